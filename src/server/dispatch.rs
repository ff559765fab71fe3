//! # Estrategias de Despacho
//! src/server/dispatch.rs
//!
//! El accept loop es de un solo thread y le entrega cada conexión a un
//! [`Dispatcher`]. Las estrategias cambian el aislamiento y el throughput,
//! nunca la semántica de request/response: todas terminan llamando a
//! [`ConnectionHandler`] (o a `serve_with` en el pool de procesos).

use super::connection::ConnectionHandler;
use super::ServerError;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;

/// Estrategia que atiende las conexiones aceptadas
pub trait Dispatcher: Send {
    /// Nombre para logs
    fn name(&self) -> &'static str;

    /// Entrega una conexión aceptada. No bloquea el accept loop más que lo
    /// necesario para encolarla.
    fn dispatch(&self, stream: TcpStream);
}

/// Un thread nuevo por conexión, sin límite
pub struct ThreadPerConnection {
    handler: Arc<ConnectionHandler>,
}

impl ThreadPerConnection {
    pub fn new(handler: Arc<ConnectionHandler>) -> Self {
        Self { handler }
    }
}

impl Dispatcher for ThreadPerConnection {
    fn name(&self) -> &'static str {
        "threads"
    }

    fn dispatch(&self, stream: TcpStream) {
        let handler = Arc::clone(&self.handler);

        let spawned = thread::Builder::new()
            .name("http-conn".to_string())
            .spawn(move || handler.serve(stream));

        if let Err(e) = spawned {
            // La conexión se cierra al descartar el closure
            tracing::error!(error = %ServerError::SpawnThread(e), "No se pudo atender la conexión");
        }
    }
}
