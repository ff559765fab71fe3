//! # Scheduler Cooperativo
//! src/server/cooperative.rs
//!
//! Un runtime tokio de un solo thread donde cada conexión es una tarea.
//! Un semáforo con `max_in_flight` permisos limita cuántas conexiones se
//! atienden a la vez; las demás esperan su permiso sin límite de cola.

use super::connection::ConnectionHandler;
use super::dispatch::Dispatcher;
use super::ServerError;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::runtime::{Builder, Handle};
use tokio::sync::{oneshot, Semaphore};

/// Tareas async sobre un runtime `current_thread`
pub struct Cooperative {
    runtime: Handle,
    gate: Arc<Semaphore>,
    max_in_flight: usize,
    handler: Arc<ConnectionHandler>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Cooperative {
    pub fn new(max_in_flight: usize, handler: Arc<ConnectionHandler>) -> Result<Self, ServerError> {
        let runtime = Builder::new_current_thread()
            .enable_io()
            .build()
            .map_err(ServerError::Runtime)?;
        let handle = runtime.handle().clone();
        let (shutdown, stopped) = oneshot::channel::<()>();

        // El thread maneja el runtime hasta que llegue la señal de apagado
        let thread = thread::Builder::new()
            .name("http-cooperative".to_string())
            .spawn(move || {
                let _ = runtime.block_on(stopped);
                tracing::debug!("Runtime cooperativo detenido");
            })
            .map_err(ServerError::SpawnThread)?;

        Ok(Self {
            runtime: handle,
            gate: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            handler,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    /// Conexiones con permiso tomado en este momento
    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.gate.available_permits()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

impl Dispatcher for Cooperative {
    fn name(&self) -> &'static str {
        "cooperative"
    }

    fn dispatch(&self, stream: TcpStream) {
        if let Err(e) = stream.set_nonblocking(true) {
            tracing::warn!(error = %e, "No se pudo pasar la conexión a modo no bloqueante");
            return;
        }

        let gate = Arc::clone(&self.gate);
        let handler = Arc::clone(&self.handler);

        self.runtime.spawn(async move {
            // El permiso se libera al terminar la tarea
            let _permit = match gate.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            match tokio::net::TcpStream::from_std(stream) {
                Ok(stream) => handler.serve_async(stream).await,
                Err(e) => tracing::warn!(error = %e, "No se pudo registrar la conexión en el runtime"),
            }
        });
    }
}

impl Drop for Cooperative {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("El thread del runtime cooperativo terminó con panic");
            }
        }
    }
}
