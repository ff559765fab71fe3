//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto (un solo thread acepta conexiones)
//! 2. Entrega cada conexión a una estrategia de despacho
//! 3. Lee el mensaje, lo parsea y lo rutea
//! 4. Envía la respuesta y cierra la conexión
//!
//! Las estrategias disponibles son thread por conexión, pool de threads,
//! pool de procesos y un scheduler cooperativo con límite de conexiones.

pub mod connection;
pub mod cooperative;
pub mod dispatch;
pub mod framer;
pub mod pool;
pub mod process;
pub mod queue;
pub mod tcp;

use std::io;
use thiserror::Error;

// Re-exportar para facilitar el uso
pub use connection::ConnectionHandler;
pub use cooperative::Cooperative;
pub use dispatch::{Dispatcher, ThreadPerConnection};
pub use framer::{Framer, Framing};
pub use pool::ThreadPool;
pub use process::{run_worker, ProcessPool, WorkerCommand};
pub use tcp::Server;

/// Errores de arranque y de infraestructura del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("no se pudo escuchar en {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("no se pudo crear el thread: {0}")]
    SpawnThread(#[source] io::Error),

    #[error("no se pudo lanzar el worker {program}: {source}")]
    SpawnProcess {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("no se pudo crear el runtime cooperativo: {0}")]
    Runtime(#[source] io::Error),

    #[error("configuración inválida: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
