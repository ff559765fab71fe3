//! # HTTP Core - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.1.
//!
//! Con `--worker` el binario no escucha en ningún puerto: atiende frames
//! por stdin/stdout como proceso hijo del pool de procesos.

use http_core::config::Config;
use http_core::logging;
use http_core::router::Router;
use http_core::server::{run_worker, ConnectionHandler, Server, ServerError};
use std::process;

fn main() {
    // Crear configuración desde CLI y variables de entorno
    let config = Config::new();
    logging::init();

    if let Err(e) = config.validate().map_err(ServerError::Config) {
        tracing::error!(error = %e, "No se puede iniciar");
        process::exit(2);
    }

    if config.worker {
        let handler = ConnectionHandler::new(
            Router::with_default_routes(config.directory.clone()),
            config.framer(),
        );

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        if let Err(e) = run_worker(stdin.lock(), stdout.lock(), &handler) {
            tracing::error!(error = %e, pid = process::id(), "El worker terminó con error");
            process::exit(1);
        }
        return;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "http_core iniciando");

    // Iniciar el servidor (esto bloqueará el thread)
    let result = Server::bind(&config).and_then(Server::run);
    if let Err(e) = result {
        tracing::error!(error = %e, "Error fatal");
        process::exit(1);
    }
}
