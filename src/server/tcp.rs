//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Accept loop de un solo thread. Cada conexión aceptada se le entrega a la
//! estrategia configurada ([`Dispatcher`]); el loop nunca atiende requests.

use super::connection::ConnectionHandler;
use super::cooperative::Cooperative;
use super::dispatch::{Dispatcher, ThreadPerConnection};
use super::pool::ThreadPool;
use super::process::{ProcessPool, WorkerCommand};
use super::ServerError;
use crate::config::{Config, Strategy};
use crate::router::Router;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Pausa después de un accept fallido
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Servidor HTTP/1.1 con estrategia de concurrencia intercambiable
pub struct Server {
    listener: TcpListener,
    dispatcher: Box<dyn Dispatcher>,
}

impl Server {
    /// Escucha en la dirección configurada y arranca la estrategia
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        let dispatcher = build_dispatcher(config)?;

        tracing::info!(
            address = %address,
            strategy = dispatcher.name(),
            directory = ?config.directory,
            "Servidor escuchando"
        );

        Ok(Self {
            listener,
            dispatcher,
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn strategy(&self) -> &'static str {
        self.dispatcher.name()
    }

    /// Acepta conexiones para siempre
    ///
    /// Un error de accept se loguea y el loop sigue tras una pausa corta.
    pub fn run(self) -> Result<(), ServerError> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.dispatcher.dispatch(stream),
                Err(e) => accept_failed(&e),
            }
        }

        Ok(())
    }
}

/// Errores como EMFILE se repiten en cada accept; la pausa evita girar en vacío
fn accept_failed(error: &io::Error) {
    tracing::warn!(error = %error, "Error al aceptar conexión");
    thread::sleep(ACCEPT_ERROR_BACKOFF);
}

/// Construye la estrategia pedida por la configuración
pub fn build_dispatcher(config: &Config) -> Result<Box<dyn Dispatcher>, ServerError> {
    let framer = config.framer();
    let handler = || {
        Arc::new(ConnectionHandler::new(
            Router::with_default_routes(config.directory.clone()),
            framer,
        ))
    };

    let dispatcher: Box<dyn Dispatcher> = match config.strategy {
        Strategy::Threads => Box::new(ThreadPerConnection::new(handler())),
        Strategy::ThreadPool => Box::new(ThreadPool::new(config.workers, handler())?),
        Strategy::ProcessPool => Box::new(ProcessPool::new(
            config.workers,
            WorkerCommand::from_config(config)?,
            framer,
        )?),
        Strategy::Cooperative => Box::new(Cooperative::new(config.max_in_flight, handler())?),
    };

    Ok(dispatcher)
}
