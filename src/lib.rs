//! # HTTP Core
//! src/lib.rs
//!
//! Núcleo de un servidor HTTP/1.1 mínimo implementado desde cero: parser de
//! requests, router, serialización de respuestas (con gzip opcional) y
//! varias estrategias de concurrencia intercambiables.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y serialización del protocolo HTTP/1.1
//! - `router`: Enrutamiento de peticiones a handlers
//! - `handlers`: Rutas raíz, `user-agent`, `echo` y `files`
//! - `server`: Accept loop, framing y estrategias de despacho
//! - `config`: Argumentos CLI y variables de entorno
//! - `logging`: Inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_core::config::Config;
//! use http_core::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el accept loop");
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
