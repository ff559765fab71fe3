//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor HTTP con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_core --port 4221 \
//!   --directory /tmp/files \
//!   --strategy cooperative \
//!   --max-in-flight 64
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_STRATEGY=process-pool HTTP_WORKERS=8 ./http_core
//! ```

use crate::server::framer::{Framer, Framing, DEFAULT_CHUNK_SIZE};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Estrategia de concurrencia para atender conexiones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Un thread nuevo por conexión
    Threads,

    /// Pool fijo de threads
    #[default]
    ThreadPool,

    /// Pool fijo de procesos worker
    ProcessPool,

    /// Runtime async de un thread con límite de conexiones en vuelo
    Cooperative,
}

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "http_core")]
#[command(about = "Servidor HTTP/1.1 mínimo con estrategias de concurrencia intercambiables")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio que sirven las rutas `/files/`. Sin él, esas rutas dan 404
    #[arg(short, long, env = "HTTP_DIRECTORY")]
    pub directory: Option<PathBuf>,

    // === Concurrencia ===

    /// Estrategia para atender conexiones
    #[arg(long, value_enum, default_value_t = Strategy::ThreadPool, env = "HTTP_STRATEGY")]
    pub strategy: Strategy,

    /// Número de workers (threads o procesos) de los pools
    #[arg(long, default_value = "4", env = "HTTP_WORKERS")]
    pub workers: usize,

    /// Máximo de conexiones atendidas a la vez en modo cooperativo
    #[arg(long = "max-in-flight", default_value = "128", env = "HTTP_MAX_IN_FLIGHT")]
    pub max_in_flight: usize,

    // === Framing ===

    /// Tamaño de cada lectura del socket en bytes
    #[arg(long = "chunk-size", default_value = "1024", env = "HTTP_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Criterio para detectar el fin de un request
    #[arg(long, value_enum, default_value_t = Framing::LengthAware, env = "HTTP_FRAMING")]
    pub framing: Framing,

    // === Internos del pool de procesos ===

    /// Corre como proceso worker: frames por stdin/stdout
    #[arg(long, hide = true)]
    pub worker: bool,

    /// Binario a lanzar como worker (por defecto, el ejecutable actual)
    #[arg(long = "worker-program", hide = true, env = "HTTP_WORKER_PROGRAM")]
    pub worker_program: Option<PathBuf>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    ///
    /// # Ejemplo
    /// ```no_run
    /// use http_core::config::Config;
    ///
    /// let config = Config::new();
    /// println!("Server listening on {}", config.address());
    /// ```
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http_core::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Framer para las conexiones según `chunk_size` y `framing`
    pub fn framer(&self) -> Framer {
        Framer::new(self.chunk_size, self.framing)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.max_in_flight == 0 {
            return Err("Max in-flight connections must be >= 1".to_string());
        }
        if self.chunk_size == 0 {
            return Err("Chunk size must be >= 1".to_string());
        }

        if let Some(directory) = &self.directory {
            if !directory.is_dir() {
                return Err(format!("Directory {} does not exist", directory.display()));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 4221,
            host: "127.0.0.1".to_string(),
            directory: None,
            strategy: Strategy::default(),
            workers: 4,
            max_in_flight: 128,
            chunk_size: DEFAULT_CHUNK_SIZE,
            framing: Framing::default(),
            worker: false,
            worker_program: None,
        }
    }
}
