//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing`. El filtro sale de `RUST_LOG` (por defecto
//! `http_core=info`) y todo se escribe a stderr: en el pool de procesos el
//! stdout del worker es el canal de frames.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filtro usado cuando `RUST_LOG` no está definido
pub const DEFAULT_FILTER: &str = "http_core=info";

/// Instala el subscriber global. Llamar una sola vez, al inicio de `main`
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
