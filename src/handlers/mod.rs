//! # Handlers
//! src/handlers/mod.rs
//!
//! Handlers que registra el router:
//! - `basic`: raíz, user-agent y echo
//! - `files`: lectura y creación de archivos bajo un directorio raíz

pub mod basic;
pub mod files;

pub use files::{FileStore, FileStoreError};
