//! # Handlers de Archivos
//! src/handlers/files.rs
//!
//! `GET /files/<name>` y `POST /files/<name>` sobre un directorio raíz.
//!
//! - El nombre se resuelve dentro de la raíz; `..`, `.` y rutas absolutas
//!   se rechazan (404).
//! - POST crea el archivo con `create_new`, que falla si ya existe. Dos
//!   POST concurrentes al mismo nombre dan exactamente un 201 y un 409.

use crate::http::{ContentEncoding, Request, Response, StatusCode};
use crate::router::Handler;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errores del file store
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// Nombre vacío o que escapa de la raíz
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// El archivo (o su directorio padre) no existe
    #[error("File not found: {0}")]
    NotFound(String),

    /// El archivo ya existe (POST)
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Directorio raíz que sirven las rutas `files/`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resuelve un nombre dentro de la raíz
    ///
    /// Solo se aceptan componentes normales: nada de `..`, `.` ni rutas
    /// absolutas.
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::handlers::files::FileStore;
    ///
    /// let store = FileStore::new("/srv/data");
    /// assert!(store.resolve("foo.txt").is_ok());
    /// assert!(store.resolve("../etc/passwd").is_err());
    /// assert!(store.resolve("/etc/passwd").is_err());
    /// ```
    pub fn resolve(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        let relative = Path::new(name);
        let is_plain = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        // `components()` normaliza los `.` intermedios, por eso se revisa el texto
        if !is_plain || name.split('/').any(|part| part == "." || part == "..") {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Lee el contenido completo de un archivo
    pub fn read(&self, name: &str) -> Result<Vec<u8>, FileStoreError> {
        let path = self.resolve(name)?;

        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileStoreError::NotFound(name.to_string()),
            _ => FileStoreError::Io {
                name: name.to_string(),
                source: e,
            },
        })
    }

    /// Crea un archivo nuevo con `contents`
    ///
    /// La creación es exclusiva: si el archivo ya existe retorna
    /// [`FileStoreError::AlreadyExists`] sin tocarlo. Si la escritura falla
    /// después de crearlo, el archivo parcial se borra.
    pub fn create(&self, name: &str, contents: &[u8]) -> Result<(), FileStoreError> {
        let path = self.resolve(name)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => FileStoreError::AlreadyExists(name.to_string()),
                io::ErrorKind::NotFound => FileStoreError::NotFound(name.to_string()),
                _ => FileStoreError::Io {
                    name: name.to_string(),
                    source: e,
                },
            })?;

        if let Err(e) = file.write_all(contents).and_then(|_| file.flush()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(FileStoreError::Io {
                name: name.to_string(),
                source: e,
            });
        }

        Ok(())
    }
}

/// Handler para `GET /files/<name>`
pub fn get_handler(store: Option<Arc<FileStore>>) -> impl Handler {
    move |req: &Request, name: &str| -> Response {
        let Some(store) = store.as_deref() else {
            return Response::empty(StatusCode::NotFound);
        };

        match store.read(name) {
            Ok(contents) => Response::text_content(
                StatusCode::Ok,
                contents,
                Some("application/octet-stream"),
                ContentEncoding::for_request(req),
            ),
            Err(FileStoreError::Io { name, source }) => {
                tracing::warn!(file = %name, error = %source, "No se pudo leer el archivo");
                Response::empty(StatusCode::NotFound)
            }
            Err(e) => {
                tracing::debug!(error = %e, "GET de archivo sin resultado");
                Response::empty(StatusCode::NotFound)
            }
        }
    }
}

/// Handler para `POST /files/<name>`
pub fn post_handler(store: Option<Arc<FileStore>>) -> impl Handler {
    move |req: &Request, name: &str| -> Response {
        let Some(store) = store.as_deref() else {
            return Response::empty(StatusCode::NotFound);
        };

        match store.create(name, req.body()) {
            Ok(()) => {
                tracing::debug!(file = name, bytes = req.body().len(), "Archivo creado");
                Response::empty(StatusCode::Created)
            }
            Err(FileStoreError::AlreadyExists(_)) => Response::empty(StatusCode::Conflict),
            Err(e @ (FileStoreError::InvalidName(_) | FileStoreError::NotFound(_))) => {
                tracing::debug!(error = %e, "POST de archivo rechazado");
                Response::empty(StatusCode::NotFound)
            }
            Err(e) => {
                tracing::warn!(error = %e, "No se pudo crear el archivo");
                Response::empty(StatusCode::InternalServerError)
            }
        }
    }
}
