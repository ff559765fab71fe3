//! # Negociación de contenido
//! src/http/encoding.rs
//!
//! Decide si la respuesta se comprime a partir de `Accept-Encoding` y
//! comprime con gzip usando flate2.

use super::Request;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Nivel de compresión fijo (equivale a gzip -9)
const GZIP_LEVEL: u32 = 9;

/// Codificaciones de contenido soportadas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    /// Valor para el header `Content-Encoding`
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }

    /// Negocia la codificación desde un valor de `Accept-Encoding`.
    ///
    /// Los tokens se separan por coma y se comparan distinguiendo mayúsculas.
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::http::ContentEncoding;
    ///
    /// assert_eq!(ContentEncoding::negotiate("deflate, gzip"), Some(ContentEncoding::Gzip));
    /// assert_eq!(ContentEncoding::negotiate("GZIP"), None);
    /// ```
    pub fn negotiate(accept_encoding: &str) -> Option<Self> {
        accept_encoding
            .split(',')
            .map(str::trim)
            .any(|token| token == "gzip")
            .then_some(ContentEncoding::Gzip)
    }

    /// Negocia la codificación para un request
    pub fn for_request(request: &Request) -> Option<Self> {
        request
            .header("Accept-Encoding")
            .and_then(Self::negotiate)
    }

    /// Codifica el contenido
    pub fn encode(&self, content: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::new(GZIP_LEVEL));
                encoder.write_all(content)?;
                encoder.finish()
            }
        }
    }
}
