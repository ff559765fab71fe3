//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP y convertirlas a bytes para enviar al
//! cliente. Todas las respuestas salen como HTTP/1.1.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_core::http::{Response, StatusCode};
//!
//! let response = Response::text_content(StatusCode::Ok, "hello", None, None);
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\nhello"));
//! ```

use super::{ContentEncoding, Headers, StatusCode, Version};

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Respuesta HTTP completa
///
/// `Content-Length` siempre coincide con el largo del body final (ya
/// comprimido si corresponde).
#[derive(Debug, Clone)]
pub struct Response {
    version: Version,
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Respuesta sin body (`Content-Length: 0`)
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::http::{Response, StatusCode};
    ///
    /// let response = Response::empty(StatusCode::NotFound);
    /// assert_eq!(response.to_bytes(), b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    /// ```
    pub fn empty(status: StatusCode) -> Self {
        let mut headers = Headers::new();
        headers.insert("Content-Length", "0");

        Self {
            version: Version::Http11,
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Respuesta con contenido de texto
    ///
    /// `content_type` por defecto es `text/plain`. Si se pasa una
    /// codificación, el body se comprime y se agrega `Content-Encoding`.
    pub fn text_content(
        status: StatusCode,
        content: impl Into<Vec<u8>>,
        content_type: Option<&str>,
        encoding: Option<ContentEncoding>,
    ) -> Self {
        let mut body = content.into();
        let mut headers = Headers::new();
        headers.insert("Content-Type", content_type.unwrap_or(DEFAULT_CONTENT_TYPE));

        if let Some(encoding) = encoding {
            match encoding.encode(&body) {
                Ok(encoded) => {
                    body = encoded;
                    headers.insert("Content-Encoding", encoding.as_str());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "No se pudo comprimir el body, se envía sin codificar");
                }
            }
        }

        headers.insert("Content-Length", body.len().to_string());

        Self {
            version: Version::Http11,
            status,
            headers,
            body,
        }
    }

    /// Respuesta para requests que no se pudieron parsear
    pub fn bad_request() -> Self {
        Self::empty(StatusCode::BadRequest)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers en orden de inserción: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body: contenido binario
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(64 + self.body.len());

        result.extend_from_slice(format!("{} {}\r\n", self.version, self.status).as_bytes());

        for (name, value) in self.headers.iter() {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
