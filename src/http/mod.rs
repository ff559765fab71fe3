//! # Módulo HTTP
//!
//! Este módulo implementa el subconjunto de HTTP/1.1 que habla el servidor,
//! sin usar librerías de alto nivel. Incluye:
//!
//! - Parsing de requests (request line, headers, body)
//! - Las cuatro formas de request-target
//! - Construcción de responses y negociación gzip
//! - Códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Accept-Encoding: gzip\r\n
//! \r\n
//! ```
//!
//! No hay conexiones persistentes, chunked transfer-encoding ni pipelining:
//! cada conexión lleva exactamente un request y una respuesta.

pub mod encoding; // Negociación de Content-Encoding
pub mod headers;  // Mapa ordenado de headers
pub mod request;  // Parsing de HTTP requests
pub mod response; // Construcción de HTTP responses
pub mod status;   // Códigos de estado HTTP
pub mod target;   // Request-target (origin/absolute/authority/asterisk)

// Re-exportamos los tipos principales para facilitar su uso
pub use encoding::ContentEncoding;
pub use headers::Headers;
pub use request::{Method, ParseError, Request, Version};
pub use response::Response;
pub use status::StatusCode;
pub use target::UrlTarget;
