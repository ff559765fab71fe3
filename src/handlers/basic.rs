//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `/`: responde 200 sin body
//! - `/user-agent`: devuelve el header `User-Agent`
//! - `/echo/<texto>`: devuelve `<texto>`
//!
//! Las respuestas de texto se comprimen con gzip si el cliente lo acepta.

use crate::http::{ContentEncoding, Request, Response, StatusCode};

/// Handler para `/`
pub fn root_handler(_req: &Request, _rest: &str) -> Response {
    Response::empty(StatusCode::Ok)
}

/// Handler para `/user-agent`
///
/// Sin header `User-Agent` responde con body vacío.
pub fn user_agent_handler(req: &Request, _rest: &str) -> Response {
    let user_agent = req.header("User-Agent").unwrap_or_default();

    Response::text_content(
        StatusCode::Ok,
        user_agent,
        None,
        ContentEncoding::for_request(req),
    )
}

/// Handler para `/echo/<texto>`
///
/// # Ejemplo
/// ```
/// use http_core::handlers::basic::echo_handler;
/// use http_core::http::Request;
///
/// let request = Request::parse(b"GET /echo/abc HTTP/1.1\r\n\r\n").unwrap();
/// let response = echo_handler(&request, "abc");
/// assert_eq!(response.body(), b"abc");
/// ```
pub fn echo_handler(req: &Request, rest: &str) -> Response {
    Response::text_content(
        StatusCode::Ok,
        rest,
        None,
        ContentEncoding::for_request(req),
    )
}
