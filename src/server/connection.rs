//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Todas las estrategias de concurrencia pasan por acá: leer el mensaje,
//! parsearlo, rutearlo, enviar la respuesta y cerrar. Un request inválido
//! recibe 400 antes de cerrar la conexión.

use super::framer::Framer;
use crate::http::{Request, Response};
use crate::router::Router;
use std::net::{Shutdown, TcpStream};
use std::time::Instant;
use tokio::io::AsyncWriteExt;

/// Lógica de una conexión, compartida entre estrategias
pub struct ConnectionHandler {
    router: Router,
    framer: Framer,
}

impl ConnectionHandler {
    pub fn new(router: Router, framer: Framer) -> Self {
        Self { router, framer }
    }

    pub fn framer(&self) -> Framer {
        self.framer
    }

    /// Parsea y rutea un mensaje crudo
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::http::StatusCode;
    /// use http_core::router::Router;
    /// use http_core::server::{ConnectionHandler, Framer};
    ///
    /// let handler = ConnectionHandler::new(Router::with_default_routes(None), Framer::default());
    ///
    /// assert_eq!(handler.handle_bytes(b"GET /echo/hi HTTP/1.1\r\n\r\n").body(), b"hi");
    /// assert_eq!(handler.handle_bytes(b"get / HTTP/1.1\r\n\r\n").status(), StatusCode::BadRequest);
    /// ```
    pub fn handle_bytes(&self, raw: &[u8]) -> Response {
        match Request::parse(raw) {
            Ok(request) => {
                let response = self.router.route(&request);
                if response.status().is_server_error() {
                    tracing::warn!(
                        method = request.method().as_str(),
                        path = request.path(),
                        status = response.status().as_u16(),
                        "Request terminó con error del servidor"
                    );
                }
                tracing::debug!(
                    method = request.method().as_str(),
                    path = request.path(),
                    status = response.status().as_u16(),
                    "Request atendido"
                );
                response
            }
            Err(e) => {
                tracing::debug!(error = %e, "Request inválido");
                Response::bad_request()
            }
        }
    }

    /// Atiende una conexión bloqueante de principio a fin
    pub fn serve(&self, stream: TcpStream) {
        serve_with(self.framer, stream, |raw| self.handle_bytes(raw).to_bytes());
    }

    /// Atiende una conexión dentro del runtime cooperativo
    pub async fn serve_async(&self, mut stream: tokio::net::TcpStream) {
        let start = Instant::now();
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let raw = self.framer.receive_async(&mut stream).await;
        if raw.is_empty() {
            tracing::debug!(%peer, "Conexión cerrada sin datos");
            return;
        }

        let bytes = self.handle_bytes(&raw).to_bytes();
        let sent = self.framer.send_async(&mut stream, &bytes).await;

        if let Err(e) = stream.shutdown().await {
            tracing::debug!(%peer, error = %e, "Error al cerrar la conexión");
        }

        tracing::info!(
            %peer,
            received = raw.len(),
            sent,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Conexión atendida"
        );
    }
}

/// Ciclo completo de una conexión bloqueante
///
/// `respond` convierte el mensaje recibido en los bytes de respuesta. La
/// conexión se cierra en todos los caminos al salir de esta función.
pub fn serve_with<F>(framer: Framer, mut stream: TcpStream, respond: F)
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let raw = framer.receive(&mut stream);
    if raw.is_empty() {
        tracing::debug!(%peer, "Conexión cerrada sin datos");
        return;
    }

    let bytes = respond(&raw);
    let sent = framer.send(&mut stream, &bytes);

    if let Err(e) = stream.shutdown(Shutdown::Write) {
        tracing::debug!(%peer, error = %e, "Error al cerrar la conexión");
    }

    tracing::info!(
        %peer,
        received = raw.len(),
        sent,
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Conexión atendida"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;

    fn handler() -> Arc<ConnectionHandler> {
        Arc::new(ConnectionHandler::new(
            Router::with_default_routes(None),
            Framer::default(),
        ))
    }

    /// Acepta una conexión, la atiende y retorna lo que vio el cliente
    fn round_trip(request: &[u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handler = handler();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handler.serve(stream);
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(request).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();

        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_handle_bytes_routes() {
        let handler = handler();
        let response = handler.handle_bytes(b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
    }

    #[test]
    fn test_handle_bytes_parse_error_is_400() {
        let handler = handler();
        for raw in [&b"GET /\r\n\r\n"[..], b"\x00\x01\x02\x03garbage", b"get / HTTP/1.1\r\n\r\n"] {
            let response = handler.handle_bytes(raw);
            assert_eq!(response.status(), StatusCode::BadRequest);
            assert!(response.body().is_empty());
        }
    }

    #[test]
    fn test_serve_echo() {
        let text = round_trip(b"GET /echo/abc HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nabc"
        );
    }

    #[test]
    fn test_serve_parse_error_sends_only_400() {
        let text = round_trip(b"GET /\r\n\r\n");
        assert_eq!(text, "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn test_serve_overflowing_content_length_still_answers() {
        let text = round_trip(
            b"POST /files/a HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\nx",
        );
        // Sin directorio configurado, las rutas de archivos responden 404
        assert_eq!(text, "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    }

    #[test]
    fn test_serve_peer_closed_immediately() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handler = handler();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            // El peer no manda nada: serve debe terminar sin responder
            handler.serve(stream);
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();
    }
}
