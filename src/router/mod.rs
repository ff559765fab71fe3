//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Tabla ordenada de rutas `(método, matcher, handler)`.
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! La primera ruta que coincide gana. Si ninguna coincide se responde
//! 404 Not Found sin body.

use crate::handlers::{basic, files};
use crate::handlers::files::FileStore;
use crate::http::{Method, Request, Response, StatusCode};
use std::path::PathBuf;
use std::sync::Arc;

/// Handler de una ruta
///
/// Recibe el request y el resto del path que quedó después del prefijo de
/// la ruta (vacío para rutas exactas).
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, rest: &str) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request, &str) -> Response + Send + Sync,
{
    fn handle(&self, request: &Request, rest: &str) -> Response {
        self(request, rest)
    }
}

/// Cómo se compara el path de una ruta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatcher {
    /// El path debe ser exactamente este literal
    Exact(&'static str),

    /// El path es el literal o empieza con `literal/`; el resto va al handler
    Prefix(&'static str),
}

impl PathMatcher {
    /// Retorna el resto del path si coincide
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::router::PathMatcher;
    ///
    /// assert_eq!(PathMatcher::Prefix("echo").matches("echo/abc"), Some("abc"));
    /// assert_eq!(PathMatcher::Prefix("echo").matches("echo"), Some(""));
    /// assert_eq!(PathMatcher::Prefix("echo").matches("echoes"), None);
    /// assert_eq!(PathMatcher::Exact("").matches(""), Some(""));
    /// ```
    pub fn matches<'p>(&self, path: &'p str) -> Option<&'p str> {
        match *self {
            PathMatcher::Exact(literal) => (path == literal).then_some(""),
            PathMatcher::Prefix(literal) => {
                if path == literal {
                    Some("")
                } else {
                    path.strip_prefix(literal)?.strip_prefix('/')
                }
            }
        }
    }
}

struct Route {
    method: Method,
    matcher: PathMatcher,
    handler: Box<dyn Handler>,
}

/// Router que mapea (método, path) a handlers
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Crea el router con la tabla de rutas del servidor
    ///
    /// `root` es el directorio que sirven las rutas `files/`. Sin directorio
    /// esas rutas responden 404.
    ///
    /// | Método | Path            |
    /// |--------|-----------------|
    /// | GET    | `` (raíz)       |
    /// | GET    | `user-agent`    |
    /// | GET    | `echo/<rest>`   |
    /// | GET    | `files/<name>`  |
    /// | POST   | `files/<name>`  |
    pub fn with_default_routes(root: Option<PathBuf>) -> Self {
        let store = root.map(FileStore::new).map(Arc::new);

        let mut router = Self::new();
        router.register(Method::GET, PathMatcher::Exact(""), basic::root_handler);
        router.register(Method::GET, PathMatcher::Exact("user-agent"), basic::user_agent_handler);
        router.register(Method::GET, PathMatcher::Prefix("echo"), basic::echo_handler);
        router.register(Method::GET, PathMatcher::Prefix("files"), files::get_handler(store.clone()));
        router.register(Method::POST, PathMatcher::Prefix("files"), files::post_handler(store));
        router
    }

    /// Registra una ruta al final de la tabla
    ///
    /// # Ejemplo
    /// ```
    /// use http_core::router::{PathMatcher, Router};
    /// use http_core::http::{Method, Request, Response, StatusCode};
    ///
    /// fn hello_handler(_req: &Request, _rest: &str) -> Response {
    ///     Response::text_content(StatusCode::Ok, "hello", None, None)
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, PathMatcher::Exact("hello"), hello_handler);
    /// ```
    pub fn register(&mut self, method: Method, matcher: PathMatcher, handler: impl Handler + 'static) {
        self.routes.push(Route {
            method,
            matcher,
            handler: Box::new(handler),
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();

        for route in &self.routes {
            if route.method != request.method() {
                continue;
            }
            if let Some(rest) = route.matcher.matches(path) {
                return route.handler.handle(request, rest);
            }
        }

        tracing::debug!(method = request.method().as_str(), path, "Ruta no encontrada");
        Response::empty(StatusCode::NotFound)
    }

    /// Cantidad de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn request(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap()
    }

    fn tagged(tag: &'static str) -> impl Handler {
        move |_req: &Request, _rest: &str| Response::text_content(StatusCode::Ok, tag, None, None)
    }

    #[test]
    fn test_router_creation() {
        assert!(Router::new().is_empty());
        assert_eq!(Router::with_default_routes(None).len(), 5);
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router.register(Method::GET, PathMatcher::Prefix("a"), tagged("first"));
        router.register(Method::GET, PathMatcher::Exact("a/b"), tagged("second"));

        let response = router.route(&request(b"GET /a/b HTTP/1.1\r\n\r\n"));
        assert_eq!(response.body(), b"first");
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new();
        router.register(Method::GET, PathMatcher::Exact("a"), tagged("get"));

        let response = router.route(&request(b"DELETE /a HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::NotFound);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_root() {
        let router = Router::with_default_routes(None);
        let response = router.route(&request(b"GET / HTTP/1.1\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body().is_empty());
        assert_eq!(response.headers().get("Content-Length"), Some("0"));
    }

    #[test]
    fn test_user_agent() {
        let router = Router::with_default_routes(None);
        let response = router.route(&request(
            b"GET /user-agent HTTP/1.1\r\nUser-Agent: curl/8.9.1\r\n\r\n",
        ));

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"curl/8.9.1");
    }

    #[test]
    fn test_echo() {
        let router = Router::with_default_routes(None);

        let response = router.route(&request(b"GET /echo/abc HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"abc");

        let response = router.route(&request(b"GET /echo/ HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"");
    }

    #[test]
    fn test_echo_gzip() {
        let router = Router::with_default_routes(None);
        let response = router.route(&request(
            b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n",
        ));

        assert_eq!(response.headers().get("Content-Encoding"), Some("gzip"));
        let mut decoded = String::new();
        GzDecoder::new(response.body()).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, "abc");
    }

    #[test]
    fn test_unknown_routes_are_404() {
        let router = Router::with_default_routes(None);

        for raw in [
            &b"GET /nonexistent HTTP/1.1\r\n\r\n"[..],
            b"PUT /echo/abc HTTP/1.1\r\n\r\n",
            b"DELETE / HTTP/1.1\r\n\r\n",
            b"POST /user-agent HTTP/1.1\r\n\r\n",
        ] {
            let response = router.route(&request(raw));
            assert_eq!(response.status(), StatusCode::NotFound);
            assert!(response.body().is_empty());
        }
    }

    #[test]
    fn test_files_without_root_are_404() {
        let router = Router::with_default_routes(None);

        let response = router.route(&request(b"GET /files/foo.txt HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::NotFound);

        let response = router.route(&request(b"POST /files/foo.txt HTTP/1.1\r\n\r\ndata"));
        assert_eq!(response.status(), StatusCode::NotFound);
    }
}
