//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser HTTP/1.1 escrito a mano: un cursor sobre los bytes y una máquina
//! de tres estados {request line, headers, body}.
//!
//! ## Gramática
//!
//! ```text
//! request-line = method SP url-target SP version CRLF
//! headers      = *( token ":" SP value CRLF ) CRLF
//! body         = *OCTET
//! ```
//!
//! El body es todo lo que queda después de la línea vacía, sin recortar por
//! `Content-Length`. El parsing es todo o nada: cualquier regla que no
//! coincide produce un [`ParseError`].

use super::headers::Headers;
use super::target::UrlTarget;
use thiserror::Error;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    DELETE,
    PUT,
}

impl Method {
    /// Parsea un método HTTP. Distingue mayúsculas (`get` no es válido)
    fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"GET" => Some(Method::GET),
            b"POST" => Some(Method::POST),
            b"DELETE" => Some(Method::DELETE),
            b"PUT" => Some(Method::PUT),
            _ => None,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::DELETE => "DELETE",
            Method::PUT => "PUT",
        }
    }
}

/// Versiones HTTP aceptadas en la request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
    Http20,
}

impl Version {
    fn from_token(token: &[u8]) -> Option<Self> {
        match token {
            b"HTTP/1.0" => Some(Version::Http10),
            b"HTTP/1.1" => Some(Version::Http11),
            b"HTTP/2.0" => Some(Version::Http20),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
            Version::Http20 => "HTTP/2.0",
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío
    #[error("Empty request")]
    Empty,

    /// Método HTTP no soportado
    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    /// Ninguna forma de request-target coincide
    #[error("Invalid request target: {0}")]
    InvalidTarget(String),

    /// Versión HTTP desconocida
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// Separadores o terminador de la request line incorrectos
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// Header malformado
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Faltó la línea vacía que cierra los headers
    #[error("Headers are not terminated by an empty line")]
    UnterminatedHeaders,
}

/// Representa un request HTTP parseado. Es inmutable una vez construido
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    target: UrlTarget,
    version: Version,
    headers: Headers,
    body: Vec<u8>,
}

/// Estados del parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    RequestLine,
    Headers,
    Body,
}

/// Cursor de lectura sobre el buffer del request
struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    /// Consume bytes mientras `accept` los acepte
    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while !self.is_at_end() && accept(self.input[self.pos]) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Consume `literal` si viene a continuación
    fn eat(&mut self, literal: &[u8]) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume hasta el próximo CRLF (o el final) y retorna la línea sin él.
    /// El booleano indica si la línea terminó en CRLF.
    fn take_line(&mut self) -> (&'a [u8], bool) {
        let rest = self.rest();
        match rest.windows(2).position(|w| w == b"\r\n") {
            Some(idx) => {
                self.pos += idx + 2;
                (&rest[..idx], true)
            }
            None => {
                self.pos = self.input.len();
                (rest, false)
            }
        }
    }
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_core::http::{Method, Request};
    ///
    /// let raw = b"GET /echo/abc?x=1 HTTP/1.1\r\nUser-Agent: curl/8.9.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "echo/abc");
    /// assert_eq!(request.header("User-Agent"), Some("curl/8.9.1"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::Empty);
        }

        let mut cursor = Cursor::new(buffer);
        let mut state = ParseState::RequestLine;

        let mut request_line = None;
        let mut headers = Headers::new();

        let body = loop {
            match state {
                ParseState::RequestLine => {
                    let (method, target, version, terminated) =
                        Self::parse_request_line(&mut cursor)?;
                    request_line = Some((method, target, version));

                    state = if terminated {
                        ParseState::Headers
                    } else {
                        // Request line sin CRLF: no hay headers ni body
                        ParseState::Body
                    };
                }

                ParseState::Headers => {
                    if cursor.is_at_end() {
                        // Request line + CRLF sin línea vacía
                        state = ParseState::Body;
                        continue;
                    }

                    let (line, terminated) = cursor.take_line();
                    if line.is_empty() && terminated {
                        state = ParseState::Body;
                        continue;
                    }
                    if !terminated {
                        return Err(ParseError::UnterminatedHeaders);
                    }

                    let (name, value) = Self::parse_header_line(line)?;
                    headers.insert(name, value);
                }

                ParseState::Body => break cursor.rest().to_vec(),
            }
        };

        let (method, target, version) = request_line.ok_or(ParseError::InvalidRequestLine)?;

        Ok(Request {
            method,
            target,
            version,
            headers,
            body,
        })
    }

    /// Parsea la request line: `METHOD SP target SP HTTP/x.y CRLF`
    fn parse_request_line(
        cursor: &mut Cursor<'_>,
    ) -> Result<(Method, UrlTarget, Version, bool), ParseError> {
        // Método: letras seguidas de un límite de palabra
        let token = cursor.take_while(|b| !b.is_ascii_whitespace());
        let method = Method::from_token(token)
            .ok_or_else(|| ParseError::InvalidMethod(lossy(token)))?;

        if cursor.take_while(|b| b == b' ').is_empty() {
            return Err(ParseError::InvalidRequestLine);
        }

        let token = cursor.take_while(|b| !b.is_ascii_whitespace());
        let target = UrlTarget::parse(&lossy(token))?;

        if cursor.take_while(|b| b == b' ').is_empty() {
            return Err(ParseError::InvalidRequestLine);
        }

        let token = cursor.take_while(|b| !b.is_ascii_whitespace());
        let version = Version::from_token(token)
            .ok_or_else(|| ParseError::InvalidVersion(lossy(token)))?;

        cursor.take_while(|b| b == b' ');
        if cursor.eat(b"\r\n") {
            Ok((method, target, version, true))
        } else if cursor.is_at_end() {
            Ok((method, target, version, false))
        } else {
            Err(ParseError::InvalidRequestLine)
        }
    }

    /// Parsea una línea `Nombre: Valor`
    fn parse_header_line(line: &[u8]) -> Result<(String, String), ParseError> {
        let invalid = || ParseError::InvalidHeader(lossy(line));

        let colon = line.iter().position(|&b| b == b':').ok_or_else(invalid)?;
        let name = &line[..colon];

        if name.is_empty()
            || !name
                .iter()
                .all(|&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(invalid());
        }

        let value = std::str::from_utf8(&line[colon + 1..]).map_err(|_| invalid())?;
        let value = value.trim_matches(|c| c == ' ' || c == '\t');

        Ok((lossy(name), value.to_string()))
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el request-target resuelto
    pub fn target(&self) -> &UrlTarget {
        &self.target
    }

    /// Obtiene el path del request (sin slash inicial ni final)
    pub fn path(&self) -> &str {
        self.target.path()
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.target.query_param(name)
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> Version {
        self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
