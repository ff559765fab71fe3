//! # Request-Target
//! src/http/target.rs
//!
//! Resuelve el request-target de la request line. HTTP/1.1 permite cuatro
//! formas, mutuamente excluyentes desde el primer token:
//!
//! ```text
//! origin-form     /path/a?key=value
//! absolute-form   http://example.com:80/path?key=value
//! authority-form  example.com:80
//! asterisk-form   *
//! ```
//!
//! El resultado es siempre la terna `(host, path, query_params)`. El path
//! se guarda sin slash inicial ni final (`/a/b/` → `a/b`).

use super::request::ParseError;
use std::collections::HashMap;
use std::fmt;

/// Request-target ya resuelto
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlTarget {
    /// Host (con puerto si vino), `*` para asterisk-form, `None` en origin-form
    host: Option<String>,

    /// Segmentos unidos por `/`, sin slash inicial ni final
    path: String,

    /// Query parameters (el último duplicado gana)
    query_params: HashMap<String, String>,
}

/// Estados de la máquina que recorre el target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Scheme,
    Host { absolute: bool },
    Port { absolute: bool },
    AfterAuthority,
    Path,
    Query,
    Done,
}

impl UrlTarget {
    /// Parsea un request-target
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_core::http::UrlTarget;
    ///
    /// let target = UrlTarget::parse("http://x.com/a/b?q=1").unwrap();
    /// assert_eq!(target.host(), Some("x.com"));
    /// assert_eq!(target.path(), "a/b");
    /// assert_eq!(target.query_param("q"), Some("1"));
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let bytes = input.as_bytes();
        let invalid = || ParseError::InvalidTarget(input.to_string());

        if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_graphic) {
            return Err(invalid());
        }

        let mut target = UrlTarget::default();
        let mut cursor = 0;
        let mut state = State::Start;

        while state != State::Done {
            state = match state {
                State::Start => match bytes[0] {
                    b'*' if bytes.len() == 1 => {
                        target.host = Some("*".to_string());
                        State::Done
                    }
                    b'*' => return Err(invalid()),
                    b'/' => {
                        cursor = 1;
                        State::Path
                    }
                    _ if input.starts_with("http://") || input.starts_with("https://") => {
                        State::Scheme
                    }
                    _ => State::Host { absolute: false },
                },

                State::Scheme => {
                    cursor = if input.starts_with("https://") { 8 } else { 7 };
                    State::Host { absolute: true }
                }

                State::Host { absolute } => {
                    let end = scan(bytes, cursor, is_host_byte);
                    if end == cursor {
                        return Err(invalid());
                    }
                    target.host = Some(input[cursor..end].to_string());
                    cursor = end;

                    match bytes.get(cursor) {
                        Some(b':') => State::Port { absolute },
                        _ if absolute => State::AfterAuthority,
                        // authority-form exige puerto
                        _ => return Err(invalid()),
                    }
                }

                State::Port { absolute } => {
                    let end = scan(bytes, cursor + 1, |b| b.is_ascii_digit());
                    if end == cursor + 1 {
                        return Err(invalid());
                    }
                    if let Some(host) = target.host.as_mut() {
                        host.push_str(&input[cursor..end]);
                    }
                    cursor = end;

                    if absolute {
                        State::AfterAuthority
                    } else if cursor == bytes.len() {
                        State::Done
                    } else {
                        return Err(invalid());
                    }
                }

                State::AfterAuthority => match bytes.get(cursor) {
                    None => State::Done,
                    Some(b'/') => {
                        cursor += 1;
                        State::Path
                    }
                    Some(b'?') => State::Query,
                    Some(_) => return Err(invalid()),
                },

                State::Path => {
                    let mut segments = Vec::new();
                    loop {
                        let end = scan(bytes, cursor, is_segment_byte);
                        if end == cursor {
                            break;
                        }
                        segments.push(&input[cursor..end]);
                        cursor = end;

                        if bytes.get(cursor) == Some(&b'/') {
                            cursor += 1;
                        } else {
                            break;
                        }
                    }
                    target.path = segments.join("/");

                    match bytes.get(cursor) {
                        None => State::Done,
                        Some(b'?') => State::Query,
                        Some(_) => return Err(invalid()),
                    }
                }

                State::Query => {
                    let query = &input[cursor + 1..];
                    for pair in query.split('&').filter(|p| !p.is_empty()) {
                        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                        if key.is_empty() || key.contains('#') || value.contains('#') {
                            return Err(invalid());
                        }
                        target.query_params.insert(key.to_string(), value.to_string());
                    }
                    cursor = bytes.len();
                    State::Done
                }

                State::Done => State::Done,
            };
        }

        Ok(target)
    }

    /// Host del target (incluye `:puerto` si vino)
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Path sin slash inicial ni final
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }
}

impl fmt::Display for UrlTarget {
    /// Forma canónica: `*`, `/path?q` o `http://host/path?q`.
    ///
    /// Volver a parsear la forma canónica produce el mismo target.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host.as_deref() {
            Some("*") => return write!(f, "*"),
            Some(host) => {
                write!(f, "http://{}", host)?;
                if !self.path.is_empty() {
                    write!(f, "/{}", self.path)?;
                }
            }
            None => write!(f, "/{}", self.path)?,
        }

        let mut keys: Vec<&String> = self.query_params.keys().collect();
        keys.sort();
        for (i, key) in keys.into_iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, self.query_params[key])?;
        }
        Ok(())
    }
}

/// Avanza mientras `accept` acepte el byte; retorna la posición final
fn scan(bytes: &[u8], start: usize, accept: impl Fn(u8) -> bool) -> usize {
    let mut end = start;
    while end < bytes.len() && accept(bytes[end]) {
        end += 1;
    }
    end
}

fn is_host_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.')
}

fn is_segment_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'%')
}
