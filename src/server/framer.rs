//! # Framing de Conexiones
//! src/server/framer.rs
//!
//! Lee y escribe los bytes crudos de una conexión.
//!
//! Hay dos modos para decidir dónde termina el mensaje:
//!
//! - [`Framing::LengthAware`] (por defecto): el mensaje termina en la línea
//!   vacía de los headers más `Content-Length` bytes de body, si el header
//!   existe.
//! - [`Framing::ShortRead`]: un chunk más corto que el pedido marca el fin
//!   del mensaje. Puede truncar mensajes que llegan en varios segmentos y
//!   se queda esperando si el largo es múltiplo exacto del chunk.
//!
//! En ambos modos, leer 0 bytes (el peer cerró) termina el mensaje. Los
//! errores de socket no se propagan: se loguean y se retorna lo acumulado.

use std::io::{self, Read, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Tamaño de chunk por defecto
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Criterio para detectar el fin de un mensaje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Framing {
    /// Headers + `Content-Length`
    #[default]
    LengthAware,

    /// Heurística de lectura corta
    ShortRead,
}

/// Lector/escritor de mensajes para una conexión
#[derive(Debug, Clone, Copy)]
pub struct Framer {
    chunk_size: usize,
    framing: Framing,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, Framing::default())
    }
}

impl Framer {
    pub fn new(chunk_size: usize, framing: Framing) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            framing,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Lee un mensaje completo
    pub fn receive<R: Read>(&self, conn: &mut R) -> Vec<u8> {
        let mut acc = Accumulator::new(*self);
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            match conn.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    if acc.feed(&chunk[..n]) {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, received = acc.len(), "Error de socket al recibir");
                    break;
                }
            }
        }

        acc.into_bytes()
    }

    /// Escribe todos los bytes (best effort). Retorna los bytes enviados
    pub fn send<W: Write>(&self, conn: &mut W, bytes: &[u8]) -> usize {
        let mut total_sent = 0;

        while total_sent < bytes.len() {
            match conn.write(&bytes[total_sent..]) {
                Ok(0) => {
                    tracing::warn!(sent = total_sent, total = bytes.len(), "El socket dejó de aceptar bytes");
                    break;
                }
                Ok(n) => total_sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, sent = total_sent, "Error de socket al enviar");
                    break;
                }
            }
        }

        if let Err(e) = conn.flush() {
            tracing::warn!(error = %e, "Error de socket al hacer flush");
        }

        total_sent
    }

    /// Versión async de [`Framer::receive`]
    pub async fn receive_async<R: AsyncRead + Unpin>(&self, conn: &mut R) -> Vec<u8> {
        let mut acc = Accumulator::new(*self);
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            match conn.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    if acc.feed(&chunk[..n]) {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, received = acc.len(), "Error de socket al recibir");
                    break;
                }
            }
        }

        acc.into_bytes()
    }

    /// Versión async de [`Framer::send`]
    pub async fn send_async<W: AsyncWrite + Unpin>(&self, conn: &mut W, bytes: &[u8]) -> usize {
        let mut total_sent = 0;

        while total_sent < bytes.len() {
            match conn.write(&bytes[total_sent..]).await {
                Ok(0) => {
                    tracing::warn!(sent = total_sent, total = bytes.len(), "El socket dejó de aceptar bytes");
                    break;
                }
                Ok(n) => total_sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, sent = total_sent, "Error de socket al enviar");
                    break;
                }
            }
        }

        if let Err(e) = conn.flush().await {
            tracing::warn!(error = %e, "Error de socket al hacer flush");
        }

        total_sent
    }
}

/// Acumula chunks y decide cuándo el mensaje está completo.
///
/// Compartido por la versión bloqueante y la async.
struct Accumulator {
    framer: Framer,
    buf: Vec<u8>,
    /// Largo total esperado, conocido al ver el fin de los headers
    expected: Option<usize>,
}

impl Accumulator {
    fn new(framer: Framer) -> Self {
        Self {
            framer,
            buf: Vec::with_capacity(framer.chunk_size),
            expected: None,
        }
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    /// Agrega un chunk. Retorna `true` si el mensaje quedó completo
    fn feed(&mut self, chunk: &[u8]) -> bool {
        self.buf.extend_from_slice(chunk);

        match self.framer.framing {
            Framing::ShortRead => chunk.len() < self.framer.chunk_size,
            Framing::LengthAware => {
                if self.expected.is_none() {
                    // Un Content-Length que desborda se ignora: el mensaje
                    // termina en la línea vacía
                    self.expected = find_head_end(&self.buf).map(|head_end| {
                        content_length(&self.buf[..head_end])
                            .and_then(|len| head_end.checked_add(len))
                            .unwrap_or(head_end)
                    });
                }
                matches!(self.expected, Some(expected) if self.buf.len() >= expected)
            }
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Posición justo después de `\r\n\r\n`
fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|idx| idx + 4)
}

/// Valor de `Content-Length` dentro del bloque de headers, si es válido
fn content_length(head: &[u8]) -> Option<usize> {
    let head = std::str::from_utf8(head).ok()?;

    head.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("Content-Length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Lector que entrega los datos en segmentos fijos, como llegarían por
    /// la red en varios paquetes
    struct Segmented {
        segments: VecDeque<Vec<u8>>,
    }

    impl Segmented {
        fn new(segments: &[&[u8]]) -> Self {
            Self {
                segments: segments.iter().map(|s| s.to_vec()).collect(),
            }
        }
    }

    impl Read for Segmented {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(mut segment) = self.segments.pop_front() else {
                return Ok(0);
            };
            let n = segment.len().min(buf.len());
            buf[..n].copy_from_slice(&segment[..n]);
            if n < segment.len() {
                self.segments.push_front(segment.split_off(n));
            }
            Ok(n)
        }
    }

    /// Escritor que acepta como máximo `max` bytes por llamada
    struct Trickle {
        written: Vec<u8>,
        max: usize,
        fail_after: Option<usize>,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(limit) = self.fail_after {
                if self.written.len() >= limit {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
                }
            }
            let n = buf.len().min(self.max);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_length_aware_without_body() {
        let framer = Framer::new(8, Framing::LengthAware);
        let mut conn = Segmented::new(&[b"GET / HT", b"TP/1.1\r\n", b"\r\n", b"never read"]);

        assert_eq!(framer.receive(&mut conn), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_length_aware_waits_for_content_length() {
        let framer = Framer::new(1024, Framing::LengthAware);
        let mut conn = Segmented::new(&[
            b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\n\r\n01234",
            b"56789",
            b"extra",
        ]);

        let received = framer.receive(&mut conn);
        assert!(received.ends_with(b"\r\n\r\n0123456789"));
    }

    #[test]
    fn test_length_aware_exact_multiple_of_chunk() {
        // 16 bytes exactos con chunk de 8: termina sin esperar más datos
        let framer = Framer::new(8, Framing::LengthAware);
        let mut conn = Segmented::new(&[b"GET /ab HTTP/1.1", b"\r\n\r\n", b"tail"]);
        let received = framer.receive(&mut conn);
        assert_eq!(received, b"GET /ab HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_length_aware_peer_closes_early() {
        let framer = Framer::new(1024, Framing::LengthAware);
        let mut conn = Segmented::new(&[b"POST /x HTTP/1.1\r\nContent-Length: 100\r\n\r\nshort"]);

        let received = framer.receive(&mut conn);
        assert!(received.ends_with(b"short"));
    }

    #[test]
    fn test_length_aware_overflowing_content_length() {
        let framer = Framer::new(1024, Framing::LengthAware);
        let head: &[u8] = b"POST /files/a HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\nx";
        let mut conn = Segmented::new(&[head, b"never read"]);

        // Termina en la línea vacía, con lo que ya llegó como body
        assert_eq!(framer.receive(&mut conn), head);
    }

    #[test]
    fn test_short_read_stops_on_short_chunk() {
        let framer = Framer::new(1024, Framing::ShortRead);
        let mut conn = Cursor::new(b"GET / HTTP/1.1\r\n\r\n".to_vec());
        assert_eq!(framer.receive(&mut conn), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_short_read_truncates_segmented_message() {
        // Limitación conocida de la heurística: el primer segmento corto
        // corta el mensaje aunque falten bytes del body.
        let framer = Framer::new(1024, Framing::ShortRead);
        let mut conn = Segmented::new(&[
            b"POST /files/a HTTP/1.1\r\nContent-Length: 4\r\n\r\n",
            b"data",
        ]);

        let received = framer.receive(&mut conn);
        assert!(received.ends_with(b"\r\n\r\n"));
        assert!(!received.ends_with(b"data"));
    }

    #[test]
    fn test_short_read_exact_multiple_needs_close() {
        // Con un largo múltiplo exacto del chunk, la heurística solo termina
        // porque el peer cierra (lectura de 0 bytes).
        let framer = Framer::new(4, Framing::ShortRead);
        let mut conn = Cursor::new(b"abcdefgh".to_vec());
        assert_eq!(framer.receive(&mut conn), b"abcdefgh");
    }

    #[test]
    fn test_send_handles_partial_writes() {
        let framer = Framer::default();
        let mut conn = Trickle { written: Vec::new(), max: 3, fail_after: None };

        let sent = framer.send(&mut conn, b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(sent, 19);
        assert_eq!(conn.written, b"HTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn test_send_stops_on_error() {
        let framer = Framer::default();
        let mut conn = Trickle { written: Vec::new(), max: 4, fail_after: Some(8) };

        let sent = framer.send(&mut conn, b"0123456789abcdef");
        assert_eq!(sent, 8);
    }

    #[test]
    fn test_content_length_lookup() {
        assert_eq!(content_length(b"POST / HTTP/1.1\r\ncontent-length: 12\r\n\r\n"), Some(12));
        assert_eq!(content_length(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"), None);
        assert_eq!(content_length(b"GET / HTTP/1.1\r\nContent-Length: x\r\n\r\n"), None);
    }

    #[tokio::test]
    async fn test_receive_async_length_aware() {
        let framer = Framer::new(4, Framing::LengthAware);
        let raw = b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let mut conn = &raw[..];

        assert_eq!(framer.receive_async(&mut conn).await, raw.to_vec());
    }

    #[tokio::test]
    async fn test_send_async_writes_everything() {
        let framer = Framer::default();
        let mut out: Vec<u8> = Vec::new();

        let sent = framer.send_async(&mut out, b"hello").await;
        assert_eq!(sent, 5);
        assert_eq!(out, b"hello");
    }
}
