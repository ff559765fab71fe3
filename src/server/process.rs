//! # Pool de Procesos
//! src/server/process.rs
//!
//! Cada worker del pool es un proceso hijo (el mismo binario con `--worker`)
//! manejado por un thread del padre. El padre lee la conexión con el
//! [`Framer`] y le pasa el mensaje crudo al hijo; el hijo parsea, rutea y
//! devuelve la respuesta serializada.
//!
//! ## Protocolo por stdin/stdout
//!
//! ```text
//! ┌──────────────────────┬──────────────────┐
//! │ largo (u32 big-end.) │ bytes            │
//! └──────────────────────┴──────────────────┘
//! ```
//!
//! Un frame por request y uno por respuesta. El hijo termina cuando su stdin
//! llega a EOF. Si el hijo muere, la conexión en curso recibe 500 y el
//! proceso se vuelve a lanzar en la próxima conexión.

use super::connection::{serve_with, ConnectionHandler};
use super::dispatch::Dispatcher;
use super::framer::Framer;
use super::pool::WorkerPool;
use super::ServerError;
use crate::config::Config;
use crate::http::{Response, StatusCode};
use std::ffi::OsString;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;

/// Escribe un frame con prefijo de largo
pub fn write_frame<W: Write>(output: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame demasiado grande"))?;

    output.write_all(&len.to_be_bytes())?;
    output.write_all(payload)?;
    output.flush()
}

/// Lee un frame. Retorna `Ok(None)` si el otro extremo cerró entre frames
pub fn read_frame<R: Read>(input: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    let mut filled = 0;

    while filled < header.len() {
        match input.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "frame incompleto",
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    let len = u32::from_be_bytes(header) as usize;
    let mut payload = vec![0u8; len];
    input.read_exact(&mut payload)?;

    Ok(Some(payload))
}

/// Loop del proceso hijo: un frame de request, un frame de respuesta
pub fn run_worker<R: Read, W: Write>(
    input: R,
    output: W,
    handler: &ConnectionHandler,
) -> io::Result<()> {
    let mut input = BufReader::new(input);
    let mut output = BufWriter::new(output);
    let mut served = 0u64;

    while let Some(raw) = read_frame(&mut input)? {
        let response = handler.handle_bytes(&raw);
        write_frame(&mut output, &response.to_bytes())?;
        served += 1;
    }

    tracing::debug!(served, "Worker sin más requests, terminando");
    Ok(())
}

/// Cómo lanzar un proceso worker
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// El binario actual (o `worker_program`) con `--worker` y el mismo
    /// directorio de archivos
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        let program = match &config.worker_program {
            Some(program) => program.clone(),
            None => std::env::current_exe()?,
        };

        let mut args = vec![OsString::from("--worker")];
        if let Some(directory) = &config.directory {
            args.push(OsString::from("--directory"));
            args.push(directory.clone().into_os_string());
        }

        Ok(Self::new(program, args))
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Lanza un proceso hijo con stdin/stdout conectados por pipes
    pub fn spawn(&self) -> Result<ChildWorker, ServerError> {
        let spawn_error = |source| ServerError::SpawnProcess {
            program: self.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                // Sin pipes el hijo no sirve; no dejarlo huérfano
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_error(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "pipes del worker no disponibles",
                )));
            }
        };

        tracing::debug!(pid = child.id(), program = %self.program.display(), "Worker lanzado");

        Ok(ChildWorker {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }
}

/// Proceso worker vivo
pub struct ChildWorker {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl ChildWorker {
    /// Manda un request y espera la respuesta del hijo
    pub fn exchange(&mut self, request: &[u8]) -> io::Result<Vec<u8>> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin del worker cerrado"))?;

        write_frame(stdin, request)?;

        read_frame(&mut self.stdout)?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "el worker terminó sin responder")
        })
    }
}

impl Drop for ChildWorker {
    fn drop(&mut self) {
        // Cerrar stdin le indica al hijo que termine
        drop(self.stdin.take());

        match self.child.wait() {
            Ok(status) => tracing::debug!(pid = self.child.id(), %status, "Worker terminado"),
            Err(e) => tracing::warn!(pid = self.child.id(), error = %e, "No se pudo esperar al worker"),
        }
    }
}

/// Pool fijo de procesos worker
pub struct ProcessPool {
    pool: WorkerPool,
}

impl ProcessPool {
    /// Lanza `size` procesos. Falla si alguno no arranca
    pub fn new(size: usize, command: WorkerCommand, framer: Framer) -> Result<Self, ServerError> {
        let command = Arc::new(command);

        let pool = WorkerPool::spawn(size, "http-process", |_| {
            let command = Arc::clone(&command);
            let mut worker = Some(command.spawn()?);

            Ok(move |stream: TcpStream| {
                serve_with(framer, stream, |raw| {
                    if worker.is_none() {
                        match command.spawn() {
                            Ok(respawned) => worker = Some(respawned),
                            Err(e) => tracing::error!(error = %e, "No se pudo relanzar el worker"),
                        }
                    }

                    let result = match worker.as_mut() {
                        Some(child) => child.exchange(raw),
                        None => Err(io::Error::new(io::ErrorKind::NotConnected, "sin proceso worker")),
                    };

                    match result {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            tracing::error!(error = %e, "Falló el proceso worker");
                            worker = None;
                            Response::empty(StatusCode::InternalServerError).to_bytes()
                        }
                    }
                });
            })
        })?;

        Ok(Self { pool })
    }

    pub fn size(&self) -> usize {
        self.pool.size()
    }
}

impl Dispatcher for ProcessPool {
    fn name(&self) -> &'static str {
        "process-pool"
    }

    fn dispatch(&self, stream: TcpStream) {
        self.pool.submit(stream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;
    use std::io::Cursor;

    fn handler() -> ConnectionHandler {
        ConnectionHandler::new(Router::with_default_routes(None), Framer::default())
    }

    #[test]
    fn test_frame_layout() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hola").unwrap();
        assert_eq!(buf, vec![0, 0, 0, 4, b'h', b'o', b'l', b'a']);

        let mut input = Cursor::new(buf);
        assert_eq!(read_frame(&mut input).unwrap(), Some(b"hola".to_vec()));
        assert_eq!(read_frame(&mut input).unwrap(), None);
    }

    #[test]
    fn test_empty_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();
        assert_eq!(read_frame(&mut Cursor::new(buf)).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_truncated_frames_are_errors() {
        let short_header = read_frame(&mut Cursor::new(vec![0, 0])).unwrap_err();
        assert_eq!(short_header.kind(), io::ErrorKind::UnexpectedEof);

        let short_payload = read_frame(&mut Cursor::new(vec![0, 0, 0, 9, b'x'])).unwrap_err();
        assert_eq!(short_payload.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_run_worker_answers_each_frame() {
        let mut input = Vec::new();
        write_frame(&mut input, b"GET /echo/uno HTTP/1.1\r\n\r\n").unwrap();
        write_frame(&mut input, b"GET /nope HTTP/1.1\r\n\r\n").unwrap();
        write_frame(&mut input, b"basura").unwrap();

        let mut output = Vec::new();
        run_worker(Cursor::new(input), &mut output, &handler()).unwrap();

        let mut responses = Cursor::new(output);
        let first = read_frame(&mut responses).unwrap().unwrap();
        assert_eq!(
            first,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nuno".to_vec()
        );

        let second = read_frame(&mut responses).unwrap().unwrap();
        assert_eq!(second, b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n".to_vec());

        let third = read_frame(&mut responses).unwrap().unwrap();
        assert_eq!(third, b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n".to_vec());

        assert_eq!(read_frame(&mut responses).unwrap(), None);
    }

    #[test]
    fn test_command_from_config() {
        let mut config = Config::default();
        config.worker_program = Some(PathBuf::from("/usr/bin/http_core"));
        config.directory = Some(PathBuf::from("/tmp/files"));

        let command = WorkerCommand::from_config(&config).unwrap();
        assert_eq!(command.program(), &PathBuf::from("/usr/bin/http_core"));
        assert_eq!(
            command.args(),
            &[
                OsString::from("--worker"),
                OsString::from("--directory"),
                OsString::from("/tmp/files")
            ]
        );
    }

    #[test]
    fn test_spawn_missing_program() {
        let command = WorkerCommand::new("/nonexistent/http_core_worker", Vec::new());
        assert!(matches!(
            command.spawn(),
            Err(ServerError::SpawnProcess { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dead_worker_yields_500() {
        use std::net::TcpListener;
        use std::thread;

        // `true` termina enseguida sin contestar ningún frame
        let command = WorkerCommand::new("true", Vec::new());
        let dispatcher = ProcessPool::new(1, command, Framer::default()).unwrap();
        assert_eq!(dispatcher.name(), "process-pool");

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let acceptor = thread::spawn(move || {
            for _ in 0..2 {
                let (stream, _) = listener.accept().unwrap();
                dispatcher.dispatch(stream);
            }
            dispatcher
        });

        // Dos veces: la segunda usa un worker relanzado
        for _ in 0..2 {
            let mut client = TcpStream::connect(addr).unwrap();
            client.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
            let mut text = String::new();
            client.read_to_string(&mut text).unwrap();
            assert_eq!(
                text,
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n"
            );
        }

        drop(acceptor.join().unwrap());
    }
}
