//! # Pool de Workers
//! src/server/pool.rs
//!
//! N threads que toman conexiones de una [`WorkQueue`] compartida. Lo usan
//! el pool de threads y el pool de procesos (donde cada thread maneja un
//! proceso hijo).

use super::connection::ConnectionHandler;
use super::dispatch::Dispatcher;
use super::queue::WorkQueue;
use super::ServerError;
use std::net::TcpStream;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Threads que consumen conexiones de una cola
pub struct WorkerPool {
    queue: Arc<WorkQueue<TcpStream>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Arranca `size` workers
    ///
    /// `make_job(id)` construye el estado de cada worker; el closure que
    /// retorna se llama una vez por conexión.
    pub fn spawn<F, J>(size: usize, name: &str, mut make_job: F) -> Result<Self, ServerError>
    where
        F: FnMut(usize) -> Result<J, ServerError>,
        J: FnMut(TcpStream) + Send + 'static,
    {
        let queue = Arc::new(WorkQueue::new());
        let mut pool = Self {
            queue: Arc::clone(&queue),
            workers: Vec::with_capacity(size),
        };

        for id in 0..size {
            // Si falla, el Drop del pool cierra la cola y espera a los ya creados
            let mut job = make_job(id)?;
            let queue = Arc::clone(&queue);

            let handle = thread::Builder::new()
                .name(format!("{}-{}", name, id))
                .spawn(move || {
                    tracing::debug!(worker = id, "Worker iniciado");
                    while let Some(stream) = queue.pop() {
                        // Un panic en una conexión no debe achicar el pool
                        if panic::catch_unwind(AssertUnwindSafe(|| job(stream))).is_err() {
                            tracing::error!(worker = id, "Panic atendiendo una conexión");
                        }
                    }
                    tracing::debug!(worker = id, "Worker terminado");
                })
                .map_err(ServerError::SpawnThread)?;

            pool.workers.push(handle);
        }

        Ok(pool)
    }

    /// Encola una conexión para el próximo worker libre
    pub fn submit(&self, stream: TcpStream) {
        if self.queue.push(stream).is_err() {
            tracing::error!("El pool está cerrado, se descarta la conexión");
        }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.queue.close();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::warn!("Un worker terminó con panic");
            }
        }
    }
}

/// Pool fijo de threads
pub struct ThreadPool {
    pool: WorkerPool,
}

impl ThreadPool {
    pub fn new(size: usize, handler: Arc<ConnectionHandler>) -> Result<Self, ServerError> {
        let pool = WorkerPool::spawn(size, "http-worker", |_| {
            let handler = Arc::clone(&handler);
            Ok(move |stream: TcpStream| handler.serve(stream))
        })?;

        Ok(Self { pool })
    }

    pub fn size(&self) -> usize {
        self.pool.size()
    }
}

impl Dispatcher for ThreadPool {
    fn name(&self) -> &'static str {
        "thread-pool"
    }

    fn dispatch(&self, stream: TcpStream) {
        self.pool.submit(stream);
    }
}
