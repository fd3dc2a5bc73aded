//! Worker execution services.
//!
//! A service turns the worker loop into a running execution context. The
//! engine does not care how: a dedicated OS thread, a task on an existing
//! runtime, or a scheduler of the application's own.

use std::future::Future;
use std::pin::Pin;

use crate::{SpawnError, WorkerConfig};

/// The worker loop, ready to be driven.
pub type WorkerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Provisions worker execution contexts.
pub trait WorkerService {
    /// Starts driving `worker` according to `config`.
    fn spawn_worker(
        &self,
        config: &WorkerConfig,
        worker: WorkerFuture,
    ) -> Result<WorkerTask, SpawnError>;
}

/// Runs each worker on its own OS thread with a single-threaded runtime.
///
/// The thread takes the configured name and stack size. Hosted threads have
/// no portable priority, so the configured one is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadService;

impl WorkerService for ThreadService {
    fn spawn_worker(
        &self,
        config: &WorkerConfig,
        worker: WorkerFuture,
    ) -> Result<WorkerTask, SpawnError> {
        tracing::debug!(
            worker = %config.name,
            priority = config.priority,
            "thread priority is advisory on hosted targets"
        );

        // The runtime is built on the worker thread itself; it must never be
        // dropped from inside the caller's async context.
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel(1);
        let handle = std::thread::Builder::new()
            .name(config.name.clone())
            .stack_size(config.stack_size)
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build();
                match runtime {
                    Ok(runtime) => {
                        let _ = ready_tx.send(Ok(()));
                        runtime.block_on(worker);
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                    }
                }
            })
            .map_err(|source| SpawnError::Thread {
                name: config.name.clone(),
                source,
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(SpawnError::Runtime(err)),
            Err(_) => {
                return Err(SpawnError::Runtime(std::io::Error::other(
                    "worker thread exited before its runtime was ready",
                )));
            }
        }

        Ok(WorkerTask {
            name: config.name.clone(),
            inner: TaskInner::Thread(handle),
        })
    }
}

/// Runs each worker as a task on an existing tokio runtime.
///
/// Stack size and priority do not apply to tasks and are ignored.
#[derive(Debug, Clone)]
pub struct RuntimeService {
    handle: tokio::runtime::Handle,
}

impl RuntimeService {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl WorkerService for RuntimeService {
    fn spawn_worker(
        &self,
        config: &WorkerConfig,
        worker: WorkerFuture,
    ) -> Result<WorkerTask, SpawnError> {
        Ok(WorkerTask {
            name: config.name.clone(),
            inner: TaskInner::Task(self.handle.spawn(worker)),
        })
    }
}

/// Handle to a provisioned worker context.
///
/// Dropping it detaches the worker; it keeps running.
#[derive(Debug)]
pub struct WorkerTask {
    name: String,
    inner: TaskInner,
}

#[derive(Debug)]
enum TaskInner {
    Thread(std::thread::JoinHandle<()>),
    Task(tokio::task::JoinHandle<()>),
}

impl WorkerTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once the worker has stopped, which only happens when a handler
    /// panicked or the hosting runtime shut down.
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            TaskInner::Thread(handle) => handle.is_finished(),
            TaskInner::Task(handle) => handle.is_finished(),
        }
    }
}
