//! Worker configuration.

use std::time::Duration;

use crate::SpawnError;

/// Smallest stack a worker thread may be given.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Stack size used when none is configured.
pub const DEFAULT_STACK_SIZE: usize = 256 * 1024;

/// How the mailbox treats an event submitted while another is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailboxPolicy {
    /// One slot. A newer event replaces the pending one, which is dropped and
    /// counted.
    #[default]
    Overwrite,
    /// FIFO of `capacity` events. A full queue rejects submissions instead
    /// of dropping anything.
    Queue { capacity: usize },
}

impl MailboxPolicy {
    /// Number of events the mailbox can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            Self::Overwrite => 1,
            Self::Queue { capacity } => *capacity,
        }
    }
}

/// Settings for one machine's worker context.
///
/// ```rust
/// # use worker_fsm_core::{MailboxPolicy, WorkerConfig};
/// let config = WorkerConfig::new("button_fsm")
///     .stack_size(128 * 1024)
///     .priority(3)
///     .mailbox(MailboxPolicy::Queue { capacity: 4 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Diagnostic label, also used as the thread name.
    pub name: String,
    /// Stack budget for the worker context, in bytes.
    pub stack_size: usize,
    /// Scheduling priority handed to the worker service.
    pub priority: u8,
    pub mailbox: MailboxPolicy,
    /// How long a non-interrupt submission may wait for room in a full
    /// queue. `None` means it does not wait at all.
    pub submit_timeout: Option<Duration>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "fsm-worker".to_owned(),
            stack_size: DEFAULT_STACK_SIZE,
            priority: 1,
            mailbox: MailboxPolicy::default(),
            submit_timeout: None,
        }
    }
}

impl WorkerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn mailbox(mut self, policy: MailboxPolicy) -> Self {
        self.mailbox = policy;
        self
    }

    #[must_use]
    pub fn submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = Some(timeout);
        self
    }

    /// Checks the settings before a worker is provisioned.
    pub fn validate(&self) -> Result<(), SpawnError> {
        if self.name.is_empty() {
            return Err(SpawnError::InvalidConfig("worker name is empty".into()));
        }
        if self.name.contains('\0') {
            return Err(SpawnError::InvalidConfig(
                "worker name contains a NUL byte".into(),
            ));
        }
        if self.stack_size < MIN_STACK_SIZE {
            return Err(SpawnError::InvalidConfig(format!(
                "stack size {} is below the minimum of {MIN_STACK_SIZE} bytes",
                self.stack_size
            )));
        }
        if self.mailbox.capacity() == 0 {
            return Err(SpawnError::InvalidConfig(
                "queue capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
