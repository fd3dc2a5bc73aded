//! Error types.

/// Failure to provision a machine's worker context.
///
/// There is no degraded mode: a machine whose worker could not be created
/// does not exist.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The worker configuration was rejected before anything was created.
    #[error("invalid worker config: {0}")]
    InvalidConfig(String),
    /// The OS refused to create the worker thread.
    #[error("failed to spawn worker thread `{name}`: {source}")]
    Thread {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// The runtime driving the worker could not be built.
    #[error("failed to build worker runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Error returned when an event could not be placed in the mailbox.
///
/// Every variant hands the rejected event back.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError<E> {
    /// The queue had no room within the allowed wait.
    #[error("mailbox is full")]
    Full(E),
    /// The interrupt-safe path found the mailbox locked and would have had
    /// to block.
    #[error("mailbox is busy")]
    Contended(E),
    /// The worker has stopped and will never drain the mailbox.
    #[error("worker has stopped")]
    Closed(E),
}

impl<E> SubmitError<E> {
    /// Takes back the event that was not delivered.
    pub fn into_inner(self) -> E {
        match self {
            Self::Full(event) | Self::Contended(event) | Self::Closed(event) => event,
        }
    }
}
