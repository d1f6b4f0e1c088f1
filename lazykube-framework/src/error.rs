use thiserror::Error;

/// Listing namespaces or the members of a category failed.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("inventory unreachable: {0}")]
    Transport(String),
    #[error("inventory access denied: {0}")]
    Denied(String),
    #[error("unexpected inventory output: {0}")]
    Malformed(String),
}

/// A log stream could not be opened, read or closed.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("cannot open log stream for {target}: {reason}")]
    Open { target: String, reason: String },
    /// the feed had started and then the producer exited with an error
    #[error("log stream for {target} stopped: {reason}")]
    Exited { target: String, reason: String },
    #[error("log stream read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("log stream closed with error: {0}")]
    Close(String),
}

#[derive(Debug, Error)]
pub enum DescribeError {
    #[error("no describe command available for {0}")]
    Unsupported(String),
    #[error("describe failed: {0}")]
    Failed(String),
}
