use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No AR-capable display could be acquired. Terminal for the session.
    #[error("This device does not support augmented reality")]
    Unsupported,
}
