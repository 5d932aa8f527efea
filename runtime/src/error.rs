use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address {0:?}, expected `unix:PATH` or `tcp:HOST:PORT`")]
    InvalidAddress(String),
    #[error("connection failed")]
    Io(#[from] std::io::Error),
    #[error("malformed message")]
    Json(#[from] serde_json::Error),
    #[error("connection closed before a complete reply was received")]
    ConnectionClosed,
    #[error("call failed with {error}")]
    Call { error: String, parameters: Value },
}

impl Error {
    /// The qualified error name, if this is an error reply of the called service.
    pub fn call_error_name(&self) -> Option<&str> {
        match self {
            Self::Call { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Deserializes the parameters of an error reply, e.g. into a generated `…Args` struct.
pub fn from_parameters<T: DeserializeOwned>(parameters: &Value) -> Option<T> {
    T::deserialize(parameters).ok()
}
