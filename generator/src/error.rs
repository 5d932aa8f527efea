use std::path::PathBuf;

use thiserror::Error;
use varlink_idl::IdlError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("service at {address} failed")]
    Service {
        address: String,
        #[source]
        source: varlink_runtime::Error,
    },
    #[error("invalid interface definition in {origin}")]
    Idl {
        origin: String,
        #[source]
        source: IdlError,
    },
    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{failed} of {total} interfaces failed")]
    Incomplete { failed: usize, total: usize },
}

/// Renders `error` followed by its chain of sources.
pub fn report(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
