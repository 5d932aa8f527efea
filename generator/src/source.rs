//! Where interface definitions come from: a file, a URL, or a running service.

use std::path::PathBuf;

use tracing::{debug, info};
use varlink_runtime::service::{GetInterfaceDescriptionArgs, Service};

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Url(String),
    Service(String),
}

impl Input {
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else if input.starts_with("unix:") || input.starts_with("tcp:") {
            Self::Service(input.to_string())
        } else {
            Self::File(PathBuf::from(input))
        }
    }
}

/// The text of one interface definition, or why it could not be obtained.
#[derive(Debug)]
pub struct Definition {
    /// Describes where the text came from, for diagnostics.
    pub origin: String,
    pub text: Result<String, Error>,
}

/// Loads all interface definitions `input` provides.
///
/// Fails as a whole only if the input itself is unreachable; a service interface whose
/// description cannot be retrieved yields a failed [`Definition`] instead.
pub fn load(input: &Input) -> Result<Vec<Definition>, Error> {
    match input {
        Input::File(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            Ok(vec![Definition {
                origin: path.display().to_string(),
                text: Ok(text),
            }])
        }
        Input::Url(url) => {
            let text = fetch(url).map_err(|source| Error::Fetch {
                url: url.clone(),
                source,
            })?;
            Ok(vec![Definition {
                origin: url.clone(),
                text: Ok(text),
            }])
        }
        Input::Service(address) => load_service(address),
    }
}

fn fetch(url: &str) -> Result<String, reqwest::Error> {
    debug!(url, "fetching interface definition");
    reqwest::blocking::get(url)?.error_for_status()?.text()
}

fn load_service(address: &str) -> Result<Vec<Definition>, Error> {
    let service_error = |source| Error::Service {
        address: address.to_string(),
        source,
    };
    let mut service = Service::connect(address).map_err(service_error)?;
    let info = service.get_info().map_err(service_error)?;
    info!(
        vendor = %info.vendor,
        product = %info.product,
        version = %info.version,
        interfaces = info.interfaces.len(),
        "connected to service"
    );

    let definitions = info
        .interfaces
        .into_iter()
        .map(|interface| {
            let text = service
                .get_interface_description(&GetInterfaceDescriptionArgs {
                    interface: interface.clone(),
                })
                .map(|result| result.description)
                .map_err(service_error);
            Definition {
                origin: format!("{address} ({interface})"),
                text,
            }
        })
        .collect();
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_inputs() {
        assert_eq!(
            Input::parse("https://example.org/org.example.shop.varlink"),
            Input::Url("https://example.org/org.example.shop.varlink".into())
        );
        assert_eq!(
            Input::parse("unix:/run/org.example.shop"),
            Input::Service("unix:/run/org.example.shop".into())
        );
        assert_eq!(
            Input::parse("tcp:localhost:1234"),
            Input::Service("tcp:localhost:1234".into())
        );
        assert_eq!(
            Input::parse("shop.varlink"),
            Input::File(PathBuf::from("shop.varlink"))
        );
    }

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "interface org.example.a\nmethod Ping () -> ()\n").unwrap();
        let definitions = load(&Input::File(file.path().to_path_buf())).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(
            definitions[0].text.as_deref().unwrap(),
            "interface org.example.a\nmethod Ping () -> ()\n"
        );
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&Input::File(dir.path().join("missing.varlink"))).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
