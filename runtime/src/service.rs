//! Client for `org.varlink.service`, which every Varlink service implements.
//!
//! Kept in the shape the Rust generator emits for [`DESCRIPTION`].

use serde::{Deserialize, Serialize};

use crate::{Connection, Error, Stream};

pub const INTERFACE_NAME: &str = "org.varlink.service";

/// The interface definition of `org.varlink.service`.
pub const DESCRIPTION: &str = include_str!("org.varlink.service.varlink");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInfoResult {
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub url: String,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInterfaceDescriptionArgs {
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetInterfaceDescriptionResult {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceNotFoundArgs {
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNotFoundArgs {
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNotImplementedArgs {
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidParameterArgs {
    pub parameter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    InterfaceNotFound(InterfaceNotFoundArgs),
    MethodNotFound(MethodNotFoundArgs),
    MethodNotImplemented(MethodNotImplementedArgs),
    InvalidParameter(InvalidParameterArgs),
}

impl ServiceError {
    /// Converts an error reply of this interface into its typed form.
    pub fn from_call_error(error: &Error) -> Option<Self> {
        let Error::Call { error, parameters } = error else {
            return None;
        };
        match error.as_str() {
            "org.varlink.service.InterfaceNotFound" => {
                crate::from_parameters(parameters).map(Self::InterfaceNotFound)
            }
            "org.varlink.service.MethodNotFound" => {
                crate::from_parameters(parameters).map(Self::MethodNotFound)
            }
            "org.varlink.service.MethodNotImplemented" => {
                crate::from_parameters(parameters).map(Self::MethodNotImplemented)
            }
            "org.varlink.service.InvalidParameter" => {
                crate::from_parameters(parameters).map(Self::InvalidParameter)
            }
            _ => None,
        }
    }
}

pub struct Service<S = crate::BoxedStream> {
    connection: Connection<S>,
}

impl Service {
    pub fn connect(address: &str) -> Result<Self, Error> {
        Ok(Self::new(Connection::open(address)?))
    }
}

impl<S: Stream> Service<S> {
    pub fn new(connection: Connection<S>) -> Self {
        Self { connection }
    }

    pub fn get_info(&mut self) -> Result<GetInfoResult, Error> {
        self.connection
            .call("org.varlink.service.GetInfo", &crate::Empty {})
    }

    pub fn get_interface_description(
        &mut self,
        args: &GetInterfaceDescriptionArgs,
    ) -> Result<GetInterfaceDescriptionResult, Error> {
        self.connection
            .call("org.varlink.service.GetInterfaceDescription", args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::tests::MockStream;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_info() {
        let stream = MockStream::new(&[r#"{"parameters":{
            "vendor":"Example","product":"shop","version":"1","url":"https://example.org",
            "interfaces":["org.varlink.service","org.example.shop"]}}"#]);
        let mut service = Service::new(Connection::new(stream));
        let info = service.get_info().unwrap();
        assert_eq!(info.interfaces, vec!["org.varlink.service", "org.example.shop"]);
    }

    #[test]
    fn typed_error_reply() {
        let stream = MockStream::new(&[
            r#"{"error":"org.varlink.service.InterfaceNotFound","parameters":{"interface":"x"}}"#,
        ]);
        let mut service = Service::new(Connection::new(stream));
        let err = service
            .get_interface_description(&GetInterfaceDescriptionArgs {
                interface: "x".into(),
            })
            .unwrap_err();
        assert_eq!(
            ServiceError::from_call_error(&err),
            Some(ServiceError::InterfaceNotFound(InterfaceNotFoundArgs {
                interface: "x".into()
            }))
        );
    }
}
