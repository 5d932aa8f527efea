//! Client side of the Varlink wire format: every message is a JSON object followed by a NUL byte.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::Error;

/// Any byte stream a connection can run over.
pub trait Stream: Read + Write + Send {}

impl<T: Read + Write + Send> Stream for T {}

pub type BoxedStream = Box<dyn Stream>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    Unix(String),
    Tcp(String),
}

impl Address {
    /// Parses `unix:PATH` or `tcp:HOST:PORT`. Parameters following a `;` are ignored.
    pub fn parse(address: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAddress(address.to_string());
        let (scheme, rest) = address.split_once(':').ok_or_else(invalid)?;
        let target = rest.split(';').next().unwrap_or_default();
        if target.is_empty() {
            return Err(invalid());
        }
        match scheme {
            "unix" => Ok(Self::Unix(target.to_string())),
            "tcp" => Ok(Self::Tcp(target.to_string())),
            _ => Err(invalid()),
        }
    }
}

#[derive(Serialize)]
struct Request<'a, P> {
    method: &'a str,
    parameters: &'a P,
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    parameters: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

pub struct Connection<S = BoxedStream> {
    stream: BufReader<S>,
}

impl Connection {
    /// Connects to the service at `address`.
    pub fn open(address: &str) -> Result<Self, Error> {
        let stream: BoxedStream = match Address::parse(address)? {
            #[cfg(unix)]
            Address::Unix(path) => Box::new(std::os::unix::net::UnixStream::connect(path)?),
            #[cfg(not(unix))]
            Address::Unix(_) => return Err(Error::InvalidAddress(address.to_string())),
            Address::Tcp(target) => Box::new(TcpStream::connect(target)?),
        };
        debug!(address, "connected");
        Ok(Self::new(stream))
    }
}

impl<S: Stream> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    /// Calls the fully qualified `method` and waits for its reply.
    ///
    /// An error reply is returned as [`Error::Call`].
    pub fn call<P, R>(&mut self, method: &str, parameters: &P) -> Result<R, Error>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        debug!(method, "call");
        let mut message = serde_json::to_vec(&Request { method, parameters })?;
        message.push(0);
        let stream = self.stream.get_mut();
        stream.write_all(&message)?;
        stream.flush()?;

        let reply = self.receive()?;
        let parameters = reply
            .parameters
            .unwrap_or_else(|| Value::Object(Default::default()));
        if let Some(error) = reply.error {
            debug!(method, %error, "call failed");
            return Err(Error::Call { error, parameters });
        }
        Ok(R::deserialize(parameters)?)
    }

    fn receive(&mut self) -> Result<Reply, Error> {
        let mut buffer = Vec::new();
        self.stream.read_until(0, &mut buffer)?;
        if buffer.pop() != Some(0) {
            return Err(Error::ConnectionClosed);
        }
        trace!(len = buffer.len(), "received reply");
        Ok(serde_json::from_slice(&buffer)?)
    }
}
