//! Support crate for generated Varlink clients.
//!
//! Generated code refers to this crate for the [`Connection`] it calls methods on, the
//! [`Object`] type used for `object` members and [`Empty`] for calls without parameters or
//! results.

pub mod connection;
pub mod service;

mod error;

use serde::{Deserialize, Serialize};

pub use connection::{Address, BoxedStream, Connection, Stream};
pub use error::{from_parameters, Error};

/// Value of an IDL `object` member: arbitrary JSON.
pub type Object = serde_json::Value;

/// Parameters or results of a call that has none.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Empty {}
