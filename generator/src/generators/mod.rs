mod common;

#[cfg(feature = "generator-rust")]
mod rust;
#[cfg(feature = "generator-typescript")]
mod typescript;

#[cfg(not(any(feature = "generator-rust", feature = "generator-typescript")))]
compile_error!("At least one generator must be enabled");

use clap::ValueEnum;
use varlink_idl::Interface;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    #[cfg(feature = "generator-rust")]
    Rust,
    #[cfg(feature = "generator-typescript")]
    Typescript,
}

impl Generator {
    pub fn generate(&self, interface: &Interface) -> String {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => rust::generate(interface),
            #[cfg(feature = "generator-typescript")]
            Self::Typescript => typescript::generate(interface),
        }
    }

    /// File extension of the generated code.
    pub fn extension(&self) -> &'static str {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => "rs",
            #[cfg(feature = "generator-typescript")]
            Self::Typescript => "ts",
        }
    }
}

impl Default for Generator {
    #[cfg(feature = "generator-rust")]
    fn default() -> Self {
        Self::Rust
    }

    #[cfg(not(feature = "generator-rust"))]
    fn default() -> Self {
        Self::Typescript
    }
}
