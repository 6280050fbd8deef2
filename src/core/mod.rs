pub mod error;
pub mod forwarder;
pub mod headers;
pub mod translator;

#[cfg(test)]
pub(crate) mod testing;

pub use error::RelayError;
pub use forwarder::Forwarder;
pub use translator::RequestTranslator;
