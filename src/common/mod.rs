//! Common utilities and types shared across linekv

pub mod config;
pub mod error;

pub use config::{NodeConfig, ProxyConfig};
pub use error::{Error, Result};
