use std::{io, result};

use thiserror::Error;

use crate::{config_store::ConfigError, protocol::ProtocolError};

/// Top-level error for the NitroShare daemon and command line.
#[derive(Error, Debug)]
pub enum NitroshareError {
    /// Loading or provisioning the configuration store failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Describing or reading a transfer item failed
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The daemon could not start or wait for shutdown
    #[error("daemon error: {0}")]
    Daemon(String),
}

/// A specialized `Result` type for NitroShare operations.
pub type Result<T> = result::Result<T, NitroshareError>;
