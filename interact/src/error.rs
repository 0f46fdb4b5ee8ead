use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems with the static setup of a run: which network, which
/// contract, which artifact, which key. None of these are retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no network specified")]
    NoNetwork,

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("proxy address not found")]
    ProxyAddressNotFound,

    #[error("ABI artifact not found: {}", path.display())]
    AbiArtifactNotFound { path: PathBuf },

    #[error("PRIVATE_KEY is not set")]
    MissingPrivateKey,

    #[error("invalid connector registry: {0}")]
    InvalidRegistry(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),

    #[error(transparent)]
    Invocation(#[from] anyhow::Error),
}
