use std::fmt;

use anyhow::Result;
use ethers::{signers::LocalWallet, utils::hex};

use crate::error::ConfigurationError;

pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    private_key: String,
}

impl Credentials {
    pub fn new(private_key: &str) -> Result<Self, ConfigurationError> {
        let key = private_key.trim();
        if key.is_empty() || key == "0x" {
            return Err(ConfigurationError::MissingPrivateKey);
        }
        let private_key = if key.starts_with("0x") {
            key.to_string()
        } else {
            format!("0x{key}")
        };
        Ok(Self { private_key })
    }

    pub fn from_env() -> Result<Self, ConfigurationError> {
        let key = std::env::var(PRIVATE_KEY_ENV).map_err(|_| ConfigurationError::MissingPrivateKey)?;
        Self::new(&key)
    }

    pub fn wallet(&self) -> Result<LocalWallet> {
        let bytes = hex::decode(self.private_key.strip_prefix("0x").unwrap_or(&self.private_key))?;
        Ok(LocalWallet::from_bytes(&bytes)?)
    }
}

// Keeps the key out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}
