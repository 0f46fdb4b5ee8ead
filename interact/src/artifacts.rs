use std::path::PathBuf;

use ethers::abi::Abi;
use serde::Deserialize;

use crate::error::ConfigurationError;

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// The upgradeable proxy's own interface (admin functions).
    BuilderNftSeasonOneUpgradeable,
    /// The implementation behind the proxy (user functions).
    BuilderNftSeasonOneImplementation01,
}

impl Artifact {
    pub fn contract_name(&self) -> &'static str {
        match self {
            Artifact::BuilderNftSeasonOneUpgradeable => "BuilderNFTSeasonOneUpgradeable",
            Artifact::BuilderNftSeasonOneImplementation01 => "BuilderNFTSeasonOneImplementation01",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    #[serde(default)]
    contract_name: Option<String>,
    abi: Abi,
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        let name = artifact.contract_name();
        self.root
            .join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }

    pub fn load_abi(&self, artifact: Artifact) -> Result<Abi, ConfigurationError> {
        let path = self.path(artifact);
        let not_found = || ConfigurationError::AbiArtifactNotFound { path: path.clone() };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            log::debug!("read {}: {}", path.display(), e);
            not_found()
        })?;
        let parsed: HardhatArtifact = serde_json::from_str(&content).map_err(|e| {
            log::debug!("parse {}: {}", path.display(), e);
            not_found()
        })?;
        if let Some(contract_name) = &parsed.contract_name {
            if contract_name != artifact.contract_name() {
                log::warn!(
                    "{} declares contract {}, expected {}",
                    path.display(),
                    contract_name,
                    artifact.contract_name()
                );
            }
        }
        Ok(parsed.abi)
    }
}
