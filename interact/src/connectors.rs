use std::{collections::BTreeMap, fmt};

use ethers::types::{Address, H160};
use serde::Deserialize;

use crate::error::ConfigurationError;

pub const REGISTRY_VERSION: u32 = 1;

/// Placeholder the table uses for "not deployed on this network".
pub const NULL_ADDRESS: Address = H160([0u8; 20]);

const BUILTIN_CONNECTORS: &str = include_str!("connectors.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractRole {
    /// Ethereum Attestation Service.
    Attestation,
    /// LuckyStarCoin.
    Token,
    /// Stargate protocol.
    Bridge,
    /// BuilderNFT.
    BuilderRegistry,
    /// USDC.
    Stablecoin,
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractRole::Attestation => "attestation",
            ContractRole::Token => "token",
            ContractRole::Bridge => "bridge",
            ContractRole::BuilderRegistry => "builderRegistry",
            ContractRole::Stablecoin => "stablecoin",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainIdentity {
    pub id: u64,
    pub name: String,
    pub native_currency: String,
    pub explorer: String,
    #[serde(default)]
    pub testnet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRecord {
    pub network_id: String,
    pub rpc_url: String,
    pub chain: ChainIdentity,
    #[serde(default)]
    pub contracts: BTreeMap<ContractRole, Address>,
    #[serde(default)]
    pub season_one_proxy: Option<Address>,
    #[serde(default)]
    pub season_one_implementation: Option<Address>,
    /// Parallel test deployment of the season-one proxy.
    #[serde(default)]
    pub dev_proxy: Option<Address>,
}

impl ConnectorRecord {
    pub fn contract(&self, role: ContractRole) -> Option<Address> {
        self.contracts.get(&role).copied()
    }

    /// Comma separated names of the roles deployed on this network.
    pub fn deployed_roles(&self) -> String {
        let roles: Vec<String> = self.contracts.keys().map(ToString::to_string).collect();
        roles.join(",")
    }

    fn normalize(mut self) -> Self {
        self.contracts.retain(|_, address| *address != NULL_ADDRESS);
        for slot in [
            &mut self.season_one_proxy,
            &mut self.season_one_implementation,
            &mut self.dev_proxy,
        ] {
            if *slot == Some(NULL_ADDRESS) {
                *slot = None;
            }
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| {
            ConfigurationError::InvalidRegistry(format!("{}: {}", self.network_id, reason))
        };
        if self.network_id.trim().is_empty() {
            return Err(ConfigurationError::InvalidRegistry(
                "empty network id".to_string(),
            ));
        }
        if self.rpc_url.trim().is_empty() {
            return Err(invalid("empty rpc url"));
        }
        if self.chain.id == 0 || self.chain.name.trim().is_empty() {
            return Err(invalid("incomplete chain identity"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    version: u32,
    connectors: Vec<ConnectorRecord>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    connectors: BTreeMap<String, ConnectorRecord>,
}

impl Registry {
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json(BUILTIN_CONNECTORS)
    }

    pub fn from_json(source: &str) -> Result<Self, ConfigurationError> {
        let file: RegistryFile = serde_json::from_str(source)
            .map_err(|e| ConfigurationError::InvalidRegistry(e.to_string()))?;
        if file.version != REGISTRY_VERSION {
            return Err(ConfigurationError::InvalidRegistry(format!(
                "unsupported registry version {}, expected {}",
                file.version, REGISTRY_VERSION
            )));
        }

        let mut connectors = BTreeMap::new();
        for record in file.connectors {
            let record = record.normalize();
            record.validate()?;
            let id = record.network_id.clone();
            if connectors.insert(id.clone(), record).is_some() {
                return Err(ConfigurationError::InvalidRegistry(format!(
                    "duplicate network id: {id}"
                )));
            }
        }
        Ok(Self { connectors })
    }

    pub fn resolve(&self, network_id: Option<&str>) -> Result<&ConnectorRecord, ConfigurationError> {
        let network_id = match network_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ConfigurationError::NoNetwork),
        };
        self.connectors
            .get(network_id)
            .ok_or_else(|| ConfigurationError::UnsupportedNetwork(network_id.to_string()))
    }

    pub fn networks(&self) -> impl Iterator<Item = &ConnectorRecord> {
        self.connectors.values()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn address(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    #[test]
    fn builtin_registry_loads() {
        let registry = Registry::builtin().unwrap();
        let ids: Vec<_> = registry.networks().map(|c| c.network_id.as_str()).collect();
        assert_eq!(ids, ["base", "basesepolia", "optimism", "opsepolia", "sepolia"]);
    }

    #[test]
    fn every_network_resolves_to_itself() {
        let registry = Registry::builtin().unwrap();
        for record in registry.networks() {
            let resolved = registry.resolve(Some(record.network_id.as_str())).unwrap();
            assert_eq!(resolved.network_id, record.network_id);
            assert!(!resolved.rpc_url.is_empty());
            assert!(resolved.chain.id > 0);
            assert!(!resolved.chain.name.is_empty());
        }
    }

    #[test]
    fn missing_network_is_rejected() {
        let registry = Registry::builtin().unwrap();
        for id in [None, Some(""), Some("   ")] {
            let err = registry.resolve(id).unwrap_err();
            assert!(matches!(err, ConfigurationError::NoNetwork));
            assert_eq!(err.to_string(), "no network specified");
        }
    }

    #[test]
    fn unknown_network_is_named_in_error() {
        let registry = Registry::builtin().unwrap();
        let err = registry.resolve(Some("arbitrum")).unwrap_err();
        assert_eq!(err.to_string(), "unsupported network: arbitrum");
    }

    #[test]
    fn base_has_builder_nft_but_no_proxy() {
        let registry = Registry::builtin().unwrap();
        let base = registry.resolve(Some("base")).unwrap();
        assert_eq!(base.chain.id, 8453);
        assert_eq!(
            base.contract(ContractRole::BuilderRegistry),
            Some(address("0x278cc8861cfc93ea47c9e89b1876d0def2037c27"))
        );
        assert!(base.season_one_proxy.is_none());
        assert!(base.dev_proxy.is_none());
    }

    #[test]
    fn null_addresses_mean_not_deployed() {
        let registry = Registry::builtin().unwrap();
        let sepolia = registry.resolve(Some("sepolia")).unwrap();
        assert!(sepolia.contract(ContractRole::BuilderRegistry).is_none());
        assert!(sepolia.contract(ContractRole::Token).is_none());
        assert_eq!(
            sepolia.contract(ContractRole::Attestation),
            Some(address("0xC2679fBD37d54388Ce493F1DB75320D236e1815e"))
        );
    }

    #[test]
    fn opsepolia_has_season_one_pair() {
        let registry = Registry::builtin().unwrap();
        let op = registry.resolve(Some("opsepolia")).unwrap();
        assert_eq!(
            op.season_one_proxy,
            Some(address("0xff9731e06f009800cb23ac6eddc2903d801fa890"))
        );
        assert_eq!(
            op.season_one_implementation,
            Some(address("0x92bbf17fcedee104bc6ae5d10b99eacf2fc2d3b6"))
        );
        assert_eq!(op.contracts.len(), 5);
    }

    #[test]
    fn deployed_roles_skip_null_addresses() {
        let registry = Registry::builtin().unwrap();
        let base = registry.resolve(Some("base")).unwrap();
        assert_eq!(base.deployed_roles(), "builderRegistry,stablecoin");
        let sepolia = registry.resolve(Some("sepolia")).unwrap();
        assert_eq!(sepolia.deployed_roles(), "attestation,stablecoin");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{
            "version": 1,
            "connectors": [
                {"networkId": "a", "rpcUrl": "http://a", "chain": {"id": 1, "name": "A", "nativeCurrency": "ETH", "explorer": ""}},
                {"networkId": "a", "rpcUrl": "http://b", "chain": {"id": 2, "name": "B", "nativeCurrency": "ETH", "explorer": ""}}
            ]
        }"#;
        let err = Registry::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate network id: a"));
    }

    #[test]
    fn empty_rpc_url_is_rejected() {
        let json = r#"{
            "version": 1,
            "connectors": [
                {"networkId": "a", "rpcUrl": "", "chain": {"id": 1, "name": "A", "nativeCurrency": "ETH", "explorer": ""}}
            ]
        }"#;
        assert!(matches!(
            Registry::from_json(json),
            Err(ConfigurationError::InvalidRegistry(_))
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let json = r#"{"version": 2, "connectors": []}"#;
        let err = Registry::from_json(json).unwrap_err();
        assert!(err.to_string().contains("unsupported registry version 2"));
    }

    #[test]
    fn null_dev_proxy_is_dropped() {
        let json = r#"{
            "version": 1,
            "connectors": [
                {"networkId": "a", "rpcUrl": "http://a", "chain": {"id": 1, "name": "A", "nativeCurrency": "ETH", "explorer": ""},
                 "devProxy": "0x0000000000000000000000000000000000000000"}
            ]
        }"#;
        let registry = Registry::from_json(json).unwrap();
        assert!(registry.resolve(Some("a")).unwrap().dev_proxy.is_none());
    }
}
