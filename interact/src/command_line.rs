use std::path::PathBuf;

use anyhow::Result;
use builder_nft_interact::{
    artifacts::{ArtifactStore, DEFAULT_ARTIFACTS_DIR},
    connectors::Registry,
    credentials::Credentials,
    dispatch::Dispatcher,
    invoker::EthersInvoker,
    prompt::TerminalChooser,
};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "builder-nft-interact", version)]
pub struct CommandLine {
    /// Active network, one of the ids printed by `networks`.
    #[clap(long, env = "NETWORK", global = true)]
    network: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interact with the BuilderNFT season-one contract via its proxy.
    InteractBuilderNft {
        /// Hardhat artifacts directory.
        #[clap(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
        artifacts: PathBuf,

        /// Use this endpoint instead of the registry's.
        #[clap(long)]
        rpc_url: Option<String>,
    },

    /// List the supported networks.
    Networks,
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let registry = Registry::builtin()?;
        match self.command {
            Command::Networks => {
                print_networks(&registry);
                Ok(())
            }
            Command::InteractBuilderNft { artifacts, rpc_url } => {
                let connector = registry.resolve(self.network.as_deref())?;
                log::info!(
                    "network:{} chain:{} ({})",
                    connector.network_id,
                    connector.chain.name,
                    connector.chain.id
                );
                let credentials = Credentials::from_env()?;
                let store = ArtifactStore::new(artifacts);
                let rpc_url = rpc_url.as_deref().unwrap_or(&connector.rpc_url);
                let invoker = EthersInvoker::new(rpc_url, connector.chain.id);

                let mut dispatcher = Dispatcher::new(
                    connector,
                    &store,
                    credentials,
                    TerminalChooser::stdio(),
                    invoker,
                );
                dispatcher.run().await?;
                Ok(())
            }
        }
    }
}

fn print_networks(registry: &Registry) {
    println!(
        "{:<12} {:>9}  {:<56} {:<42} contracts",
        "network", "chain id", "rpc", "season one proxy"
    );
    for connector in registry.networks() {
        let proxy = connector
            .season_one_proxy
            .map(|address| format!("{address:?}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>9}  {:<56} {:<42} {}",
            connector.network_id,
            connector.chain.id,
            connector.rpc_url,
            proxy,
            connector.deployed_roles()
        );
    }
}
