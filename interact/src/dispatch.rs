//! ```text
//! Start -> ProxySelected -> CategorySelected -> AddressResolved -> AbiResolved -> Invoked
//! ```
//!
//! A failed transition ends the flow before anything reaches the chain.

use std::io;

use ethers::{abi::Abi, types::Address};

use crate::{
    artifacts::{Artifact, ArtifactStore},
    connectors::ConnectorRecord,
    credentials::Credentials,
    error::{ConfigurationError, DispatchError},
    invoker::ContractInvoker,
    prompt::Chooser,
};

pub const PROXY_PROMPT: &str = "Dev contract, or real contract?";
pub const CATEGORY_PROMPT: &str = "Do you want to interact with admin functions or user functions?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMode {
    /// The season-one proxy.
    Primary,
    /// The parallel development proxy.
    Development,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCategory {
    Admin,
    User,
}

impl FunctionCategory {
    pub const ALL: [FunctionCategory; 2] = [FunctionCategory::Admin, FunctionCategory::User];

    pub fn label(&self) -> &'static str {
        match self {
            FunctionCategory::Admin => "Admin Functions",
            FunctionCategory::User => "User Functions",
        }
    }

    /// Admin calls are interpreted with the proxy's own interface, user
    /// calls with the implementation's. Both target the proxy address.
    pub fn artifact(&self) -> Artifact {
        match self {
            FunctionCategory::Admin => Artifact::BuilderNftSeasonOneUpgradeable,
            FunctionCategory::User => Artifact::BuilderNftSeasonOneImplementation01,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub contract_address: Address,
    pub abi: Abi,
    pub credentials: Credentials,
}

#[derive(Debug)]
pub enum DispatchState {
    Start,
    ProxySelected {
        mode: ProxyMode,
    },
    CategorySelected {
        mode: ProxyMode,
        category: FunctionCategory,
    },
    AddressResolved {
        category: FunctionCategory,
        contract_address: Address,
    },
    AbiResolved(InvocationRequest),
    Invoked,
}

fn short(address: Option<Address>) -> String {
    match address {
        Some(address) => format!("{address:?}")[..6].to_string(),
        None => "(not configured)".to_string(),
    }
}

fn invalid_choice(index: usize, choices: &[String]) -> DispatchError {
    DispatchError::Prompt(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("no choice at index {index} in {choices:?}"),
    ))
}

pub struct Dispatcher<'a, C, I> {
    connector: &'a ConnectorRecord,
    artifacts: &'a ArtifactStore,
    credentials: Credentials,
    chooser: C,
    invoker: I,
}

impl<'a, C, I> Dispatcher<'a, C, I>
where
    C: Chooser + Send,
    I: ContractInvoker,
{
    pub fn new(
        connector: &'a ConnectorRecord,
        artifacts: &'a ArtifactStore,
        credentials: Credentials,
        chooser: C,
        invoker: I,
    ) -> Self {
        Self {
            connector,
            artifacts,
            credentials,
            chooser,
            invoker,
        }
    }

    pub fn chooser(&self) -> &C {
        &self.chooser
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn select_proxy(&mut self) -> Result<ProxyMode, DispatchError> {
        let Some(dev_proxy) = self.connector.dev_proxy else {
            return Ok(ProxyMode::Primary);
        };
        let choices = [
            format!("Real {}", short(self.connector.season_one_proxy)),
            format!("Dev {}", short(Some(dev_proxy))),
        ];
        match self.chooser.choose(PROXY_PROMPT, &choices)? {
            0 => Ok(ProxyMode::Primary),
            1 => Ok(ProxyMode::Development),
            index => Err(invalid_choice(index, &choices)),
        }
    }

    pub fn select_category(&mut self) -> Result<FunctionCategory, DispatchError> {
        let choices = FunctionCategory::ALL.map(|c| c.label().to_string());
        match self.chooser.choose(CATEGORY_PROMPT, &choices)? {
            0 => Ok(FunctionCategory::Admin),
            1 => Ok(FunctionCategory::User),
            index => Err(invalid_choice(index, &choices)),
        }
    }

    pub fn resolve_address(&self, mode: ProxyMode) -> Result<Address, ConfigurationError> {
        let address = match mode {
            ProxyMode::Primary => self.connector.season_one_proxy,
            ProxyMode::Development => self.connector.dev_proxy,
        };
        address.ok_or(ConfigurationError::ProxyAddressNotFound)
    }

    pub fn resolve_abi(&self, category: FunctionCategory) -> Result<Abi, ConfigurationError> {
        let artifact = category.artifact();
        log::info!(
            "loading {} from {}",
            artifact.contract_name(),
            self.artifacts.path(artifact).display()
        );
        self.artifacts.load_abi(artifact)
    }

    /// Advances one step without touching the chain. `AbiResolved` and
    /// `Invoked` are returned unchanged; invocation only happens in [`run`].
    ///
    /// [`run`]: Dispatcher::run
    pub fn step(&mut self, state: DispatchState) -> Result<DispatchState, DispatchError> {
        let next = match state {
            DispatchState::Start => DispatchState::ProxySelected {
                mode: self.select_proxy()?,
            },
            DispatchState::ProxySelected { mode } => DispatchState::CategorySelected {
                mode,
                category: self.select_category()?,
            },
            DispatchState::CategorySelected { mode, category } => {
                let contract_address = self.resolve_address(mode)?;
                log::info!("{} {:?} proxy at {:?}", self.connector.network_id, mode, contract_address);
                DispatchState::AddressResolved {
                    category,
                    contract_address,
                }
            }
            DispatchState::AddressResolved {
                category,
                contract_address,
            } => DispatchState::AbiResolved(InvocationRequest {
                contract_address,
                abi: self.resolve_abi(category)?,
                credentials: self.credentials.clone(),
            }),
            state @ (DispatchState::AbiResolved(_) | DispatchState::Invoked) => state,
        };
        log::debug!("dispatch state: {:?}", StateName(&next));
        Ok(next)
    }

    /// Runs every prompt and resolution, stopping short of the call.
    pub fn prepare(&mut self) -> Result<InvocationRequest, DispatchError> {
        let mut state = DispatchState::Start;
        loop {
            state = match self.step(state)? {
                DispatchState::AbiResolved(request) => return Ok(request),
                next => next,
            };
        }
    }

    pub async fn run(&mut self) -> Result<(), DispatchError> {
        let request = self.prepare()?;
        self.invoker.invoke(request, &mut self.chooser).await?;
        log::debug!("dispatch state: {:?}", StateName(&DispatchState::Invoked));
        Ok(())
    }
}

// Avoids dumping the whole ABI into debug logs.
struct StateName<'s>(&'s DispatchState);

impl std::fmt::Debug for StateName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            DispatchState::Start => "Start",
            DispatchState::ProxySelected { .. } => "ProxySelected",
            DispatchState::CategorySelected { .. } => "CategorySelected",
            DispatchState::AddressResolved { .. } => "AddressResolved",
            DispatchState::AbiResolved(_) => "AbiResolved",
            DispatchState::Invoked => "Invoked",
        };
        f.write_str(name)
    }
}
