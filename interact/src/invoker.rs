use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use ethers::{
    abi::{
        token::{LenientTokenizer, Tokenizer},
        Abi, Function, StateMutability, Token,
    },
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::Signer,
    types::{transaction::eip2718::TypedTransaction, TransactionRequest, U256, U64},
};

use crate::{
    credentials::Credentials,
    dispatch::InvocationRequest,
    prompt::Chooser,
    utils::{send_transaction, Client},
};

pub const FUNCTION_PROMPT: &str = "Which function do you want to call?";

/// Performs the call once the dispatcher has resolved what to call.
#[async_trait]
pub trait ContractInvoker: Send {
    async fn invoke(
        &mut self,
        request: InvocationRequest,
        chooser: &mut (dyn Chooser + Send),
    ) -> Result<()>;
}

pub struct EthersInvoker {
    rpc_url: String,
    chain_id: u64,
}

impl EthersInvoker {
    pub fn new(rpc_url: &str, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            chain_id,
        }
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Arc<Client>> {
        let provider = Provider::<Http>::try_from(self.rpc_url.as_str())?;
        let chain_id = provider.get_chainid().await?.as_u64();
        if chain_id != self.chain_id {
            log::warn!(
                "{} reports chain id {}, registry expects {}",
                self.rpc_url,
                chain_id,
                self.chain_id
            );
        }
        let wallet = credentials.wallet()?.with_chain_id(chain_id);
        Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
    }
}

#[async_trait]
impl ContractInvoker for EthersInvoker {
    async fn invoke(
        &mut self,
        request: InvocationRequest,
        chooser: &mut (dyn Chooser + Send),
    ) -> Result<()> {
        let client = self.connect(&request.credentials).await?;
        log::info!("signer address:{:?}", client.address());

        let functions = callable_functions(&request.abi);
        if functions.is_empty() {
            bail!("ABI has no callable functions");
        }
        let labels: Vec<String> = functions.iter().map(|f| describe(f)).collect();
        let index = chooser.choose(FUNCTION_PROMPT, &labels)?;
        let function = *functions
            .get(index)
            .ok_or_else(|| anyhow!("no function at index {index}"))?;

        let tokens = read_arguments(function, chooser)?;
        let data = function.encode_input(&tokens)?;
        let to = request.contract_address;

        match function.state_mutability {
            StateMutability::View | StateMutability::Pure => {
                let tx: TypedTransaction = TransactionRequest::new()
                    .from(client.address())
                    .to(to)
                    .data(data)
                    .into();
                let output = client.call(&tx, None).await?;
                let values = function.decode_output(&output)?;
                for (param, value) in function.outputs.iter().zip(values) {
                    if param.name.is_empty() {
                        println!("{value}");
                    } else {
                        println!("{}: {}", param.name, value);
                    }
                }
            }
            StateMutability::NonPayable | StateMutability::Payable => {
                let value = if function.state_mutability == StateMutability::Payable {
                    read_value(chooser)?
                } else {
                    U256::zero()
                };
                let receipt = send_transaction(client, data, to, value).await?;
                let hash = receipt.transaction_hash;
                println!(
                    "transaction {:?} included in block {:?}, gas used {:?}",
                    hash,
                    receipt.block_number.unwrap_or_default(),
                    receipt.gas_used.unwrap_or_default()
                );
                if receipt.status == Some(U64::zero()) {
                    bail!("transaction {:?} reverted", hash);
                }
            }
        }
        Ok(())
    }
}

pub fn callable_functions(abi: &Abi) -> Vec<&Function> {
    let mut functions: Vec<&Function> = abi.functions().collect();
    functions.sort_by_key(|f| signature(f));
    functions
}

/// `name(type,...)`, without the output list ethabi appends.
pub fn signature(function: &Function) -> String {
    let inputs: Vec<String> = function.inputs.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", function.name, inputs.join(","))
}

pub fn describe(function: &Function) -> String {
    let mutability = match function.state_mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    };
    format!("{} [{}]", signature(function), mutability)
}

pub fn read_arguments(function: &Function, chooser: &mut (dyn Chooser + Send)) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(function.inputs.len());
    for (i, param) in function.inputs.iter().enumerate() {
        let name = if param.name.is_empty() {
            format!("arg{i}")
        } else {
            param.name.clone()
        };
        let raw = chooser.input(&format!("{} ({})", name, param.kind))?;
        let token = LenientTokenizer::tokenize(&param.kind, raw.trim())
            .with_context(|| format!("invalid {} value for {}", param.kind, name))?;
        tokens.push(token);
    }
    Ok(tokens)
}

fn read_value(chooser: &mut (dyn Chooser + Send)) -> Result<U256> {
    let raw = chooser.input("value to send (wei)")?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(raw).with_context(|| format!("invalid wei amount {raw}"))
}
