use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::{
        transaction::eip2718::TypedTransaction, TransactionReceipt, TransactionRequest, H160, H256,
        U256,
    },
};

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub async fn send_transaction(
    client: Arc<Client>,
    data: Vec<u8>,
    to: H160,
    value: U256,
) -> Result<TransactionReceipt> {
    let tx = TransactionRequest::new().to(to).data(data).value(value);
    let mut tx = TypedTransaction::Legacy(tx);

    client.fill_transaction(&mut tx, None).await?;

    let pending = client.send_transaction(tx, None).await?;
    let transaction_hash = pending.tx_hash();
    log::info!("transaction hash:{:?}", transaction_hash);

    let receipt = pending.interval(RECEIPT_POLL_INTERVAL).await?;
    require_receipt(transaction_hash, receipt)
}

fn require_receipt(
    transaction_hash: H256,
    receipt: Option<TransactionReceipt>,
) -> Result<TransactionReceipt> {
    receipt.ok_or_else(|| anyhow!("transaction {:?} dropped from mempool", transaction_hash))
}
