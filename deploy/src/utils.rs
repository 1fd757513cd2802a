use std::{str::FromStr, time::Duration};

use ethers::{
    providers::{Middleware, PendingTransaction},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest,
        TransactionReceipt, TransactionRequest, H256,
    },
    utils::to_checksum,
};

use crate::errors::DeployError;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Sends a contract creation transaction and returns its hash without waiting
/// for it to be mined.
pub async fn send_transaction<M: Middleware>(
    client: &M,
    code: Bytes,
    legacy: bool,
) -> Result<H256, DeployError> {
    let tx = if legacy {
        TypedTransaction::Legacy(TransactionRequest::new().data(code))
    } else {
        TypedTransaction::Eip1559(Eip1559TransactionRequest::new().data(code))
    };

    let transaction_hash = client
        .send_transaction(tx, None)
        .await
        .map_err(|e| DeployError::Deployment(format!("failed to submit transaction: {e}")))?
        .tx_hash();
    log::info!("transaction hash:{:?}", transaction_hash);
    Ok(transaction_hash)
}

/// Waits until the transaction is mined and buried under `confirmations`
/// blocks, counting its own block as the first.
pub async fn wait_transaction<M: Middleware>(
    client: &M,
    transaction_hash: H256,
    confirmations: usize,
) -> Result<TransactionReceipt, DeployError> {
    PendingTransaction::new(transaction_hash, client.provider())
        .interval(POLL_INTERVAL)
        .confirmations(confirmations)
        .await
        .map_err(|e| {
            DeployError::Deployment(format!("failed to confirm {:?}: {e}", transaction_hash))
        })?
        .ok_or_else(|| {
            DeployError::Deployment(format!(
                "{:?} was dropped before being mined",
                transaction_hash
            ))
        })
}

/// Parses an account address, insisting on a valid EIP-55 checksum whenever
/// the input mixes upper and lower case hex digits.
pub fn parse_address(input: &str) -> Result<Address, DeployError> {
    let address = Address::from_str(input)
        .map_err(|e| DeployError::InvalidArgument(format!("{input:?} is not an address: {e}")))?;

    let digits = input.strip_prefix("0x").unwrap_or(input);
    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case && to_checksum(&address, None) != format!("0x{digits}") {
        return Err(DeployError::InvalidArgument(format!(
            "{input:?} has an invalid checksum"
        )));
    }
    Ok(address)
}
