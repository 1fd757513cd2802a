use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::Token,
    middleware::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TxHash, U64},
    utils::hex,
};

use crate::{
    config::NetworkProfile,
    contracts::{ArtifactStore, ContractArtifact},
    errors::DeployError,
    utils::{send_transaction, wait_transaction},
};

/// The chain-side capabilities a deployment command needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Locates the compiled artifact for `contract_name`.
    fn contract_factory(&self, contract_name: &str) -> Result<ContractArtifact, DeployError>;

    /// Submits a creation transaction and returns as soon as it has a hash.
    async fn submit(
        &self,
        artifact: &ContractArtifact,
        constructor_arguments: &[Token],
    ) -> Result<TxHash, DeployError>;

    /// Resolves once the created contract's code is retrievable on chain.
    async fn wait_for_deployment(&self, transaction_hash: TxHash) -> Result<Address, DeployError>;
}

/// The RPC-backed [`ChainClient`], generic over the JSON-RPC transport.
pub struct EthersChainClient<P = Http> {
    client: Arc<SignerMiddleware<Provider<P>, LocalWallet>>,
    artifacts: ArtifactStore,
    confirmations: usize,
    legacy: bool,
}

impl EthersChainClient {
    pub async fn connect(
        network: &NetworkProfile,
        artifacts: ArtifactStore,
        confirmations: usize,
        legacy: bool,
    ) -> Result<Self, DeployError> {
        let provider = Provider::<Http>::try_from(network.rpc_url.as_str()).map_err(|e| {
            DeployError::Configuration(format!("invalid rpc url for {}: {e}", network.name))
        })?;
        Self::with_provider(provider, network, artifacts, confirmations, legacy).await
    }
}

impl<P: JsonRpcClient + 'static> EthersChainClient<P> {
    /// Binds the network's signer to `provider` once the endpoint proves to
    /// serve the network's chain id.
    pub async fn with_provider(
        provider: Provider<P>,
        network: &NetworkProfile,
        artifacts: ArtifactStore,
        confirmations: usize,
        legacy: bool,
    ) -> Result<Self, DeployError> {
        let wallet = parse_signing_key(&network.signing_credential)?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| DeployError::Deployment(format!("rpc endpoint unreachable: {e}")))?
            .as_u64();
        if chain_id != network.chain_id {
            return Err(DeployError::Configuration(format!(
                "{} expects chain id {} but its rpc endpoint reports {}",
                network.name, network.chain_id, chain_id
            )));
        }
        log::info!(
            "connected to {} (chain id {}) as {:?}",
            network.name,
            chain_id,
            wallet.address()
        );
        log::debug!(
            "explorer api key configured: {}",
            network.explorer_api_key.is_some()
        );

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain_id),
        ));
        Ok(Self {
            client,
            artifacts,
            confirmations,
            legacy,
        })
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> ChainClient for EthersChainClient<P> {
    fn contract_factory(&self, contract_name: &str) -> Result<ContractArtifact, DeployError> {
        self.artifacts.load(contract_name)
    }

    async fn submit(
        &self,
        artifact: &ContractArtifact,
        constructor_arguments: &[Token],
    ) -> Result<TxHash, DeployError> {
        let code = artifact.deployment_data(constructor_arguments)?;
        send_transaction(self.client.as_ref(), code, self.legacy).await
    }

    async fn wait_for_deployment(&self, transaction_hash: TxHash) -> Result<Address, DeployError> {
        let receipt =
            wait_transaction(self.client.as_ref(), transaction_hash, self.confirmations).await?;
        if receipt.status == Some(U64::zero()) {
            return Err(DeployError::Deployment(format!(
                "creation transaction {:?} reverted",
                transaction_hash
            )));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            DeployError::Deployment(format!(
                "receipt for {:?} carries no contract address",
                transaction_hash
            ))
        })?;

        let code = self
            .client
            .get_code(address, None)
            .await
            .map_err(|e| DeployError::Deployment(format!("failed to fetch contract code: {e}")))?;
        if code.is_empty() {
            return Err(DeployError::Deployment(format!(
                "no contract code at {:?} after {:?} was mined",
                address, transaction_hash
            )));
        }
        Ok(address)
    }
}

fn parse_signing_key(credential: &str) -> Result<LocalWallet, DeployError> {
    let bytes = hex::decode(credential.strip_prefix("0x").unwrap_or(credential))
        .map_err(|_| DeployError::Configuration("signing credential is not hex".to_string()))?;
    if bytes.len() != 32 {
        return Err(DeployError::Configuration(format!(
            "signing credential must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    LocalWallet::from_bytes(&bytes).map_err(|_| {
        DeployError::Configuration("signing credential is not a valid private key".to_string())
    })
}
