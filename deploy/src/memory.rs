//! An in-memory [`ChainClient`] that confirms deployments instantly.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use ethers::{
    abi::Token,
    types::{Address, Bytes, TxHash},
    utils::{get_contract_address, keccak256},
};

use crate::{chain::ChainClient, contracts::ContractArtifact, errors::DeployError};

#[derive(Clone, Debug)]
pub struct Submission {
    pub contract_name: String,
    pub data: Bytes,
    pub transaction_hash: TxHash,
}

#[derive(Default)]
struct Ledger {
    nonce: u64,
    pending: HashMap<TxHash, Address>,
    submissions: Vec<Submission>,
}

pub struct InMemoryChainClient {
    deployer: Address,
    artifacts: HashMap<String, ContractArtifact>,
    stalled: bool,
    ledger: Mutex<Ledger>,
}

impl InMemoryChainClient {
    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            artifacts: HashMap::new(),
            stalled: false,
            ledger: Mutex::default(),
        }
    }

    pub fn with_artifact(mut self, artifact: ContractArtifact) -> Self {
        self.artifacts
            .insert(artifact.contract_name.clone(), artifact);
        self
    }

    /// Accepts submissions but never confirms them.
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.ledger.lock().unwrap().submissions.clone()
    }
}

#[async_trait]
impl ChainClient for InMemoryChainClient {
    fn contract_factory(&self, contract_name: &str) -> Result<ContractArtifact, DeployError> {
        self.artifacts
            .get(contract_name)
            .cloned()
            .ok_or_else(|| DeployError::artifact_not_found(contract_name, "not registered"))
    }

    async fn submit(
        &self,
        artifact: &ContractArtifact,
        constructor_arguments: &[Token],
    ) -> Result<TxHash, DeployError> {
        let data = artifact.deployment_data(constructor_arguments)?;

        let mut ledger = self.ledger.lock().unwrap();
        let nonce = ledger.nonce;
        ledger.nonce += 1;

        let address = get_contract_address(self.deployer, nonce);
        let transaction_hash =
            TxHash::from(keccak256([&data[..], &nonce.to_be_bytes()[..]].concat()));
        ledger.pending.insert(transaction_hash, address);
        ledger.submissions.push(Submission {
            contract_name: artifact.contract_name.clone(),
            data,
            transaction_hash,
        });
        Ok(transaction_hash)
    }

    async fn wait_for_deployment(&self, transaction_hash: TxHash) -> Result<Address, DeployError> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        self.ledger
            .lock()
            .unwrap()
            .pending
            .get(&transaction_hash)
            .copied()
            .ok_or_else(|| {
                DeployError::Deployment(format!("unknown transaction {:?}", transaction_hash))
            })
    }
}
