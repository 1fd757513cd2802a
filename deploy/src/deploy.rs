use std::{io::Write, time::Duration};

use ethers::{
    abi::Token,
    types::{Address, TxHash},
    utils::to_checksum,
};

use crate::{
    chain::ChainClient,
    config::NetworkProfile,
    contracts::{COLLATERAL_POOL, FACTORY},
    errors::DeployError,
    utils::parse_address,
};

/// Checks the `deployFactory` positional argument. Runs before any chain
/// interaction so a bad address never costs an RPC round trip.
pub fn collateral_pool_argument(input: Option<&str>) -> Result<Address, DeployError> {
    let input = input
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .ok_or_else(|| {
            DeployError::InvalidArgument("missing collateral pool address".to_string())
        })?;
    parse_address(input)
}

pub struct DeploymentRequest<'a> {
    pub contract_name: &'a str,
    pub constructor_arguments: Vec<Token>,
    pub network: &'a NetworkProfile,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_address: Address,
    pub network: String,
    pub transaction_hash: TxHash,
}

/// Runs deployment commands against one network through a [`ChainClient`].
pub struct Deploy<C> {
    client: C,
    network: NetworkProfile,
    timeout: Duration,
}

impl<C: ChainClient> Deploy<C> {
    pub fn new(client: C, network: NetworkProfile, timeout: Duration) -> Self {
        Self {
            client,
            network,
            timeout,
        }
    }

    pub async fn deploy_collateral_pool(
        &self,
        out: &mut impl Write,
    ) -> Result<DeploymentResult, DeployError> {
        let request = DeploymentRequest {
            contract_name: COLLATERAL_POOL,
            constructor_arguments: Vec::new(),
            network: &self.network,
        };
        self.deploy(request, out).await
    }

    /// Deploys the factory bound to `collateral_pool`. Nothing verifies a
    /// pool actually lives at that address.
    pub async fn deploy_factory(
        &self,
        collateral_pool: Address,
        out: &mut impl Write,
    ) -> Result<DeploymentResult, DeployError> {
        let request = DeploymentRequest {
            contract_name: FACTORY,
            constructor_arguments: vec![Token::Address(collateral_pool)],
            network: &self.network,
        };
        self.deploy(request, out).await
    }

    async fn deploy(
        &self,
        request: DeploymentRequest<'_>,
        out: &mut impl Write,
    ) -> Result<DeploymentResult, DeployError> {
        let DeploymentRequest {
            contract_name,
            constructor_arguments,
            network,
        } = request;

        writeln!(out, "{contract_name}")?;
        writeln!(out, "Deploying {contract_name} to {} network", network.name)?;

        let artifact = self.client.contract_factory(contract_name)?;
        let transaction_hash = self.client.submit(&artifact, &constructor_arguments).await?;
        log::info!(
            "{} creation submitted on {} in {:?}",
            contract_name,
            network.name,
            transaction_hash
        );

        let contract_address =
            tokio::time::timeout(self.timeout, self.client.wait_for_deployment(transaction_hash))
                .await
                .map_err(|_| {
                    DeployError::Deployment(format!(
                        "{contract_name} not confirmed within {}s, check {:?} on {}",
                        self.timeout.as_secs(),
                        transaction_hash,
                        network.name
                    ))
                })??;
        log::info!("{} confirmed at {:?}", contract_name, contract_address);

        writeln!(
            out,
            "{contract_name} deployed to {} on {} network.",
            to_checksum(&contract_address, None),
            network.name
        )?;

        Ok(DeploymentResult {
            contract_address,
            network: network.name.clone(),
            transaction_hash,
        })
    }
}
