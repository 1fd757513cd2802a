use std::{io, path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    chain::EthersChainClient,
    config::NetworkConfig,
    contracts::ArtifactStore,
    deploy::{collateral_pool_argument, Deploy},
};

/// Deploys the catastrophe bonds contracts to a configured test network.
#[derive(Debug, Parser)]
pub struct CommandLine {
    /// Network to deploy to (avalancheFujiTestnet or polygonAmoy)
    #[clap(short, long, env = "NETWORK")]
    network: String,

    /// Hardhat artifacts directory holding the compiled contracts
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts: PathBuf,

    /// Seconds to wait for the deployment to be confirmed
    #[clap(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Blocks required on top of the receipt, counting its own block
    #[clap(long, default_value_t = 1)]
    confirmations: usize,

    /// Send legacy transactions instead of EIP-1559 ones
    #[clap(long)]
    legacy: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy CatastropheBondsCollateralPool contract
    #[clap(name = "deployCollateralPool", alias = "deploy-collateral-pool")]
    DeployCollateralPool,

    /// Deploy CatastropheBondsFactory contract
    #[clap(name = "deployFactory", alias = "deploy-factory")]
    DeployFactory {
        /// The collateralPoolAddress of the contract that you want to deploy
        collateral_pool_address: Option<String>,
    },
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        self.execute_with(&NetworkConfig::from_env()).await
    }

    async fn execute_with(self, config: &NetworkConfig) -> Result<()> {
        let network = config.resolve(&self.network)?;
        let collateral_pool = match &self.command {
            Command::DeployCollateralPool => None,
            Command::DeployFactory {
                collateral_pool_address,
            } => Some(collateral_pool_argument(collateral_pool_address.as_deref())?),
        };

        let client = EthersChainClient::connect(
            network,
            ArtifactStore::new(self.artifacts),
            self.confirmations,
            self.legacy,
        )
        .await?;
        let deploy = Deploy::new(
            client,
            network.clone(),
            Duration::from_secs(self.timeout),
        );

        let mut out = io::stdout();
        let result = match collateral_pool {
            None => deploy.deploy_collateral_pool(&mut out).await?,
            Some(collateral_pool) => deploy.deploy_factory(collateral_pool, &mut out).await?,
        };
        log::debug!(
            "deployment on {} recorded in {:?}",
            result.network,
            result.transaction_hash
        );
        Ok(())
    }
}
