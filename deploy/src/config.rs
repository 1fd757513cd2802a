use std::{collections::BTreeMap, env, fmt};

use crate::errors::DeployError;

pub const AVALANCHE_FUJI_TESTNET: &str = "avalancheFujiTestnet";
pub const POLYGON_AMOY: &str = "polygonAmoy";

/// Both networks sign with the same account.
pub const ACCOUNT_PRIVATE_KEY_VAR: &str = "ACCOUNT_PRIVATE_KEY";

struct NetworkDeclaration {
    name: &'static str,
    chain_id: u64,
    rpc_url_var: &'static str,
    explorer_api_key_var: &'static str,
}

const NETWORKS: [NetworkDeclaration; 2] = [
    NetworkDeclaration {
        name: AVALANCHE_FUJI_TESTNET,
        chain_id: 43113,
        rpc_url_var: "AVALANCHE_FUJI_RPC_URL",
        explorer_api_key_var: "SNOWTRACE_API_KEY",
    },
    NetworkDeclaration {
        name: POLYGON_AMOY,
        chain_id: 80002,
        rpc_url_var: "POLYGON_AMOY_RPC_URL",
        explorer_api_key_var: "POLYGONSCAN_API_KEY",
    },
];

#[derive(Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: String,
    pub rpc_url: String,
    pub signing_credential: String,
    pub chain_id: u64,
    pub explorer_api_key: Option<String>,
}

impl fmt::Debug for NetworkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkProfile")
            .field("name", &self.name)
            .field("rpc_url", &self.rpc_url)
            .field("signing_credential", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .field(
                "explorer_api_key",
                &self.explorer_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// The declared networks, built once at startup and read-only afterwards.
///
/// Profiles are stored even when their variables are unset so that
/// [`NetworkConfig::resolve`] can tell an unknown network apart from an
/// incomplete one.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    networks: BTreeMap<String, NetworkProfile>,
}

impl NetworkConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |var: &str| lookup(var).map(|value| value.trim().to_string());
        let signing_credential = read(ACCOUNT_PRIVATE_KEY_VAR).unwrap_or_default();

        let networks = NETWORKS
            .iter()
            .map(|network| {
                let profile = NetworkProfile {
                    name: network.name.to_string(),
                    rpc_url: read(network.rpc_url_var).unwrap_or_default(),
                    signing_credential: signing_credential.clone(),
                    chain_id: network.chain_id,
                    explorer_api_key: read(network.explorer_api_key_var)
                        .filter(|key| !key.is_empty()),
                };
                (network.name.to_string(), profile)
            })
            .collect();

        Self { networks }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// Looks up a network by name and checks it carries what a deployment needs.
    pub fn resolve(&self, name: &str) -> Result<&NetworkProfile, DeployError> {
        let profile = self.networks.get(name).ok_or_else(|| {
            DeployError::Configuration(format!(
                "unknown network {name:?}, expected one of: {}",
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let declaration = NETWORKS.iter().find(|network| network.name == name);
        if profile.rpc_url.is_empty() {
            return Err(DeployError::Configuration(format!(
                "no rpc url for network {name}, set {}",
                declaration.map_or("the rpc url variable", |d| d.rpc_url_var)
            )));
        }
        if profile.signing_credential.is_empty() {
            return Err(DeployError::Configuration(format!(
                "no signing credential for network {name}, set {ACCOUNT_PRIVATE_KEY_VAR}"
            )));
        }
        Ok(profile)
    }
}
