use std::{
    fs,
    path::{Path, PathBuf},
};

use ethers::{
    abi::{Abi, Token},
    types::Bytes,
};
use serde::Deserialize;

use crate::errors::DeployError;

pub const COLLATERAL_POOL: &str = "CatastropheBondsCollateralPool";
pub const FACTORY: &str = "CatastropheBondsFactory";

const BUILD_INFO_DIR: &str = "build-info";

/// A compiled contract as emitted by the Hardhat toolchain.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn from_json(name: &str, json: &str) -> Result<Self, DeployError> {
        let artifact: Self =
            serde_json::from_str(json).map_err(|e| DeployError::artifact_not_found(name, e))?;
        if artifact.contract_name != name {
            return Err(DeployError::artifact_not_found(
                name,
                format!("artifact describes {}", artifact.contract_name),
            ));
        }
        if artifact.bytecode.is_empty() {
            return Err(DeployError::artifact_not_found(
                name,
                "artifact has no creation bytecode (abstract contract or interface?)",
            ));
        }
        Ok(artifact)
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn deployment_data(&self, constructor_arguments: &[Token]) -> Result<Bytes, DeployError> {
        match self.abi.constructor() {
            Some(constructor) => constructor
                .encode_input(self.bytecode.to_vec(), constructor_arguments)
                .map(Bytes::from)
                .map_err(|e| {
                    DeployError::Deployment(format!(
                        "cannot encode constructor arguments for {}: {e}",
                        self.contract_name
                    ))
                }),
            None if constructor_arguments.is_empty() => Ok(self.bytecode.clone()),
            None => Err(DeployError::Deployment(format!(
                "{} has no constructor but {} arguments were given",
                self.contract_name,
                constructor_arguments.len()
            ))),
        }
    }
}

/// Locates artifacts under a Hardhat `artifacts/` directory.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load(&self, name: &str) -> Result<ContractArtifact, DeployError> {
        let path = self.find(name)?;
        log::debug!("loading {} artifact from {}", name, path.display());
        let json = fs::read_to_string(&path).map_err(|e| {
            DeployError::artifact_not_found(name, format!("{}: {e}", path.display()))
        })?;
        ContractArtifact::from_json(name, &json)
    }

    fn find(&self, name: &str) -> Result<PathBuf, DeployError> {
        let file_name = format!("{name}.json");
        let conventional = self
            .root
            .join("contracts")
            .join(format!("{name}.sol"))
            .join(&file_name);
        if conventional.is_file() {
            return Ok(conventional);
        }

        search(&self.root, &file_name).ok_or_else(|| {
            DeployError::artifact_not_found(
                name,
                format!("no {file_name} under {}", self.root.display()),
            )
        })
    }
}

fn search(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut entries = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                continue;
            }
            if let Some(found) = search(&path, file_name) {
                return Some(found);
            }
        } else if path.file_name().is_some_and(|n| n == file_name) {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use ethers::types::Address;

    use super::*;

    pub(crate) const CREATION_CODE: &str = "0x6080604052348015600f57600080fd5b50";

    pub(crate) fn collateral_pool_json() -> String {
        format!(
            r#"{{
                "_format": "hh-sol-artifact-1",
                "contractName": "{COLLATERAL_POOL}",
                "sourceName": "contracts/{COLLATERAL_POOL}.sol",
                "abi": [],
                "bytecode": "{CREATION_CODE}",
                "deployedBytecode": "0x6080",
                "linkReferences": {{}},
                "deployedLinkReferences": {{}}
            }}"#
        )
    }

    pub(crate) fn factory_json() -> String {
        format!(
            r#"{{
                "_format": "hh-sol-artifact-1",
                "contractName": "{FACTORY}",
                "sourceName": "contracts/{FACTORY}.sol",
                "abi": [
                    {{
                        "type": "constructor",
                        "stateMutability": "nonpayable",
                        "inputs": [
                            {{
                                "internalType": "address",
                                "name": "_collateralPool",
                                "type": "address"
                            }}
                        ]
                    }}
                ],
                "bytecode": "{CREATION_CODE}",
                "deployedBytecode": "0x6080",
                "linkReferences": {{}},
                "deployedLinkReferences": {{}}
            }}"#
        )
    }

    #[test]
    fn parses_hardhat_artifact() {
        let artifact = ContractArtifact::from_json(FACTORY, &factory_json()).unwrap();
        assert_eq!(artifact.contract_name, FACTORY);
        assert!(artifact.abi.constructor().is_some());
        assert_eq!(artifact.bytecode, Bytes::from_str(CREATION_CODE).unwrap());
    }

    #[test]
    fn rejects_artifact_for_another_contract() {
        let err = ContractArtifact::from_json(FACTORY, &collateral_pool_json()).unwrap_err();
        assert!(matches!(err, DeployError::ArtifactNotFound { .. }));
    }

    #[test]
    fn rejects_artifact_without_bytecode() {
        let json = collateral_pool_json().replace(CREATION_CODE, "0x");
        let err = ContractArtifact::from_json(COLLATERAL_POOL, &json).unwrap_err();
        assert!(matches!(err, DeployError::ArtifactNotFound { .. }));
    }

    #[test]
    fn appends_encoded_address_to_creation_code() {
        let artifact = ContractArtifact::from_json(FACTORY, &factory_json()).unwrap();
        let pool = Address::from_low_u64_be(0xdead);

        let data = artifact.deployment_data(&[Token::Address(pool)]).unwrap();

        let code = Bytes::from_str(CREATION_CODE).unwrap();
        assert_eq!(data.len(), code.len() + 32);
        assert_eq!(&data[..code.len()], &code[..]);
        assert_eq!(&data[data.len() - 20..], pool.as_bytes());
    }

    #[test]
    fn constructor_argument_mismatch_is_a_deployment_error() {
        let factory = ContractArtifact::from_json(FACTORY, &factory_json()).unwrap();
        assert!(matches!(
            factory.deployment_data(&[]),
            Err(DeployError::Deployment(_))
        ));

        let pool = ContractArtifact::from_json(COLLATERAL_POOL, &collateral_pool_json()).unwrap();
        assert_eq!(pool.deployment_data(&[]).unwrap(), pool.bytecode);
        assert!(matches!(
            pool.deployment_data(&[Token::Address(Address::zero())]),
            Err(DeployError::Deployment(_))
        ));
    }

    #[test]
    fn loads_from_conventional_layout() {
        let dir = tempfile::tempdir().unwrap();
        let contract_dir = dir.path().join("contracts").join(format!("{FACTORY}.sol"));
        fs::create_dir_all(&contract_dir).unwrap();
        fs::write(contract_dir.join(format!("{FACTORY}.json")), factory_json()).unwrap();
        fs::write(contract_dir.join(format!("{FACTORY}.dbg.json")), "{}").unwrap();

        let artifact = ArtifactStore::new(dir.path()).load(FACTORY).unwrap();
        assert_eq!(artifact.contract_name, FACTORY);
    }

    #[test]
    fn searches_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("contracts").join("pool").join("Pool.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.path().join(BUILD_INFO_DIR)).unwrap();
        fs::write(nested.join(format!("{COLLATERAL_POOL}.json")), collateral_pool_json()).unwrap();

        let artifact = ArtifactStore::new(dir.path()).load(COLLATERAL_POOL).unwrap();
        assert_eq!(artifact.contract_name, COLLATERAL_POOL);
    }

    #[test]
    fn missing_artifact_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::new(dir.path()).load(FACTORY).unwrap_err();
        match err {
            DeployError::ArtifactNotFound { name, .. } => assert_eq!(name, FACTORY),
            other => panic!("unexpected error: {other}"),
        }
    }
}
