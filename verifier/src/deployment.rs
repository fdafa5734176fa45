use std::fs;
use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConstructionError, DeploymentError};
use crate::ledger::VerificationLedger;
use crate::service::KycVerifier;
use crate::typed_data::KycDomain;

/// Base Sepolia, the network the verifier was first deployed on.
pub const DEFAULT_CHAIN_ID: u64 = 84532;

/// Everything needed to reconstruct a deployed verifier and sign for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub issuer: Address,
    pub chain_id: u64,
    pub verifying_contract: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
}

impl Deployment {
    /// Deploy from `deployer` at account `nonce`. The instance address is the
    /// CREATE address of that pair.
    pub fn new(
        issuer: Address,
        chain_id: u64,
        deployer: Address,
        nonce: u64,
    ) -> Result<Self, ConstructionError> {
        if issuer.is_zero() {
            return Err(ConstructionError::ZeroIssuer);
        }
        Ok(Self {
            issuer,
            chain_id,
            verifying_contract: deployer.create(nonce),
            rpc_url: None,
        })
    }

    pub fn with_rpc_url(mut self, rpc_url: Option<Url>) -> Self {
        self.rpc_url = rpc_url;
        self
    }

    pub fn domain(&self) -> KycDomain {
        KycDomain::new(self.chain_id, self.verifying_contract)
    }

    pub fn verifier<L: VerificationLedger>(
        &self,
        ledger: L,
    ) -> Result<KycVerifier<L>, ConstructionError> {
        KycVerifier::with_ledger(self.issuer, self.domain(), ledger)
    }

    pub fn load(path: &Path) -> Result<Self, DeploymentError> {
        let bytes = fs::read(path).map_err(|source| DeploymentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let deployment: Self =
            serde_json::from_slice(&bytes).map_err(|source| DeploymentError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        if deployment.issuer.is_zero() {
            return Err(ConstructionError::ZeroIssuer.into());
        }
        Ok(deployment)
    }

    pub fn save(&self, path: &Path) -> Result<(), DeploymentError> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|source| DeploymentError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|source| DeploymentError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
