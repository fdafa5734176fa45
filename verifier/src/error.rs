use alloy_primitives::Address;
use std::path::PathBuf;

/// The only rejection `verify_kyc` ever surfaces for a bad signature.
pub const INVALID_KYC_SIGNATURE: &str = "Invalid or unauthorized KYC signature";

/// Failure to instantiate a verifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("issuer must not be the zero address")]
    ZeroIssuer,
}

/// Signature bytes that cannot be turned into a signer address.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("recovery id {0} is not 27 or 28")]
    InvalidRecoveryId(u8),
    #[error("signature r value out of range")]
    InvalidR,
    #[error("signature s value out of range")]
    InvalidS,
    #[error("public key recovery failed")]
    Unrecoverable,
    #[error("signature recovered to the zero address")]
    ZeroAddress,
}

/// A well-formed signature from someone other than the issuer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("recovered signer {recovered} is not the authorized issuer")]
pub struct UnauthorizedError {
    pub recovered: Address,
}

/// Failures of a ledger backing store.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode ledger state: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors returned by [`crate::KycVerifier::verify_kyc`].
///
/// Malformed and unauthorized signatures are deliberately collapsed into
/// [`KycError::InvalidSignature`].
#[derive(Debug, thiserror::Error)]
pub enum KycError {
    #[error("{}", INVALID_KYC_SIGNATURE)]
    InvalidSignature,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Failures loading or saving a deployment record.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("deployment file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("deployment file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Failures digesting a generic typed-data JSON document.
#[derive(Debug, thiserror::Error)]
pub enum TypedDataError {
    #[error("invalid EIP-712 typed data JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed computing EIP-712 digest: {0}")]
    Digest(#[from] alloy_dyn_abi::Error),
}
