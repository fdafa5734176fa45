use alloy_dyn_abi::TypedData;
use alloy_primitives::{keccak256, Address, B256, U256};
use serde_json::{json, Value};

use crate::error::TypedDataError;

pub const DOMAIN_NAME: &str = "Gbese KYC";
pub const DOMAIN_VERSION: &str = "1";
pub const PRIMARY_TYPE: &str = "KYC";

/// Canonical encoding of the `EIP712Domain` type.
pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Canonical encoding of the attestation struct type.
pub const KYC_TYPE: &str = "KYC(address user,uint256 issuedAt)";

/// The EIP-712 domain of one deployed verifier.
///
/// `name` and `version` are fixed; the chain id and the instance address are
/// bound when the verifier is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KycDomain {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

/// The attestation an issuer signs: `KYC { address user; uint256 issuedAt; }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KycMessage {
    pub user: Address,
    pub issued_at: U256,
}

impl KycMessage {
    pub fn new(user: Address, issued_at: U256) -> Self {
        Self { user, issued_at }
    }

    /// keccak256(typeHash || pad32(user) || pad32(issuedAt))
    pub fn struct_hash(&self) -> B256 {
        let mut buf = [0u8; 96];
        buf[..32].copy_from_slice(keccak256(KYC_TYPE).as_slice());
        buf[32..64].copy_from_slice(self.user.into_word().as_slice());
        buf[64..].copy_from_slice(&self.issued_at.to_be_bytes::<32>());
        keccak256(buf)
    }
}

impl KycDomain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id,
            verifying_contract,
        }
    }

    /// keccak256(typeHash || keccak256(name) || keccak256(version)
    ///     || pad32(chainId) || pad32(verifyingContract))
    pub fn separator(&self) -> B256 {
        let mut buf = [0u8; 160];
        buf[..32].copy_from_slice(keccak256(DOMAIN_TYPE).as_slice());
        buf[32..64].copy_from_slice(keccak256(DOMAIN_NAME).as_slice());
        buf[64..96].copy_from_slice(keccak256(DOMAIN_VERSION).as_slice());
        buf[96..128].copy_from_slice(&U256::from(self.chain_id).to_be_bytes::<32>());
        buf[128..].copy_from_slice(self.verifying_contract.into_word().as_slice());
        keccak256(buf)
    }

    /// The digest the issuer signs:
    /// keccak256("\x19\x01" || domainSeparator || hashStruct(message)).
    pub fn signing_hash(&self, message: &KycMessage) -> B256 {
        let mut buf = [0u8; 66];
        buf[0] = 0x19;
        buf[1] = 0x01;
        buf[2..34].copy_from_slice(self.separator().as_slice());
        buf[34..].copy_from_slice(message.struct_hash().as_slice());
        keccak256(buf)
    }

    /// The `eth_signTypedData_v4` payload an issuer's wallet signs for `message`.
    pub fn signing_request(&self, message: &KycMessage) -> Value {
        json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" },
                ],
                "KYC": [
                    { "name": "user", "type": "address" },
                    { "name": "issuedAt", "type": "uint256" },
                ],
            },
            "primaryType": PRIMARY_TYPE,
            "domain": {
                "name": DOMAIN_NAME,
                "version": DOMAIN_VERSION,
                "chainId": self.chain_id,
                "verifyingContract": self.verifying_contract,
            },
            "message": {
                "user": message.user,
                // decimal string so values above 2^53 survive JSON tooling
                "issuedAt": message.issued_at.to_string(),
            },
        })
    }
}

/// Compute a generic EIP-712 digest for any compliant typed-data JSON.
/// Input is a JSON string with `types`, `primaryType`, `domain`, and `message`.
/// Returns the bytes32 digest: keccak256("\x19\x01" || domainSeparator || hashStruct(message)).
pub fn typed_data_digest(typed_data_json: &str) -> Result<B256, TypedDataError> {
    let typed: TypedData = serde_json::from_str(typed_data_json)?;
    Ok(typed.eip712_signing_hash()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use alloy_sol_types::{eip712_domain, sol, SolStruct};

    sol! {
        struct KYC {
            address user;
            uint256 issuedAt;
        }
    }

    const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const USER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn message() -> KycMessage {
        KycMessage::new(USER, U256::from(1_700_000_000u64))
    }

    #[test]
    fn domain_type_hash_is_the_standard_one() {
        assert_eq!(
            keccak256(DOMAIN_TYPE),
            b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f")
        );
    }

    #[test]
    fn matches_sol_types_encoding() {
        let domain = KycDomain::new(84532, CONTRACT);
        let reference_domain = eip712_domain! {
            name: "Gbese KYC",
            version: "1",
            chain_id: 84532,
            verifying_contract: CONTRACT,
        };
        let reference = KYC {
            user: USER,
            issuedAt: U256::from(1_700_000_000u64),
        };

        assert_eq!(reference.eip712_type_hash(), keccak256(KYC_TYPE));
        assert_eq!(domain.separator(), reference_domain.separator());
        assert_eq!(message().struct_hash(), reference.eip712_hash_struct());
        assert_eq!(
            domain.signing_hash(&message()),
            reference.eip712_signing_hash(&reference_domain)
        );
    }

    #[test]
    fn signing_request_digests_to_the_same_hash() {
        let domain = KycDomain::new(84532, CONTRACT);
        let payload = domain.signing_request(&message()).to_string();
        let digest = typed_data_digest(&payload).unwrap();
        assert_eq!(digest, domain.signing_hash(&message()));
    }

    #[test]
    fn signing_request_handles_full_width_issued_at() {
        let domain = KycDomain::new(1, CONTRACT);
        let msg = KycMessage::new(USER, U256::MAX);
        let payload = domain.signing_request(&msg).to_string();
        assert_eq!(typed_data_digest(&payload).unwrap(), domain.signing_hash(&msg));
    }

    #[test]
    fn every_domain_field_changes_the_digest() {
        let base = KycDomain::new(84532, CONTRACT);
        let other_chain = KycDomain::new(1, CONTRACT);
        let other_contract = KycDomain::new(84532, USER);

        let digest = base.signing_hash(&message());
        assert_ne!(digest, other_chain.signing_hash(&message()));
        assert_ne!(digest, other_contract.signing_hash(&message()));
    }

    #[test]
    fn every_message_field_changes_the_digest() {
        let domain = KycDomain::new(84532, CONTRACT);
        let digest = domain.signing_hash(&message());

        let later = KycMessage::new(USER, U256::from(1_700_000_001u64));
        let someone_else = KycMessage::new(CONTRACT, U256::from(1_700_000_000u64));
        assert_ne!(digest, domain.signing_hash(&later));
        assert_ne!(digest, domain.signing_hash(&someone_else));
    }

    #[test]
    fn digest_is_not_the_plain_struct_hash() {
        let domain = KycDomain::new(84532, CONTRACT);
        let plain = keccak256(
            [domain.separator().as_slice(), message().struct_hash().as_slice()].concat(),
        );
        assert_ne!(domain.signing_hash(&message()), plain);
    }

    #[test]
    fn malformed_json_errors() {
        let err = typed_data_digest("{").unwrap_err();
        assert!(matches!(err, TypedDataError::Json(_)));
        assert!(format!("{err}").contains("invalid EIP-712 typed data JSON"));
    }
}
