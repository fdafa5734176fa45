use alloy_primitives::{uint, Address, Signature, B256, U256};

use crate::error::RecoveryError;

/// Length of an `r || s || v` secp256k1 signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Order of the secp256k1 group.
const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Largest accepted `s`; the upper half of the range is the malleable twin.
const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// Parse a 65-byte `r || s || v` signature.
///
/// `v` must be 27 or 28, `r` must lie in `[1, n)` and `s` in `[1, n/2]`.
pub fn parse_signature(bytes: &[u8]) -> Result<Signature, RecoveryError> {
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(RecoveryError::InvalidLength(bytes.len()));
    }

    let r = U256::from_be_slice(&bytes[..32]);
    let s = U256::from_be_slice(&bytes[32..64]);
    let y_parity = match bytes[64] {
        27 => false,
        28 => true,
        v => return Err(RecoveryError::InvalidRecoveryId(v)),
    };

    if r.is_zero() || r >= SECP256K1_N {
        return Err(RecoveryError::InvalidR);
    }
    if s.is_zero() || s > SECP256K1_HALF_N {
        return Err(RecoveryError::InvalidS);
    }

    Ok(Signature::new(r, s, y_parity))
}

/// Recover the address whose key produced `signature` over the 32-byte `digest`.
///
/// Never returns the zero address.
pub fn recover_signer(digest: &B256, signature: &[u8]) -> Result<Address, RecoveryError> {
    let signature = parse_signature(signature)?;
    let recovered = signature
        .recover_address_from_prehash(digest)
        .map_err(|_| RecoveryError::Unrecoverable)?;

    if recovered.is_zero() {
        return Err(RecoveryError::ZeroAddress);
    }
    Ok(recovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;

    fn signed(digest: &B256) -> (PrivateKeySigner, [u8; 65]) {
        let signer = PrivateKeySigner::random();
        let signature = signer.sign_hash_sync(digest).unwrap();
        (signer, signature.as_bytes())
    }

    #[test]
    fn recovers_the_signing_address() {
        let digest = keccak256(b"attestation");
        let (signer, bytes) = signed(&digest);
        assert_eq!(recover_signer(&digest, &bytes).unwrap(), signer.address());
    }

    #[test]
    fn other_digest_recovers_someone_else() {
        let digest = keccak256(b"attestation");
        let (signer, bytes) = signed(&digest);
        let other = keccak256(b"something else");
        // Recovery may succeed, but never to the original signer.
        if let Ok(recovered) = recover_signer(&other, &bytes) {
            assert_ne!(recovered, signer.address());
        }
    }

    #[test]
    fn rejects_wrong_lengths() {
        let digest = keccak256(b"attestation");
        let (_, bytes) = signed(&digest);

        assert_eq!(recover_signer(&digest, &[]), Err(RecoveryError::InvalidLength(0)));
        assert_eq!(
            recover_signer(&digest, &bytes[..64]),
            Err(RecoveryError::InvalidLength(64))
        );
        let mut long = bytes.to_vec();
        long.push(0);
        assert_eq!(recover_signer(&digest, &long), Err(RecoveryError::InvalidLength(66)));
    }

    #[test]
    fn rejects_recovery_ids_outside_27_and_28() {
        let digest = keccak256(b"attestation");
        let (_, mut bytes) = signed(&digest);
        for v in [0u8, 1, 26, 29, 35, 36, 255] {
            bytes[64] = v;
            assert_eq!(
                recover_signer(&digest, &bytes),
                Err(RecoveryError::InvalidRecoveryId(v))
            );
        }
    }

    #[test]
    fn rejects_out_of_range_r() {
        let digest = keccak256(b"attestation");
        let (_, mut bytes) = signed(&digest);

        bytes[..32].fill(0);
        assert_eq!(recover_signer(&digest, &bytes), Err(RecoveryError::InvalidR));

        bytes[..32].copy_from_slice(&SECP256K1_N.to_be_bytes::<32>());
        assert_eq!(recover_signer(&digest, &bytes), Err(RecoveryError::InvalidR));
    }

    #[test]
    fn rejects_zero_and_high_s() {
        let digest = keccak256(b"attestation");
        let (_, mut bytes) = signed(&digest);

        let s = U256::from_be_slice(&bytes[32..64]);
        let mut flipped = bytes;
        flipped[32..64].copy_from_slice(&(SECP256K1_N - s).to_be_bytes::<32>());
        flipped[64] = if bytes[64] == 27 { 28 } else { 27 };
        assert_eq!(recover_signer(&digest, &flipped), Err(RecoveryError::InvalidS));

        bytes[32..64].fill(0);
        assert_eq!(recover_signer(&digest, &bytes), Err(RecoveryError::InvalidS));
    }

    #[test]
    fn all_zero_signature_is_not_an_address() {
        let digest = keccak256(b"attestation");
        let mut bytes = [0u8; 65];
        bytes[64] = 27;
        assert!(recover_signer(&digest, &bytes).is_err());
    }

    #[test]
    fn half_order_constant_is_consistent() {
        assert_eq!(SECP256K1_N >> 1, SECP256K1_HALF_N);
    }
}
