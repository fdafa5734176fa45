use alloy_primitives::Address;

use crate::error::UnauthorizedError;

/// True iff `recovered` is exactly the authorized issuer.
pub fn authorize(recovered: &Address, issuer: &Address) -> bool {
    recovered == issuer
}

/// [`authorize`] as a `Result`, for chaining after recovery.
pub fn ensure_issuer(recovered: Address, issuer: &Address) -> Result<Address, UnauthorizedError> {
    if authorize(&recovered, issuer) {
        Ok(recovered)
    } else {
        Err(UnauthorizedError { recovered })
    }
}
