use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Checks `password` against a stored hash.
///
/// A stored value that is not a bcrypt hash never matches. It is logged instead of
/// failing the login with a 500.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    match verify(password, stored_hash) {
        Ok(matches) => Ok(matches),
        Err(bcrypt::BcryptError::InvalidHash(_))
        | Err(bcrypt::BcryptError::InvalidPrefix(_))
        | Err(bcrypt::BcryptError::InvalidCost(_))
        | Err(bcrypt::BcryptError::CostNotAllowed(_))
        | Err(bcrypt::BcryptError::InvalidSaltLen(_))
        | Err(bcrypt::BcryptError::InvalidBase64(_)) => {
            log::warn!("Stored password hash is malformed");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
