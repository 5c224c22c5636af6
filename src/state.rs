use rand::{TryRngCore, rngs::OsRng};

use crate::AuthError;

const STATE_BYTES: usize = 32;

/// Fresh CSRF state: 32 bytes from the OS RNG, lowercase hex encoded.
pub fn create_state() -> Result<String, AuthError> {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| AuthError::OsRng {
            message: err.to_string(),
        })?;
    Ok(hex::encode(bytes))
}

/// Compares two state values without short-circuiting on the first
/// differing byte.
pub(crate) fn states_match(returned: &str, stored: &str) -> bool {
    if returned.len() != stored.len() {
        return false;
    }

    let mut diff = 0u8;
    for (a, b) in returned.bytes().zip(stored.bytes()) {
        diff |= a ^ b;
    }
    diff == 0
}
