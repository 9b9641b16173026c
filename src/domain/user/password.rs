//! Generated passwords for accounts created during registration.

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Random alphanumeric password of [`GENERATED_PASSWORD_LEN`] characters.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
