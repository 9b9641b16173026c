//! Authentication adapters.
//!
//! - `jwt` - HS256 access tokens, implementing `TokenIssuer` and `SessionValidator`
//! - `password` - argon2 password hashing
//! - `mock` - Token map validator for router tests

mod jwt;
mod mock;
mod password;

pub use jwt::{JwtSettings, JwtTokenService};
pub use mock::MockSessionValidator;
pub use password::Argon2PasswordHasher;
