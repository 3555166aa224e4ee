//! Authentication module
//!
//! Provides JWT-based authentication with argon2 password hashing and
//! role-based access control.

mod authenticator;
mod claims;
mod jwt;
mod middleware;
mod password;
mod roles;

pub use authenticator::{AuthError, Authenticator, LoginOutcome};
pub use claims::{Claims, Identity, TokenDomain};
pub use jwt::{JwtService, TokenError, TokenPair};
pub use middleware::{authenticate, bearer_token, AuthUser};
pub use password::{hash_async, verify_async, CredentialHasher, PasswordService};
pub use roles::{enforce_role, RoleGate};
