//! Authentication and authorization
//!
//! - [`token`]: HS256 session tokens
//! - [`revocation`]: revoked-token store (Redis or in-process)
//! - [`roles`]: role directory used for authorization
//! - [`middleware`]: authentication, authorization and API-key gates
//! - [`password`]: Argon2id password hashing
//! - [`service`]: login and logout

pub mod middleware;
pub mod password;
pub mod revocation;
pub mod roles;
pub mod service;
pub mod token;

pub use middleware::{authenticate, authorize, require_api_key, AuthContext, Session};
pub use password::{hash_password, verify_password, PasswordError};
pub use revocation::{
    MemoryRevocationStore, RedisRevocationStore, RevocationError, RevocationStore,
};
pub use roles::{MemoryRoleDirectory, PgRoleDirectory, RoleDirectory, RoleError};
pub use service::{AuthService, ClientInfo, LoginRequest, LoginResponse};
pub use token::{SessionClaims, TokenConfig, TokenError};
