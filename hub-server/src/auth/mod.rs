//! Authentication and authorization
//!
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - resolved caller
//! - [`require_auth`] - authentication middleware
//! - [`require_client`] / [`require_freelancer`] - role gates
//! - [`authorize`] - the order participant predicate

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_auth, require_client, require_freelancer};
pub use password::{hash_password, verify_password};
pub use policy::authorize;
