//! Authentication: password hashing, signed tokens, the register/login
//! service and the request gates that protect routes.

mod claims;
mod config;
mod error;
mod middleware;
mod password;
mod service;
mod token;

pub use claims::{Claims, Role};
pub use config::{AuthConfig, ConfigValidationError, parse_duration};
pub use error::{AuthError, AuthErrorResponse, INVALID_CREDENTIALS_MESSAGE, UNAUTHENTICATED_MESSAGE};
pub use middleware::{CurrentUser, auth_middleware, require_role};
pub use password::PasswordHasher;
pub use service::{AuthService, LoginResponse};
pub use token::TokenIssuer;
