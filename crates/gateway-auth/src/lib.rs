//! # gateway-auth
//!
//! Authentication and authorization for the supermarket gateway.
//!
//! ## Modules
//!
//! - `jwt` — token issuing, bearer verification, claims
//! - `credentials` — email/password checks against the identity backend
//! - `session` — login orchestration
//! - `rbac` — the per-operation role policy and its enforcer
//! - `reset` — forgot-password flow and the logging notifier

pub mod credentials;
pub mod jwt;
pub mod rbac;
pub mod reset;
pub mod session;

pub use credentials::CredentialAuthenticator;
pub use jwt::{Claims, IssuedToken, SessionAuthenticator, TokenIssuer};
pub use rbac::{Operation, RoleAuthorizer, RolePolicy};
pub use reset::{PasswordReset, TracingNotifier};
pub use session::LoginService;
