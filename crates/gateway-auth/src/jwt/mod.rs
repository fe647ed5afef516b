//! Bearer token encoding, decoding, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::Claims;
pub use decoder::SessionAuthenticator;
pub use encoder::{IssuedToken, TokenIssuer};
