//! Auth-domain secrets and the token set issued by the Dropbox token endpoint.

pub mod secret;
pub mod token;

pub use secret::*;
pub use token::*;
