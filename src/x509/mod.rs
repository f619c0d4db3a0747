//! X.509 building blocks
//!
//! The structures shared by certificates and revocation lists: algorithm
//! identifiers, names, times, extensions and the signature envelope.

mod alg_id;
mod extension;
mod name;
mod signed;
mod time;

pub use alg_id::*;
pub use extension::*;
pub use name::*;
pub use signed::*;
pub use time::*;
