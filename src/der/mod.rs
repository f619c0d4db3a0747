//! Distinguished Encoding Rules (DER) encoder
//!
//! Everything produced here is canonical DER: definite lengths in their
//! shortest form, BOOLEAN TRUE as `0xff`, minimal INTEGER content, DEFAULT
//! values omitted and SET OF elements sorted.

mod encoder;
mod serialize;

pub use crate::der::encoder::*;
pub use crate::der::serialize::*;
