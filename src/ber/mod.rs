//! Basic Encoding Rules (BER) objects, byte sources and decoder

mod ber;
mod decoder;
mod parser;
mod source;

pub use crate::ber::ber::*;
pub use crate::ber::decoder::*;
pub use crate::ber::parser::*;
pub use crate::ber::source::*;
pub use crate::der::put_in_sequence;
