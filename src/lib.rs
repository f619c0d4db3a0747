//! # BER/DER Codec
//!
//! A codec for Basic Encoding Rules (BER [[X.690]]) and Distinguished Encoding Rules (DER
//! [[X.690]]), with the X.509 structures needed to decode certificate revocation lists.
//! Header parsing is implemented with the [nom](https://github.com/Geal/nom) parser combinator
//! framework.
//!
//! # Design
//!
//! Decoding is driven by the expected structure: a [`BerDecoder`](ber/struct.BerDecoder.html)
//! reads one tagged object at a time from a [`DataSource`](ber/trait.DataSource.html), and the
//! caller says what it expects next (a SEQUENCE, an optional field, an INTEGER, ...). Constructed
//! objects are entered with `start_cons`, which returns a decoder scoped to their content.
//!
//! ```rust
//! use der_codec::ber::*;
//!
//! let bytes = [ 0x30, 0x08,
//!               0x02, 0x01, 0x01,
//!               0x04, 0x03, 0x61, 0x62, 0x63,
//! ];
//!
//! let mut decoder = BerDecoder::new(&bytes);
//! let mut seq = decoder.start_cons(BerTag::Sequence, BerClass::Universal).expect("sequence");
//! let version = seq.decode_u32().expect("version");
//! let name = seq.decode_octet_string().expect("name");
//! seq.verify_end().expect("end of sequence");
//! assert_eq!(version, 1);
//! assert_eq!(name, b"abc");
//! ```
//!
//! Encoding goes the other way, with a [`DerEncoder`](der/struct.DerEncoder.html):
//!
//! ```rust
//! use der_codec::ber::*;
//! use der_codec::der::DerEncoder;
//!
//! let bytes = DerEncoder::new()
//!     .start_cons(BerTag::Sequence, BerClass::Universal)
//!     .encode(&1u32)
//!     .encode(&OctetString(b"abc".to_vec()))
//!     .end_cons()
//!     .get_contents()
//!     .expect("encoding");
//! assert_eq!(bytes, [0x30, 0x08, 0x02, 0x01, 0x01, 0x04, 0x03, 0x61, 0x62, 0x63]);
//! ```
//!
//! Revocation lists are decoded with [`X509Crl`](crl/struct.X509Crl.html). Decoding needs a
//! [`Context`](config/struct.Context.html), holding the object identifier registry and the
//! policy for unknown critical extensions.
//!
//! # Notes
//!
//! - Only definite lengths are accepted. The encoder always produces DER.
//! - Errors abort the whole decode: there are no partially decoded documents.
//! - INTEGER values can be of any size. Use `decode_u32`/`decode_u64` when the value is known to
//!   be small, or the `bigint` feature for serial numbers.
//!
//! # References
//!
//! - [[X.680]] Abstract Syntax Notation One (ASN.1): Specification of basic notation.
//! - [[X.690]] ASN.1 encoding rules: Specification of Basic Encoding Rules (BER), Canonical
//!   Encoding Rules (CER) and Distinguished Encoding Rules (DER).
//! - [RFC 5280] Internet X.509 Public Key Infrastructure Certificate and CRL Profile
//!
//! [X.680]: http://www.itu.int/rec/T-REC-X.680/en "Abstract Syntax Notation One (ASN.1):
//!   Specification of basic notation."
//! [X.690]: https://www.itu.int/rec/T-REC-X.690/en "ASN.1 encoding rules: Specification of
//!   Basic Encoding Rules (BER), Canonical Encoding Rules (CER) and Distinguished Encoding Rules
//!   (DER)."
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280

#![deny(/*missing_docs,*/unsafe_code,
        unstable_features,
        unused_import_braces)]

#[macro_use]
extern crate rusticata_macros;

#[allow(clippy::module_inception)]
pub mod ber;
pub mod config;
pub mod crl;
pub mod der;
pub mod ecc;
pub mod error;
pub mod oid;
pub mod x509;

pub use crate::config::Context;
pub use crate::crl::X509Crl;
pub use crate::error::{BerError, X509Error};

#[cfg(feature = "bigint")]
extern crate num_bigint;
