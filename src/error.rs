//! Error types
//!
//! Codec-level failures are reported as [`BerError`]. Document decoders built
//! on top of the codec wrap it in [`X509Error`], which adds semantic and
//! configuration errors. A failing decode never yields a partial document.

use crate::ber::{BerTag, Identifier};
use crate::oid::Oid;
use nom::error::{ErrorKind, ParseError};
use nom::IResult;
use std::io;

/// Holds the result of parsing functions
///
/// `O` is the output type, and defaults to a `BerObject`.
pub type BerResult<'a, O = crate::ber::BerObject> = IResult<&'a [u8], O, BerError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BerError {
    /// The byte source had no data where at least one byte was required
    #[error("stream error: source was empty")]
    StreamEmpty,
    /// The byte source reported an I/O failure
    #[error("stream error: {0:?}")]
    Io(io::ErrorKind),

    #[error("invalid tag encoding")]
    InvalidTag,
    #[error("invalid class")]
    InvalidClass,
    #[error("invalid length encoding")]
    InvalidLength,
    #[error("indefinite length encoding is not supported")]
    IndefiniteLength,
    /// Declared length exceeds the bytes remaining in the enclosing region
    #[error("declared length {declared} exceeds the {available} bytes available")]
    Truncated { declared: usize, available: usize },
    #[error("truncated object header")]
    TruncatedHeader,
    #[error("unexpected trailing data")]
    TrailingData,

    /// Object does not have the expected identifier
    #[error("tag mismatch: expected {expected}, got {actual}")]
    UnexpectedTag {
        expected: Identifier,
        actual: Identifier,
    },
    /// A required object was not present before the end of the region
    #[error("missing object: expected {0}")]
    MissingObject(Identifier),

    #[error("constructed encoding expected")]
    ConstructExpected,
    #[error("primitive encoding expected")]
    ConstructUnexpected,

    /// Integer is too large to fit in the requested native type
    #[error("integer too large")]
    IntegerTooLarge,
    #[error("integer is negative")]
    IntegerNegative,
    #[error("invalid boolean encoding")]
    InvalidBoolean,
    #[error("invalid object identifier")]
    InvalidOid,
    #[error("invalid time encoding")]
    InvalidTime,
    #[error("invalid value for {0:?}")]
    InvalidValue(BerTag),

    #[error("maximum nesting depth exceeded")]
    BerMaxDepth,

    #[error("parser error: {0:?}")]
    NomError(ErrorKind),

    #[error("serialization failed: {0}")]
    Serialize(#[from] SerializeError),
}

impl<I> ParseError<I> for BerError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        BerError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        BerError::NomError(kind)
    }
}

impl From<io::Error> for BerError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => BerError::StreamEmpty,
            kind => BerError::Io(kind),
        }
    }
}

/// Errors raised while decoding an X.509 document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum X509Error {
    #[error("BER: {0}")]
    Ber(#[from] BerError),

    /// Version number as displayed (v1, v2, ...), saturated to the `i64` range
    #[error("unknown X.509 CRL version {0}")]
    UnknownVersion(i64),
    #[error("algorithm identifier mismatch")]
    AlgorithmMismatch,
    #[error("unknown critical CRL extension {0}")]
    UnknownCriticalExtension(Oid),
    #[error("unknown tag in CRL: {0}")]
    UnknownTrailingTag(Identifier),
    #[error("input does not look like BER data")]
    NotBer,

    /// The policy collaborator returned a value outside its recognized set
    #[error("bad value of {key}: {value:?}")]
    InvalidConfig { key: String, value: Option<String> },
    #[error("no object identifier registered for {0}")]
    UnknownOidName(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] SerializeError),
}

impl X509Error {
    /// Returns true for errors caused by the configuration rather than the input
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            X509Error::InvalidConfig { .. } | X509Error::UnknownOidName(_)
        )
    }
}

/// Errors raised while parsing settings text
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("line {0}: expected `key = value`")]
    MissingSeparator(usize),
    #[error("line {0}: empty key")]
    EmptyKey(usize),
    #[error("invalid object identifier {0:?}")]
    InvalidOid(String),
}

/// Errors raised while encoding or decoding EC keys
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EcKeyError {
    #[error("BER: {0}")]
    Ber(#[from] BerError),
    #[error("domain parameters have no object identifier")]
    MissingDomainOid,
    #[error("domain parameters have no explicit encoding")]
    MissingExplicitDomain,
    #[error("implicitCA domain parameters are not supported")]
    ImplicitCaUnsupported,
    #[error("unexpected key algorithm {0}")]
    WrongAlgorithm(Oid),
    #[error("unknown EC private key version {0}")]
    UnknownVersion(u32),
    #[error("point arithmetic failed: {0}")]
    Arithmetic(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] SerializeError),
}

/// Serialization error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SerializeError {
    #[error("output buffer too small, {0} more bytes needed")]
    BufferTooSmall(usize),
    #[error("write failed")]
    Io,
    #[error("serializer error: {0}")]
    Other(String),
}

impl From<cookie_factory::GenError> for SerializeError {
    fn from(e: cookie_factory::GenError) -> Self {
        match e {
            cookie_factory::GenError::BufferTooSmall(sz) => SerializeError::BufferTooSmall(sz),
            cookie_factory::GenError::IoError(_) => SerializeError::Io,
            e => SerializeError::Other(format!("{:?}", e)),
        }
    }
}
