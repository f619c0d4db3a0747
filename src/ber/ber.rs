use crate::error::{BerError, SerializeError};
use rusticata_macros::newtype_enum;
use std::convert::TryFrom;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BerClassFromIntError(pub(crate) ());

/// BER Object class of tag
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BerClass {
    Universal = 0b00,
    Application = 0b01,
    ContextSpecific = 0b10,
    Private = 0b11,
}

/// BER/DER Tag as defined in X.680 section 8.4
///
/// X.690 doesn't specify the maxmimum tag size so we're assuming that people
/// aren't going to need anything more than a u32.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BerTag(pub u32);

newtype_enum! {
impl debug BerTag {
    EndOfContent = 0x0,
    Boolean = 0x1,
    Integer = 0x2,
    BitString = 0x3,
    OctetString = 0x4,
    Null = 0x05,
    Oid = 0x06,
    ObjDescriptor = 0x07,
    External = 0x08,
    RealType = 0x09,
    Enumerated = 0xa,
    EmbeddedPdv = 0xb,
    Utf8String = 0xc,
    RelativeOid = 0xd,

    Sequence = 0x10,
    Set = 0x11,
    NumericString = 0x12,
    PrintableString = 0x13,
    T61String = 0x14,

    Ia5String = 0x16,
    UtcTime = 0x17,
    GeneralizedTime = 0x18,

    GeneralString = 27, // 0x1b
    UniversalString = 0x1c,

    BmpString = 0x1e,
}
}

impl TryFrom<u8> for BerClass {
    type Error = BerClassFromIntError;

    #[inline]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(BerClass::Universal),
            0b01 => Ok(BerClass::Application),
            0b10 => Ok(BerClass::ContextSpecific),
            0b11 => Ok(BerClass::Private),
            _ => Err(BerClassFromIntError(())),
        }
    }
}

impl fmt::Display for BerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BerClass::Universal => "UNIVERSAL",
            BerClass::Application => "APPLICATION",
            BerClass::ContextSpecific => "CONTEXT-SPECIFIC",
            BerClass::Private => "PRIVATE",
        };
        f.write_str(s)
    }
}

/// Identifier octets of a BER object: class, primitive/constructed bit and tag number
///
/// Tag comparisons in the decoder are always made on the complete identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub class: BerClass,
    pub constructed: bool,
    pub tag: BerTag,
}

impl Identifier {
    pub const fn new(class: BerClass, constructed: bool, tag: BerTag) -> Self {
        Identifier {
            class,
            constructed,
            tag,
        }
    }

    /// Universal, primitive identifier
    pub const fn primitive(tag: BerTag) -> Self {
        Identifier::new(BerClass::Universal, false, tag)
    }

    /// Universal, constructed identifier
    pub const fn constructed(tag: BerTag) -> Self {
        Identifier::new(BerClass::Universal, true, tag)
    }

    /// Context-specific identifier `[n]`
    pub const fn context(n: u32, constructed: bool) -> Self {
        Identifier::new(BerClass::ContextSpecific, constructed, BerTag(n))
    }

    /// First identifier octet, when the tag number fits in the short form
    pub fn short_form(&self) -> Option<u8> {
        if self.tag.0 >= 0x1f {
            return None;
        }
        let b = ((self.class as u8) << 6) | if self.constructed { 0x20 } else { 0 };
        Some(b | self.tag.0 as u8)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            BerClass::Universal => write!(f, "{}", self.tag)?,
            class => write!(f, "[{} {}]", class, self.tag.0)?,
        }
        if self.constructed {
            f.write_str(" (constructed)")?;
        }
        Ok(())
    }
}

/// Ber Object Length
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Length {
    /// Definite form (X.690 8.1.3.3)
    Definite(usize),
    /// Indefinite form (X.690 8.1.3.6)
    Indefinite,
}

impl Length {
    /// Get the length of a definite-length object
    #[inline]
    pub fn definite(&self) -> Result<usize, BerError> {
        match self {
            Length::Definite(sz) => Ok(*sz),
            Length::Indefinite => Err(BerError::IndefiniteLength),
        }
    }
}

impl From<usize> for Length {
    fn from(v: usize) -> Self {
        Length::Definite(v)
    }
}

/// BER object header (identifier and length)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BerObjectHeader {
    /// Object class: universal, application, context-specific, or private
    pub class: BerClass,
    /// Constructed attribute: 1 if constructed, else 0
    pub structured: u8,
    /// Tag number
    pub tag: BerTag,
    /// Object length: definite or indefinite
    pub len: Length,
}

impl BerObjectHeader {
    /// Build a new BER header
    pub fn new(class: BerClass, structured: u8, tag: BerTag, len: Length) -> Self {
        BerObjectHeader {
            class,
            structured,
            tag,
            len,
        }
    }

    /// Identifier octets of this header
    #[inline]
    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.class, self.is_constructed(), self.tag)
    }

    /// Test if object is primitive
    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.structured == 0
    }
    /// Test if object is constructed
    #[inline]
    pub fn is_constructed(&self) -> bool {
        self.structured == 1
    }
}

/// A single decoded (or about to be encoded) BER object
///
/// The payload is kept as raw bytes. For a constructed object it is the
/// concatenation of the complete encodings of the inner objects, which can be
/// walked with a [`BerDecoder`](crate::ber::BerDecoder). Equality compares
/// class, constructed bit, tag and payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BerObject {
    pub class: BerClass,
    pub structured: u8,
    pub tag: BerTag,
    pub value: Vec<u8>,
}

impl BerObject {
    /// Build an object from its identifier and payload
    pub fn new(id: Identifier, value: Vec<u8>) -> Self {
        BerObject {
            class: id.class,
            structured: u8::from(id.constructed),
            tag: id.tag,
            value,
        }
    }

    /// Build a universal, primitive object
    pub fn from_primitive(tag: BerTag, value: Vec<u8>) -> Self {
        BerObject::new(Identifier::primitive(tag), value)
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.class, self.is_constructed(), self.tag)
    }

    /// Header describing this object, with the definite length of its payload
    pub fn header(&self) -> BerObjectHeader {
        BerObjectHeader::new(
            self.class,
            self.structured,
            self.tag,
            Length::Definite(self.value.len()),
        )
    }

    /// Test if object class is Universal
    #[inline]
    pub fn is_universal(&self) -> bool {
        self.class == BerClass::Universal
    }
    /// Test if object class is Context-specific
    #[inline]
    pub fn is_contextspecific(&self) -> bool {
        self.class == BerClass::ContextSpecific
    }
    /// Test if object is primitive
    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.structured == 0
    }
    /// Test if object is constructed
    #[inline]
    pub fn is_constructed(&self) -> bool {
        self.structured == 1
    }

    /// Check that the object has the given identifier
    pub fn assert_identifier(&self, expected: Identifier) -> Result<(), BerError> {
        let actual = self.identifier();
        if actual != expected {
            return Err(BerError::UnexpectedTag { expected, actual });
        }
        Ok(())
    }

    /// Payload as text, replacing invalid UTF-8 sequences.
    ///
    /// For display only: never use this on key material or other binary payloads
    /// that need to be interpreted later.
    pub fn as_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }

    /// Serialize this object (header and payload) to a new vector
    pub fn to_vec(&self) -> Result<Vec<u8>, SerializeError> {
        cookie_factory::gen_simple(crate::der::ber_encode_object(self), Vec::new())
            .map_err(SerializeError::from)
    }
}

/// Content of a BIT STRING
///
/// Only the DER form is handled: the number of unused bits in the last octet
/// (0 to 7) followed by the data octets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitString {
    pub unused_bits: u8,
    pub data: Vec<u8>,
}

impl BitString {
    /// A bit string made of whole octets
    pub fn from_bytes(data: Vec<u8>) -> Self {
        BitString {
            unused_bits: 0,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ber::*;

    #[test]
    fn test_identifier_short_form() {
        assert_eq!(Identifier::constructed(BerTag::Sequence).short_form(), Some(0x30));
        assert_eq!(Identifier::context(0, true).short_form(), Some(0xa0));
        assert_eq!(Identifier::context(2, false).short_form(), Some(0x82));
        assert_eq!(Identifier::context(31, false).short_form(), None);
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::primitive(BerTag::Integer).to_string(), "Integer");
        assert_eq!(
            Identifier::context(0, true).to_string(),
            "[CONTEXT-SPECIFIC 0] (constructed)"
        );
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(BerTag::Sequence.to_string(), "Sequence");
        assert_eq!(format!("{:?}", BerTag::Oid), "Oid");
        assert_eq!(BerTag(1000).to_string(), "BerTag(1000 / 0x3e8)");
    }

    #[test]
    fn test_as_string_lossy() {
        let obj = BerObject::from_primitive(BerTag::OctetString, vec![b'h', b'i', 0xff]);
        assert_eq!(obj.as_string_lossy(), "hi\u{fffd}");
    }

    #[test]
    fn test_object_equality() {
        let a = BerObject::from_primitive(BerTag::Integer, vec![1]);
        let b = BerObject::new(Identifier::context(2, false), vec![1]);
        assert_ne!(a, b);
        assert_eq!(a, BerObject::from_primitive(BerTag::Integer, vec![1]));
    }
}
