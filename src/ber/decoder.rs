//! Typed decoding over a byte source
//!
//! A [`BerDecoder`] is a cursor over one region of input: either the whole
//! input, or the payload of an enclosing constructed object. Objects are read
//! one at a time with [`BerDecoder::next_object`]; typed values are extracted
//! with [`BerDecoder::decode`] and friends, which check the identifier of the
//! object before interpreting its payload.
//!
//! ```rust
//! use der_codec::ber::{BerClass, BerDecoder, BerTag};
//!
//! let bytes = [0x30, 0x06, 0x02, 0x01, 0x07, 0x01, 0x01, 0xff];
//! let mut decoder = BerDecoder::new(&bytes);
//! let mut seq = decoder
//!     .start_cons(BerTag::Sequence, BerClass::Universal)
//!     .expect("sequence");
//! assert_eq!(seq.decode_u32(), Ok(7));
//! assert_eq!(seq.decode_bool(), Ok(true));
//! assert!(seq.verify_end().is_ok());
//! assert!(decoder.verify_end().is_ok());
//! ```

use crate::ber::parser::{ber_read_element_header, bytes_to_uint, MAX_HEADER_LEN};
use crate::ber::*;
use crate::error::BerError;
use log::trace;
use nom::Err;

/// Payload bytes are copied from the source in chunks of this size
const READ_CHUNK: usize = 4096;

/// A type that can be read from a single BER object
pub trait BerDecodable: Sized {
    /// Identifier of the untagged encoding of this type
    const IDENTIFIER: Identifier;

    /// Returns true if an object with this identifier holds a value of this type
    fn accepts(id: &Identifier) -> bool {
        *id == Self::IDENTIFIER
    }

    /// Interpret the payload of an object whose identifier was already checked
    fn from_ber_object(obj: BerObject) -> Result<Self, BerError>;
}

#[derive(Debug)]
pub struct BerDecoder<S> {
    source: S,
    pushed: Option<BerObject>,
}

impl<'a> BerDecoder<SliceSource<'a>> {
    /// Decoder over an in-memory buffer
    pub fn new(data: &'a [u8]) -> Self {
        BerDecoder::from_source(SliceSource::new(data))
    }
}

impl<S: DataSource> BerDecoder<S> {
    pub fn from_source(source: S) -> Self {
        BerDecoder {
            source,
            pushed: None,
        }
    }

    /// Returns true if objects (or bytes) remain in the current region
    pub fn more_items(&mut self) -> Result<bool, BerError> {
        if self.pushed.is_some() {
            return Ok(true);
        }
        Ok(!self.source.end_of_data()?)
    }

    /// Fail if anything remains in the current region
    pub fn verify_end(&mut self) -> Result<(), BerError> {
        if self.more_items()? {
            return Err(BerError::TrailingData);
        }
        Ok(())
    }

    /// Read the next object of the region
    ///
    /// Returns `Ok(None)` when the region is exhausted. Only definite lengths
    /// are accepted, and the whole payload must be available.
    pub fn next_object(&mut self) -> Result<Option<BerObject>, BerError> {
        if let Some(obj) = self.pushed.take() {
            return Ok(Some(obj));
        }
        if self.source.end_of_data()? {
            return Ok(None);
        }
        let hdr = self.read_header()?;
        let len = hdr.len.definite()?;
        let value = self.read_value(len)?;
        trace!("read {} ({} bytes)", hdr.identifier(), len);
        Ok(Some(BerObject {
            class: hdr.class,
            structured: hdr.structured,
            tag: hdr.tag,
            value,
        }))
    }

    fn read_header(&mut self) -> Result<BerObjectHeader, BerError> {
        let mut head = Vec::with_capacity(4);
        loop {
            match ber_read_element_header(&head) {
                Ok((_, hdr)) => return Ok(hdr),
                Err(Err::Incomplete(_)) => (),
                Err(Err::Error(e)) | Err(Err::Failure(e)) => return Err(e),
            }
            if head.len() >= MAX_HEADER_LEN {
                return Err(BerError::InvalidLength);
            }
            match self.source.read_byte()? {
                Some(b) => head.push(b),
                None => return Err(BerError::TruncatedHeader),
            }
        }
    }

    fn read_value(&mut self, len: usize) -> Result<Vec<u8>, BerError> {
        let mut value = Vec::with_capacity(len.min(READ_CHUNK));
        let mut buf = [0u8; READ_CHUNK];
        while value.len() < len {
            let want = (len - value.len()).min(READ_CHUNK);
            let n = self.source.read(&mut buf[..want])?;
            if n == 0 {
                return Err(BerError::Truncated {
                    declared: len,
                    available: value.len(),
                });
            }
            value.extend_from_slice(&buf[..n]);
        }
        Ok(value)
    }

    /// Return an object to the decoder, so that the next read yields it
    ///
    /// # Panics
    ///
    /// Panics if an object was already pushed back and not read since.
    pub fn push_back(&mut self, obj: BerObject) {
        assert!(
            self.pushed.is_none(),
            "BerDecoder::push_back: only one object can be pushed back"
        );
        self.pushed = Some(obj);
    }

    /// Look at the next object without consuming it
    pub fn peek_object(&mut self) -> Result<Option<&BerObject>, BerError> {
        if self.pushed.is_none() {
            self.pushed = self.next_object()?;
        }
        Ok(self.pushed.as_ref())
    }

    /// Drain the rest of the region verbatim
    pub fn raw_bytes(&mut self) -> Result<Vec<u8>, BerError> {
        let mut out = match self.pushed.take() {
            Some(obj) => obj.to_vec()?,
            None => Vec::new(),
        };
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let n = self.source.read(&mut buf)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    /// Enter a constructed object
    ///
    /// The next object must carry exactly the given tag and class with the
    /// constructed bit set. The returned decoder owns its payload; this
    /// decoder is positioned after the whole object, whatever the caller does
    /// with the sub-decoder.
    pub fn start_cons(
        &mut self,
        tag: BerTag,
        class: BerClass,
    ) -> Result<BerDecoder<VecSource>, BerError> {
        let expected = Identifier::new(class, true, tag);
        let obj = self
            .next_object()?
            .ok_or(BerError::MissingObject(expected))?;
        obj.assert_identifier(expected)?;
        Ok(obj.into_decoder())
    }

    /// Read a value of type `T` with its universal identifier
    pub fn decode<T: BerDecodable>(&mut self) -> Result<T, BerError> {
        let obj = self
            .next_object()?
            .ok_or(BerError::MissingObject(T::IDENTIFIER))?;
        let actual = obj.identifier();
        if !T::accepts(&actual) {
            return Err(BerError::UnexpectedTag {
                expected: T::IDENTIFIER,
                actual,
            });
        }
        T::from_ber_object(obj)
    }

    /// Read an implicitly tagged value of type `T`
    pub fn decode_with_tag<T: BerDecodable>(
        &mut self,
        tag: BerTag,
        class: BerClass,
    ) -> Result<T, BerError> {
        let expected = Identifier::new(class, T::IDENTIFIER.constructed, tag);
        let obj = self
            .next_object()?
            .ok_or(BerError::MissingObject(expected))?;
        obj.assert_identifier(expected)?;
        T::from_ber_object(obj)
    }

    /// Read an optional, implicitly tagged value
    ///
    /// If the next object does not carry the given tag and class, it is left
    /// in place and `default` is returned. A universal `class` means the
    /// field is untagged.
    pub fn decode_optional<T: BerDecodable>(
        &mut self,
        tag: BerTag,
        class: BerClass,
        default: T,
    ) -> Result<T, BerError> {
        let obj = match self.next_object()? {
            Some(obj) => obj,
            None => return Ok(default),
        };
        if obj.tag != tag || obj.class != class {
            self.push_back(obj);
            return Ok(default);
        }
        let actual = obj.identifier();
        let matches = if class == BerClass::Universal {
            T::accepts(&actual)
        } else {
            actual.constructed == T::IDENTIFIER.constructed
        };
        if !matches {
            return Err(BerError::UnexpectedTag {
                expected: Identifier::new(class, T::IDENTIFIER.constructed, tag),
                actual,
            });
        }
        T::from_ber_object(obj)
    }

    /// Read an optional value wrapped in an explicit `[n]` tag
    pub fn decode_optional_explicit<T: BerDecodable>(
        &mut self,
        n: u32,
        default: T,
    ) -> Result<T, BerError> {
        let obj = match self.next_object()? {
            Some(obj) => obj,
            None => return Ok(default),
        };
        if obj.identifier() != Identifier::context(n, true) {
            self.push_back(obj);
            return Ok(default);
        }
        let mut inner = obj.into_decoder();
        let value = inner.decode()?;
        inner.verify_end()?;
        Ok(value)
    }

    /// Read an optional string carried with the implicit tag `[context_tag]`
    ///
    /// `real_type` is the string type the field would have without the tag:
    /// OCTET STRING content is returned as is, BIT STRING content must not
    /// have unused bits and is returned without its leading count octet.
    pub fn decode_optional_string(
        &mut self,
        real_type: BerTag,
        context_tag: u32,
    ) -> Result<Option<Vec<u8>>, BerError> {
        let obj = match self.next_object()? {
            Some(obj) => obj,
            None => return Ok(None),
        };
        if obj.tag != BerTag(context_tag) || obj.class != BerClass::ContextSpecific {
            self.push_back(obj);
            return Ok(None);
        }
        if obj.is_constructed() {
            return Err(BerError::ConstructUnexpected);
        }
        match real_type {
            BerTag::BitString => {
                let bits = BitString::from_ber_object(obj)?;
                if bits.unused_bits != 0 {
                    return Err(BerError::InvalidValue(BerTag::BitString));
                }
                Ok(Some(bits.data))
            }
            _ => Ok(Some(obj.value)),
        }
    }

    /// Read a SEQUENCE OF `T`
    pub fn decode_list<T: BerDecodable>(&mut self) -> Result<Vec<T>, BerError> {
        let mut seq = self.start_cons(BerTag::Sequence, BerClass::Universal)?;
        let mut out = Vec::new();
        while seq.more_items()? {
            out.push(seq.decode()?);
        }
        Ok(out)
    }

    pub fn decode_u32(&mut self) -> Result<u32, BerError> {
        self.decode()
    }

    pub fn decode_u64(&mut self) -> Result<u64, BerError> {
        self.decode()
    }

    pub fn decode_bool(&mut self) -> Result<bool, BerError> {
        self.decode()
    }

    pub fn decode_octet_string(&mut self) -> Result<Vec<u8>, BerError> {
        self.decode::<OctetString>().map(|s| s.0)
    }

    pub fn decode_bit_string(&mut self) -> Result<BitString, BerError> {
        self.decode()
    }

    pub fn decode_oid(&mut self) -> Result<crate::oid::Oid, BerError> {
        self.decode()
    }

    pub fn decode_null(&mut self) -> Result<(), BerError> {
        self.decode::<Null>().map(|_| ())
    }
}

impl BerObject {
    /// Decoder over the payload of this object
    pub fn into_decoder(self) -> BerDecoder<VecSource> {
        BerDecoder::from_source(VecSource::new(self.value))
    }
}

fn check_primitive(obj: &BerObject) -> Result<(), BerError> {
    if obj.is_constructed() {
        return Err(BerError::ConstructUnexpected);
    }
    Ok(())
}

impl BerDecodable for bool {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::Boolean);

    // BER allows any non-zero octet for TRUE
    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        check_primitive(&obj)?;
        match obj.value[..] {
            [b] => Ok(b != 0),
            _ => Err(BerError::InvalidBoolean),
        }
    }
}

macro_rules! impl_decodable_uint {
    ($t:ty) => {
        impl BerDecodable for $t {
            const IDENTIFIER: Identifier = Identifier::primitive(BerTag::Integer);

            fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
                check_primitive(&obj)?;
                bytes_to_uint(&obj.value)
            }
        }
    };
}

impl_decodable_uint!(u8);
impl_decodable_uint!(u32);
impl_decodable_uint!(u64);

/// Content of an OCTET STRING
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OctetString(pub Vec<u8>);

impl BerDecodable for OctetString {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::OctetString);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        check_primitive(&obj)?;
        Ok(OctetString(obj.value))
    }
}

impl BerDecodable for BitString {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::BitString);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        check_primitive(&obj)?;
        let (&unused_bits, data) = obj.value.split_first().ok_or(BerError::InvalidLength)?;
        if unused_bits > 7 || (data.is_empty() && unused_bits != 0) {
            return Err(BerError::InvalidValue(BerTag::BitString));
        }
        Ok(BitString {
            unused_bits,
            data: data.to_vec(),
        })
    }
}

/// The NULL value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Null;

impl BerDecodable for Null {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::Null);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        check_primitive(&obj)?;
        if !obj.value.is_empty() {
            return Err(BerError::InvalidLength);
        }
        Ok(Null)
    }
}

/// ENUMERATED value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Enumerated(pub u32);

impl BerDecodable for Enumerated {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::Enumerated);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        check_primitive(&obj)?;
        bytes_to_uint(&obj.value).map(Enumerated)
    }
}
