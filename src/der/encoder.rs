//! DER encoder
//!
//! [`DerEncoder`] builds a buffer by appending objects. Constructed objects
//! are opened with [`start_cons`](DerEncoder::start_cons) and closed with
//! [`end_cons`](DerEncoder::end_cons): the inner bytes are collected in a
//! frame, and wrapped with the frame identifier and the shortest length form
//! when the frame is closed.
//!
//! ```rust
//! use der_codec::ber::{BerClass, BerTag};
//! use der_codec::der::DerEncoder;
//!
//! let bytes = DerEncoder::new()
//!     .start_cons(BerTag::Sequence, BerClass::Universal)
//!     .encode(&7u32)
//!     .encode(&true)
//!     .end_cons()
//!     .get_contents()
//!     .expect("serialization failed");
//! assert_eq!(bytes, [0x30, 0x06, 0x02, 0x01, 0x07, 0x01, 0x01, 0xff]);
//! ```

use crate::ber::{
    BerClass, BerObject, BerTag, BitString, Enumerated, Identifier, Null, OctetString,
};
use crate::der::serialize::ber_encode_tlv;
use crate::error::SerializeError;
use cookie_factory::gen_simple;
use log::trace;

/// A type that can be written as a DER object
pub trait DerEncodable {
    /// Identifier of the untagged encoding of this value
    fn identifier(&self) -> Identifier;

    /// Write the payload of this value
    ///
    /// Constructed values write their inner objects through `enc`; primitive
    /// values write their content octets with `enc.raw_bytes`.
    fn encode_content(&self, enc: &mut DerEncoder);
}

#[derive(Debug)]
struct Frame {
    id: Identifier,
    contents: Vec<u8>,
    // SET OF elements, sorted when the frame is closed
    set_elements: Option<Vec<Vec<u8>>>,
}

#[derive(Debug, Default)]
pub struct DerEncoder {
    contents: Vec<u8>,
    frames: Vec<Frame>,
    error: Option<SerializeError>,
}

impl DerEncoder {
    pub fn new() -> Self {
        DerEncoder::default()
    }

    /// Open a constructed object
    pub fn start_cons(&mut self, tag: BerTag, class: BerClass) -> &mut Self {
        self.open(Identifier::new(class, true, tag))
    }

    fn open(&mut self, id: Identifier) -> &mut Self {
        let set_elements = if id == Identifier::constructed(BerTag::Set) {
            Some(Vec::new())
        } else {
            None
        };
        self.frames.push(Frame {
            id,
            contents: Vec::new(),
            set_elements,
        });
        self
    }

    /// Close the innermost open object
    ///
    /// # Panics
    ///
    /// Panics if no object is open.
    pub fn end_cons(&mut self) -> &mut Self {
        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => panic!("DerEncoder::end_cons called without a matching start_cons"),
        };
        let contents = match frame.set_elements {
            Some(mut elements) => {
                elements.sort();
                elements.concat()
            }
            None => frame.contents,
        };
        trace!("closed {} ({} bytes)", frame.id, contents.len());
        self.write_object(frame.id, &contents);
        self
    }

    /// Append already encoded bytes to the current object
    pub fn raw_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        match self.frames.last_mut() {
            Some(Frame {
                set_elements: Some(elements),
                ..
            }) => elements.push(bytes.to_vec()),
            Some(frame) => frame.contents.extend_from_slice(bytes),
            None => self.contents.extend_from_slice(bytes),
        }
        self
    }

    /// Append a primitive object with the given tag, class and content
    pub fn add_object(&mut self, tag: BerTag, class: BerClass, content: &[u8]) -> &mut Self {
        self.write_object(Identifier::new(class, false, tag), content);
        self
    }

    fn write_object(&mut self, id: Identifier, content: &[u8]) {
        let mut buf = Vec::with_capacity(content.len() + 6);
        match gen_simple(ber_encode_tlv(id, content), &mut buf) {
            Ok(_) => {
                self.raw_bytes(&buf);
            }
            Err(e) => {
                // keep the first failure, reported by get_contents
                if self.error.is_none() {
                    self.error = Some(e.into());
                }
            }
        }
    }

    /// Append a value with its universal identifier
    pub fn encode<T: DerEncodable + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.open(value.identifier());
        value.encode_content(self);
        self.end_cons()
    }

    /// Append a value with an implicit tag
    pub fn encode_with_tag<T: DerEncodable + ?Sized>(
        &mut self,
        value: &T,
        tag: BerTag,
        class: BerClass,
    ) -> &mut Self {
        let constructed = value.identifier().constructed;
        self.open(Identifier::new(class, constructed, tag));
        value.encode_content(self);
        self.end_cons()
    }

    /// Append a value unless it is equal to the DEFAULT value of the field
    pub fn encode_optional<T: DerEncodable + PartialEq>(
        &mut self,
        value: &T,
        default: &T,
    ) -> &mut Self {
        if value != default {
            self.encode(value);
        }
        self
    }

    /// Append a SEQUENCE OF values
    pub fn encode_list<T: DerEncodable>(&mut self, values: &[T]) -> &mut Self {
        self.start_cons(BerTag::Sequence, BerClass::Universal);
        for v in values {
            self.encode(v);
        }
        self.end_cons()
    }

    /// Take the finished buffer
    ///
    /// # Panics
    ///
    /// Panics if an object is still open.
    pub fn get_contents(&mut self) -> Result<Vec<u8>, SerializeError> {
        assert!(
            self.frames.is_empty(),
            "DerEncoder::get_contents called with {} open objects",
            self.frames.len()
        );
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        Ok(std::mem::take(&mut self.contents))
    }
}

/// Wrap already encoded content in a SEQUENCE
pub fn put_in_sequence(contents: &[u8]) -> Result<Vec<u8>, SerializeError> {
    DerEncoder::new()
        .start_cons(BerTag::Sequence, BerClass::Universal)
        .raw_bytes(contents)
        .end_cons()
        .get_contents()
}

/// Minimal two's complement content of a non-negative integer
pub(crate) fn uint_content(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let bytes = &bytes[start..];
    match bytes.first() {
        None => vec![0],
        Some(&b) if b & 0x80 != 0 => {
            let mut v = Vec::with_capacity(bytes.len() + 1);
            v.push(0);
            v.extend_from_slice(bytes);
            v
        }
        Some(_) => bytes.to_vec(),
    }
}

impl DerEncodable for BerObject {
    fn identifier(&self) -> Identifier {
        BerObject::identifier(self)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&self.value);
    }
}

impl DerEncodable for bool {
    fn identifier(&self) -> Identifier {
        Identifier::primitive(BerTag::Boolean)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&[if *self { 0xff } else { 0x00 }]);
    }
}

macro_rules! impl_encodable_uint {
    ($t:ty) => {
        impl DerEncodable for $t {
            fn identifier(&self) -> Identifier {
                Identifier::primitive(BerTag::Integer)
            }

            fn encode_content(&self, enc: &mut DerEncoder) {
                enc.raw_bytes(&uint_content(&self.to_be_bytes()));
            }
        }
    };
}

impl_encodable_uint!(u8);
impl_encodable_uint!(u32);
impl_encodable_uint!(u64);

impl DerEncodable for OctetString {
    fn identifier(&self) -> Identifier {
        Identifier::primitive(BerTag::OctetString)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&self.0);
    }
}

impl DerEncodable for BitString {
    fn identifier(&self) -> Identifier {
        Identifier::primitive(BerTag::BitString)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        let mut content = Vec::with_capacity(self.data.len() + 1);
        content.push(self.unused_bits);
        content.extend_from_slice(&self.data);
        enc.raw_bytes(&content);
    }
}

impl DerEncodable for Null {
    fn identifier(&self) -> Identifier {
        Identifier::primitive(BerTag::Null)
    }

    fn encode_content(&self, _enc: &mut DerEncoder) {}
}

impl DerEncodable for Enumerated {
    fn identifier(&self) -> Identifier {
        Identifier::primitive(BerTag::Enumerated)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&uint_content(&self.0.to_be_bytes()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::BerDecoder;
    use hex_literal::hex;

    #[test]
    fn test_uint_content() {
        assert_eq!(uint_content(&0u32.to_be_bytes()), vec![0]);
        assert_eq!(uint_content(&127u32.to_be_bytes()), vec![0x7f]);
        assert_eq!(uint_content(&128u32.to_be_bytes()), vec![0x00, 0x80]);
        assert_eq!(uint_content(&0x10001u64.to_be_bytes()), vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_nested_frames() {
        let bytes = DerEncoder::new()
            .start_cons(BerTag::Sequence, BerClass::Universal)
            .start_cons(BerTag(0), BerClass::ContextSpecific)
            .encode(&2u32)
            .end_cons()
            .encode(&Null)
            .end_cons()
            .get_contents()
            .unwrap();
        assert_eq!(bytes, hex!("30 07 a0 03 02 01 02 05 00"));
    }

    #[test]
    fn test_long_form_length() {
        let content = vec![0xaa; 200];
        let bytes = DerEncoder::new()
            .encode(&OctetString(content.clone()))
            .get_contents()
            .unwrap();
        assert_eq!(&bytes[..3], &hex!("04 81 c8"));
        let mut decoder = BerDecoder::new(&bytes);
        assert_eq!(decoder.decode_octet_string(), Ok(content));
    }

    #[test]
    fn test_set_is_sorted() {
        let bytes = DerEncoder::new()
            .start_cons(BerTag::Set, BerClass::Universal)
            .encode(&300u32)
            .encode(&true)
            .encode(&5u32)
            .end_cons()
            .get_contents()
            .unwrap();
        assert_eq!(bytes, hex!("31 0a 01 01 ff 02 01 05 02 02 01 2c"));
    }

    #[test]
    fn test_encode_optional_omits_default() {
        let bytes = DerEncoder::new()
            .encode_optional(&false, &false)
            .encode_optional(&3u32, &0)
            .get_contents()
            .unwrap();
        assert_eq!(bytes, hex!("02 01 03"));
    }

    #[test]
    fn test_implicit_tag() {
        let bytes = DerEncoder::new()
            .encode_with_tag(&OctetString(vec![1, 2]), BerTag(0), BerClass::ContextSpecific)
            .get_contents()
            .unwrap();
        assert_eq!(bytes, hex!("80 02 01 02"));
    }

    #[test]
    fn test_put_in_sequence() {
        assert_eq!(put_in_sequence(&hex!("05 00")), Ok(hex!("30 02 05 00").to_vec()));
    }

    #[test]
    #[should_panic]
    fn test_end_cons_without_start() {
        DerEncoder::new().end_cons();
    }

    #[test]
    #[should_panic]
    fn test_get_contents_with_open_frame() {
        let _ = DerEncoder::new()
            .start_cons(BerTag::Sequence, BerClass::Universal)
            .get_contents();
    }
}
