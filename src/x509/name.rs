use crate::ber::*;
use crate::der::{DerEncodable, DerEncoder};
use crate::error::BerError;
use crate::oid::Oid;
use std::fmt;

/// One attribute of a distinguished name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub oid: Oid,
    /// The value, as the object it was encoded with (any string type)
    pub value: BerObject,
}

impl AttributeTypeAndValue {
    pub fn new(oid: Oid, value: BerObject) -> Self {
        AttributeTypeAndValue { oid, value }
    }
}

impl BerDecodable for AttributeTypeAndValue {
    const IDENTIFIER: Identifier = Identifier::constructed(BerTag::Sequence);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        let mut seq = obj.into_decoder();
        let oid = seq.decode_oid()?;
        let value = seq
            .next_object()?
            .ok_or(BerError::InvalidValue(BerTag::Sequence))?;
        seq.verify_end()?;
        Ok(AttributeTypeAndValue { oid, value })
    }
}

impl DerEncodable for AttributeTypeAndValue {
    fn identifier(&self) -> Identifier {
        Self::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.encode(&self.oid).encode(&self.value);
    }
}

/// Relative distinguished name: a set of attributes
///
/// Attributes are held in DER SET OF order (sorted by their encoding), the
/// order the encoder writes them in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    set: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new(mut set: Vec<AttributeTypeAndValue>) -> Self {
        set.sort_by_cached_key(|attr| {
            DerEncoder::new()
                .encode(attr)
                .get_contents()
                .unwrap_or_default()
        });
        RelativeDistinguishedName { set }
    }

    pub fn attributes(&self) -> &[AttributeTypeAndValue] {
        &self.set
    }
}

impl BerDecodable for RelativeDistinguishedName {
    const IDENTIFIER: Identifier = Identifier::constructed(BerTag::Set);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        let mut set_dec = obj.into_decoder();
        let mut set = Vec::new();
        while set_dec.more_items()? {
            set.push(set_dec.decode()?);
        }
        if set.is_empty() {
            return Err(BerError::InvalidValue(BerTag::Set));
        }
        Ok(RelativeDistinguishedName::new(set))
    }
}

impl DerEncodable for RelativeDistinguishedName {
    fn identifier(&self) -> Identifier {
        Self::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        for attr in &self.set {
            enc.encode(attr);
        }
    }
}

/// X.500 distinguished name
///
/// RDNs are kept in encounter order, with their values as originally
/// encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct X509Name {
    pub rdn_seq: Vec<RelativeDistinguishedName>,
}

impl X509Name {
    pub fn new() -> Self {
        X509Name::default()
    }

    /// Append a single-valued RDN
    pub fn push(&mut self, oid: Oid, value: BerObject) -> &mut Self {
        self.rdn_seq
            .push(RelativeDistinguishedName::new(vec![AttributeTypeAndValue::new(
                oid, value,
            )]));
        self
    }

    /// All attributes, flattened
    pub fn iter(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.rdn_seq.iter().flat_map(|rdn| rdn.set.iter())
    }

    /// First value for the given attribute type
    pub fn get(&self, oid: &Oid) -> Option<&BerObject> {
        self.iter().find(|attr| &attr.oid == oid).map(|attr| &attr.value)
    }

    pub fn is_empty(&self) -> bool {
        self.rdn_seq.is_empty()
    }
}

impl BerDecodable for X509Name {
    const IDENTIFIER: Identifier = Identifier::constructed(BerTag::Sequence);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        let mut seq = obj.into_decoder();
        let mut rdn_seq = Vec::new();
        while seq.more_items()? {
            rdn_seq.push(seq.decode()?);
        }
        Ok(X509Name { rdn_seq })
    }
}

impl DerEncodable for X509Name {
    fn identifier(&self) -> Identifier {
        Self::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        for rdn in &self.rdn_seq {
            enc.encode(rdn);
        }
    }
}

impl fmt::Display for X509Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for attr in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}={}", attr.oid, attr.value.as_string_lossy())?;
        }
        Ok(())
    }
}
