use crate::ber::*;
use crate::der::{DerEncodable, DerEncoder};
use crate::error::BerError;
use crate::oid::Oid;

/// X.509 extension
///
/// <pre>
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING  }
/// </pre>
///
/// The value is kept encoded; interpreting it is up to the document decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub oid: Oid,
    pub critical: bool,
    pub value: Vec<u8>,
}

impl Extension {
    pub fn new(oid: Oid, critical: bool, value: Vec<u8>) -> Self {
        Extension {
            oid,
            critical,
            value,
        }
    }

    /// Decoder over the encoded value
    pub fn value_decoder(&self) -> BerDecoder<SliceSource<'_>> {
        BerDecoder::new(&self.value)
    }
}

impl BerDecodable for Extension {
    const IDENTIFIER: Identifier = Identifier::constructed(BerTag::Sequence);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        let mut seq = obj.into_decoder();
        let oid = seq.decode_oid()?;
        let critical = seq.decode_optional(BerTag::Boolean, BerClass::Universal, false)?;
        let value = seq.decode_octet_string()?;
        seq.verify_end()?;
        Ok(Extension {
            oid,
            critical,
            value,
        })
    }
}

impl DerEncodable for Extension {
    fn identifier(&self) -> Identifier {
        Self::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.encode(&self.oid)
            .encode_optional(&self.critical, &false)
            .encode(&OctetString(self.value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_extension_critical_default() {
        // CRL number 42, critical flag absent
        let bytes = hex!("30 08 06 03 55 1d 14 04 01 2a");
        let ext: Extension = BerDecoder::new(&bytes).decode().unwrap();
        assert_eq!(ext, Extension::new(Oid::from(&[2, 5, 29, 20]), false, vec![0x2a]));
        let out = DerEncoder::new().encode(&ext).get_contents().unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_extension_critical() {
        let bytes = hex!("30 0b 06 03 55 1d 14 01 01 ff 04 01 2a");
        let ext: Extension = BerDecoder::new(&bytes).decode().unwrap();
        assert!(ext.critical);
        let out = DerEncoder::new().encode(&ext).get_contents().unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_extension_trailing_field() {
        let bytes = hex!("30 0a 06 03 55 1d 14 04 01 2a 05 00");
        assert_eq!(
            BerDecoder::new(&bytes).decode::<Extension>(),
            Err(BerError::TrailingData)
        );
    }
}
