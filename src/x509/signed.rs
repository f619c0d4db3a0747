use crate::ber::*;
use crate::der::{put_in_sequence, DerEncodable, DerEncoder};
use crate::error::{SerializeError, X509Error};
use crate::x509::AlgorithmIdentifier;
use log::debug;

/// The signature envelope shared by certificates and CRLs
///
/// <pre>
/// SignedObject ::= SEQUENCE {
///      tbs                  SEQUENCE { ... },
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// </pre>
///
/// The to-be-signed part is kept as the payload of its SEQUENCE, ready to be
/// handed to a document decoder. Signatures are not verified here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedObject {
    pub tbs_bits: Vec<u8>,
    pub signature_algorithm: AlgorithmIdentifier,
    pub signature: BitString,
}

impl SignedObject {
    pub fn from_der(bytes: &[u8]) -> Result<Self, X509Error> {
        SignedObject::from_source(SliceSource::new(bytes))
    }

    /// Read an envelope from a source
    ///
    /// The source must start with a SEQUENCE, and hold nothing after the
    /// envelope.
    pub fn from_source<S: DataSource>(mut source: S) -> Result<Self, X509Error> {
        if !looks_like_ber(&mut source)? {
            return Err(X509Error::NotBer);
        }
        let mut decoder = BerDecoder::from_source(source);
        let mut outer = decoder.start_cons(BerTag::Sequence, BerClass::Universal)?;
        let tbs_bits = outer
            .start_cons(BerTag::Sequence, BerClass::Universal)?
            .raw_bytes()?;
        let signature_algorithm: AlgorithmIdentifier = outer.decode()?;
        let signature = outer.decode_bit_string()?;
        outer.verify_end()?;
        decoder.verify_end()?;
        debug!(
            "signed object: {} bytes to be signed, algorithm {}",
            tbs_bits.len(),
            signature_algorithm.oid
        );
        Ok(SignedObject {
            tbs_bits,
            signature_algorithm,
            signature,
        })
    }

    /// The encoded to-be-signed SEQUENCE, as covered by the signature
    pub fn tbs_data(&self) -> Result<Vec<u8>, SerializeError> {
        put_in_sequence(&self.tbs_bits)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, SerializeError> {
        DerEncoder::new().encode(self).get_contents()
    }
}

impl DerEncodable for SignedObject {
    fn identifier(&self) -> Identifier {
        Identifier::constructed(BerTag::Sequence)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.start_cons(BerTag::Sequence, BerClass::Universal)
            .raw_bytes(&self.tbs_bits)
            .end_cons()
            .encode(&self.signature_algorithm)
            .encode(&self.signature);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BerError;
    use crate::oid::Oid;
    use hex_literal::hex;

    const SIGNED: &[u8] = &hex!(
        "30 14
           30 03 02 01 01
           30 0a 06 08 2a 86 48 ce 3d 04 03 02
           03 01 00"
    );

    #[test]
    fn test_signed_object() {
        let obj = SignedObject::from_der(SIGNED).unwrap();
        assert_eq!(obj.tbs_bits, hex!("02 01 01").to_vec());
        assert_eq!(
            obj.signature_algorithm,
            AlgorithmIdentifier::new(Oid::from(&[1, 2, 840, 10045, 4, 3, 2]), None)
        );
        assert_eq!(obj.tbs_data(), Ok(hex!("30 03 02 01 01").to_vec()));
        assert_eq!(obj.to_der(), Ok(SIGNED.to_vec()));
    }

    #[test]
    fn test_not_ber() {
        assert_eq!(
            SignedObject::from_der(b"-----BEGIN X509 CRL-----"),
            Err(X509Error::NotBer)
        );
        assert_eq!(
            SignedObject::from_der(&[]),
            Err(X509Error::Ber(BerError::StreamEmpty))
        );
    }

    #[test]
    fn test_trailing_bytes_after_envelope() {
        let mut bytes = SIGNED.to_vec();
        bytes.extend_from_slice(&[0x05, 0x00]);
        assert_eq!(
            SignedObject::from_der(&bytes),
            Err(X509Error::Ber(BerError::TrailingData))
        );
    }
}
