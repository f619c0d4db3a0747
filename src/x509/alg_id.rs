use crate::ber::*;
use crate::der::{DerEncodable, DerEncoder};
use crate::error::BerError;
use crate::oid::Oid;

/// AlgorithmIdentifier
///
/// <pre>
/// AlgorithmIdentifier  ::=  SEQUENCE  {
///      algorithm               OBJECT IDENTIFIER,
///      parameters              ANY DEFINED BY algorithm OPTIONAL  }
/// </pre>
///
/// The parameters are kept as the raw encoding following the OID, so two
/// identifiers compare equal only if they were encoded identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub oid: Oid,
    pub parameters: Option<Vec<u8>>,
}

impl AlgorithmIdentifier {
    pub fn new(oid: Oid, parameters: Option<Vec<u8>>) -> Self {
        AlgorithmIdentifier { oid, parameters }
    }

    /// Identifier with explicit NULL parameters, as used by RSA signatures
    pub fn with_null_parameters(oid: Oid) -> Self {
        AlgorithmIdentifier::new(oid, Some(vec![0x05, 0x00]))
    }
}

impl BerDecodable for AlgorithmIdentifier {
    const IDENTIFIER: Identifier = Identifier::constructed(BerTag::Sequence);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        let mut seq = obj.into_decoder();
        let oid = seq.decode_oid()?;
        let parameters = seq.raw_bytes()?;
        let parameters = if parameters.is_empty() {
            None
        } else {
            Some(parameters)
        };
        Ok(AlgorithmIdentifier { oid, parameters })
    }
}

impl DerEncodable for AlgorithmIdentifier {
    fn identifier(&self) -> Identifier {
        Self::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.encode(&self.oid);
        if let Some(params) = &self.parameters {
            enc.raw_bytes(params);
        }
    }
}
