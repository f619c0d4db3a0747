//! Elliptic curve key encoding
//!
//! Public and private EC keys share their domain parameters. Instead of a
//! common base type, the shared behavior is split into two capabilities:
//! [`EcDomain`] for keys that have domain parameters, and [`EcPrivateScalar`]
//! for keys that hold a private scalar. [`EcPrivateKey`] composes an
//! [`EcPublicKey`] with its scalar and implements both.
//!
//! Only the encodings live here. Curve arithmetic is supplied by the caller
//! through [`EcArithmetic`]; points and scalars are kept as octet strings.

use crate::ber::*;
use crate::der::DerEncoder;
use crate::error::{BerError, EcKeyError};
use crate::oid::Oid;
use crate::x509::AlgorithmIdentifier;
use log::debug;

/// id-ecPublicKey (RFC 5480)
pub const ID_EC_PUBLIC_KEY: &[u64] = &[1, 2, 840, 10045, 2, 1];

/// Version of the ECPrivateKey structure (RFC 5915)
const EC_PRIVATE_KEY_VERSION: u32 = 1;

/// How domain parameters are written into a key encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DomainEncoding {
    /// Full `ECParameters` structure
    Explicit,
    /// Named curve
    Oid,
    /// `NULL`: parameters inherited from the issuing CA
    ImplicitCa,
}

/// Curve domain parameters, as far as encoding is concerned
///
/// A domain can be known by name, by its explicit encoding, or both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcDomainParams {
    oid: Option<Oid>,
    explicit: Option<Vec<u8>>,
}

impl EcDomainParams {
    pub fn from_oid(oid: Oid) -> Self {
        EcDomainParams {
            oid: Some(oid),
            explicit: None,
        }
    }

    /// Domain from an encoded `ECParameters` SEQUENCE, kept opaque
    pub fn from_explicit(der: Vec<u8>) -> Self {
        EcDomainParams {
            oid: None,
            explicit: Some(der),
        }
    }

    pub fn with_oid(mut self, oid: Oid) -> Self {
        self.oid = Some(oid);
        self
    }

    pub fn oid(&self) -> Option<&Oid> {
        self.oid.as_ref()
    }

    pub fn explicit(&self) -> Option<&[u8]> {
        self.explicit.as_deref()
    }

    /// The encoding format to use by default: named when a name is known
    pub fn preferred_encoding(&self) -> DomainEncoding {
        if self.oid.is_some() {
            DomainEncoding::Oid
        } else {
            DomainEncoding::Explicit
        }
    }

    pub fn der_encode(&self, format: DomainEncoding) -> Result<Vec<u8>, EcKeyError> {
        match format {
            DomainEncoding::Explicit => self
                .explicit
                .clone()
                .ok_or(EcKeyError::MissingExplicitDomain),
            DomainEncoding::Oid => {
                let oid = self.oid.as_ref().ok_or(EcKeyError::MissingDomainOid)?;
                Ok(DerEncoder::new().encode(oid).get_contents()?)
            }
            DomainEncoding::ImplicitCa => Ok(DerEncoder::new().encode(&Null).get_contents()?),
        }
    }

    /// Decode an encoded domain, returning the format it was found in
    pub fn from_der(bytes: &[u8]) -> Result<(Self, DomainEncoding), EcKeyError> {
        let mut decoder = BerDecoder::new(bytes);
        let obj = decoder
            .next_object()?
            .ok_or(BerError::MissingObject(Identifier::primitive(BerTag::Oid)))?;
        let id = obj.identifier();
        let decoded = if id == Identifier::primitive(BerTag::Oid) {
            let oid = Oid::from_ber_object(obj)?;
            (EcDomainParams::from_oid(oid), DomainEncoding::Oid)
        } else if id == Identifier::constructed(BerTag::Sequence) {
            let der = obj.to_vec()?;
            (EcDomainParams::from_explicit(der), DomainEncoding::Explicit)
        } else if id == Identifier::primitive(BerTag::Null) {
            return Err(EcKeyError::ImplicitCaUnsupported);
        } else {
            return Err(BerError::UnexpectedTag {
                expected: Identifier::primitive(BerTag::Oid),
                actual: id,
            }
            .into());
        };
        decoder.verify_end()?;
        Ok(decoded)
    }
}

/// Point arithmetic collaborator
pub trait EcArithmetic {
    /// Compute the encoded public point for a private scalar
    fn public_point(&self, domain: &EcDomainParams, scalar: &[u8]) -> Result<Vec<u8>, EcKeyError>;
}

/// A key that has domain parameters
pub trait EcDomain {
    fn domain(&self) -> &EcDomainParams;

    fn domain_format(&self) -> DomainEncoding;

    /// The domain, encoded in this key's format
    fn der_domain(&self) -> Result<Vec<u8>, EcKeyError> {
        self.domain().der_encode(self.domain_format())
    }
}

/// A key that holds a private scalar
pub trait EcPrivateScalar {
    /// Big-endian scalar
    fn private_value(&self) -> &[u8];
}

//------------ EcPublicKey ---------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcPublicKey {
    domain: EcDomainParams,
    public_point: Vec<u8>,
    domain_encoding: DomainEncoding,
}

impl EcPublicKey {
    pub fn new(domain: EcDomainParams, public_point: Vec<u8>) -> Self {
        let domain_encoding = domain.preferred_encoding();
        EcPublicKey {
            domain,
            public_point,
            domain_encoding,
        }
    }

    /// Encoded public point
    pub fn public_point(&self) -> &[u8] {
        &self.public_point
    }

    pub fn set_parameter_encoding(&mut self, format: DomainEncoding) {
        self.domain_encoding = format;
    }

    pub fn algorithm_identifier(&self) -> Result<AlgorithmIdentifier, EcKeyError> {
        Ok(AlgorithmIdentifier::new(
            Oid::from(ID_EC_PUBLIC_KEY),
            Some(self.der_domain()?),
        ))
    }

    /// Content of the subjectPublicKey BIT STRING
    pub fn x509_subject_public_key(&self) -> Vec<u8> {
        self.public_point.clone()
    }

    /// Encoded SubjectPublicKeyInfo
    pub fn to_spki_der(&self) -> Result<Vec<u8>, EcKeyError> {
        let alg = self.algorithm_identifier()?;
        let bytes = DerEncoder::new()
            .start_cons(BerTag::Sequence, BerClass::Universal)
            .encode(&alg)
            .encode(&BitString::from_bytes(self.x509_subject_public_key()))
            .end_cons()
            .get_contents()?;
        Ok(bytes)
    }

    pub fn from_x509(alg_id: &AlgorithmIdentifier, key_bits: &[u8]) -> Result<Self, EcKeyError> {
        let (domain, format) = domain_of(alg_id)?;
        if key_bits.is_empty() {
            return Err(BerError::InvalidValue(BerTag::BitString).into());
        }
        Ok(EcPublicKey {
            domain,
            public_point: key_bits.to_vec(),
            domain_encoding: format,
        })
    }

    /// Decode an encoded SubjectPublicKeyInfo
    pub fn from_spki_der(bytes: &[u8]) -> Result<Self, EcKeyError> {
        let mut decoder = BerDecoder::new(bytes);
        let mut spki = decoder.start_cons(BerTag::Sequence, BerClass::Universal)?;
        let alg_id: AlgorithmIdentifier = spki.decode()?;
        let key_bits = spki.decode_bit_string()?;
        spki.verify_end()?;
        decoder.verify_end()?;
        if key_bits.unused_bits != 0 {
            return Err(BerError::InvalidValue(BerTag::BitString).into());
        }
        EcPublicKey::from_x509(&alg_id, &key_bits.data)
    }
}

impl EcDomain for EcPublicKey {
    fn domain(&self) -> &EcDomainParams {
        &self.domain
    }

    fn domain_format(&self) -> DomainEncoding {
        self.domain_encoding
    }
}

fn domain_of(alg_id: &AlgorithmIdentifier) -> Result<(EcDomainParams, DomainEncoding), EcKeyError> {
    if alg_id.oid != Oid::from(ID_EC_PUBLIC_KEY) {
        return Err(EcKeyError::WrongAlgorithm(alg_id.oid.clone()));
    }
    let params = alg_id
        .parameters
        .as_deref()
        .ok_or(EcKeyError::MissingDomainOid)?;
    EcDomainParams::from_der(params)
}

//------------ EcPrivateKey --------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcPrivateKey {
    public: EcPublicKey,
    scalar: Vec<u8>,
}

impl EcPrivateKey {
    /// Build a key from its scalar, deriving the public point
    pub fn new(
        domain: EcDomainParams,
        scalar: Vec<u8>,
        arith: &dyn EcArithmetic,
    ) -> Result<Self, EcKeyError> {
        let point = arith.public_point(&domain, &scalar)?;
        Ok(EcPrivateKey {
            public: EcPublicKey::new(domain, point),
            scalar,
        })
    }

    pub fn public_key(&self) -> &EcPublicKey {
        &self.public
    }

    pub fn set_parameter_encoding(&mut self, format: DomainEncoding) {
        self.public.set_parameter_encoding(format);
    }

    pub fn algorithm_identifier(&self) -> Result<AlgorithmIdentifier, EcKeyError> {
        self.public.algorithm_identifier()
    }

    /// ECPrivateKey structure, as carried in a PKCS#8 privateKey OCTET STRING
    pub fn pkcs8_private_key(&self) -> Result<Vec<u8>, EcKeyError> {
        let bytes = DerEncoder::new()
            .start_cons(BerTag::Sequence, BerClass::Universal)
            .encode(&EC_PRIVATE_KEY_VERSION)
            .encode(&OctetString(self.scalar.clone()))
            .end_cons()
            .get_contents()?;
        Ok(bytes)
    }

    /// Decode an ECPrivateKey structure
    ///
    /// The domain comes from `alg_id`. The public point is taken from the
    /// optional `[1]` field when present, and derived from the scalar
    /// otherwise.
    pub fn from_pkcs8(
        alg_id: &AlgorithmIdentifier,
        key_bits: &[u8],
        arith: &dyn EcArithmetic,
    ) -> Result<Self, EcKeyError> {
        let (domain, format) = domain_of(alg_id)?;

        let mut decoder = BerDecoder::new(key_bits);
        let mut key = decoder.start_cons(BerTag::Sequence, BerClass::Universal)?;
        let version = key.decode_u32()?;
        if version != EC_PRIVATE_KEY_VERSION {
            return Err(EcKeyError::UnknownVersion(version));
        }
        let scalar = key.decode_octet_string()?;
        // parameters are already known from the algorithm identifier
        if let Some(obj) = key.next_object()? {
            if obj.identifier() != Identifier::context(0, true) {
                key.push_back(obj);
            }
        }
        let embedded: BitString = key.decode_optional_explicit(1, BitString::default())?;
        key.verify_end()?;
        decoder.verify_end()?;

        let point = if embedded.data.is_empty() {
            arith.public_point(&domain, &scalar)?
        } else {
            debug!("EC private key carries its public point");
            embedded.data
        };
        let mut public = EcPublicKey::new(domain, point);
        public.set_parameter_encoding(format);
        Ok(EcPrivateKey { public, scalar })
    }
}

impl EcDomain for EcPrivateKey {
    fn domain(&self) -> &EcDomainParams {
        self.public.domain()
    }

    fn domain_format(&self) -> DomainEncoding {
        self.public.domain_format()
    }
}

impl EcPrivateScalar for EcPrivateKey {
    fn private_value(&self) -> &[u8] {
        &self.scalar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    struct FixedPoint;

    impl EcArithmetic for FixedPoint {
        fn public_point(&self, _domain: &EcDomainParams, scalar: &[u8]) -> Result<Vec<u8>, EcKeyError> {
            let mut point = vec![0x04];
            point.extend_from_slice(scalar);
            point.extend_from_slice(scalar);
            Ok(point)
        }
    }

    fn p256() -> EcDomainParams {
        EcDomainParams::from_oid(Oid::from(&[1, 2, 840, 10045, 3, 1, 7]))
    }

    #[test]
    fn test_domain_encodings() {
        let domain = p256();
        assert_eq!(
            domain.der_encode(DomainEncoding::Oid).unwrap(),
            hex!("06 08 2a 86 48 ce 3d 03 01 07").to_vec()
        );
        assert_eq!(
            domain.der_encode(DomainEncoding::ImplicitCa).unwrap(),
            hex!("05 00").to_vec()
        );
        assert_eq!(
            domain.der_encode(DomainEncoding::Explicit),
            Err(EcKeyError::MissingExplicitDomain)
        );
    }

    #[test]
    fn test_public_key_spki() {
        let key = EcPublicKey::new(p256(), hex!("04 01 02 03 04").to_vec());
        let spki = key.to_spki_der().unwrap();
        let back = EcPublicKey::from_spki_der(&spki).unwrap();
        assert_eq!(back, key);
        assert_eq!(back.domain_format(), DomainEncoding::Oid);
    }

    #[test]
    fn test_private_key_derives_point() {
        let key = EcPrivateKey::new(p256(), vec![0x2a], &FixedPoint).unwrap();
        assert_eq!(key.public_key().public_point(), &[0x04, 0x2a, 0x2a]);
        assert_eq!(
            key.pkcs8_private_key().unwrap(),
            hex!("30 06 02 01 01 04 01 2a").to_vec()
        );
        let alg = key.algorithm_identifier().unwrap();
        let back = EcPrivateKey::from_pkcs8(&alg, &key.pkcs8_private_key().unwrap(), &FixedPoint)
            .unwrap();
        assert_eq!(back, key);
        assert_eq!(back.private_value(), &[0x2a]);
    }

    #[test]
    fn test_wrong_algorithm() {
        let alg = AlgorithmIdentifier::with_null_parameters(Oid::from(&[1, 2, 840, 113549, 1, 1, 1]));
        assert!(matches!(
            EcPublicKey::from_x509(&alg, &[0x04]),
            Err(EcKeyError::WrongAlgorithm(_))
        ));
    }

    #[test]
    fn test_implicit_ca_rejected() {
        let alg = AlgorithmIdentifier::with_null_parameters(Oid::from(ID_EC_PUBLIC_KEY));
        assert_eq!(
            EcPublicKey::from_x509(&alg, &[0x04]),
            Err(EcKeyError::ImplicitCaUnsupported)
        );
    }
}
