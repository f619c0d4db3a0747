//! X.509 certificate revocation lists
//!
//! <pre>
//! TBSCertList  ::=  SEQUENCE  {
//!      version                 Version OPTIONAL,
//!      signature               AlgorithmIdentifier,
//!      issuer                  Name,
//!      thisUpdate              Time,
//!      nextUpdate              Time OPTIONAL,
//!      revokedCertificates     SEQUENCE OF SEQUENCE  {
//!           userCertificate         CertificateSerialNumber,
//!           revocationDate          Time,
//!           crlEntryExtensions      Extensions OPTIONAL
//!      }  OPTIONAL,
//!      crlExtensions           [0]  EXPLICIT Extensions OPTIONAL
//! }
//! </pre>
//!
//! Decoding is all or nothing: the first error aborts the whole document.
//! Unknown critical extensions are handled according to the
//! `x509/crl/unknown_critical` policy of the [`Context`].

use crate::ber::*;
use crate::config::{Context, UnknownCritical};
use crate::der::{uint_content, DerEncodable, DerEncoder};
use crate::error::{BerError, X509Error};
use crate::x509::{AlgorithmIdentifier, Extension, SignedObject, X509Name, X509Time};
use log::{debug, warn};
use std::convert::TryFrom;

const AUTHORITY_KEY_ID: &str = "X509v3.AuthorityKeyIdentifier";
const CRL_NUMBER: &str = "X509v3.CRLNumber";
const REASON_CODE: &str = "X509v3.ReasonCode";

/// Revocation reason (RFC 5280 section 5.3.1)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CrlCode {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
}

impl TryFrom<u32> for CrlCode {
    type Error = BerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        let code = match value {
            0 => CrlCode::Unspecified,
            1 => CrlCode::KeyCompromise,
            2 => CrlCode::CaCompromise,
            3 => CrlCode::AffiliationChanged,
            4 => CrlCode::Superseded,
            5 => CrlCode::CessationOfOperation,
            6 => CrlCode::CertificateHold,
            8 => CrlCode::RemoveFromCrl,
            9 => CrlCode::PrivilegeWithdrawn,
            10 => CrlCode::AaCompromise,
            _ => return Err(BerError::InvalidValue(BerTag::Enumerated)),
        };
        Ok(code)
    }
}

/// Certificate serial number, as the content octets of its INTEGER
///
/// Serial numbers can be up to 20 octets long, so no native integer type is
/// used.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SerialNumber(Vec<u8>);

impl SerialNumber {
    pub fn from_bytes(content: Vec<u8>) -> Result<Self, BerError> {
        if content.is_empty() {
            return Err(BerError::InvalidLength);
        }
        Ok(SerialNumber(content))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[cfg(feature = "bigint")]
    #[cfg_attr(docsrs, doc(cfg(feature = "bigint")))]
    pub fn to_bigint(&self) -> num_bigint::BigInt {
        num_bigint::BigInt::from_signed_bytes_be(&self.0)
    }
}

impl From<u64> for SerialNumber {
    fn from(v: u64) -> Self {
        SerialNumber(uint_content(&v.to_be_bytes()))
    }
}

impl BerDecodable for SerialNumber {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::Integer);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        SerialNumber::from_bytes(obj.value)
    }
}

impl DerEncodable for SerialNumber {
    fn identifier(&self) -> Identifier {
        Self::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&self.0);
    }
}

/// Apply the policy to an extension the decoder does not understand
fn handle_unknown_extension(extn: &Extension, ctx: &Context) -> Result<(), X509Error> {
    if !extn.critical {
        debug!("skipping non-critical extension {}", extn.oid);
        return Ok(());
    }
    match ctx.unknown_critical_action()? {
        UnknownCritical::Throw => Err(X509Error::UnknownCriticalExtension(extn.oid.clone())),
        UnknownCritical::Ignore => {
            warn!("ignoring unknown critical extension {}", extn.oid);
            Ok(())
        }
    }
}

fn encode_extensions(extensions: &[Extension]) -> Result<Vec<u8>, X509Error> {
    let bytes = DerEncoder::new().encode_list(extensions).get_contents()?;
    Ok(bytes)
}

//------------ CrlEntry ------------------------------------------------------

/// One revoked certificate
///
/// Entry extensions are kept as read; `reason` is filled from the reason
/// code extension when there is one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrlEntry {
    pub serial: SerialNumber,
    pub revocation_time: X509Time,
    pub reason: Option<CrlCode>,
    pub extensions: Vec<Extension>,
}

impl CrlEntry {
    pub fn new(serial: SerialNumber, revocation_time: X509Time) -> Self {
        CrlEntry {
            serial,
            revocation_time,
            reason: None,
            extensions: Vec::new(),
        }
    }

    /// Set the revocation reason, adding the matching extension
    pub fn with_reason(mut self, reason: CrlCode, ctx: &Context) -> Result<Self, X509Error> {
        let oid = ctx.oid(REASON_CODE)?.clone();
        let value = DerEncoder::new()
            .encode(&Enumerated(reason as u32))
            .get_contents()?;
        self.extensions.retain(|e| e.oid != oid);
        self.extensions.push(Extension::new(oid, false, value));
        self.reason = Some(reason);
        Ok(self)
    }

    /// Read one entry of the revokedCertificates list
    pub fn decode_from<S: DataSource>(
        decoder: &mut BerDecoder<S>,
        ctx: &Context,
    ) -> Result<Self, X509Error> {
        let mut entry = decoder.start_cons(BerTag::Sequence, BerClass::Universal)?;
        let serial = entry.decode()?;
        let revocation_time = entry.decode()?;
        let mut crl_entry = CrlEntry::new(serial, revocation_time);
        if entry.more_items()? {
            let mut exts = entry.start_cons(BerTag::Sequence, BerClass::Universal)?;
            while exts.more_items()? {
                let extn: Extension = exts.decode()?;
                crl_entry.handle_entry_extension(&extn, ctx)?;
                crl_entry.extensions.push(extn);
            }
        }
        entry.verify_end()?;
        Ok(crl_entry)
    }

    fn handle_entry_extension(&mut self, extn: &Extension, ctx: &Context) -> Result<(), X509Error> {
        if extn.oid == *ctx.oid(REASON_CODE)? {
            let mut value = extn.value_decoder();
            let code: Enumerated = value.decode()?;
            value.verify_end()?;
            self.reason = Some(CrlCode::try_from(code.0)?);
            return Ok(());
        }
        handle_unknown_extension(extn, ctx)
    }
}

impl DerEncodable for CrlEntry {
    fn identifier(&self) -> Identifier {
        Identifier::constructed(BerTag::Sequence)
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.encode(&self.serial).encode(&self.revocation_time);
        if !self.extensions.is_empty() {
            enc.encode_list(&self.extensions);
        }
    }
}

//------------ X509Crl -------------------------------------------------------

/// A decoded revocation list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct X509Crl {
    /// Encoded version: 0 for v1, 1 for v2
    pub version: u32,
    pub signature_algorithm: AlgorithmIdentifier,
    pub issuer: X509Name,
    pub this_update: X509Time,
    pub next_update: Option<X509Time>,
    pub revoked: Vec<CrlEntry>,
    /// Key identifier from the authority key identifier extension
    pub issuer_key_id: Option<Vec<u8>>,
    pub crl_number: Option<u32>,
}

/// Optional version INTEGER of the TBS region, v1 when absent
///
/// Any value other than 0 or 1 is an unknown version, including negative and
/// oversized encodings.
fn decode_version<S: DataSource>(tbs: &mut BerDecoder<S>) -> Result<u32, X509Error> {
    let obj = match tbs.next_object()? {
        Some(obj) if obj.identifier() == Identifier::primitive(BerTag::Integer) => obj,
        Some(obj) => {
            tbs.push_back(obj);
            return Ok(0);
        }
        None => return Ok(0),
    };
    match integer_value(&obj.value)? {
        0 => Ok(0),
        1 => Ok(1),
        v => Err(X509Error::UnknownVersion(v.saturating_add(1))),
    }
}

/// Two's complement INTEGER content, saturated to the `i64` range
fn integer_value(content: &[u8]) -> Result<i64, BerError> {
    let negative = match content.first() {
        Some(first) => first & 0x80 != 0,
        None => return Err(BerError::InvalidLength),
    };
    if content.len() > 8 {
        return Ok(if negative { i64::MIN } else { i64::MAX });
    }
    let init: i64 = if negative { -1 } else { 0 };
    Ok(content
        .iter()
        .fold(init, |acc, &b| (acc << 8) | i64::from(b)))
}

/// Take the object out of `next` if it has the given identifier
fn take_if(next: &mut Option<BerObject>, id: Identifier) -> Option<BerObject> {
    if next.as_ref().map(BerObject::identifier) == Some(id) {
        next.take()
    } else {
        None
    }
}

impl X509Crl {
    /// An empty v1 list
    pub fn new(
        signature_algorithm: AlgorithmIdentifier,
        issuer: X509Name,
        this_update: X509Time,
    ) -> Self {
        X509Crl {
            version: 0,
            signature_algorithm,
            issuer,
            this_update,
            next_update: None,
            revoked: Vec::new(),
            issuer_key_id: None,
            crl_number: None,
        }
    }

    /// Decode a complete, DER-encoded CRL
    pub fn from_der(bytes: &[u8], ctx: &Context) -> Result<Self, X509Error> {
        X509Crl::from_source(SliceSource::new(bytes), ctx)
    }

    /// Decode a complete CRL from a byte source
    pub fn from_source<S: DataSource>(source: S, ctx: &Context) -> Result<Self, X509Error> {
        let signed = SignedObject::from_source(source)?;
        X509Crl::from_signed(&signed, ctx)
    }

    pub fn from_signed(signed: &SignedObject, ctx: &Context) -> Result<Self, X509Error> {
        X509Crl::decode_tbs(&signed.tbs_bits, &signed.signature_algorithm, ctx)
    }

    /// Decode the to-be-signed region of a CRL
    ///
    /// `tbs_bits` is the payload of the TBSCertList SEQUENCE, and
    /// `outer_algorithm` the signature algorithm read from the envelope.
    pub fn decode_tbs(
        tbs_bits: &[u8],
        outer_algorithm: &AlgorithmIdentifier,
        ctx: &Context,
    ) -> Result<Self, X509Error> {
        let mut tbs = BerDecoder::new(tbs_bits);

        let version = decode_version(&mut tbs)?;

        let signature_algorithm: AlgorithmIdentifier = tbs.decode()?;
        if signature_algorithm != *outer_algorithm {
            return Err(X509Error::AlgorithmMismatch);
        }

        let issuer = tbs.decode()?;
        let this_update = tbs.decode()?;
        let has_next_update = match tbs.peek_object()? {
            Some(obj) => X509Time::accepts(&obj.identifier()),
            None => false,
        };
        let next_update = if has_next_update {
            Some(tbs.decode()?)
        } else {
            None
        };

        let mut crl = X509Crl {
            version,
            signature_algorithm,
            issuer,
            this_update,
            next_update,
            revoked: Vec::new(),
            issuer_key_id: None,
            crl_number: None,
        };

        let mut next = tbs.next_object()?;

        if let Some(obj) = take_if(&mut next, Identifier::constructed(BerTag::Sequence)) {
            let mut cert_list = obj.into_decoder();
            while cert_list.more_items()? {
                crl.revoked.push(CrlEntry::decode_from(&mut cert_list, ctx)?);
            }
            next = tbs.next_object()?;
        }

        if let Some(obj) = take_if(&mut next, Identifier::context(0, true)) {
            let mut crl_options = obj.into_decoder();
            let mut sequence = crl_options.start_cons(BerTag::Sequence, BerClass::Universal)?;
            while sequence.more_items()? {
                let extn: Extension = sequence.decode()?;
                crl.handle_crl_extension(&extn, ctx)?;
            }
            crl_options.verify_end()?;
            next = tbs.next_object()?;
        }

        if let Some(obj) = next {
            return Err(X509Error::UnknownTrailingTag(obj.identifier()));
        }
        tbs.verify_end()?;

        debug!(
            "decoded CRL v{} from {}: {} revoked entries",
            crl.version + 1,
            crl.issuer,
            crl.revoked.len()
        );
        Ok(crl)
    }

    fn handle_crl_extension(&mut self, extn: &Extension, ctx: &Context) -> Result<(), X509Error> {
        let mut value = extn.value_decoder();

        if extn.oid == *ctx.oid(AUTHORITY_KEY_ID)? {
            let mut key_id = value.start_cons(BerTag::Sequence, BerClass::Universal)?;
            self.issuer_key_id = key_id.decode_optional_string(BerTag::OctetString, 0)?;
        } else if extn.oid == *ctx.oid(CRL_NUMBER)? {
            self.crl_number = Some(value.decode_u32()?);
        } else {
            return handle_unknown_extension(extn, ctx);
        }

        value.verify_end()?;
        Ok(())
    }

    /// CRL level extensions carrying the fields of this list
    pub fn extensions(&self, ctx: &Context) -> Result<Vec<Extension>, X509Error> {
        let mut extensions = Vec::new();
        if let Some(key_id) = &self.issuer_key_id {
            let value = DerEncoder::new()
                .start_cons(BerTag::Sequence, BerClass::Universal)
                .encode_with_tag(
                    &OctetString(key_id.clone()),
                    BerTag(0),
                    BerClass::ContextSpecific,
                )
                .end_cons()
                .get_contents()?;
            extensions.push(Extension::new(ctx.oid(AUTHORITY_KEY_ID)?.clone(), false, value));
        }
        if let Some(number) = self.crl_number {
            let value = DerEncoder::new().encode(&number).get_contents()?;
            extensions.push(Extension::new(ctx.oid(CRL_NUMBER)?.clone(), false, value));
        }
        Ok(extensions)
    }

    /// Payload of the TBSCertList SEQUENCE, as accepted by `decode_tbs`
    pub fn tbs_bits(&self, ctx: &Context) -> Result<Vec<u8>, X509Error> {
        let mut enc = DerEncoder::new();
        enc.encode_optional(&self.version, &0)
            .encode(&self.signature_algorithm)
            .encode(&self.issuer)
            .encode(&self.this_update);
        if let Some(next_update) = &self.next_update {
            enc.encode(next_update);
        }
        if !self.revoked.is_empty() {
            enc.encode_list(&self.revoked);
        }
        let extensions = self.extensions(ctx)?;
        if !extensions.is_empty() {
            let encoded = encode_extensions(&extensions)?;
            enc.start_cons(BerTag(0), BerClass::ContextSpecific)
                .raw_bytes(&encoded)
                .end_cons();
        }
        Ok(enc.get_contents()?)
    }

    /// The encoded TBSCertList SEQUENCE
    pub fn tbs_der(&self, ctx: &Context) -> Result<Vec<u8>, X509Error> {
        let bits = self.tbs_bits(ctx)?;
        Ok(crate::der::put_in_sequence(&bits)?)
    }

    /// Wrap this list in a signature envelope
    pub fn to_signed(&self, signature: BitString, ctx: &Context) -> Result<SignedObject, X509Error> {
        Ok(SignedObject {
            tbs_bits: self.tbs_bits(ctx)?,
            signature_algorithm: self.signature_algorithm.clone(),
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Oid;

    fn sample_crl() -> X509Crl {
        let mut issuer = X509Name::new();
        issuer.push(
            Oid::from(&[2, 5, 4, 3]),
            BerObject::from_primitive(BerTag::PrintableString, b"Test CA".to_vec()),
        );
        X509Crl::new(
            AlgorithmIdentifier::new(Oid::from(&[1, 2, 840, 10045, 4, 3, 2]), None),
            issuer,
            X509Time::new(2010, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_version_mapping() {
        let ctx = Context::default();
        let mut crl = sample_crl();
        crl.version = 2;
        let bits = crl.tbs_bits(&ctx).unwrap();
        assert_eq!(
            X509Crl::decode_tbs(&bits, &crl.signature_algorithm, &ctx),
            Err(X509Error::UnknownVersion(3))
        );
    }

    #[test]
    fn test_integer_value() {
        assert_eq!(integer_value(&[0x01]), Ok(1));
        assert_eq!(integer_value(&[0xff]), Ok(-1));
        assert_eq!(integer_value(&[0x00, 0x80]), Ok(128));
        assert_eq!(integer_value(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0]), Ok(i64::MAX));
        assert_eq!(integer_value(&[0x80, 0, 0, 0, 0, 0, 0, 0, 0]), Ok(i64::MIN));
        assert_eq!(integer_value(&[]), Err(BerError::InvalidLength));
    }

    #[test]
    fn test_entry_reason() {
        let ctx = Context::default();
        let mut crl = sample_crl();
        crl.version = 1;
        let entry = CrlEntry::new(SerialNumber::from(0x1234), X509Time::new(2010, 1, 2, 3, 4, 5).unwrap())
            .with_reason(CrlCode::KeyCompromise, &ctx)
            .unwrap();
        crl.revoked.push(entry);
        let bits = crl.tbs_bits(&ctx).unwrap();
        let back = X509Crl::decode_tbs(&bits, &crl.signature_algorithm, &ctx).unwrap();
        assert_eq!(back.revoked[0].reason, Some(CrlCode::KeyCompromise));
        assert_eq!(back, crl);
    }

    #[test]
    fn test_bad_reason_code() {
        assert_eq!(CrlCode::try_from(7), Err(BerError::InvalidValue(BerTag::Enumerated)));
        assert_eq!(CrlCode::try_from(10), Ok(CrlCode::AaCompromise));
    }

    #[test]
    fn test_serial_number() {
        assert_eq!(SerialNumber::from(0x80).as_bytes(), &[0x00, 0x80]);
        assert_eq!(SerialNumber::from_bytes(vec![]), Err(BerError::InvalidLength));
    }

    #[cfg(feature = "bigint")]
    #[test]
    fn test_serial_number_bigint() {
        use num_bigint::BigInt;
        assert_eq!(SerialNumber::from(0x1234).to_bigint(), BigInt::from(0x1234));
    }
}
