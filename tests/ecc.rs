#[macro_use]
extern crate hex_literal;

use der_codec::ber::*;
use der_codec::ecc::*;
use der_codec::error::*;
use der_codec::oid::Oid;
use der_codec::x509::AlgorithmIdentifier;

// Never asked for a point: every key below carries its own
struct NoArithmetic;

impl EcArithmetic for NoArithmetic {
    fn public_point(&self, _domain: &EcDomainParams, _scalar: &[u8]) -> Result<Vec<u8>, EcKeyError> {
        Err(EcKeyError::Arithmetic("no curve support".to_string()))
    }
}

fn p256_alg() -> AlgorithmIdentifier {
    AlgorithmIdentifier::new(
        Oid::from(ID_EC_PUBLIC_KEY),
        Some(hex!("06 08 2a 86 48 ce 3d 03 01 07").to_vec()),
    )
}

#[test]
fn test_spki_named_curve() {
    let spki = hex!(
        "30 19 30 13 06 07 2a 86 48 ce 3d 02 01 06 08 2a 86 48 ce 3d 03 01 07
         03 02 00 04"
    );
    let key = EcPublicKey::from_spki_der(&spki).expect("decoding failed");
    assert_eq!(key.public_point(), &[0x04]);
    assert_eq!(key.domain_format(), DomainEncoding::Oid);
    assert_eq!(
        key.domain().oid(),
        Some(&Oid::from(&[1, 2, 840, 10045, 3, 1, 7]))
    );
    assert_eq!(key.to_spki_der().unwrap(), spki.to_vec());
}

#[test]
fn test_explicit_domain() {
    // opaque ECParameters stand-in
    let params = hex!("30 03 02 01 01");
    let domain = EcDomainParams::from_explicit(params.to_vec());
    let mut key = EcPublicKey::new(domain, vec![0x04, 0x01, 0x02]);
    assert_eq!(key.domain_format(), DomainEncoding::Explicit);
    assert_eq!(key.der_domain(), Ok(params.to_vec()));

    let alg = key.algorithm_identifier().unwrap();
    let back = EcPublicKey::from_x509(&alg, &key.x509_subject_public_key()).unwrap();
    assert_eq!(back, key);

    key.set_parameter_encoding(DomainEncoding::Oid);
    assert_eq!(key.der_domain(), Err(EcKeyError::MissingDomainOid));
}

#[test]
fn test_pkcs8_with_embedded_point() {
    // ECPrivateKey { 1, scalar, [0] parameters, [1] public key }
    let key_bits = hex!(
        "30 1a 02 01 01 04 02 0b 0c a0 0a 06 08 2a 86 48 ce 3d 03 01 07
         a1 05 03 03 00 04 07"
    );
    let key = EcPrivateKey::from_pkcs8(&p256_alg(), &key_bits, &NoArithmetic)
        .expect("decoding failed");
    assert_eq!(key.private_value(), &[0x0b, 0x0c]);
    assert_eq!(key.public_key().public_point(), &[0x04, 0x07]);
    assert_eq!(key.domain_format(), DomainEncoding::Oid);
    // re-encoded without the optional fields
    assert_eq!(
        key.pkcs8_private_key().unwrap(),
        hex!("30 07 02 01 01 04 02 0b 0c").to_vec()
    );
}

#[test]
fn test_pkcs8_needs_arithmetic() {
    let key_bits = hex!("30 07 02 01 01 04 02 0b 0c");
    assert_eq!(
        EcPrivateKey::from_pkcs8(&p256_alg(), &key_bits, &NoArithmetic),
        Err(EcKeyError::Arithmetic("no curve support".to_string()))
    );
}

#[test]
fn test_pkcs8_bad_version() {
    let key_bits = hex!("30 07 02 01 00 04 02 0b 0c");
    assert_eq!(
        EcPrivateKey::from_pkcs8(&p256_alg(), &key_bits, &NoArithmetic),
        Err(EcKeyError::UnknownVersion(0))
    );
}

#[test]
fn test_pkcs8_trailing_field() {
    let key_bits = hex!("30 09 02 01 01 04 02 0b 0c 05 00");
    assert_eq!(
        EcPrivateKey::from_pkcs8(&p256_alg(), &key_bits, &NoArithmetic),
        Err(EcKeyError::Ber(BerError::TrailingData))
    );
}
