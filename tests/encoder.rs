#[macro_use]
extern crate pretty_assertions;

#[macro_use]
extern crate hex_literal;

use der_codec::ber::*;
use der_codec::der::*;
use der_codec::oid::Oid;
use der_codec::x509::*;
use test_case::test_case;

#[test_case(0, &hex!("02 01 00") ; "zero")]
#[test_case(127, &hex!("02 01 7f") ; "largest single octet")]
#[test_case(128, &hex!("02 02 00 80") ; "leading zero")]
#[test_case(0xffff_ffff, &hex!("02 05 00 ff ff ff ff") ; "max")]
fn test_encode_u32(value: u32, expected: &[u8]) {
    let bytes = DerEncoder::new().encode(&value).get_contents().unwrap();
    assert_eq!(bytes, expected);
    assert_eq!(BerDecoder::new(&bytes).decode_u32(), Ok(value));
}

#[test_case(0, &hex!("04 00") ; "empty")]
#[test_case(127, &hex!("04 7f") ; "short form limit")]
#[test_case(128, &hex!("04 81 80") ; "one length octet")]
#[test_case(256, &hex!("04 82 01 00") ; "two length octets")]
fn test_length_forms(len: usize, header: &[u8]) {
    let bytes = DerEncoder::new()
        .encode(&OctetString(vec![0x55; len]))
        .get_contents()
        .unwrap();
    assert_eq!(&bytes[..header.len()], header);
    assert_eq!(bytes.len(), header.len() + len);
}

#[test]
fn test_structure_roundtrip() {
    let oid = Oid::from(&[1, 2, 840, 113549, 1, 1, 11]);
    let bytes = DerEncoder::new()
        .start_cons(BerTag::Sequence, BerClass::Universal)
        .encode(&oid)
        .start_cons(BerTag(1), BerClass::ContextSpecific)
        .encode(&OctetString(b"nested".to_vec()))
        .end_cons()
        .encode_with_tag(&42u32, BerTag(2), BerClass::ContextSpecific)
        .end_cons()
        .get_contents()
        .unwrap();

    let mut decoder = BerDecoder::new(&bytes);
    let mut seq = decoder
        .start_cons(BerTag::Sequence, BerClass::Universal)
        .unwrap();
    assert_eq!(seq.decode_oid(), Ok(oid));
    let mut wrapper = seq.start_cons(BerTag(1), BerClass::ContextSpecific).unwrap();
    assert_eq!(wrapper.decode_octet_string(), Ok(b"nested".to_vec()));
    assert_eq!(wrapper.verify_end(), Ok(()));
    let v: u32 = seq
        .decode_with_tag(BerTag(2), BerClass::ContextSpecific)
        .unwrap();
    assert_eq!(v, 42);
    assert_eq!(seq.verify_end(), Ok(()));
    assert_eq!(decoder.verify_end(), Ok(()));
}

#[test]
fn test_raw_bytes_in_frame() {
    // wrap pre-encoded content in a SEQUENCE
    let inner = DerEncoder::new().encode(&Null).encode(&true).get_contents().unwrap();
    let wrapped = DerEncoder::new()
        .start_cons(BerTag::Sequence, BerClass::Universal)
        .raw_bytes(&inner)
        .end_cons()
        .get_contents()
        .unwrap();
    assert_eq!(wrapped, hex!("30 05 05 00 01 01 ff"));
    assert_eq!(put_in_sequence(&inner), Ok(wrapped));
}

#[test]
fn test_add_object() {
    let bytes = DerEncoder::new()
        .add_object(BerTag(0x1f), BerClass::Private, &[0x01])
        .get_contents()
        .unwrap();
    assert_eq!(bytes, hex!("df 1f 01 01"));
    let obj = BerDecoder::new(&bytes).next_object().unwrap().unwrap();
    assert_eq!(obj.class, BerClass::Private);
    assert_eq!(obj.tag, BerTag(0x1f));
}

#[test]
fn test_multi_valued_rdn_sorted() {
    let cn = AttributeTypeAndValue::new(
        Oid::from(&[2, 5, 4, 3]),
        BerObject::from_primitive(BerTag::Utf8String, b"a".to_vec()),
    );
    let c = AttributeTypeAndValue::new(
        Oid::from(&[2, 5, 4, 6]),
        BerObject::from_primitive(BerTag::PrintableString, b"FR".to_vec()),
    );
    // out of DER order on purpose
    let name = X509Name {
        rdn_seq: vec![RelativeDistinguishedName::new(vec![c.clone(), cn.clone()])],
    };
    assert_eq!(name.rdn_seq[0].attributes(), &[cn.clone(), c.clone()][..]);
    let bytes = DerEncoder::new().encode(&name).get_contents().unwrap();
    let decoded: X509Name = BerDecoder::new(&bytes).decode().unwrap();
    assert_eq!(decoded, name);
    assert_eq!(decoded.rdn_seq[0].attributes(), &[cn, c][..]);
}

#[test]
fn test_berobject_to_vec() {
    let obj = BerObject::new(
        Identifier::constructed(BerTag::Sequence),
        hex!("02 01 01").to_vec(),
    );
    assert_eq!(obj.to_vec(), Ok(hex!("30 03 02 01 01").to_vec()));
    let bytes = DerEncoder::new().encode(&obj).get_contents().unwrap();
    assert_eq!(bytes, hex!("30 03 02 01 01"));
}
