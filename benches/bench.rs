use criterion::{black_box, criterion_group, criterion_main, Criterion};
use der_codec::ber::*;
use der_codec::config::Context;
use der_codec::crl::{CrlEntry, SerialNumber, X509Crl};
use der_codec::der::DerEncoder;
use der_codec::oid::Oid;
use der_codec::x509::{AlgorithmIdentifier, X509Name, X509Time};

fn bench_read_element_header(c: &mut Criterion) {
    let bytes = &[
        0x0c, 0x0a, 0x53, 0x6f, 0x6d, 0x65, 0x2d, 0x53, 0x74, 0x61, 0x74, 0x65,
    ];
    c.bench_function("ber_read_element_header", |b| {
        b.iter(|| {
            let (_, hdr) = ber_read_element_header(black_box(bytes)).unwrap();
            assert_eq!(hdr.tag, BerTag::Utf8String);
        })
    });
}

fn sample_crl(entries: u64) -> Vec<u8> {
    let ctx = Context::default();
    let mut issuer = X509Name::new();
    issuer.push(
        Oid::from(&[2, 5, 4, 3]),
        BerObject::from_primitive(BerTag::PrintableString, b"Bench CA".to_vec()),
    );
    let mut crl = X509Crl::new(
        AlgorithmIdentifier::new(Oid::from(&[1, 2, 840, 10045, 4, 3, 2]), None),
        issuer,
        X509Time::new(2020, 1, 1, 0, 0, 0).unwrap(),
    );
    crl.version = 1;
    crl.crl_number = Some(1);
    let revoked = X509Time::new(2019, 6, 1, 0, 0, 0).unwrap();
    for serial in 0..entries {
        crl.revoked
            .push(CrlEntry::new(SerialNumber::from(serial + 0x1000_0000), revoked));
    }
    crl.to_signed(BitString::from_bytes(vec![0; 64]), &ctx)
        .unwrap()
        .to_der()
        .unwrap()
}

fn bench_crl(c: &mut Criterion) {
    let ctx = Context::default();
    let der = sample_crl(1000);
    c.bench_function("crl_decode_1000_entries", |b| {
        b.iter(|| X509Crl::from_der(black_box(&der), &ctx).unwrap())
    });
    let crl = X509Crl::from_der(&der, &ctx).unwrap();
    c.bench_function("crl_encode_1000_entries", |b| {
        b.iter(|| crl.tbs_der(&ctx).unwrap())
    });
}

fn bench_encoder(c: &mut Criterion) {
    c.bench_function("encode_nested_sequence", |b| {
        b.iter(|| {
            let mut enc = DerEncoder::new();
            enc.start_cons(BerTag::Sequence, BerClass::Universal);
            for i in 0..100u32 {
                enc.start_cons(BerTag::Sequence, BerClass::Universal)
                    .encode(black_box(&i))
                    .encode(&OctetString(vec![0x55; 16]))
                    .end_cons();
            }
            enc.end_cons().get_contents().unwrap()
        })
    });
}

criterion_group!(benches, bench_read_element_header, bench_crl, bench_encoder);
criterion_main!(benches);
