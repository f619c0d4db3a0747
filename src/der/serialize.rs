use crate::ber::*;
use cookie_factory::bytes::be_u8;
use cookie_factory::combinator::slice;
use cookie_factory::sequence::tuple;
use cookie_factory::SerializeFn;
use std::io::Write;

/// Tag number in base 128, most significant group first, continuation bit set
/// on every octet but the last
fn tag_number_octets(mut n: u32) -> Vec<u8> {
    let mut v = vec![(n & 0x7f) as u8];
    n >>= 7;
    while n > 0 {
        v.push(0x80 | (n & 0x7f) as u8);
        n >>= 7;
    }
    v.reverse();
    v
}

fn ber_encode_identifier<'a, W: Write + 'a>(id: Identifier) -> impl SerializeFn<W> + 'a {
    move |out| match id.short_form() {
        Some(b) => be_u8(b)(out),
        None => {
            let constructed = if id.constructed { 0b0010_0000 } else { 0 };
            let b0 = ((id.class as u8) << 6) | constructed | 0x1f;
            tuple((be_u8(b0), slice(tag_number_octets(id.tag.0))))(out)
        }
    }
}

fn ber_encode_length<'a, W: Write + 'a>(len: Length) -> impl SerializeFn<W> + 'a {
    move |out| match len {
        // definite, short form
        Length::Definite(sz) if sz <= 127 => be_u8(sz as u8)(out),
        // definite, long form
        Length::Definite(sz) => {
            let v: Vec<u8> = sz
                .to_be_bytes()
                .iter()
                .cloned()
                .skip_while(|&b| b == 0)
                .collect();
            let b0 = 0b1000_0000 | (v.len() as u8);
            tuple((be_u8(b0), slice(v)))(out)
        }
        Length::Indefinite => be_u8(0b1000_0000)(out),
    }
}

/// Encode the header of a BER object (identifier and length)
///
/// Definite lengths always use the shortest form.
pub fn ber_encode_header<'a, W: Write + 'a>(hdr: BerObjectHeader) -> impl SerializeFn<W> + 'a {
    tuple((
        ber_encode_identifier(hdr.identifier()),
        ber_encode_length(hdr.len),
    ))
}

/// Encode a complete BER object: header, then payload
pub fn ber_encode_object<'a, W: Write + 'a>(obj: &'a BerObject) -> impl SerializeFn<W> + 'a {
    tuple((ber_encode_header(obj.header()), slice(&obj.value)))
}

/// Encode an object given its identifier and payload
pub(crate) fn ber_encode_tlv<'a, W: Write + 'a>(
    id: Identifier,
    value: &'a [u8],
) -> impl SerializeFn<W> + 'a {
    let hdr = BerObjectHeader::new(
        id.class,
        u8::from(id.constructed),
        id.tag,
        Length::Definite(value.len()),
    );
    tuple((ber_encode_header(hdr), slice(value)))
}
