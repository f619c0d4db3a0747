use crate::ber::*;
use crate::error::*;
use nom::bytes::streaming::take;
use nom::number::streaming::be_u8;
use nom::{Err, Needed};
use num_traits::PrimInt;
use std::convert::TryFrom;

/// Maximum recursion limit
pub const MAX_RECURSION: usize = 50;

/// Longest header accepted: 6 identifier octets and 9 length octets
pub const MAX_HEADER_LEN: usize = 15;

/// Try to parse the content of an unsigned INTEGER as a native integer
pub(crate) fn bytes_to_uint<T: PrimInt>(s: &[u8]) -> Result<T, BerError> {
    if s.is_empty() {
        return Err(BerError::InvalidLength);
    }
    if is_highest_bit_set(s) {
        return Err(BerError::IntegerNegative);
    }
    let mut u = T::zero();
    for &c in s {
        if u.leading_zeros() < 8 {
            return Err(BerError::IntegerTooLarge);
        }
        let c: T = <T as num_traits::NumCast>::from(c).ok_or(BerError::IntegerTooLarge)?;
        // no shift before the first significant octet, `u8` has no room for one
        u = if u == T::zero() { c } else { (u << 8) | c };
    }
    Ok(u)
}

/// Is the highest bit of the first byte in the slice 1? (if present)
#[inline]
pub(crate) fn is_highest_bit_set(bytes: &[u8]) -> bool {
    bytes
        .first()
        .map(|byte| byte & 0b1000_0000 != 0)
        .unwrap_or(false)
}

/// Read the identifier octets: (class, constructed, tag number)
pub(crate) fn parse_identifier(i: &[u8]) -> BerResult<(u8, u8, u32)> {
    if i.is_empty() {
        return Err(Err::Incomplete(Needed::new(1)));
    }
    let a = i[0] >> 6;
    let b = if i[0] & 0b0010_0000 != 0 { 1 } else { 0 };
    let mut c = u32::from(i[0] & 0b0001_1111);

    let mut tag_byte_count = 1;

    if c == 0x1f {
        c = 0;
        loop {
            if tag_byte_count >= i.len() {
                return Err(Err::Incomplete(Needed::new(1)));
            }
            // With tag defined as u32 the most we can fit in is five tag bytes.
            custom_check!(i, tag_byte_count > 5, BerError::InvalidTag)?;
            // leading 0x80 octets are not a valid tag number encoding (8.1.2.4.2 c)
            custom_check!(
                i,
                tag_byte_count == 1 && i[1] == 0x80,
                BerError::InvalidTag
            )?;
            custom_check!(i, c.leading_zeros() < 7, BerError::InvalidTag)?;

            c = (c << 7) | (u32::from(i[tag_byte_count]) & 0x7f);
            let done = i[tag_byte_count] & 0x80 == 0;
            tag_byte_count += 1;
            if done {
                break;
            }
        }
    }

    Ok((&i[tag_byte_count..], (a, b, c)))
}

/// Read the first length octet: (long form flag, low 7 bits)
pub(crate) fn parse_ber_length_byte(i: &[u8]) -> BerResult<(u8, u8)> {
    let (rem, b) = be_u8(i)?;
    Ok((rem, (b >> 7, b & 0b0111_1111)))
}

/// Read the length octets
pub(crate) fn parse_ber_length(i: &[u8]) -> BerResult<Length> {
    let (i, (long, n)) = parse_ber_length_byte(i)?;
    if long == 0 {
        return Ok((i, Length::Definite(usize::from(n))));
    }
    match n {
        0 => Ok((i, Length::Indefinite)),
        // 0xff is reserved for future use (8.1.3.5)
        0b0111_1111 => Err(Err::Error(BerError::InvalidLength)),
        n => {
            custom_check!(i, n > 8, BerError::InvalidLength)?;
            let (i, llen) = take(n)(i)?;
            let len = llen.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
            custom_check!(i, len > u64::from(u32::MAX), BerError::InvalidLength)?;
            let len = usize::try_from(len).or(Err(Err::Error(BerError::InvalidLength)))?;
            Ok((i, Length::Definite(len)))
        }
    }
}

/// Read an object header
///
/// This is a streaming parser: `Err::Incomplete` is returned while the
/// input does not hold the complete header.
pub fn ber_read_element_header(i: &[u8]) -> BerResult<BerObjectHeader> {
    let (i, (class, structured, tag)) = parse_identifier(i)?;
    let (i, len) = parse_ber_length(i)?;
    let class = BerClass::try_from(class).or(Err(Err::Error(BerError::InvalidClass)))?;
    Ok((i, BerObjectHeader::new(class, structured, BerTag(tag), len)))
}

/// Read one complete BER object from a slice
///
/// Only definite lengths are accepted. The payload is copied out; nested
/// objects are not parsed.
pub fn parse_ber_object(i: &[u8]) -> BerResult<BerObject> {
    let (rem, hdr) = match ber_read_element_header(i) {
        Err(Err::Incomplete(_)) => return Err(Err::Error(BerError::InvalidLength)),
        r => r?,
    };
    let len = hdr.len.definite().map_err(Err::Error)?;
    custom_check!(
        rem,
        len > rem.len(),
        BerError::Truncated {
            declared: len,
            available: rem.len()
        }
    )?;
    let (rem, value) = take(len)(rem)?;
    let obj = BerObject {
        class: hdr.class,
        structured: hdr.structured,
        tag: hdr.tag,
        value: value.to_vec(),
    };
    Ok((rem, obj))
}

/// Walk an object and all the objects nested in its constructed payloads,
/// checking that every level is well formed.
///
/// Returns the number of objects visited.
pub fn ber_check_nested(obj: &BerObject, depth: usize) -> Result<usize, BerError> {
    if depth > MAX_RECURSION {
        return Err(BerError::BerMaxDepth);
    }
    if obj.is_primitive() {
        return Ok(1);
    }
    let mut count = 1;
    let mut i = &obj.value[..];
    while !i.is_empty() {
        let (rem, inner) = parse_ber_object(i).map_err(|e| match e {
            Err::Error(e) | Err::Failure(e) => e,
            Err::Incomplete(_) => BerError::InvalidLength,
        })?;
        count += ber_check_nested(&inner, depth + 1)?;
        i = rem;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_uint() {
        assert_eq!(bytes_to_uint::<u32>(&[0x01, 0x00, 0x01]), Ok(0x10001));
        assert_eq!(bytes_to_uint::<u32>(&[0x00, 0xff, 0xff, 0xff, 0xff]), Ok(u32::MAX));
        assert_eq!(
            bytes_to_uint::<u32>(&[0x01, 0x00, 0x00, 0x00, 0x00]),
            Err(BerError::IntegerTooLarge)
        );
        assert_eq!(bytes_to_uint::<u64>(&[0x80]), Err(BerError::IntegerNegative));
        assert_eq!(bytes_to_uint::<u8>(&[]), Err(BerError::InvalidLength));
        assert_eq!(bytes_to_uint::<u8>(&[0x05]), Ok(5));
        assert_eq!(bytes_to_uint::<u8>(&[0x00, 0xff]), Ok(255));
        assert_eq!(bytes_to_uint::<u8>(&[0x01, 0x00]), Err(BerError::IntegerTooLarge));
    }

    #[test]
    fn test_header_incomplete() {
        assert!(matches!(ber_read_element_header(&[]), Err(Err::Incomplete(_))));
        assert!(matches!(ber_read_element_header(&[0x30]), Err(Err::Incomplete(_))));
        assert!(matches!(
            ber_read_element_header(&[0x1f, 0x81]),
            Err(Err::Incomplete(_))
        ));
        assert!(matches!(
            ber_read_element_header(&[0x04, 0x82, 0x01]),
            Err(Err::Incomplete(_))
        ));
    }

    #[test]
    fn test_header_high_tag_number() {
        let (rem, hdr) = ber_read_element_header(&[0x9f, 0x81, 0x00, 0x02]).expect("header");
        assert!(rem.is_empty());
        assert_eq!(hdr.class, BerClass::ContextSpecific);
        assert_eq!(hdr.tag, BerTag(128));
        assert_eq!(hdr.len, Length::Definite(2));
    }

    #[test]
    fn test_header_reserved_length() {
        assert_eq!(
            ber_read_element_header(&[0x04, 0xff]),
            Err(Err::Error(BerError::InvalidLength))
        );
    }

    #[test]
    fn test_header_indefinite() {
        let (_, hdr) = ber_read_element_header(&[0x30, 0x80]).expect("header");
        assert_eq!(hdr.len, Length::Indefinite);
    }

    #[test]
    fn test_check_nested() {
        let bytes = [0x30, 0x05, 0x30, 0x03, 0x02, 0x01, 0x07];
        let (_, obj) = parse_ber_object(&bytes).expect("object");
        assert_eq!(ber_check_nested(&obj, 0), Ok(3));
        let bad = [0x30, 0x04, 0x30, 0x03, 0x02, 0x01];
        let (_, obj) = parse_ber_object(&bad).expect("object");
        assert!(ber_check_nested(&obj, 0).is_err());
    }
}
