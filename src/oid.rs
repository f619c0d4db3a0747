//! Object identifiers
use crate::ber::{BerDecodable, BerObject, BerTag, Identifier};
use crate::der::{DerEncodable, DerEncoder};
use crate::error::BerError;
use std::fmt;
use std::slice;
use std::str::FromStr;

/// Object identifier, as a list of arcs
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Oid(Vec<u64>);

impl Oid {
    /// Build an OID from its arcs
    ///
    /// The first arc must be 0, 1 or 2, and the second must be below 40 unless
    /// the first is 2; encoding an OID breaking these rules gives garbage.
    pub fn from(s: &[u64]) -> Oid {
        Oid(s.to_vec())
    }

    pub fn iter(&self) -> slice::Iter<u64> {
        self.0.iter()
    }

    pub fn to_id_string(&self) -> String {
        let v: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        v.join(".")
    }

    /// Parse the content octets of an OBJECT IDENTIFIER
    pub fn from_der_content(bytes: &[u8]) -> Result<Oid, BerError> {
        if bytes.is_empty() {
            return Err(BerError::InvalidOid);
        }
        let mut arcs = Vec::new();
        let mut acc: u64 = 0;
        let mut first_octet = true;
        for &b in bytes {
            // leading 0x80 octets are not allowed (8.19.2)
            if first_octet && b == 0x80 {
                return Err(BerError::InvalidOid);
            }
            if acc.leading_zeros() < 7 {
                return Err(BerError::InvalidOid);
            }
            acc = (acc << 7) | u64::from(b & 0x7f);
            first_octet = b & 0x80 == 0;
            if first_octet {
                if arcs.is_empty() {
                    let (x, y) = match acc {
                        0..=39 => (0, acc),
                        40..=79 => (1, acc - 40),
                        _ => (2, acc - 80),
                    };
                    arcs.push(x);
                    arcs.push(y);
                } else {
                    arcs.push(acc);
                }
                acc = 0;
            }
        }
        // last subidentifier must be complete
        if !first_octet {
            return Err(BerError::InvalidOid);
        }
        Ok(Oid(arcs))
    }

    /// Content octets of the DER encoding
    pub fn to_der_content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let first = match self.0[..] {
            [] => return out,
            [x] => u128::from(x) * 40,
            [x, y, ..] => u128::from(x) * 40 + u128::from(y),
        };
        push_subidentifier(&mut out, first);
        for &arc in self.0.iter().skip(2) {
            push_subidentifier(&mut out, u128::from(arc));
        }
        out
    }
}

fn push_subidentifier(out: &mut Vec<u8>, mut n: u128) {
    let mut tmp = vec![(n & 0x7f) as u8];
    n >>= 7;
    while n > 0 {
        tmp.push(0x80 | (n & 0x7f) as u8);
        n >>= 7;
    }
    out.extend(tmp.iter().rev());
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_id_string())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OID({})", self.to_id_string())
    }
}

impl FromStr for Oid {
    type Err = BerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .trim()
            .split('.')
            .map(|c| c.parse::<u64>().or(Err(BerError::InvalidOid)))
            .collect::<Result<Vec<_>, _>>()?;
        // the first subidentifier (80 + y under arc 2) must fit in 64 bits
        let valid = match arcs[..] {
            [0..=1, y, ..] => y < 40,
            [2, y, ..] => y.checked_add(80).is_some(),
            _ => false,
        };
        if !valid {
            return Err(BerError::InvalidOid);
        }
        Ok(Oid(arcs))
    }
}

impl BerDecodable for Oid {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::Oid);

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        if obj.is_constructed() {
            return Err(BerError::ConstructUnexpected);
        }
        Oid::from_der_content(&obj.value)
    }
}

impl DerEncodable for Oid {
    fn identifier(&self) -> Identifier {
        Oid::IDENTIFIER
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&self.to_der_content());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_oid_fmt() {
        let oid = Oid::from(&[1, 2, 840, 113549, 1, 1, 5]);
        assert_eq!(format!("{}", oid), "1.2.840.113549.1.1.5".to_owned());
        assert_eq!(format!("{:?}", oid), "OID(1.2.840.113549.1.1.5)".to_owned());
    }

    #[test]
    fn test_oid_content() {
        let oid = Oid::from(&[1, 2, 840, 113549, 1, 1, 5]);
        let content = hex!("2a 86 48 86 f7 0d 01 01 05");
        assert_eq!(oid.to_der_content(), content.to_vec());
        assert_eq!(Oid::from_der_content(&content), Ok(oid));
        // arc 2 takes everything above 80
        assert_eq!(
            Oid::from_der_content(&hex!("88 37 03")),
            Ok(Oid::from(&[2, 999, 3]))
        );
    }

    #[test]
    fn test_oid_invalid_content() {
        assert_eq!(Oid::from_der_content(&[]), Err(BerError::InvalidOid));
        assert_eq!(Oid::from_der_content(&hex!("2a 86")), Err(BerError::InvalidOid));
        assert_eq!(Oid::from_der_content(&hex!("2a 80 01")), Err(BerError::InvalidOid));
    }

    #[test]
    fn test_oid_from_str() {
        assert_eq!("2.5.29.20".parse::<Oid>(), Ok(Oid::from(&[2, 5, 29, 20])));
        assert!("1.40".parse::<Oid>().is_err());
        assert!("3.1".parse::<Oid>().is_err());
        assert!("1".parse::<Oid>().is_err());
        assert!("1.2.x".parse::<Oid>().is_err());
        assert!("2.18446744073709551615".parse::<Oid>().is_err());
    }

    #[test]
    fn test_oid_large_second_arc() {
        let oid: Oid = "2.18446744073709551535".parse().unwrap();
        let content = oid.to_der_content();
        assert_eq!(Oid::from_der_content(&content), Ok(oid));
        // built without validation: still encodes, no overflow
        let unchecked = Oid::from(&[2, u64::MAX]);
        assert_eq!(unchecked.to_der_content().len(), 10);
    }
}
