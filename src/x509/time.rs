use crate::ber::*;
use crate::der::{DerEncodable, DerEncoder};
use crate::error::BerError;
use nom::bytes::complete::take;
use nom::character::complete::char;
use nom::combinator::{all_consuming, opt};
use nom::sequence::tuple;
use nom::IResult;
use std::cmp::Ordering;
use std::fmt;

/// Encoding used for a time value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeKind {
    UtcTime,
    GeneralizedTime,
}

/// A validity time, in UTC
///
/// The encoding variant is remembered so that re-encoding gives back the
/// original form. Ordering compares the instants first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct X509Time {
    pub kind: TimeKind,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 0,
    }
}

impl X509Time {
    /// Build a time, picking UTCTime for years 1950 to 2049 and
    /// GeneralizedTime otherwise
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, BerError> {
        let kind = if (1950..2050).contains(&year) {
            TimeKind::UtcTime
        } else {
            TimeKind::GeneralizedTime
        };
        let t = X509Time {
            kind,
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        t.validate()?;
        Ok(t)
    }

    fn validate(&self) -> Result<(), BerError> {
        if self.month == 0
            || self.month > 12
            || self.day == 0
            || self.day > days_in_month(self.year, self.month)
            || self.hour > 23
            || self.minute > 59
            || self.second > 59
        {
            return Err(BerError::InvalidTime);
        }
        if self.kind == TimeKind::UtcTime && !(1950..2050).contains(&self.year) {
            return Err(BerError::InvalidTime);
        }
        Ok(())
    }

    fn instant(&self) -> (u16, u8, u8, u8, u8, u8) {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Parse the content of a UTCTime or GeneralizedTime
    pub fn from_content(kind: TimeKind, content: &[u8]) -> Result<Self, BerError> {
        let parser: fn(&[u8]) -> IResult<&[u8], X509Time, BerError> = match kind {
            TimeKind::UtcTime => utc_time,
            TimeKind::GeneralizedTime => generalized_time,
        };
        let (_, t) = all_consuming(parser)(content).or(Err(BerError::InvalidTime))?;
        t.validate()?;
        Ok(t)
    }

    /// Content octets in the encoding variant of this time
    pub fn to_content(&self) -> Vec<u8> {
        let s = match self.kind {
            TimeKind::UtcTime => format!(
                "{:02}{:02}{:02}{:02}{:02}{:02}Z",
                self.year % 100,
                self.month,
                self.day,
                self.hour,
                self.minute,
                self.second
            ),
            TimeKind::GeneralizedTime => format!(
                "{:04}{:02}{:02}{:02}{:02}{:02}Z",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            ),
        };
        s.into_bytes()
    }
}

fn digits(n: usize) -> impl Fn(&[u8]) -> IResult<&[u8], u16, BerError> {
    move |i| {
        let (rem, d) = take::<_, _, BerError>(n)(i)?;
        if !d.iter().all(u8::is_ascii_digit) {
            return Err(nom::Err::Error(BerError::InvalidTime));
        }
        let v = d.iter().fold(0u16, |acc, c| acc * 10 + u16::from(c - b'0'));
        Ok((rem, v))
    }
}

fn two_digits(i: &[u8]) -> IResult<&[u8], u8, BerError> {
    let (i, v) = digits(2)(i)?;
    Ok((i, v as u8))
}

// MMDDHHMM[SS]Z
fn time_tail(i: &[u8]) -> IResult<&[u8], (u8, u8, u8, u8, u8), BerError> {
    let (i, (month, day, hour, minute)) =
        tuple((two_digits, two_digits, two_digits, two_digits))(i)?;
    let (i, second) = opt(two_digits)(i)?;
    let (i, _) = char::<_, BerError>('Z')(i)?;
    Ok((i, (month, day, hour, minute, second.unwrap_or(0))))
}

fn utc_time(i: &[u8]) -> IResult<&[u8], X509Time, BerError> {
    let (i, yy) = digits(2)(i)?;
    let (i, (month, day, hour, minute, second)) = time_tail(i)?;
    let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
    let t = X509Time {
        kind: TimeKind::UtcTime,
        year,
        month,
        day,
        hour,
        minute,
        second,
    };
    Ok((i, t))
}

fn generalized_time(i: &[u8]) -> IResult<&[u8], X509Time, BerError> {
    let (i, year) = digits(4)(i)?;
    let (i, (month, day, hour, minute, second)) = time_tail(i)?;
    let t = X509Time {
        kind: TimeKind::GeneralizedTime,
        year,
        month,
        day,
        hour,
        minute,
        second,
    };
    Ok((i, t))
}

impl PartialOrd for X509Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for X509Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant()
            .cmp(&other.instant())
            .then_with(|| (self.kind as u8).cmp(&(other.kind as u8)))
    }
}

impl fmt::Display for X509Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02} UTC",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl BerDecodable for X509Time {
    const IDENTIFIER: Identifier = Identifier::primitive(BerTag::UtcTime);

    fn accepts(id: &Identifier) -> bool {
        *id == Identifier::primitive(BerTag::UtcTime)
            || *id == Identifier::primitive(BerTag::GeneralizedTime)
    }

    fn from_ber_object(obj: BerObject) -> Result<Self, BerError> {
        let kind = match obj.tag {
            BerTag::GeneralizedTime => TimeKind::GeneralizedTime,
            _ => TimeKind::UtcTime,
        };
        X509Time::from_content(kind, &obj.value)
    }
}

impl DerEncodable for X509Time {
    fn identifier(&self) -> Identifier {
        match self.kind {
            TimeKind::UtcTime => Identifier::primitive(BerTag::UtcTime),
            TimeKind::GeneralizedTime => Identifier::primitive(BerTag::GeneralizedTime),
        }
    }

    fn encode_content(&self, enc: &mut DerEncoder) {
        enc.raw_bytes(&self.to_content());
    }
}
