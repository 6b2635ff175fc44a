use std::fmt;

use chrono::{Duration,Utc};
use chrono::naive::NaiveDate;
use serde::{Serialize,Serializer};

use super::error::{Result,Error};


/// A calendar day parsed from a strict `YYYY-MM-DD` string.
///
/// Ordering is chronological. Since the string form is fixed-width and
/// zero-padded, this is the same order as comparing the strings, so
/// dates can be used directly as sorted map keys.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct IsoDate(NaiveDate);

impl IsoDate {

    pub fn parse(s: &str) -> Result<Self> {
	let bytes = s.as_bytes();
	let well_formed = bytes.len() == 10
	    && bytes.iter().enumerate().all(|(i,b)| match i {
		4 | 7 => *b == b'-',
		_ => b.is_ascii_digit()
	    });
	if !well_formed {
	    return Err(Error::InvalidDate(s.to_string()));
	}
	NaiveDate::parse_from_str(s, "%Y-%m-%d")
	    .map(IsoDate)
	    .map_err(|_| Error::InvalidDate(s.to_string()))
    }

    /// The current UTC calendar day.
    pub fn today() -> Self {
	IsoDate(Utc::now().date_naive())
    }

    /// Plain calendar arithmetic; there is no time of day involved, so
    /// daylight-saving transitions cannot shift the result.
    pub fn add_days(self, n: i64) -> Self {
	IsoDate(self.0 + Duration::days(n))
    }

    pub fn days_until(self, other: IsoDate) -> i64 {
	(other.0 - self.0).num_days()
    }

}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for IsoDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
	serializer.collect_str(self)
    }
}


/// Inclusive range of days; open-ended when the end is `None`.
#[derive(Clone,Debug)]
pub struct DateRange(pub IsoDate, pub Option<IsoDate>);

impl Iterator for DateRange {
    type Item = IsoDate;
    fn next(&mut self) -> Option<IsoDate> {
	match self.1.map_or(true, |end| self.0 <= end) {
	    false => None,
	    true => {
		let current = self.0;
		self.0 = self.0.add_days(1);
		Some(current)
	    }
	}
    }
}
