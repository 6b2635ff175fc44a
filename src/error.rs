use std::{io,fmt};
use std::convert::From;

use super::date::IsoDate;
use super::population::Region;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    IO(io::Error),
    CSV(csv::Error),
    JSON(serde_json::Error),
    InvalidDate(String),
    InvalidNumber { column: String, line: u64, value: String },
    MissingColumn { column: String, line: u64 },
    UnknownRegion(String),
    UnknownVaccine(String),
    DuplicateObservation { date: IsoDate, region: Region },
    InvalidRange { oldest: IsoDate, latest: IsoDate },
    OutOfRange { date: IsoDate, oldest: IsoDate, latest: IsoDate },
    MissingFirstDay { date: IsoDate },
    IncompleteDay { date: IsoDate, region: Region },
    DecreasingDeliveries { date: IsoDate, region: Region },
    RangeTooShort { latest: IsoDate, days: i64 },
    NoPopulation(Region),
    NothingDelivered,
    MissingData(&'static str),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
	Self::IO(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
	Self::CSV(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
	Self::JSON(err)
    }
}

impl std::error::Error for Error {}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Self::IO(err) => write!(f, "I/O error: {}", err),
	    Self::CSV(err) => write!(f, "CSV error: {}", err),
	    Self::JSON(err) => write!(f, "JSON error: {}", err),
	    Self::InvalidDate(date) => write!(f, "Invalid date (expected YYYY-MM-DD): {:?}", date),
	    Self::InvalidNumber { column, line, value } =>
		write!(f, "Invalid number {:?} in column {} on line {}", value, column, line),
	    Self::MissingColumn { column, line } =>
		write!(f, "Missing column {} on line {}", column, line),
	    Self::UnknownRegion(name) => write!(f, "Unknown region: {}", name),
	    Self::UnknownVaccine(name) => write!(f, "Unknown vaccine: {}", name),
	    Self::DuplicateObservation { date, region } =>
		write!(f, "Duplicate observation for {} on {}", region.name(), date),
	    Self::InvalidRange { oldest, latest } =>
		write!(f, "Invalid date range: {} is after {}", oldest, latest),
	    Self::OutOfRange { date, oldest, latest } =>
		write!(f, "Observation on {} lies outside {}..={}", date, oldest, latest),
	    Self::MissingFirstDay { date } =>
		write!(f, "No data for {}, the first day of the range; nothing to carry forward", date),
	    Self::IncompleteDay { date, region } =>
		write!(f, "No data for {} on {} and no earlier day to carry forward from",
		       region.name(), date),
	    Self::DecreasingDeliveries { date, region } =>
		write!(f, "Cumulative deliveries for {} decrease on {}", region.name(), date),
	    Self::RangeTooShort { latest, days } =>
		write!(f, "Series ending {} does not reach back {} days", latest, days),
	    Self::NoPopulation(region) => write!(f, "No population figure for {}", region.name()),
	    Self::NothingDelivered => write!(f, "No doses delivered yet; ratio is undefined"),
	    Self::MissingData(what) => write!(f, "No data in {}!", what),
	}
    }
}
