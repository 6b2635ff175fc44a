use std::fs;
use std::borrow::Cow;
use std::path::Path;
use std::collections::HashMap;

use csv::{StringRecord,Trim};
use encoding_rs::{UTF_8,WINDOWS_1252};
use log::{info,warn,debug};

use super::date::IsoDate;
use super::error::{Result,Error};


/// A delimited text table, read in full. Values stay raw strings until a
/// caller asks for a typed field.
#[derive(Debug)]
pub struct Table {
    columns: HashMap<String,usize>,
    rows: Vec<StringRecord>,
}

/// One row of a `Table`, addressed by header name.
#[derive(Clone,Copy)]
pub struct Record<'a> {
    columns: &'a HashMap<String,usize>,
    row: &'a StringRecord,
}


pub fn read_table(path: &Path, delimiter: u8) -> Result<Table> {
    info!("Reading {}...", path.display());
    let bytes = fs::read(path)?;
    let table = Table::from_text(&decode(&bytes), delimiter)?;
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Spreadsheet exports are not always UTF-8; fall back to Windows-1252
/// when the bytes do not decode cleanly.
fn decode(bytes: &[u8]) -> Cow<'_,str> {
    let (text, malformed) = UTF_8.decode_with_bom_removal(bytes);
    if !malformed {
	return text;
    }
    warn!("Input is not valid UTF-8, decoding as Windows-1252");
    WINDOWS_1252.decode_without_bom_handling(bytes).0
}


impl Table {

    pub fn from_text(text: &str, delimiter: u8) -> Result<Table> {
	let mut reader = csv::ReaderBuilder::new()
	    .delimiter(delimiter)
	    .trim(Trim::Headers)
	    .from_reader(text.as_bytes());
	let columns = reader.headers()?.iter().enumerate()
	    .map(|(i,h)| (h.to_string(), i))
	    .collect();
	let rows = reader.records().collect::<std::result::Result<Vec<_>,_>>()?;
	Ok(Table { columns, rows })
    }

    pub fn len(&self) -> usize {
	self.rows.len()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
	self.rows.iter().map(move |row| Record { columns: &self.columns, row })
    }

}


impl<'a> Record<'a> {

    /// Source line, 1-based and counting the header.
    pub fn line(&self) -> u64 {
	self.row.position().map_or(0, |p| p.line())
    }

    pub fn get(&self, column: &str) -> Result<&'a str> {
	let row: &'a StringRecord = self.row;
	self.columns.get(column)
	    .and_then(|i| row.get(*i))
	    .ok_or_else(|| Error::MissingColumn { column: column.to_string(), line: self.line() })
    }

    pub fn date(&self, column: &str) -> Result<IsoDate> {
	IsoDate::parse(self.get(column)?.trim())
    }

    /// Non-negative integer; an empty cell counts as zero.
    pub fn count(&self, column: &str) -> Result<u64> {
	self.parse(column, self.get(column)?)
    }

    /// Like `count`, but an absent column also counts as zero.
    pub fn optional_count(&self, column: &str) -> Result<u64> {
	match self.columns.contains_key(column) {
	    false => Ok(0),
	    true => self.count(column),
	}
    }

    /// Signed integer; an empty cell counts as zero.
    pub fn signed(&self, column: &str) -> Result<i64> {
	self.parse(column, self.get(column)?)
    }

    fn parse<T: std::str::FromStr + Default>(&self, column: &str, value: &str) -> Result<T> {
	match value.trim() {
	    "" => Ok(T::default()),
	    v => v.parse().map_err(|_| Error::InvalidNumber {
		column: column.to_string(),
		line: self.line(),
		value: value.to_string(),
	    })
	}
    }

}
