use std::collections::{BTreeMap,BTreeSet};

use log::warn;
use serde::Serialize;

use super::date::IsoDate;
use super::error::Result;
use super::format::format_count;


/// A day on which a cumulative count went down.
#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Anomaly {
    pub date: IsoDate,
    pub region: String,
    pub metric: String,
    pub previous: u64,
    pub current: u64,
    pub index: usize,
}

/// Indices `i` where `values[i] < values[i - 1]`.
pub fn decreases<T: PartialOrd>(values: &[T]) -> Vec<usize> {
    (1..values.len()).filter(|&i| values[i] < values[i - 1]).collect()
}


/// Anomalies found across all scanned series. Only reports; the series
/// themselves are left as they are.
#[derive(Debug,Default)]
pub struct AnomalyLog {
    records: Vec<Anomaly>,
    dates: BTreeMap<String,BTreeSet<IsoDate>>,
}

impl AnomalyLog {

    /// Scans one series, `labels[i]` being the date of `values[i]`.
    /// Returns the number of anomalies found.
    pub fn scan(&mut self, region: &str, metric: &str, labels: &[IsoDate], values: &[u64]) -> usize {
	let found = decreases(values);
	for index in found.iter().copied() {
	    let anomaly = Anomaly {
		date: labels[index],
		region: region.to_string(),
		metric: metric.to_lowercase(),
		previous: values[index - 1],
		current: values[index],
		index,
	    };
	    warn!("{} {} dropped from {} to {} on {}", anomaly.region, anomaly.metric,
		  anomaly.previous, anomaly.current, anomaly.date);
	    self.dates.entry(anomaly.region.clone()).or_default().insert(anomaly.date);
	    self.records.push(anomaly);
	}
	found.len()
    }

    pub fn len(&self) -> usize {
	self.records.len()
    }

    /// Sorted by date, then region and metric.
    pub fn records(&self) -> Vec<&Anomaly> {
	let mut records: Vec<_> = self.records.iter().collect();
	records.sort_by(|a,b| (a.date, &a.region, &a.metric).cmp(&(b.date, &b.region, &b.metric)));
	records
    }

    pub fn to_markdown(&self) -> String {
	let mut markdown = String::from("| `date` | state | metric | details |\n| --- | --- | --- | --- |\n");
	for anomaly in self.records() {
	    markdown.push_str(&format!(
		"| {} | {} | {} | {} is lower than previous value of {} |\n",
		anomaly.date, anomaly.region, anomaly.metric,
		format_count(anomaly.current as f64), format_count(anomaly.previous as f64)));
	}
	markdown
    }

    pub fn to_json(&self) -> Result<String> {
	Ok(serde_json::to_string_pretty(&self.dates)?)
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    fn labels(n: usize) -> Vec<IsoDate> {
	let start = IsoDate::parse("2021-02-01").unwrap();
	(0..n as i64).map(|i| start.add_days(i)).collect()
    }

    #[test]
    fn flags_only_decreases() {
	assert_eq!(decreases(&[100, 150, 140, 200]), vec![2]);
	assert_eq!(decreases(&[1, 1, 2, 3]), Vec::<usize>::new());
	assert_eq!(decreases::<u64>(&[]), Vec::<usize>::new());
	assert_eq!(decreases(&[5.0, 4.0, 3.0]), vec![1, 2]);
    }

    #[test]
    fn records_values_and_dates() {
	let mut log = AnomalyLog::default();
	let dates = labels(4);
	assert_eq!(log.scan("Bayern", "Total doses", &dates, &[100, 150, 140, 200]), 1);
	assert_eq!(log.records(), vec![&Anomaly {
	    date: dates[2],
	    region: "Bayern".to_string(),
	    metric: "total doses".to_string(),
	    previous: 150,
	    current: 140,
	    index: 2,
	}]);
    }

    #[test]
    fn dates_are_deduplicated_per_region() {
	let mut log = AnomalyLog::default();
	let dates = labels(4);
	log.scan("Bayern", "Total doses", &dates, &[10, 5, 6, 7]);
	log.scan("Bayern", "First doses", &dates, &[10, 5, 6, 3]);
	log.scan("Berlin", "First doses", &dates, &[1, 2, 3, 4]);
	assert_eq!(log.len(), 3);
	assert_eq!(log.to_json().unwrap(),
		   "{\n  \"Bayern\": [\n    \"2021-02-02\",\n    \"2021-02-04\"\n  ]\n}");
    }

    #[test]
    fn markdown_table_is_sorted() {
	let mut log = AnomalyLog::default();
	let dates = labels(3);
	log.scan("Sachsen", "Total doses", &dates, &[3000, 2500, 2600]);
	log.scan("Bayern", "Total doses", &dates, &[5000, 6000, 1200]);
	assert_eq!(log.to_markdown(),
		   "| `date` | state | metric | details |\n| --- | --- | --- | --- |\n\
		    | 2021-02-02 | Sachsen | total doses | 2,500 is lower than previous value of 3,000 |\n\
		    | 2021-02-03 | Bayern | total doses | 1,200 is lower than previous value of 6,000 |\n");
    }

}
