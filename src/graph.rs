use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;
use serde::Serialize;
use serde_json::Value;
use unidecode::unidecode;

use super::date::IsoDate;
use super::error::Result;
use super::vaccinations::{Metric,VaccinationBundle};
use super::vaccine::Vaccine;


#[derive(Serialize,Clone,Copy,Debug,PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
}

#[derive(Serialize,Clone,Debug,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset<V> {
    pub name: String,
    pub chart_type: ChartType,
    pub values: Vec<V>,
}

#[derive(Serialize,Clone,Debug,PartialEq)]
pub struct Marker {
    pub label: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Chart data in the shape frappe-charts reads.
#[derive(Serialize,Clone,Debug,PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chart<V> {
    pub labels: Vec<IsoDate>,
    pub datasets: Vec<Dataset<V>>,
    pub y_markers: Vec<Marker>,
}

impl<V> Chart<V> {

    /// An empty chart over `labels`. The solid marker at zero keeps
    /// the y axis from starting above it.
    pub fn new(labels: Vec<IsoDate>) -> Self {
	Chart {
	    labels,
	    datasets: Vec::new(),
	    y_markers: vec![Marker { label: String::new(), value: 0.0, kind: "solid".to_string() }],
	}
    }

    pub fn push(&mut self, name: &str, chart_type: ChartType, values: Vec<V>) {
	debug_assert_eq!(values.len(), self.labels.len());
	self.datasets.push(Dataset { name: name.to_string(), chart_type, values });
    }

}

#[cfg(test)]
impl<V> Chart<V> {

    pub fn dataset(&self, name: &str) -> Option<&Dataset<V>> {
	self.datasets.iter().find(|dataset| dataset.name == name)
    }

}


/// File name component for a region: ASCII, lower case, dashes.
pub fn slug(name: &str) -> String {
    unidecode(name).to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    debug!("Writing {}", path.display());
    let mut out = io::BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(out.by_ref(), value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    debug!("Writing {}", path.display());
    fs::write(path, text)?;
    Ok(())
}


static DOSE_COLUMNS: [(&str,Metric); 3] = [
    ("initialDoses", Metric::FirstDoses),
    ("finalDoses", Metric::SecondDoses),
    ("boosterDoses", Metric::BoosterDoses),
];

static PERSON_COLUMNS: [(&str,Metric); 3] = [
    ("onlyPartiallyVaccinated", Metric::OnlyPartiallyVaccinated),
    ("atLeastPartiallyVaccinated", Metric::AtLeastPartiallyVaccinated),
    ("fullyVaccinated", Metric::FullyVaccinated),
];

fn national_columns() -> impl Iterator<Item = &'static (&'static str,Metric)> {
    DOSE_COLUMNS.iter().chain(PERSON_COLUMNS.iter())
}

/// Per vaccine, "only partially" is left out.
fn vaccine_columns() -> impl Iterator<Item = &'static (&'static str,Metric)> {
    DOSE_COLUMNS.iter().chain(PERSON_COLUMNS[1..].iter())
}

/// The metrics behind the `*Percent` columns, in column order.
pub fn percent_metrics() -> impl Iterator<Item = Metric> {
    national_columns().map(|(_,metric)| *metric)
}

/// National sums for one day, as written to the national CSV.
/// `percents` follows `percent_metrics()`.
#[derive(Clone,Debug,PartialEq)]
pub struct NationalRow {
    pub date: IsoDate,
    pub bundle: VaccinationBundle,
    pub percents: Vec<f64>,
}

pub fn write_national_csv(path: &Path, rows: &[NationalRow]) -> Result<()> {

    debug!("Writing {}", path.display());
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["date".to_string(), "totalDosesCumulative".to_string()];
    header.extend(national_columns().map(|(name,_)| format!("{}Cumulative", name)));
    for vaccine in Vaccine::ALL.iter() {
	header.extend(vaccine_columns().map(|(name,_)| format!("{}Cumulative{}", name, vaccine.column_suffix())));
    }
    header.extend(national_columns().map(|(name,_)| format!("{}Percent", name)));
    writer.write_record(&header)?;

    for row in rows {
	let mut record = vec![row.date.to_string(), row.bundle.doses.total().to_string()];
	record.extend(national_columns().map(|(_,metric)| row.bundle.value(*metric).to_string()));
	for vaccine in Vaccine::ALL.iter() {
	    record.extend(vaccine_columns().map(|(_,metric)| row.bundle.vaccine_value(*vaccine, *metric).to_string()));
	}
	record.extend(row.percents.iter().map(f64::to_string));
	writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())

}


/// A chart placed on the index page.
pub struct PageChart {
    pub id: String,
    pub title: String,
    pub data: Value,
}

/// The contents of the index page, already formatted.
pub struct Page {
    pub title: String,
    pub published: String,
    pub headline: Vec<(String,String)>,
    pub table_header: Vec<String>,
    pub table_rows: Vec<Vec<String>>,
    pub charts: Vec<PageChart>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn write_index(path: &Path, page: &Page) -> Result<()> {

    debug!("Writing {}", path.display());
    let mut out = io::BufWriter::new(File::create(path)?);

    write!(out, "<!DOCTYPE html><html lang=\"en\"><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>{}</title>", escape(&page.title))?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/frappe-charts@1.6.2/dist/frappe-charts.min.umd.js\"></script>")?;
    write!(out, "<style>body{{font-family:sans-serif;max-width:60em;margin:0 auto;padding:1em}}")?;
    write!(out, "table{{border-collapse:collapse}}td,th{{padding:.2em .6em;text-align:right}}")?;
    write!(out, "td:first-child,th:first-child{{text-align:left}}</style>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;
    write!(out, "<h1>{}</h1>", escape(&page.title))?;
    write!(out, "<p>Last updated: <time>{}</time></p>", escape(&page.published))?;

    write!(out, "<dl>")?;
    for (label,value) in &page.headline {
	write!(out, "<dt>{}</dt><dd>{}</dd>", escape(label), escape(value))?;
    }
    write!(out, "</dl>")?;

    write!(out, "<table><thead><tr>")?;
    for column in &page.table_header {
	write!(out, "<th>{}</th>", escape(column))?;
    }
    write!(out, "</tr></thead><tbody>")?;
    for row in &page.table_rows {
	write!(out, "<tr>")?;
	for cell in row {
	    write!(out, "<td>{}</td>", escape(cell))?;
	}
	write!(out, "</tr>")?;
    }
    write!(out, "</tbody></table>")?;

    for chart in &page.charts {
	write!(out, "<h2>{}</h2><div id=\"{}\"></div>", escape(&chart.title), chart.id)?;
    }

    write!(out, "<script>")?;
    for chart in &page.charts {
	write!(out, "new frappe.Chart('#{}', {{type:'axis-mixed',height:300,", chart.id)?;
	write!(out, "axisOptions:{{xIsSeries:true}},lineOptions:{{hideDots:1,regionFill:0}},data:")?;
	serde_json::to_writer(out.by_ref(), &chart.data)?;
	write!(out, "}});")?;
    }
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;
    writeln!(out)?;

    out.flush()?;
    Ok(())

}
