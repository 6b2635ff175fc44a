use std::fs;
use std::path::Path;

use log::info;

use super::anomalies::AnomalyLog;
use super::date::IsoDate;
use super::deliveries::Deliveries;
use super::error::Result;
use super::format::{format_count,format_percent};
use super::graph::{self,Chart,ChartType,NationalRow,Page,PageChart};
use super::metrics::{DerivedMetric,Summary,percent_of_population,summarize};
use super::population::Region;
use super::vaccinations::{Metric,Vaccinations,VaccinationBundle,national};
use super::vaccine::Vaccine;


const DOSE_METRICS: [Metric; 4] = [Metric::TotalDoses, Metric::FirstDoses,
				   Metric::SecondDoses, Metric::BoosterDoses];

/// What the report shows besides the charts.
#[derive(Clone,Debug)]
pub struct ReportConfig {
    pub title: String,
    pub metrics: Vec<DerivedMetric>,
}

impl Default for ReportConfig {
    fn default() -> Self {
	ReportConfig {
	    title: "COVID-19 vaccination doses administered in Germany".to_string(),
	    metrics: vec![
		DerivedMetric::Current(Metric::TotalDoses),
		DerivedMetric::Current(Metric::FirstDoses),
		DerivedMetric::Current(Metric::SecondDoses),
		DerivedMetric::Current(Metric::BoosterDoses),
		DerivedMetric::PercentOfPopulation(Metric::AtLeastPartiallyVaccinated),
		DerivedMetric::PercentOfPopulation(Metric::FullyVaccinated),
		DerivedMetric::PercentOfPopulation(Metric::BoosterDoses),
		DerivedMetric::SevenDayAverage(Metric::TotalDoses),
		DerivedMetric::ShareOfDelivered,
	    ],
	}
    }
}


/// Everything the report writes, computed up front.
pub struct Report {
    national: Chart<u64>,
    percent: Chart<f64>,
    deliveries: Chart<u64>,
    states: Vec<(Region,Chart<u64>)>,
    anomalies: AnomalyLog,
    national_rows: Vec<NationalRow>,
    page: Page,
}

impl Report {

    pub fn build(config: &ReportConfig, vaccinations: &Vaccinations, deliveries: &Deliveries) -> Result<Report> {

	let series = &vaccinations.series;
	let labels = series.dates();
	let totals = series.pluck(national);

	let mut national_chart = Chart::new(labels.clone());
	national_chart.push("Available doses", ChartType::Bar,
			    labels.iter().map(|date| deliveries.delivered_on(*date)).collect());
	for metric in DOSE_METRICS.iter() {
	    national_chart.push(metric.label(), ChartType::Line,
				totals.iter().map(|bundle| bundle.value(*metric)).collect());
	}

	let mut percent: Chart<f64> = Chart::new(labels.clone());
	for state in Region::STATES.iter() {
	    let values = series.iter().map(|(_,day)| Ok(round_percent(percent_of_population(
		day[*state].value(Metric::AtLeastPartiallyVaccinated) as f64, Some(*state))?)))
		.collect::<Result<_>>()?;
	    percent.push(state.name(), ChartType::Line, values);
	}

	let delivered: Vec<_> = labels.iter().map(|date| deliveries.delivered_by_vaccine_on(*date)).collect();
	let mut deliveries_chart = Chart::new(labels.clone());
	for vaccine in Vaccine::ALL.iter() {
	    deliveries_chart.push(vaccine.label(), ChartType::Line,
				  delivered.iter().map(|day| day[*vaccine]).collect());
	}

	let mut anomalies = AnomalyLog::default();
	let states = Region::STATES.iter().map(|state| {
	    let mut chart = Chart::new(labels.clone());
	    for metric in DOSE_METRICS.iter() {
		chart.push(metric.label(), ChartType::Line, series.pluck(|day| day[*state].value(*metric)));
	    }
	    for dataset in &chart.datasets {
		anomalies.scan(state.name(), &dataset.name, &chart.labels, &dataset.values);
	    }
	    (*state, chart)
	}).collect::<Vec<_>>();
	info!("Found {} anomalies", anomalies.len());

	let national_summary = summarize(&config.metrics, series, deliveries, None)?;
	let state_summaries = Region::STATES.iter()
	    .map(|state| summarize(&config.metrics, series, deliveries, Some(*state)))
	    .collect::<Result<Vec<_>>>()?;

	let national_rows = labels.iter().zip(totals.into_iter()).map(|(date,bundle)| national_row(*date, bundle))
	    .collect::<Result<Vec<_>>>()?;

	let page = index_page(config, vaccinations, deliveries, &national_summary, &state_summaries,
			      vec![("national", "Germany", serde_json::to_value(&national_chart)?),
				("percent", "At least partially vaccinated (% of population)", serde_json::to_value(&percent)?),
				("deliveries", "Doses delivered by vaccine", serde_json::to_value(&deliveries_chart)?)],
			      &states)?;

	Ok(Report { national: national_chart, percent, deliveries: deliveries_chart, states, anomalies,
		    national_rows, page })

    }

    /// Writes all report files into `out_dir`, replacing earlier ones.
    pub fn write(&self, out_dir: &Path) -> Result<()> {
	fs::create_dir_all(out_dir)?;
	graph::write_json(&out_dir.join("national-data.json"), &self.national)?;
	graph::write_json(&out_dir.join("percent-data.json"), &self.percent)?;
	graph::write_json(&out_dir.join("deliveries-data.json"), &self.deliveries)?;
	for (state,chart) in &self.states {
	    let name = format!("state-data-{}.json", graph::slug(state.name()));
	    graph::write_json(&out_dir.join(name), chart)?;
	}
	graph::write_text(&out_dir.join("anomalies.json"), &format!("{}\n", self.anomalies.to_json()?))?;
	graph::write_text(&out_dir.join("anomalies.md"), &self.anomalies.to_markdown())?;
	graph::write_national_csv(&out_dir.join("national-total.csv"), &self.national_rows)?;
	graph::write_index(&out_dir.join("index.html"), &self.page)?;
	info!("Wrote report for {} days to {}", self.national.labels.len(), out_dir.display());
	Ok(())
    }

}


fn round_percent(percent: f64) -> f64 {
    (percent * 100.0).round() / 100.0
}

fn national_row(date: IsoDate, bundle: VaccinationBundle) -> Result<NationalRow> {
    let percents = graph::percent_metrics()
	.map(|metric| percent_of_population(bundle.value(metric) as f64, None))
	.collect::<Result<_>>()?;
    Ok(NationalRow { date, bundle, percents })
}

fn format_value(metric: DerivedMetric, value: f64) -> String {
    match metric.is_percent() {
	true => format!("{}%", format_percent(value)),
	false => format_count(value),
    }
}

/// `national` are the charts shown above the per-state ones, as
/// (id, title, data).
fn index_page(config: &ReportConfig, vaccinations: &Vaccinations, deliveries: &Deliveries,
	      national_summary: &Summary, state_summaries: &[Summary],
	      national: Vec<(&str,&str,serde_json::Value)>,
	      states: &[(Region,Chart<u64>)]) -> Result<Page> {

    let mut headline: Vec<_> = national_summary.values.iter()
	.map(|(metric,value)| (metric.label(), format_value(*metric, *value)))
	.collect();
    headline.push(("Doses delivered".to_string(), format_count(deliveries.latest_total() as f64)));
    headline.push(("Latest delivery".to_string(), deliveries.latest_delivery_date.to_string()));

    let mut table_header = vec!["State".to_string()];
    table_header.extend(config.metrics.iter().map(DerivedMetric::label));
    let table_rows = state_summaries.iter().map(|summary| {
	let mut row = vec![summary.region.map_or("Germany", Region::name).to_string()];
	row.extend(summary.values.iter().map(|(metric,value)| format_value(*metric, *value)));
	row
    }).collect();

    let mut charts: Vec<_> = national.into_iter().map(|(id,title,data)| PageChart {
	id: id.to_string(),
	title: title.to_string(),
	data,
    }).collect();
    for (state,chart) in states {
	charts.push(PageChart {
	    id: format!("state-{}", graph::slug(state.name())),
	    title: state.name().to_string(),
	    data: serde_json::to_value(chart)?,
	});
    }

    Ok(Page {
	title: config.title.clone(),
	published: vaccinations.latest_pub_date.to_string(),
	headline,
	table_header,
	table_rows,
	charts,
    })

}
