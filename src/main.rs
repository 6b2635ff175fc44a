mod anomalies;
mod date;
mod deliveries;
mod error;
mod format;
mod graph;
mod metrics;
mod population;
mod reader;
mod report;
mod series;
mod vaccinations;
mod vaccine;

use std::env;
use std::path::PathBuf;
use std::process;

use clap::{Parser,ValueEnum};
use log::{info,debug,error,LevelFilter};

use date::IsoDate;
use error::Result;
use report::{Report,ReportConfig};
use vaccinations::Metric;


#[derive(Parser,Debug)]
#[command(name = "impfreport", about = "Builds the German vaccination rollout report")]
struct Cli {
    /// Vaccination table, one row per state and day
    #[arg(long, default_value = "data/data.csv")]
    data: PathBuf,
    /// Delivery log, one row per delivery
    #[arg(long, default_value = "data/deliveries.csv")]
    deliveries: PathBuf,
    #[arg(long, value_enum, default_value_t = Delimiter::Comma)]
    deliveries_delimiter: Delimiter,
    /// Directory the report is written to
    #[arg(long, default_value = "output")]
    output: PathBuf,
    /// Last day of the report (YYYY-MM-DD or "today"); rows reported
    /// after it are ignored. Defaults to the latest reported day
    #[arg(long, value_parser = parse_until)]
    until: Option<IsoDate>,
    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone,Copy,Debug,PartialEq,ValueEnum)]
enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn byte(self) -> u8 {
	match self {
	    Delimiter::Comma => b',',
	    Delimiter::Tab => b'\t',
	}
    }
}

fn parse_until(s: &str) -> std::result::Result<IsoDate,String> {
    match s {
	"today" => Ok(IsoDate::today()),
	s => IsoDate::parse(s).map_err(|e| e.to_string()),
    }
}


fn main() {

    let cli = Cli::parse();

    match env::var_os("RUST_LOG") {
	Some(_) => pretty_env_logger::init(),
	None => pretty_env_logger::formatted_builder()
	    .filter_level(match cli.verbose {
		0 => LevelFilter::Info,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	    })
	    .init(),
    }

    if let Err(err) = run(&cli) {
	error!("{}", err);
	process::exit(1);
    }

}

fn run(cli: &Cli) -> Result<()> {

    let table = reader::read_table(&cli.data, b',')?;
    let vaccinations = vaccinations::build(&table, cli.until)?;

    let table = reader::read_table(&cli.deliveries, cli.deliveries_delimiter.byte())?;
    let events = deliveries::parse_events(&table)?;
    let deliveries = deliveries::aggregate(&events, vaccinations.series.latest())?;
    debug!("Delivered {} doses by {}, at most {} on any day",
	   deliveries.latest_total(), deliveries.latest_delivery_date, deliveries.max_total());

    let report = Report::build(&ReportConfig::default(), &vaccinations, &deliveries)?;
    report.write(&cli.output)?;

    info!("Done: {} doses administered, {} delivered",
	  format::format_count(metrics::latest_value(&vaccinations.series, Metric::TotalDoses, None)? as f64),
	  format::format_count(deliveries.latest_total() as f64));
    Ok(())

}
