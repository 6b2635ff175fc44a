use super::date::IsoDate;
use super::deliveries::Deliveries;
use super::error::{Result,Error};
use super::population::{Region,POPULATION_GERMANY};
use super::series::DailySeries;
use super::vaccinations::{Metric,VaccinationDay,national};


/// Share of the population of `region` (of Germany when `None`), in percent.
pub fn percent_of_population(value: f64, region: Option<Region>) -> Result<f64> {
    let population = match region {
	None => POPULATION_GERMANY,
	Some(region) => region.population().ok_or(Error::NoPopulation(region))?,
    };
    Ok(value / population as f64 * 100.0)
}

/// Administered doses as a percentage of delivered doses.
pub fn ratio_to_delivered(administered: u64, delivered: u64) -> Result<f64> {
    match delivered {
	0 => Err(Error::NothingDelivered),
	delivered => Ok(administered as f64 / delivered as f64 * 100.0),
    }
}

pub fn value_on(series: &DailySeries<VaccinationDay>, date: IsoDate,
		metric: Metric, region: Option<Region>) -> Option<u64> {
    series.get(date).map(|day| match region {
	Some(region) => day[region].value(metric),
	None => national(day).value(metric),
    })
}

pub fn latest_value(series: &DailySeries<VaccinationDay>, metric: Metric,
		    region: Option<Region>) -> Result<u64> {
    let latest = series.latest().ok_or(Error::MissingData("vaccination series"))?;
    value_on(series, latest, metric, region).ok_or(Error::MissingData("vaccination series"))
}

/// Average daily increase over the last seven days of the series.
pub fn seven_day_average(series: &DailySeries<VaccinationDay>, metric: Metric,
			 region: Option<Region>) -> Result<f64> {
    let latest = series.latest().ok_or(Error::MissingData("vaccination series"))?;
    let week_ago = latest.add_days(-7);
    let old = value_on(series, week_ago, metric, region)
	.ok_or(Error::RangeTooShort { latest, days: 7 })?;
    let current = latest_value(series, metric, region)?;
    Ok((current as f64 - old as f64) / 7.0)
}


/// A figure a report can ask for.
#[derive(Clone,Copy,Debug,PartialEq)]
pub enum DerivedMetric {
    Current(Metric),
    PercentOfPopulation(Metric),
    SevenDayAverage(Metric),
    ShareOfDelivered,
}

impl DerivedMetric {

    pub fn label(&self) -> String {
	match self {
	    Self::Current(metric) => metric.label().to_string(),
	    Self::PercentOfPopulation(metric) => format!("{} (% of population)", metric.label()),
	    Self::SevenDayAverage(metric) => format!("{} per day (7-day average)", metric.label()),
	    Self::ShareOfDelivered => "Doses administered (% of delivered)".to_string(),
	}
    }

    pub fn is_percent(&self) -> bool {
	matches!(self, Self::PercentOfPopulation(_) | Self::ShareOfDelivered)
    }

    pub fn compute(&self, vaccinations: &DailySeries<VaccinationDay>, deliveries: &Deliveries,
		   region: Option<Region>) -> Result<f64> {
	match *self {
	    Self::Current(metric) => Ok(latest_value(vaccinations, metric, region)? as f64),
	    Self::PercentOfPopulation(metric) =>
		percent_of_population(latest_value(vaccinations, metric, region)? as f64, region),
	    Self::SevenDayAverage(metric) => seven_day_average(vaccinations, metric, region),
	    Self::ShareOfDelivered =>
		ratio_to_delivered(latest_value(vaccinations, Metric::TotalDoses, region)?,
				   deliveries.latest_for(region)),
	}
    }

}


/// The configured figures for one region, or for Germany as a whole.
#[derive(Clone,Debug,PartialEq)]
pub struct Summary {
    pub region: Option<Region>,
    pub values: Vec<(DerivedMetric,f64)>,
}

#[cfg(test)]
impl Summary {

    pub fn get(&self, metric: DerivedMetric) -> Option<f64> {
	self.values.iter().find(|(m,_)| *m == metric).map(|(_,v)| *v)
    }

}

pub fn summarize(metrics: &[DerivedMetric], vaccinations: &DailySeries<VaccinationDay>,
		 deliveries: &Deliveries, region: Option<Region>) -> Result<Summary> {
    Ok(Summary {
	region,
	values: metrics.iter().map(
	    |metric| Ok((*metric, metric.compute(vaccinations, deliveries, region)?))
	).collect::<Result<_>>()?,
    })
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::deliveries::{aggregate,tests::round};
    use crate::reader::Table;
    use crate::vaccinations::{build,tests::{date,uniform_table}};

    fn series(days: &[(&str,u64,u64)]) -> DailySeries<VaccinationDay> {
	let csv = uniform_table(days);
	build(&Table::from_text(&csv, b',').unwrap(), None).unwrap().series
    }

    #[test]
    fn percent_uses_population() {
	let berlin = Region::Berlin.population().unwrap() as f64;
	assert_eq!(percent_of_population(berlin / 2.0, Some(Region::Berlin)).unwrap(), 50.0);
	assert_eq!(percent_of_population(POPULATION_GERMANY as f64, None).unwrap(), 100.0);
	assert!(matches!(percent_of_population(1.0, Some(Region::Federal)), Err(Error::NoPopulation(_))));
    }

    #[test]
    fn percent_grows_with_value() {
	let mut previous = 0.0;
	for value in (0..2_000_000).step_by(99_991) {
	    let percent = percent_of_population(value as f64, Some(Region::Bremen)).unwrap();
	    assert!(percent >= previous);
	    previous = percent;
	}
    }

    #[test]
    fn percent_keeps_full_precision() {
	let percent = percent_of_population(1.0, Some(Region::Bremen)).unwrap();
	assert!(percent > 0.0 && percent < 0.001);
    }

    #[test]
    fn seven_day_average_of_difference() {
	let s = series(&[("2021-02-01", 250, 0), ("2021-02-08", 425, 0)]);
	assert_eq!(seven_day_average(&s, Metric::FirstDoses, Some(Region::BadenWuerttemberg)).unwrap(),
		   25.0);
	let s = series(&[("2021-02-01", 500, 500), ("2021-02-08", 850, 850)]);
	assert_eq!(seven_day_average(&s, Metric::TotalDoses, Some(Region::BadenWuerttemberg)).unwrap(),
		   100.0);
	// Bayern is the second state, so its counts are doubled.
	assert_eq!(seven_day_average(&s, Metric::TotalDoses, Some(Region::Bayern)).unwrap(), 200.0);
	assert_eq!(seven_day_average(&s, Metric::TotalDoses, None).unwrap(), 100.0 * 136.0);
    }

    #[test]
    fn seven_day_average_needs_a_week() {
	let s = series(&[("2021-02-01", 1, 1), ("2021-02-07", 2, 2)]);
	match seven_day_average(&s, Metric::TotalDoses, None) {
	    Err(Error::RangeTooShort { latest, days }) => {
		assert_eq!(latest, date("2021-02-07"));
		assert_eq!(days, 7);
	    }
	    other => panic!("unexpected {:?}", other),
	}
    }

    #[test]
    fn ratio_to_delivered_rejects_zero() {
	assert_eq!(ratio_to_delivered(50, 200).unwrap(), 25.0);
	assert!(matches!(ratio_to_delivered(50, 0), Err(Error::NothingDelivered)));
	assert!(matches!(ratio_to_delivered(0, 0), Err(Error::NothingDelivered)));
    }

    #[test]
    fn national_values_sum_regions() {
	let s = series(&[("2021-02-01", 10, 1)]);
	assert_eq!(latest_value(&s, Metric::FirstDoses, None).unwrap(), 10 * 136);
	assert_eq!(latest_value(&s, Metric::TotalDoses, Some(Region::Thueringen)).unwrap(), 11 * 16);
	assert_eq!(value_on(&s, date("2021-01-31"), Metric::TotalDoses, None), None);
    }

    #[test]
    fn summarizes_configured_metrics() {
	let s = series(&[("2021-02-01", 10, 0), ("2021-02-08", 80, 0)]);
	let deliveries = aggregate(&round("2021-01-04", 160), None).unwrap();
	let metrics = [DerivedMetric::Current(Metric::FirstDoses),
		       DerivedMetric::SevenDayAverage(Metric::FirstDoses),
		       DerivedMetric::ShareOfDelivered];
	let summary = summarize(&metrics, &s, &deliveries, Some(Region::BadenWuerttemberg)).unwrap();
	assert_eq!(summary.get(DerivedMetric::Current(Metric::FirstDoses)), Some(80.0));
	assert_eq!(summary.get(DerivedMetric::SevenDayAverage(Metric::FirstDoses)), Some(10.0));
	assert_eq!(summary.get(DerivedMetric::ShareOfDelivered), Some(50.0));
	assert_eq!(summary.get(DerivedMetric::PercentOfPopulation(Metric::FirstDoses)), None);

	let national = summarize(&metrics, &s, &deliveries, None).unwrap();
	assert_eq!(national.get(DerivedMetric::ShareOfDelivered), Some(80.0 * 136.0 / 2560.0 * 100.0));
    }

    #[test]
    fn vaccinated_people_as_share_of_population() {
	let s = series(&[("2021-02-01", 100, 40)]);
	let deliveries = aggregate(&round("2021-01-04", 160), None).unwrap();
	let metrics = [DerivedMetric::PercentOfPopulation(Metric::AtLeastPartiallyVaccinated),
		       DerivedMetric::PercentOfPopulation(Metric::FullyVaccinated),
		       DerivedMetric::Current(Metric::OnlyPartiallyVaccinated)];
	let summary = summarize(&metrics, &s, &deliveries, None).unwrap();
	let population = POPULATION_GERMANY as f64;
	assert_eq!(summary.get(metrics[0]), Some(100.0 * 136.0 / population * 100.0));
	assert_eq!(summary.get(metrics[1]), Some(40.0 * 136.0 / population * 100.0));
	assert_eq!(summary.get(metrics[2]), Some(60.0 * 136.0));
    }

    #[test]
    fn computing_twice_gives_the_same_figures() {
	let s = series(&[("2021-02-01", 10, 2), ("2021-02-05", 40, 9), ("2021-02-09", 95, 30)]);
	let deliveries = aggregate(&round("2021-01-04", 500), None).unwrap();
	let metrics = [DerivedMetric::Current(Metric::TotalDoses),
		       DerivedMetric::PercentOfPopulation(Metric::AtLeastPartiallyVaccinated),
		       DerivedMetric::SevenDayAverage(Metric::FirstDoses),
		       DerivedMetric::ShareOfDelivered];
	for region in [None, Some(Region::Sachsen)] {
	    let first = summarize(&metrics, &s, &deliveries, region).unwrap();
	    let second = summarize(&metrics, &s, &deliveries, region).unwrap();
	    assert_eq!(first, second);
	}
	assert_eq!(seven_day_average(&s, Metric::TotalDoses, None).unwrap(),
		   seven_day_average(&s, Metric::TotalDoses, None).unwrap());
	assert_eq!(percent_of_population(1234.0, Some(Region::Hessen)).unwrap(),
		   percent_of_population(1234.0, Some(Region::Hessen)).unwrap());
    }

}
