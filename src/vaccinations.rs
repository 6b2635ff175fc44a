use std::ops::AddAssign;
use std::collections::BTreeMap;

use log::{info,warn,debug};

use super::date::IsoDate;
use super::error::{Result,Error};
use super::population::{Region,PerRegion};
use super::reader::{Table,Record};
use super::series::{DailySeries,fill_gaps_with};
use super::vaccine::{Vaccine,PerVaccine};


/// The cumulative counts that charts and metrics are computed from.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Metric {
    TotalDoses,
    FirstDoses,
    SecondDoses,
    BoosterDoses,
    AtLeastPartiallyVaccinated,
    OnlyPartiallyVaccinated,
    FullyVaccinated,
}

impl Metric {

    pub fn label(self) -> &'static str {
	match self {
	    Self::TotalDoses => "Total doses",
	    Self::FirstDoses => "First doses",
	    Self::SecondDoses => "Second doses",
	    Self::BoosterDoses => "Booster doses",
	    Self::AtLeastPartiallyVaccinated => "At least partially vaccinated",
	    Self::OnlyPartiallyVaccinated => "Only partially vaccinated",
	    Self::FullyVaccinated => "Fully vaccinated",
	}
    }

}


/// Cumulative doses by regimen step. First doses come from the
/// `initialDoses*` columns and second doses from the `finalDoses*`
/// columns of the source table.
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct DoseCounts {
    pub first: u64,
    pub second: u64,
    pub booster: u64,
}

impl DoseCounts {

    pub fn total(&self) -> u64 {
	self.first + self.second + self.booster
    }

    /// `single_dose` is the part of `second` given in a one-dose
    /// regimen: those people are fully vaccinated without a first dose.
    pub fn value(&self, metric: Metric, single_dose: u64) -> u64 {
	match metric {
	    Metric::TotalDoses => self.total(),
	    Metric::FirstDoses => self.first,
	    Metric::SecondDoses => self.second,
	    Metric::BoosterDoses => self.booster,
	    Metric::AtLeastPartiallyVaccinated => self.first + single_dose,
	    Metric::OnlyPartiallyVaccinated => (self.first + single_dose).saturating_sub(self.second),
	    Metric::FullyVaccinated => self.second,
	}
    }

    fn from_record(record: &Record, suffix: &str, required: bool) -> Result<DoseCounts> {
	let column = |step: &str| format!("{}DosesCumulative{}", step, suffix);
	let get = |column: &str| match required {
	    true => record.count(column),
	    false => record.optional_count(column),
	};
	Ok(DoseCounts {
	    first: get(&column("initial"))?,
	    second: get(&column("final"))?,
	    booster: record.optional_count(&column("booster"))?,
	})
    }

}

impl AddAssign for DoseCounts {
    fn add_assign(&mut self, other: DoseCounts) {
	self.first += other.first;
	self.second += other.second;
	self.booster += other.booster;
    }
}


/// Everything one region reported for one day.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct VaccinationBundle {
    pub doses: DoseCounts,
    pub by_vaccine: PerVaccine<DoseCounts>,
}

impl VaccinationBundle {

    pub fn value(&self, metric: Metric) -> u64 {
	let single_dose = Vaccine::ALL.iter().filter(|vaccine| vaccine.is_single_dose())
	    .map(|vaccine| self.by_vaccine[*vaccine].second).sum();
	self.doses.value(metric, single_dose)
    }

    pub fn vaccine_value(&self, vaccine: Vaccine, metric: Metric) -> u64 {
	let counts = &self.by_vaccine[vaccine];
	counts.value(metric, if vaccine.is_single_dose() { counts.second } else { 0 })
    }

    fn from_record(record: &Record) -> Result<VaccinationBundle> {
	let mut by_vaccine = PerVaccine::default();
	for vaccine in Vaccine::ALL.iter() {
	    by_vaccine[*vaccine] = DoseCounts::from_record(record, vaccine.column_suffix(), false)?;
	}
	Ok(VaccinationBundle {
	    doses: DoseCounts::from_record(record, "", true)?,
	    by_vaccine,
	})
    }

}

impl<'a> AddAssign<&'a VaccinationBundle> for VaccinationBundle {
    fn add_assign(&mut self, other: &'a VaccinationBundle) {
	self.doses += other.doses;
	for vaccine in Vaccine::ALL.iter() {
	    self.by_vaccine[*vaccine] += other.by_vaccine[*vaccine];
	}
    }
}

pub type VaccinationDay = PerRegion<VaccinationBundle>;

/// Sum over all regions, the federal sites included.
pub fn national(day: &VaccinationDay) -> VaccinationBundle {
    day.values().fold(VaccinationBundle::default(), |mut sum, bundle| {
	sum += bundle;
	sum
    })
}


pub struct Vaccinations {
    pub series: DailySeries<VaccinationDay>,
    pub latest_pub_date: IsoDate,
}

/// Builds the gap-filled per-state series from the daily table.
///
/// The series runs from the earliest reported day to `until`, or to the
/// latest reported day when `until` is `None`. Rows after `until` are
/// left out. A state missing from a day that has data for other states
/// keeps its previous values.
pub fn build(table: &Table, until: Option<IsoDate>) -> Result<Vaccinations> {

    let mut observed: BTreeMap<IsoDate,PerRegion<Option<VaccinationBundle>>> = BTreeMap::new();
    let mut pub_dates: BTreeMap<IsoDate,IsoDate> = BTreeMap::new();

    for record in table.records() {
	let date = record.date("date")?;
	let pub_date = record.date("pubDate")?;
	let region = Region::from_name(record.get("state")?)?;
	let slot = &mut observed.entry(date).or_default()[region];
	if slot.is_some() {
	    return Err(Error::DuplicateObservation { date, region });
	}
	*slot = Some(VaccinationBundle::from_record(&record)?);
	let latest_pub = pub_dates.entry(date).or_insert(pub_date);
	*latest_pub = (*latest_pub).max(pub_date);
    }

    let oldest = *observed.keys().next().ok_or(Error::MissingData("vaccination table"))?;
    let latest = match until {
	Some(until) if until < oldest => return Err(Error::InvalidRange { oldest, latest: until }),
	Some(until) => {
	    let later = observed.split_off(&until.add_days(1));
	    if !later.is_empty() {
		warn!("Ignoring {} reported days after {}", later.len(), until);
	    }
	    until
	},
	None => *observed.keys().next_back().ok_or(Error::MissingData("vaccination table"))?,
    };
    let latest_pub_date = pub_dates.range(..=latest).map(|(_,pub_date)| *pub_date).max()
	.ok_or(Error::MissingData("vaccination table"))?;

    info!("Vaccination data: {} reported days out of {} from {} to {}, published {}",
	  observed.len(), oldest.days_until(latest) + 1, oldest, latest, latest_pub_date);

    let filled = fill_gaps_with(observed, oldest, latest, |date, mut today, filled| {
	for region in Region::ALL.iter() {
	    match today[*region].take() {
		Some(bundle) => filled[*region] = Some(bundle),
		None if filled[*region].is_some() =>
		    warn!("{} did not report on {}, carrying forward", region.name(), date),
		None => {},
	    }
	}
    })?;

    let series = filled.try_map(|date, day| complete_day(date, day))?;
    debug!("Filled vaccination series to {} days", series.len());

    Ok(Vaccinations { series, latest_pub_date })

}

/// States must be present; the pseudo-region may never have reported.
fn complete_day(date: IsoDate, day: &PerRegion<Option<VaccinationBundle>>) -> Result<VaccinationDay> {
    let mut complete = VaccinationDay::default();
    for (region,bundle) in day.iter() {
	complete[region] = match (bundle, region.is_pseudo()) {
	    (Some(bundle), _) => bundle.clone(),
	    (None, true) => VaccinationBundle::default(),
	    (None, false) => return Err(Error::IncompleteDay { date, region }),
	};
    }
    Ok(complete)
}
