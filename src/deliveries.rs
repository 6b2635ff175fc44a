use std::collections::BTreeMap;

use log::{info,debug};

use super::date::IsoDate;
use super::error::{Result,Error};
use super::population::{Region,PerRegion};
use super::reader::Table;
use super::series::{DailySeries,fill_gaps,fill_gaps_with};
use super::vaccine::{Vaccine,PerVaccine};


/// One row of the delivery log: doses handed to a region on a day.
#[derive(Clone,Debug,PartialEq)]
pub struct DeliveryEvent {
    pub date: IsoDate,
    pub region: Region,
    pub vaccine: Vaccine,
    pub doses: i64,
}

pub fn parse_events(table: &Table) -> Result<Vec<DeliveryEvent>> {
    table.records().map(|record| Ok(DeliveryEvent {
	date: record.date("date")?,
	region: Region::from_name(record.get("state")?)?,
	vaccine: Vaccine::from_name(record.get("type")?)?,
	doses: record.signed("doses")?,
    })).collect()
}


/// Running delivery totals per region on one day, with their sum.
#[derive(Clone,Debug,PartialEq)]
pub struct DeliverySnapshot {
    pub regions: PerRegion<u64>,
    pub total: u64,
}

impl DeliverySnapshot {

    fn new(regions: PerRegion<u64>) -> Self {
	let total = regions.values().sum();
	DeliverySnapshot { regions, total }
    }

}


pub struct Deliveries {
    pub series: DailySeries<DeliverySnapshot>,
    pub by_vaccine: DailySeries<PerVaccine<u64>>,
    pub latest_delivery_date: IsoDate,
}

impl Deliveries {

    /// National total on the last day of the series.
    pub fn latest_total(&self) -> u64 {
	self.series.last().map_or(0, |(_,snapshot)| snapshot.total)
    }

    /// Largest national total on any day. Equal to `latest_total` unless
    /// the log was corrected downwards, which `aggregate` rejects.
    pub fn max_total(&self) -> u64 {
	self.series.pluck(|snapshot| snapshot.total).into_iter().max().unwrap_or(0)
    }

    /// Latest cumulative deliveries to one region, or nationally.
    pub fn latest_for(&self, region: Option<Region>) -> u64 {
	match region {
	    None => self.latest_total(),
	    Some(region) => self.series.last().map_or(0, |(_,snapshot)| snapshot.regions[region]),
	}
    }

    /// National cumulative deliveries as of `date`: nothing before the
    /// first delivery, the latest total after the series ends.
    pub fn delivered_on(&self, date: IsoDate) -> u64 {
	day_of(&self.series, date).map_or(0, |snapshot| snapshot.total)
    }

    /// Cumulative deliveries of each vaccine as of `date`.
    pub fn delivered_by_vaccine_on(&self, date: IsoDate) -> PerVaccine<u64> {
	day_of(&self.by_vaccine, date).copied().unwrap_or_default()
    }

}

fn day_of<T>(series: &DailySeries<T>, date: IsoDate) -> Option<&T> {
    match series.get(date) {
	Some(day) => Some(day),
	None if series.oldest().map_or(true, |oldest| date < oldest) => None,
	None => series.last().map(|(_,day)| day),
    }
}


#[derive(Default)]
struct Tally {
    counts: PerRegion<u64>,
    by_date: BTreeMap<IsoDate,PerRegion<Option<u64>>>,
    vaccines_by_date: BTreeMap<IsoDate,PerVaccine<u64>>,
}

/// Accumulates the events (in file order) into cumulative series running
/// from the first delivery to the later of the last delivery and `until`.
///
/// A region without an event on a delivery day keeps its previous total.
/// Every state must have received a delivery on the first day, since
/// there is nothing earlier to carry forward; the federal pseudo-region
/// starts at zero.
pub fn aggregate(events: &[DeliveryEvent], until: Option<IsoDate>) -> Result<Deliveries> {

    let tally = events.iter().try_fold(Tally::default(), |mut tally, event| {
	if event.doses < 0 {
	    return Err(Error::DecreasingDeliveries { date: event.date, region: event.region });
	}
	let doses = event.doses as u64;
	tally.counts[event.region] += doses;
	tally.by_date.entry(event.date).or_default()[event.region] = Some(tally.counts[event.region]);
	tally.vaccines_by_date.entry(event.date).or_default()[event.vaccine] += doses;
	Ok(tally)
    })?;

    let oldest = *tally.by_date.keys().next().ok_or(Error::MissingData("delivery table"))?;
    let latest_delivery_date = *tally.by_date.keys().next_back().ok_or(Error::MissingData("delivery table"))?;
    let latest = until.map_or(latest_delivery_date, |until| until.max(latest_delivery_date));

    info!("Deliveries: {} events on {} days from {} to {}",
	  events.len(), tally.by_date.len(), oldest, latest_delivery_date);

    let filled = fill_gaps_with(tally.by_date, oldest, latest, |_, today, filled| {
	for region in Region::ALL.iter() {
	    if let Some(count) = today[*region] {
		filled[*region] = Some(count);
	    }
	}
    })?;

    let series = filled.try_map(|date, day| {
	let mut regions = PerRegion::default();
	for (region,count) in day.iter() {
	    regions[region] = match (count, region.is_pseudo()) {
		(Some(count), _) => *count,
		(None, true) => 0,
		(None, false) => return Err(Error::IncompleteDay { date, region }),
	    };
	}
	Ok(DeliverySnapshot::new(regions))
    })?;

    check_monotonic(&series)?;

    // Per-vaccine deliveries are kept per date, so they add up in date
    // order whatever order the log lists them in.
    let vaccine_totals = tally.vaccines_by_date.into_iter()
	.scan(PerVaccine::<u64>::default(), |running, (date,delivered)| {
	    for (vaccine,doses) in delivered.iter() {
		running[vaccine] += *doses;
	    }
	    Some((date, *running))
	}).collect();
    let by_vaccine = fill_gaps(vaccine_totals, oldest, latest)?;
    debug!("Filled delivery series to {} days", series.len());

    Ok(Deliveries { series, by_vaccine, latest_delivery_date })

}

/// Events for one region listed out of date order would make the
/// snapshots taken on the earlier date larger than later ones.
fn check_monotonic(series: &DailySeries<DeliverySnapshot>) -> Result<()> {
    let mut previous: Option<&DeliverySnapshot> = None;
    for (date,snapshot) in series.iter() {
	if let Some(previous) = previous {
	    if let Some(region) = Region::ALL.iter().find(|r| snapshot.regions[**r] < previous.regions[**r]) {
		return Err(Error::DecreasingDeliveries { date, region: *region });
	    }
	}
	previous = Some(snapshot);
    }
    Ok(())
}


#[cfg(test)]
pub mod tests {

    use super::*;

    fn date(s: &str) -> IsoDate {
	IsoDate::parse(s).unwrap()
    }

    fn event(day: &str, region: Region, vaccine: Vaccine, doses: i64) -> DeliveryEvent {
	DeliveryEvent { date: date(day), region, vaccine, doses }
    }

    /// Every state gets `doses` of BioNTech on `day`.
    pub fn round(day: &str, doses: i64) -> Vec<DeliveryEvent> {
	Region::STATES.iter().map(|r| event(day, *r, Vaccine::BioNTech, doses)).collect()
    }

    #[test]
    fn parses_delivery_table() {
	let table = Table::from_text("date,state,type,doses\n2021-01-04,Bayern,comirnaty,100\n\
				      2021-01-05,Bund,Moderna,20\n", b',').unwrap();
	let events = parse_events(&table).unwrap();
	assert_eq!(events, vec![event("2021-01-04", Region::Bayern, Vaccine::BioNTech, 100),
				event("2021-01-05", Region::Federal, Vaccine::Moderna, 20)]);

	let table = Table::from_text("date,state,type,doses\n2021-01-04,Bayern,sputnik,1\n", b',').unwrap();
	assert!(matches!(parse_events(&table), Err(Error::UnknownVaccine(_))));
    }

    #[test]
    fn totals_are_sums_of_regions() {
	let mut events = round("2021-01-04", 100);
	events.push(event("2021-01-04", Region::Federal, Vaccine::Moderna, 50));
	events.push(event("2021-01-06", Region::Bayern, Vaccine::Moderna, 30));
	events.extend(round("2021-01-11", 10));
	let deliveries = aggregate(&events, None).unwrap();

	assert_eq!(deliveries.series.len(), 8);
	for (_,snapshot) in deliveries.series.iter() {
	    assert_eq!(snapshot.total, snapshot.regions.values().sum::<u64>());
	}
	assert_eq!(deliveries.series.pluck(|s| s.total),
		   vec![1650, 1650, 1680, 1680, 1680, 1680, 1680, 1840]);
	assert_eq!(deliveries.latest_delivery_date, date("2021-01-11"));
	assert_eq!(deliveries.latest_total(), 1840);
	assert_eq!(deliveries.max_total(), 1840);
    }

    #[test]
    fn regions_without_events_stay_flat() {
	let mut events = round("2021-01-04", 100);
	events.push(event("2021-01-05", Region::Berlin, Vaccine::BioNTech, 7));
	let deliveries = aggregate(&events, None).unwrap();
	let tuesday = deliveries.series.get(date("2021-01-05")).unwrap();
	assert_eq!(tuesday.regions[Region::Berlin], 107);
	assert_eq!(tuesday.regions[Region::Bremen], 100);
	assert_eq!(tuesday.regions[Region::Federal], 0);
	assert_eq!(deliveries.latest_for(Some(Region::Berlin)), 107);
	assert_eq!(deliveries.latest_for(None), 1607);
    }

    #[test]
    fn incomplete_first_day_fails() {
	let events = vec![event("2021-01-04", Region::Bayern, Vaccine::BioNTech, 100)];
	match aggregate(&events, None) {
	    Err(Error::IncompleteDay { date: d, region }) => {
		assert_eq!(d, date("2021-01-04"));
		assert_eq!(region, Region::BadenWuerttemberg);
	    }
	    Err(other) => panic!("unexpected {:?}", other),
	    Ok(_) => panic!("incomplete first day accepted"),
	}
    }

    #[test]
    fn decreases_fail() {
	let mut events = round("2021-01-04", 100);
	events.push(event("2021-01-05", Region::Berlin, Vaccine::BioNTech, -7));
	assert!(matches!(aggregate(&events, None), Err(Error::DecreasingDeliveries { .. })));

	let mut events = round("2021-01-04", 100);
	events.push(event("2021-01-06", Region::Berlin, Vaccine::BioNTech, 5));
	events.push(event("2021-01-05", Region::Berlin, Vaccine::BioNTech, 5));
	match aggregate(&events, None) {
	    Err(Error::DecreasingDeliveries { date: d, region }) => {
		assert_eq!(d, date("2021-01-06"));
		assert_eq!(region, Region::Berlin);
	    }
	    Err(other) => panic!("unexpected {:?}", other),
	    Ok(_) => panic!("out-of-order log accepted"),
	}
    }

    #[test]
    fn extends_to_until_and_answers_by_date() {
	let mut events = round("2021-01-04", 100);
	events.extend(round("2021-01-06", 100));
	let deliveries = aggregate(&events, Some(date("2021-01-09"))).unwrap();
	assert_eq!(deliveries.series.len(), 6);
	assert_eq!(deliveries.latest_delivery_date, date("2021-01-06"));
	assert_eq!(deliveries.delivered_on(date("2021-01-03")), 0);
	assert_eq!(deliveries.delivered_on(date("2021-01-05")), 1600);
	assert_eq!(deliveries.delivered_on(date("2021-01-09")), 3200);
	assert_eq!(deliveries.delivered_on(date("2021-02-01")), 3200);

	// An earlier `until` never cuts deliveries off.
	let deliveries = aggregate(&events, Some(date("2021-01-05"))).unwrap();
	assert_eq!(deliveries.series.latest(), Some(date("2021-01-06")));
    }

    #[test]
    fn breaks_down_by_vaccine() {
	let mut events = round("2021-01-04", 100);
	events.push(event("2021-01-06", Region::Hessen, Vaccine::AstraZeneca, 40));
	events.push(event("2021-01-06", Region::Hessen, Vaccine::Moderna, 10));
	let deliveries = aggregate(&events, None).unwrap();
	let by_vaccine = &deliveries.by_vaccine;
	assert_eq!(by_vaccine.len(), 3);
	let tuesday = by_vaccine.get(date("2021-01-05")).unwrap();
	assert_eq!(tuesday[Vaccine::BioNTech], 1600);
	assert_eq!(tuesday[Vaccine::AstraZeneca], 0);
	let wednesday = by_vaccine.get(date("2021-01-06")).unwrap();
	assert_eq!(wednesday[Vaccine::AstraZeneca], 40);
	assert_eq!(wednesday[Vaccine::Moderna], 10);
	assert_eq!(wednesday.iter().map(|(_,n)| *n).sum::<u64>(),
		   deliveries.series.get(date("2021-01-06")).unwrap().total);
    }

    #[test]
    fn vaccine_totals_follow_dates_not_file_order() {
	let mut events = round("2021-01-04", 100);
	events.push(event("2021-01-06", Region::Bayern, Vaccine::Moderna, 50));
	events.push(event("2021-01-05", Region::Berlin, Vaccine::Moderna, 10));
	let deliveries = aggregate(&events, Some(date("2021-01-07"))).unwrap();

	for (day,snapshot) in deliveries.series.iter() {
	    let vaccines = deliveries.by_vaccine.get(day).unwrap();
	    assert_eq!(vaccines.iter().map(|(_,n)| *n).sum::<u64>(), snapshot.total);
	}
	assert_eq!(deliveries.delivered_on(date("2021-01-05")), 1610);
	assert_eq!(deliveries.delivered_on(date("2021-01-06")), 1660);
	assert_eq!(deliveries.by_vaccine.get(date("2021-01-05")).unwrap()[Vaccine::Moderna], 10);
	assert_eq!(deliveries.by_vaccine.get(date("2021-01-06")).unwrap()[Vaccine::Moderna], 60);

	assert_eq!(deliveries.delivered_by_vaccine_on(date("2021-01-03")), PerVaccine::default());
	let later = deliveries.delivered_by_vaccine_on(date("2021-02-01"));
	assert_eq!(later[Vaccine::BioNTech], 1600);
	assert_eq!(later[Vaccine::Moderna], 60);
    }

    #[test]
    fn empty_log_fails() {
	assert!(matches!(aggregate(&[], None), Err(Error::MissingData(_))));
    }

}
