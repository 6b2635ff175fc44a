use std::collections::HashMap;
use std::ops::{Index,IndexMut};

use lazy_static::lazy_static;

use super::error::{Result,Error};


pub const REGION_COUNT: usize = 17;

/// The German states plus the federal pseudo-region, which receives
/// deliveries and runs its own vaccination sites but has no population.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Region {
    BadenWuerttemberg,
    Bayern,
    Berlin,
    Brandenburg,
    Bremen,
    Hamburg,
    Hessen,
    MecklenburgVorpommern,
    Niedersachsen,
    NordrheinWestfalen,
    RheinlandPfalz,
    Saarland,
    Sachsen,
    SachsenAnhalt,
    SchleswigHolstein,
    Thueringen,
    Federal,
}

use Region::*;

impl Region {

    pub const STATES: [Region; 16] = [
	BadenWuerttemberg, Bayern, Berlin, Brandenburg, Bremen, Hamburg,
	Hessen, MecklenburgVorpommern, Niedersachsen, NordrheinWestfalen,
	RheinlandPfalz, Saarland, Sachsen, SachsenAnhalt, SchleswigHolstein,
	Thueringen
    ];

    pub const ALL: [Region; REGION_COUNT] = [
	BadenWuerttemberg, Bayern, Berlin, Brandenburg, Bremen, Hamburg,
	Hessen, MecklenburgVorpommern, Niedersachsen, NordrheinWestfalen,
	RheinlandPfalz, Saarland, Sachsen, SachsenAnhalt, SchleswigHolstein,
	Thueringen, Federal
    ];

    pub fn name(self) -> &'static str {
	match self {
	    BadenWuerttemberg => "Baden-Württemberg",
	    Bayern => "Bayern",
	    Berlin => "Berlin",
	    Brandenburg => "Brandenburg",
	    Bremen => "Bremen",
	    Hamburg => "Hamburg",
	    Hessen => "Hessen",
	    MecklenburgVorpommern => "Mecklenburg-Vorpommern",
	    Niedersachsen => "Niedersachsen",
	    NordrheinWestfalen => "Nordrhein-Westfalen",
	    RheinlandPfalz => "Rheinland-Pfalz",
	    Saarland => "Saarland",
	    Sachsen => "Sachsen",
	    SachsenAnhalt => "Sachsen-Anhalt",
	    SchleswigHolstein => "Schleswig-Holstein",
	    Thueringen => "Thüringen",
	    Federal => "Bund",
	}
    }

    /// Destatis figures, the same snapshot the RKI uses for its
    /// per-state percentages.
    pub const fn population(self) -> Option<u64> {
	match self {
	    BadenWuerttemberg => Some(11_100_394),
	    Bayern => Some(13_124_737),
	    Berlin => Some(3_669_491),
	    Brandenburg => Some(2_521_893),
	    Bremen => Some(681_202),
	    Hamburg => Some(1_847_253),
	    Hessen => Some(6_288_080),
	    MecklenburgVorpommern => Some(1_608_138),
	    Niedersachsen => Some(7_993_608),
	    NordrheinWestfalen => Some(17_947_221),
	    RheinlandPfalz => Some(4_093_903),
	    Saarland => Some(986_887),
	    Sachsen => Some(4_071_971),
	    SachsenAnhalt => Some(2_194_782),
	    SchleswigHolstein => Some(2_903_773),
	    Thueringen => Some(2_133_378),
	    Federal => None,
	}
    }

    pub fn is_pseudo(self) -> bool {
	self.population().is_none()
    }

    pub fn from_name(name: &str) -> Result<Region> {
	REGION_BY_NAME.get(name.trim()).copied()
	    .ok_or_else(|| Error::UnknownRegion(name.to_string()))
    }

}

lazy_static! {
    static ref REGION_BY_NAME: HashMap<&'static str,Region> = {
	let mut names: HashMap<_,_> = Region::ALL.iter().map(|r| (r.name(), *r)).collect();
	names.insert("Bundesressorts", Federal);
	names
    };
}

/// Sum of the state populations rather than an independent national
/// figure, so that state percentages add up to the national one.
pub const POPULATION_GERMANY: u64 = sum_of_states();

const fn sum_of_states() -> u64 {
    let mut sum = 0;
    let mut i = 0;
    while i < Region::STATES.len() {
	if let Some(population) = Region::STATES[i].population() {
	    sum += population;
	}
	i += 1;
    }
    sum
}


/// One value per region, laid out in `Region::ALL` order.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct PerRegion<T>([T; REGION_COUNT]);

impl<T> PerRegion<T> {

    pub fn iter(&self) -> impl Iterator<Item = (Region,&T)> {
	Region::ALL.iter().copied().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
	self.0.iter()
    }

}

impl<T> Index<Region> for PerRegion<T> {
    type Output = T;
    fn index(&self, region: Region) -> &T {
	&self.0[region as usize]
    }
}

impl<T> IndexMut<Region> for PerRegion<T> {
    fn index_mut(&mut self, region: Region) -> &mut T {
	&mut self.0[region as usize]
    }
}
