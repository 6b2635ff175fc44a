use std::collections::HashMap;
use std::ops::{Index,IndexMut};

use lazy_static::lazy_static;

use super::error::{Result,Error};


pub const VACCINE_COUNT: usize = 5;

#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Vaccine {
    AstraZeneca,
    BioNTech,
    JohnsonAndJohnson,
    Moderna,
    Novavax,
}

impl Vaccine {

    pub const ALL: [Vaccine; VACCINE_COUNT] = [
	Vaccine::AstraZeneca, Vaccine::BioNTech, Vaccine::JohnsonAndJohnson,
	Vaccine::Moderna, Vaccine::Novavax
    ];

    /// Identifier used by the raw RKI delivery export.
    pub fn id(self) -> &'static str {
	match self {
	    Self::AstraZeneca => "astra",
	    Self::BioNTech => "comirnaty",
	    Self::JohnsonAndJohnson => "johnson",
	    Self::Moderna => "moderna",
	    Self::Novavax => "novavax",
	}
    }

    pub fn label(self) -> &'static str {
	match self {
	    Self::AstraZeneca => "Oxford/AstraZeneca",
	    Self::BioNTech => "Pfizer/BioNTech",
	    Self::JohnsonAndJohnson => "Johnson & Johnson",
	    Self::Moderna => "Moderna",
	    Self::Novavax => "Novavax",
	}
    }

    /// Suffix of the per-product columns, e.g. `initialDosesCumulativeBioNTech`.
    pub fn column_suffix(self) -> &'static str {
	match self {
	    Self::AstraZeneca => "AstraZeneca",
	    Self::BioNTech => "BioNTech",
	    Self::JohnsonAndJohnson => "JohnsonAndJohnson",
	    Self::Moderna => "Moderna",
	    Self::Novavax => "Novavax",
	}
    }

    /// One dose completes the primary course.
    pub fn is_single_dose(self) -> bool {
	self == Self::JohnsonAndJohnson
    }

    /// Accepts the export id, the display label or the column suffix,
    /// case-insensitively.
    pub fn from_name(name: &str) -> Result<Vaccine> {
	VACCINE_BY_NAME.get(&name.trim().to_lowercase()).copied()
	    .ok_or_else(|| Error::UnknownVaccine(name.to_string()))
    }

}

lazy_static! {
    static ref VACCINE_BY_NAME: HashMap<String,Vaccine> = Vaccine::ALL.iter().flat_map(
	|v| vec![v.id(), v.label(), v.column_suffix()].into_iter()
	    .map(move |name| (name.to_lowercase(), *v))
    ).collect();
}


#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct PerVaccine<T>([T; VACCINE_COUNT]);

impl<T> PerVaccine<T> {

    pub fn iter(&self) -> impl Iterator<Item = (Vaccine,&T)> {
	Vaccine::ALL.iter().copied().zip(self.0.iter())
    }

}

impl<T> Index<Vaccine> for PerVaccine<T> {
    type Output = T;
    fn index(&self, vaccine: Vaccine) -> &T {
	&self.0[vaccine as usize]
    }
}

impl<T> IndexMut<Vaccine> for PerVaccine<T> {
    fn index_mut(&mut self, vaccine: Vaccine) -> &mut T {
	&mut self.0[vaccine as usize]
    }
}
