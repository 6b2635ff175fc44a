use std::rc::Rc;
use std::collections::BTreeMap;

use super::date::{IsoDate,DateRange};
use super::error::{Result,Error};


/// One value per calendar day, in ascending date order.
///
/// Days that had no observation of their own share the `Rc` of the last
/// observed day. Mutating a day through `make_mut` copies it first, so
/// the days it was aliased with keep their value.
#[derive(Clone,Debug,PartialEq)]
pub struct DailySeries<T> {
    days: BTreeMap<IsoDate,Rc<T>>,
}

impl<T> DailySeries<T> {

    pub fn len(&self) -> usize {
	self.days.len()
    }

    pub fn get(&self, date: IsoDate) -> Option<&T> {
	self.days.get(&date).map(|v| v.as_ref())
    }

    pub fn shared(&self, date: IsoDate) -> Option<&Rc<T>> {
	self.days.get(&date)
    }

    pub fn oldest(&self) -> Option<IsoDate> {
	self.days.keys().next().copied()
    }

    pub fn latest(&self) -> Option<IsoDate> {
	self.days.keys().next_back().copied()
    }

    pub fn last(&self) -> Option<(IsoDate,&T)> {
	self.days.iter().next_back().map(|(d,v)| (*d, v.as_ref()))
    }

    pub fn dates(&self) -> Vec<IsoDate> {
	self.days.keys().copied().collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (IsoDate,&T)> {
	self.days.iter().map(|(d,v)| (*d, v.as_ref()))
    }

    /// One value per day, in date order.
    pub fn pluck<U,F: FnMut(&T) -> U>(&self, f: F) -> Vec<U> {
	self.days.values().map(|v| v.as_ref()).map(f).collect()
    }

    pub fn make_mut(&mut self, date: IsoDate) -> Option<&mut T> where T: Clone {
	self.days.get_mut(&date).map(Rc::make_mut)
    }

    /// Converts every day, calling `f` once per distinct value so that
    /// filled-in days stay aliased in the result.
    pub fn try_map<U,F>(&self, mut f: F) -> Result<DailySeries<U>>
    where F: FnMut(IsoDate, &T) -> Result<U> {
	let mut days = BTreeMap::new();
	let mut previous: Option<(&Rc<T>,Rc<U>)> = None;
	for (date,value) in &self.days {
	    let mapped = match previous {
		Some((source,ref mapped)) if Rc::ptr_eq(source, value) => mapped.clone(),
		_ => Rc::new(f(*date, value.as_ref())?),
	    };
	    days.insert(*date, mapped.clone());
	    previous = Some((value, mapped));
	}
	Ok(DailySeries { days })
    }

}


/// Forward-fills `observed` into one entry per day of `oldest..=latest`.
pub fn fill_gaps<T: Clone>(observed: BTreeMap<IsoDate,T>, oldest: IsoDate,
			   latest: IsoDate) -> Result<DailySeries<T>> {
    fill(observed, oldest, latest, None::<fn(IsoDate, T, &mut T)>)
}

/// Like `fill_gaps`, but every observed day after the first starts out
/// as a copy of the previous filled day, and `merge` folds the day's own
/// observation into that copy. Partially reported days are completed
/// this way before they are carried forward.
pub fn fill_gaps_with<T,F>(observed: BTreeMap<IsoDate,T>, oldest: IsoDate,
			   latest: IsoDate, merge: F) -> Result<DailySeries<T>>
where T: Clone, F: FnMut(IsoDate, T, &mut T) {
    fill(observed, oldest, latest, Some(merge))
}

fn fill<T,F>(mut observed: BTreeMap<IsoDate,T>, oldest: IsoDate,
	     latest: IsoDate, mut merge: Option<F>) -> Result<DailySeries<T>>
where T: Clone, F: FnMut(IsoDate, T, &mut T) {

    if oldest > latest {
	return Err(Error::InvalidRange { oldest, latest });
    }
    if let Some(date) = observed.keys().find(|d| **d < oldest || **d > latest) {
	return Err(Error::OutOfRange { date: *date, oldest, latest });
    }

    let mut series = DailySeries { days: BTreeMap::new() };
    let mut last_known: Option<Rc<T>> = None;

    for date in DateRange(oldest, Some(latest)) {
	match (observed.remove(&date), last_known.take(), merge.as_mut()) {
	    (Some(today), Some(previous), Some(merge)) => {
		// `previous` still holds the value, so this copies it.
		series.days.insert(date, previous.clone());
		if let Some(filled) = series.make_mut(date) {
		    merge(date, today, filled);
		}
	    },
	    (Some(today), _, _) => {
		series.days.insert(date, Rc::new(today));
	    },
	    (None, Some(previous), _) => {
		series.days.insert(date, previous);
	    },
	    (None, None, _) => return Err(Error::MissingFirstDay { date }),
	}
	last_known = series.shared(date).cloned();
    }

    Ok(series)

}
