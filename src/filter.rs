//! Derived views of the record store: the visible subset for a set of filters, the option
//! lists that populate the selectors, and summary statistics.

use crate::model::{WorkEntry, MONTHS_ORDER};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A selector that either matches everything or one specific value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector<T> {
    #[default]
    Any,
    Specific(T),
}

impl<T> Selector<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, Selector::Any)
    }

    /// `Some(value)` becomes `Specific(value)` and `None` becomes `Any`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Selector::Specific(v),
            None => Selector::Any,
        }
    }

    fn matches<U>(&self, value: &U) -> bool
    where
        T: PartialEq<U>,
        U: ?Sized,
    {
        match self {
            Selector::Any => true,
            Selector::Specific(expected) => expected == value,
        }
    }
}

/// The active year, month and person selectors.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    pub year: Selector<i64>,
    pub month: Selector<String>,
    pub person: Selector<String>,
}

impl Filters {
    pub fn new(year: Selector<i64>, month: Selector<String>, person: Selector<String>) -> Self {
        Self {
            year,
            month,
            person,
        }
    }

    /// True when at least one selector is specific.
    pub fn is_active(&self) -> bool {
        !(self.year.is_any() && self.month.is_any() && self.person.is_any())
    }

    /// Resets every selector to `Any`.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn matches(&self, entry: &WorkEntry) -> bool {
        self.year.matches(&entry.year())
            && self.month.matches(entry.month())
            && self.person.matches(entry.person())
    }
}

/// The values offered by each selector.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct years, newest first.
    pub years: Vec<i64>,
    /// The canonical months in calendar order, regardless of the data.
    pub months: Vec<String>,
    /// Distinct people, in ascending order.
    pub people: Vec<String>,
}

/// Headline numbers for the whole store, independent of any filters.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_entries: usize,
    pub unique_people: usize,
    pub active_months: usize,
}

pub fn derive_options(entries: &[WorkEntry]) -> FilterOptions {
    let years: BTreeSet<i64> = entries.iter().map(WorkEntry::year).collect();
    let people: BTreeSet<&str> = entries.iter().map(WorkEntry::person).collect();
    FilterOptions {
        years: years.into_iter().rev().collect(),
        months: MONTHS_ORDER.iter().map(|m| m.to_string()).collect(),
        people: people.into_iter().map(str::to_string).collect(),
    }
}

/// Returns the entries that match every specific selector, in store order.
///
/// When no selector is specific the result is empty: nothing is shown until the user asks for
/// something.
pub fn compute_visible<'a>(entries: &'a [WorkEntry], filters: &Filters) -> Vec<&'a WorkEntry> {
    if !filters.is_active() {
        return Vec::new();
    }
    entries.iter().filter(|e| filters.matches(e)).collect()
}

/// The number of distinct `(year, month)` pairs in `entries`.
pub fn count_distinct_year_month(entries: &[WorkEntry]) -> usize {
    entries
        .iter()
        .map(|e| (e.year(), e.month()))
        .collect::<HashSet<_>>()
        .len()
}

pub fn stats(entries: &[WorkEntry]) -> Stats {
    Stats {
        total_entries: entries.len(),
        unique_people: derive_options(entries).people.len(),
        active_months: count_distinct_year_month(entries),
    }
}
