use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// The opaque, unique identifier of a `WorkEntry`. Newly created ids are UUID v4 strings, but
/// any string read back from storage is accepted as-is.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for EntryId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// One maintenance-work record.
///
/// The serialized field names match the `workData` format that has always been persisted, so
/// previously stored data keeps loading.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WorkEntry {
    pub(crate) id: EntryId,
    /// Month name, expected to be one of `MONTHS_ORDER`.
    #[serde(rename = "mes")]
    pub(crate) month: String,
    #[serde(rename = "ano")]
    pub(crate) year: i64,
    #[serde(rename = "persona")]
    pub(crate) person: String,
    /// Description of the work performed.
    #[serde(rename = "trabajo")]
    pub(crate) work: String,
}

impl WorkEntry {
    /// Assigns a freshly generated id to `entry`.
    pub fn new(entry: NewEntry) -> Self {
        Self {
            id: EntryId::generate(),
            month: entry.month,
            year: entry.year,
            person: entry.person,
            work: entry.work,
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn person(&self) -> &str {
        &self.person
    }

    pub fn work(&self) -> &str {
        &self.work
    }

    /// The entry without its id, useful for comparing records across imports.
    pub fn content(&self) -> NewEntry {
        NewEntry {
            month: self.month.clone(),
            year: self.year,
            person: self.person.clone(),
            work: self.work.clone(),
        }
    }
}

/// A validated work record that has not been assigned an id yet.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct NewEntry {
    pub month: String,
    pub year: i64,
    pub person: String,
    pub work: String,
}

impl NewEntry {
    pub fn new(
        month: impl Into<String>,
        year: i64,
        person: impl Into<String>,
        work: impl Into<String>,
    ) -> Self {
        Self {
            month: month.into(),
            year,
            person: person.into(),
            work: work.into(),
        }
    }
}

/// Who performed the work, as chosen on the entry form.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub enum PersonChoice {
    /// Nothing has been chosen yet.
    #[default]
    Unselected,
    /// One of the people already present in the records.
    Existing(String),
    /// Someone who does not appear in the records yet.
    New(String),
}

/// Raw input for a new entry before validation.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct EntryForm {
    pub year: String,
    pub month: String,
    pub person: PersonChoice,
    pub work: String,
}

impl EntryForm {
    /// Validates the form against the list of known `people` and produces a `NewEntry`.
    ///
    /// # Errors
    /// Returns an `ErrorType::Validation` error when a required field is missing, the chosen
    /// existing person is unknown, or the year is not an integer.
    pub fn validate(&self, people: &[String]) -> Result<NewEntry> {
        self.validate_inner(people).pub_result(ErrorType::Validation)
    }

    fn validate_inner(&self, people: &[String]) -> Result<NewEntry> {
        if self.year.is_empty() || self.month.is_empty() || self.work.is_empty() {
            return Err(anyhow!(
                "Year, month and work performed are required fields."
            ));
        }

        let person = match &self.person {
            PersonChoice::Unselected => {
                return Err(anyhow!("A person must be selected or added."));
            }
            PersonChoice::Existing(name) => {
                if !people.iter().any(|p| p == name) {
                    return Err(anyhow!(
                        "'{name}' is not one of the known people; use --new-person to add \
                        someone new."
                    ));
                }
                name.clone()
            }
            PersonChoice::New(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(anyhow!("The name of the new person must be specified."));
                }
                name.to_string()
            }
        };

        let year = parse_year(&self.year)
            .ok_or_else(|| anyhow!("Year '{}' is not a valid integer.", self.year))?;

        Ok(NewEntry {
            month: self.month.clone(),
            year,
            person,
            work: self.work.clone(),
        })
    }
}

/// Parses the leading integer of `text`, ignoring leading whitespace and anything after the
/// digits, so `" 2023"`, `"2023.0"` and `"2023 (approx)"` are all `2023`. Returns `None` when
/// there are no leading digits or the value does not fit an `i64`.
pub fn parse_year(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}
