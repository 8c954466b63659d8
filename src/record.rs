//! Personnel records.
//!
//! A [`Record`] is only ever built by the store, either from a [`NewRecord`]
//! or from a snapshot entry. Both paths upper-case every string field and
//! reject non-finite numbers; `start_date` is stamped when a caller leaves it
//! empty. Tenure is derived from `start_date` on every read.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper-cases an identity the same way for inserts and lookups.
pub fn normalize_identity(identity: &str) -> String {
    identity.to_uppercase()
}

/// Fields supplied by a caller when adding a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewRecord {
    pub identity: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub compensation: f64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub education_level: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub absenteeism_rate: f64,
    #[serde(default)]
    pub performance_score: f64,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

impl NewRecord {
    /// Checks the numeric bounds the input forms enforce.
    ///
    /// The store only rejects non-finite values; only the CLI and HTTP layers
    /// call this.
    pub fn check_ranges(&self) -> Result<(), ValidationError> {
        check_range("compensation", self.compensation, 0.0, f64::MAX)?;
        check_range("absenteeism_rate", self.absenteeism_rate, 0.0, 100.0)?;
        check_range("performance_score", self.performance_score, 0.0, 100.0)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value, min, max })
    }
}

/// One person in the registry. Field order matches the snapshot layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    identity: String,
    role: String,
    compensation: f64,
    city: String,
    education_level: String,
    specialty: String,
    absenteeism_rate: f64,
    performance_score: f64,
    start_date: DateTime<Utc>,
}

impl Record {
    /// Normalizes `new` into a record, stamping `now` when it has no start date.
    pub(crate) fn from_new(new: NewRecord, now: DateTime<Utc>) -> Result<Record, ValidationError> {
        Record {
            identity: new.identity,
            role: new.role,
            compensation: new.compensation,
            city: new.city,
            education_level: new.education_level,
            specialty: new.specialty,
            absenteeism_rate: new.absenteeism_rate,
            performance_score: new.performance_score,
            start_date: new.start_date.unwrap_or(now),
        }
        .normalized()
    }

    /// Upper-cases every string field and rejects a blank identity or a
    /// non-finite number. Applied to added records and to loaded ones alike.
    pub(crate) fn normalized(self) -> Result<Record, ValidationError> {
        if self.identity.trim().is_empty() {
            return Err(ValidationError::EmptyIdentity);
        }
        for (field, value) in [
            ("compensation", self.compensation),
            ("absenteeism_rate", self.absenteeism_rate),
            ("performance_score", self.performance_score),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field, value });
            }
        }

        Ok(Record {
            identity: normalize_identity(&self.identity),
            role: self.role.to_uppercase(),
            city: self.city.to_uppercase(),
            education_level: self.education_level.to_uppercase(),
            specialty: self.specialty.to_uppercase(),
            ..self
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn compensation(&self) -> f64 {
        self.compensation
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn education_level(&self) -> &str {
        &self.education_level
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn absenteeism_rate(&self) -> f64 {
        self.absenteeism_rate
    }

    pub fn performance_score(&self) -> f64 {
        self.performance_score
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Whole days elapsed since `start_date`.
    pub fn tenure_days(&self) -> i64 {
        self.tenure_days_at(Utc::now())
    }

    /// Whole days between `start_date` and `now`, truncated toward zero.
    pub fn tenure_days_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_date).num_days()
    }
}
