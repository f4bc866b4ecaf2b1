//! A typed composite: a run joined with its competitor.
//!
//! The bulk query selects columns from `runs` and `competitors`; the run's
//! own id arrives as `run_id`, the competitor's as `competitor_id`. Field
//! names are accepted in wire spelling or camelCase.

use mirra_core::{Cell, FieldNaming, Record, ValueKind};
use mirra_sync::{Composite, FieldError, Side};

/// One start-list entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub run_id: i64,
    pub competitor_id: i64,
    /// Timing chip number
    pub si_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub registration: String,
    /// Milliseconds since the Unix epoch
    pub start_time: Option<i64>,
    pub finish_time: Option<i64>,
    pub not_competing: bool,
}

impl Run {
    /// Builds a run from a joined record.
    ///
    /// `runId` and `competitorId` are required; every other field defaults
    /// when absent.
    pub fn from_record(record: &Record) -> Result<Self, FieldError> {
        let mut run = Run::default();
        let mut ids = (false, false);
        for (name, cell) in record.iter() {
            match &*FieldNaming::CamelCase.rename(name) {
                "runId" => ids.0 = true,
                "competitorId" => ids.1 = true,
                _ => {}
            }
            run.set_field(name, cell)?;
        }
        if !ids.0 {
            return Err(FieldError::new("runId", ValueKind::Int, ValueKind::Null));
        }
        if !ids.1 {
            return Err(FieldError::new("competitorId", ValueKind::Int, ValueKind::Null));
        }
        Ok(run)
    }

    /// Returns "first last".
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            _ => self.last_name.clone(),
        }
    }

    /// Returns the elapsed time in milliseconds once both times are known.
    ///
    /// `None` as well when the difference does not fit an `i64`.
    pub fn elapsed(&self) -> Option<i64> {
        self.finish_time?.checked_sub(self.start_time?)
    }
}

impl Composite for Run {
    fn identity(&self, side: Side) -> i64 {
        match side {
            Side::Primary => self.run_id,
            Side::Secondary => self.competitor_id,
        }
    }

    fn set_field(&mut self, name: &str, value: &Cell) -> Result<(), FieldError> {
        match &*FieldNaming::CamelCase.rename(name) {
            "runId" => self.run_id = required_int(name, value)?,
            "competitorId" => self.competitor_id = required_int(name, value)?,
            "siId" => self.si_id = optional_int(name, value)?,
            "firstName" => self.first_name = text(name, value)?,
            "lastName" => self.last_name = text(name, value)?,
            "registration" => self.registration = text(name, value)?,
            "startTime" => self.start_time = timestamp(name, value)?,
            "finishTime" => self.finish_time = timestamp(name, value)?,
            "notCompeting" => self.not_competing = flag(name, value)?,
            _ => {}
        }
        Ok(())
    }
}

fn required_int(name: &str, value: &Cell) -> Result<i64, FieldError> {
    value
        .as_i64()
        .ok_or_else(|| FieldError::new(name, ValueKind::Int, value.kind()))
}

fn optional_int(name: &str, value: &Cell) -> Result<Option<i64>, FieldError> {
    match value {
        Cell::Null => Ok(None),
        other => required_int(name, other).map(Some),
    }
}

fn text(name: &str, value: &Cell) -> Result<String, FieldError> {
    match value {
        Cell::Null => Ok(String::new()),
        Cell::Text(s) => Ok(s.clone()),
        other => Err(FieldError::new(name, ValueKind::Text, other.kind())),
    }
}

/// Timestamps, or integral milliseconds.
fn timestamp(name: &str, value: &Cell) -> Result<Option<i64>, FieldError> {
    match value {
        Cell::Null => Ok(None),
        Cell::Timestamp(ts) => Ok(Some(*ts)),
        other => other
            .as_i64()
            .map(Some)
            .ok_or_else(|| FieldError::new(name, ValueKind::DateTime, other.kind())),
    }
}

/// Booleans, or 0/1.
fn flag(name: &str, value: &Cell) -> Result<bool, FieldError> {
    match value {
        Cell::Null => Ok(false),
        Cell::Bool(b) => Ok(*b),
        other => match other.as_i64() {
            Some(n @ (0 | 1)) => Ok(n == 1),
            _ => Err(FieldError::new(name, ValueKind::Bool, other.kind())),
        },
    }
}
