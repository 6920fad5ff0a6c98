use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Base cadence of a recurring obligation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum RecurrenceKind {
    Once,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
    /// Also the landing spot for any kind string this build does not recognize.
    Custom,
}

impl RecurrenceKind {
    pub const ALL: [RecurrenceKind; 8] = [
        RecurrenceKind::Once,
        RecurrenceKind::Daily,
        RecurrenceKind::Weekly,
        RecurrenceKind::Monthly,
        RecurrenceKind::Quarterly,
        RecurrenceKind::SemiAnnually,
        RecurrenceKind::Annually,
        RecurrenceKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::Once => "ONCE",
            RecurrenceKind::Daily => "DAILY",
            RecurrenceKind::Weekly => "WEEKLY",
            RecurrenceKind::Monthly => "MONTHLY",
            RecurrenceKind::Quarterly => "QUARTERLY",
            RecurrenceKind::SemiAnnually => "SEMI_ANNUALLY",
            RecurrenceKind::Annually => "ANNUALLY",
            RecurrenceKind::Custom => "CUSTOM",
        }
    }

    /// Lenient parse: case and separator insensitive, unknown values map to `Custom`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .unwrap_or(RecurrenceKind::Custom)
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RecurrenceKind {
    fn from(value: String) -> Self {
        RecurrenceKind::parse(&value)
    }
}

impl From<RecurrenceKind> for String {
    fn from(kind: RecurrenceKind) -> Self {
        kind.as_str().to_string()
    }
}

fn one() -> u32 {
    1
}

/// How often a parent task recurs.
///
/// `frequency` counts occurrences per base period and only matters for the
/// twice-monthly case; `interval` counts base periods between occurrences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceSpec {
    pub kind: RecurrenceKind,
    #[serde(default = "one")]
    pub frequency: u32,
    #[serde(default = "one")]
    pub interval: u32,
}

impl RecurrenceSpec {
    pub fn new(kind: RecurrenceKind) -> Self {
        Self {
            kind,
            frequency: 1,
            interval: 1,
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn is_twice_monthly(&self) -> bool {
        self.kind == RecurrenceKind::Monthly && self.frequency == 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.frequency == 0 {
            return Err(CoreError::Validation(
                "recurrence frequency must be a positive integer".into(),
            ));
        }
        if self.interval == 0 {
            return Err(CoreError::Validation(
                "recurrence interval must be a positive integer".into(),
            ));
        }
        Ok(())
    }

    pub fn label(&self) -> String {
        if self.is_twice_monthly() {
            return match self.interval {
                1 => "Twice monthly".into(),
                n => format!("Twice monthly, every {n} months"),
            };
        }
        match (self.kind, self.interval) {
            (RecurrenceKind::Once, _) => "Once".into(),
            (RecurrenceKind::Daily, 1) => "Daily".into(),
            (RecurrenceKind::Weekly, 1) => "Weekly".into(),
            (RecurrenceKind::Monthly, 1) => "Monthly".into(),
            (RecurrenceKind::Quarterly, 1) => "Quarterly".into(),
            (RecurrenceKind::SemiAnnually, 1) => "Semi-annually".into(),
            (RecurrenceKind::Annually, 1) => "Annually".into(),
            (RecurrenceKind::Custom, _) => "Custom (monthly)".into(),
            (RecurrenceKind::Daily, n) => format!("Every {n} days"),
            (RecurrenceKind::Weekly, n) => format!("Every {n} weeks"),
            (RecurrenceKind::Monthly, n) => format!("Every {n} months"),
            (RecurrenceKind::Quarterly, n) => format!("Every {n} quarters"),
            (RecurrenceKind::SemiAnnually, n) => format!("Every {n} half-years"),
            (RecurrenceKind::Annually, n) => format!("Every {n} years"),
        }
    }
}
