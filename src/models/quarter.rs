//! Planning quarters.
//!
//! The engine plans a single year split into four fixed quarters.
//! Quarters are totally ordered (`Q1 < Q2 < Q3 < Q4`), which is what the
//! scheduler and the delivery-status classifier rely on.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static QUARTER_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bQ([1-4])\b").expect("valid quarter regex")
});

/// A planning quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// All quarters in chronological order.
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Zero-based position within the year.
    pub fn index(self) -> usize {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 1,
            Quarter::Q3 => 2,
            Quarter::Q4 => 3,
        }
    }

    /// Quarter from a zero-based position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether this is one of the first two quarters, where forecasts are least mature.
    pub fn is_early(self) -> bool {
        matches!(self, Quarter::Q1 | Quarter::Q2)
    }

    /// First calendar day of this quarter in `year`.
    pub fn start_date(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 1 + 3 * self.index() as u32, 1)
    }

    /// Number of quarters from `self` to `later`, inclusive of both ends.
    ///
    /// Returns 0 when `later` precedes `self`.
    pub fn span_to(self, later: Quarter) -> usize {
        if later < self {
            0
        } else {
            later.index() - self.index() + 1
        }
    }

    /// Extracts the first quarter mentioned in a free-form hint
    /// (e.g. `"Q2 2025"`, `"target: q3"`).
    pub fn from_hint(hint: &str) -> Option<Self> {
        let caps = QUARTER_HINT.captures(hint)?;
        let n: usize = caps.get(1)?.as_str().parse().ok()?;
        Self::from_index(n - 1)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.index() + 1)
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(format!("unknown quarter '{other}'")),
        }
    }
}
