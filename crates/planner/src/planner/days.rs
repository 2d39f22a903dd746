//! Decomposition of raw day tokens (`"MWF"`, `"TTh"`) into atomic weekdays.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A teaching day. Sunday classes are not part of the time schedule format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weekday {
    M,
    T,
    W,
    Th,
    F,
    S,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::M,
        Weekday::T,
        Weekday::W,
        Weekday::Th,
        Weekday::F,
        Weekday::S,
    ];

    /// Matching order for decomposition. `Th` must come before `T`.
    const MATCH_ORDER: [Weekday; 6] = [
        Weekday::Th,
        Weekday::M,
        Weekday::T,
        Weekday::W,
        Weekday::F,
        Weekday::S,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Weekday::M => "M",
            Weekday::T => "T",
            Weekday::W => "W",
            Weekday::Th => "Th",
            Weekday::F => "F",
            Weekday::S => "S",
        }
    }

    /// Position in `ALL`, used to index day buckets.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returns the set of weekdays named in `token`.
///
/// Each matched code is removed from the remaining token before the next code is
/// tested, so `"TTh"` yields `{T, Th}` and never a stray `h`. Characters that do
/// not name a day are ignored.
pub fn decompose(token: &str) -> BTreeSet<Weekday> {
    let mut remaining = token.to_string();
    let mut days = BTreeSet::new();

    for day in Weekday::MATCH_ORDER {
        if let Some(pos) = remaining.find(day.code()) {
            days.insert(day);
            remaining.replace_range(pos..pos + day.code().len(), "");
        }
    }

    days
}
