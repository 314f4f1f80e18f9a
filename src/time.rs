use chrono::NaiveDateTime;
use std::iter::Sum;
use std::ops::Add;

/// A span of whole minutes.
#[derive(Debug, Clone, Copy, Default, Ord, Eq, PartialEq, Hash, PartialOrd)]
pub struct Minutes(pub u64);

impl Minutes {
    /// Elapsed minutes from `from` to `to`. Calendar arithmetic takes care of
    /// arrivals on a later day, including month and year rollover. A `to`
    /// earlier than `from` collapses to zero.
    pub fn between(from: NaiveDateTime, to: NaiveDateTime) -> Minutes {
        let mins = (to - from).num_minutes();
        Minutes(u64::try_from(mins).unwrap_or(0))
    }
}

impl std::fmt::Display for Minutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.0 / 60;
        let mins = self.0 % 60;
        write!(f, "{}h{:02}m", hours, mins)
    }
}

impl Add<Minutes> for Minutes {
    type Output = Self;

    fn add(self, rhs: Minutes) -> Self::Output {
        Minutes(self.0 + rhs.0)
    }
}

impl Sum for Minutes {
    fn sum<I: Iterator<Item = Minutes>>(iter: I) -> Self {
        iter.fold(Minutes(0), |acc, m| acc + m)
    }
}
