use crate::customer::{Customer, CustomerId};
use crate::error::FilterError;
use crate::flight::{FlightSegment, SegmentKey, SegmentRef};
use crate::time::Minutes;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Reset,
    Customer,
    Duration,
    Location,
    Date,
    Trip,
}

/// What a validated spec turns into.
pub(crate) enum Selection {
    /// Discard the input and use this set instead.
    Replace(Vec<SegmentRef>),
    /// Keep the input segments that satisfy the criterion, in input order.
    Keep(Criterion),
}

pub(crate) enum Criterion {
    Members(HashSet<SegmentKey>),
    ShorterThan(Minutes),
    LongerThan(Minutes),
    Touches(String),
    Between(NaiveDate, NaiveDate),
}

impl Criterion {
    pub(crate) fn matches(&self, segment: &FlightSegment) -> bool {
        match self {
            Criterion::Members(keys) => keys.contains(&segment.key()),
            Criterion::ShorterThan(limit) => segment.duration < *limit,
            Criterion::LongerThan(limit) => segment.duration > *limit,
            Criterion::Touches(airport) => segment.touches(airport),
            Criterion::Between(from, to) => {
                let within = |d: NaiveDate| *from <= d && d <= *to;
                within(segment.departure_time.date()) || within(segment.arrival_time.date())
            }
        }
    }

    pub(crate) fn retain(&self, segments: &[SegmentRef]) -> Vec<SegmentRef> {
        segments
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Reset,
        FilterKind::Customer,
        FilterKind::Duration,
        FilterKind::Location,
        FilterKind::Date,
        FilterKind::Trip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Reset => "reset",
            FilterKind::Customer => "customer",
            FilterKind::Duration => "duration",
            FilterKind::Location => "location",
            FilterKind::Date => "date",
            FilterKind::Trip => "trip",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FilterKind::Reset => "Reset all of the filters applied so far (if any)",
            FilterKind::Customer => "Filter flight segments based on customer ID",
            FilterKind::Duration => {
                "Filter flight segments based on duration; L#### keeps segments shorter than #### minutes, G#### longer"
            }
            FilterKind::Location => {
                "Filter flight segments departing from or arriving at an airport (3-letter IATA code)"
            }
            FilterKind::Date => {
                "Filter flight segments based on dates; 'YYYY-MM-DD/YYYY-MM-DD' or 'YYYY-MM-DD,YYYY-MM-DD'"
            }
            FilterKind::Trip => "Filter flight segments based on a reservation ID",
        }
    }

    /// Reset discards its input, so splitting that input buys nothing.
    pub fn is_partitionable(self) -> bool {
        self != FilterKind::Reset
    }

    /// Applies this filter over `segments` on the calling thread. A spec that
    /// fails validation returns `segments` unchanged.
    pub fn apply(self, customers: &[Customer], segments: &[SegmentRef], spec: &str) -> Vec<SegmentRef> {
        match self.compile(customers, segments, spec) {
            Ok(Selection::Replace(all)) => all,
            Ok(Selection::Keep(criterion)) => criterion.retain(segments),
            Err(e) => {
                debug!(filter = self.name(), error = %e, "filter rejected, view unchanged");
                segments.to_vec()
            }
        }
    }

    /// Validates `spec` against the whole input and the customer base.
    pub(crate) fn compile(
        self,
        customers: &[Customer],
        segments: &[SegmentRef],
        spec: &str,
    ) -> Result<Selection, FilterError> {
        // reservation ids are matched as given; codes and duration flags are not
        let spec = match self {
            FilterKind::Duration | FilterKind::Location => spec.trim().to_uppercase(),
            _ => spec.trim().to_string(),
        };
        let malformed = || FilterError::Malformed {
            kind: self.name(),
            spec: spec.clone(),
        };

        match self {
            FilterKind::Reset => Ok(Selection::Replace(all_trip_segments(customers))),
            FilterKind::Customer => {
                if spec.is_empty() || !spec.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                let id: CustomerId = spec.parse().map_err(|_| malformed())?;
                let customer = customers
                    .iter()
                    .find(|c| c.id == id)
                    .ok_or(FilterError::UnknownCustomer(id))?;
                let keys = customer
                    .trips()
                    .flat_map(|t| t.segments().iter().map(|s| s.key()))
                    .collect();
                Ok(Selection::Keep(Criterion::Members(keys)))
            }
            FilterKind::Duration => {
                let bytes = spec.as_bytes();
                if bytes.len() != 5 || !bytes[1..].iter().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                let limit = Minutes(spec[1..].parse().map_err(|_| malformed())?);
                match bytes[0] {
                    b'L' => Ok(Selection::Keep(Criterion::ShorterThan(limit))),
                    b'G' => Ok(Selection::Keep(Criterion::LongerThan(limit))),
                    _ => Err(malformed()),
                }
            }
            FilterKind::Location => {
                if spec.len() != 3 || !spec.bytes().all(|b| b.is_ascii_uppercase()) {
                    return Err(malformed());
                }
                if !segments.iter().any(|s| s.touches(&spec)) {
                    return Err(FilterError::UnknownLocation(spec));
                }
                Ok(Selection::Keep(Criterion::Touches(spec)))
            }
            FilterKind::Date => {
                let (from, to) = parse_date_range(&spec).ok_or_else(malformed)?;
                Ok(Selection::Keep(Criterion::Between(from, to)))
            }
            FilterKind::Trip => {
                if spec.is_empty() || !spec.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    return Err(malformed());
                }
                let trip = customers
                    .iter()
                    .find_map(|c| c.find_trip(&spec))
                    .ok_or_else(|| FilterError::UnknownTrip(spec.clone()))?;
                let keys = trip.segments().iter().map(|s| s.key()).collect();
                Ok(Selection::Keep(Criterion::Members(keys)))
            }
        }
    }
}

/// Every segment of every trip, first occurrence wins, in customer then
/// booking order.
pub fn all_trip_segments(customers: &[Customer]) -> Vec<SegmentRef> {
    let mut seen = HashSet::new();
    customers
        .iter()
        .flat_map(|c| c.trips())
        .flat_map(|t| t.segments().iter())
        .filter(|s| seen.insert(s.key()))
        .cloned()
        .collect()
}

/// `YYYY-MM-DD` twice, fields separated by any of `-`, `/`, `,` or a space.
/// The range must not run backwards.
fn parse_date_range(spec: &str) -> Option<(NaiveDate, NaiveDate)> {
    let fields = spec
        .split(|c| matches!(c, '-' | '/' | ',' | ' '))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>();
    let widths = [4, 2, 2, 4, 2, 2];
    if fields.len() != widths.len()
        || fields
            .iter()
            .zip(widths)
            .any(|(f, w)| f.len() != w || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let date = |y: &str, m: &str, d: &str| {
        NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
    };
    let from = date(fields[0], fields[1], fields[2])?;
    let to = date(fields[3], fields[4], fields[5])?;
    (from <= to).then_some((from, to))
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "reset" => Ok(FilterKind::Reset),
            "c" | "customer" => Ok(FilterKind::Customer),
            "d" | "duration" => Ok(FilterKind::Duration),
            "l" | "location" => Ok(FilterKind::Location),
            "y" | "date" => Ok(FilterKind::Date),
            "t" | "trip" => Ok(FilterKind::Trip),
            _ => Err(FilterError::UnknownKind(s.to_string())),
        }
    }
}
