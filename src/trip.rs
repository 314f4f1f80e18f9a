use crate::customer::CustomerId;
use crate::flight::SegmentRef;
use crate::time::Minutes;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

pub type ReservationId = Arc<str>;

/// An itinerary booked under one reservation. The segment list is fixed at
/// booking time; cancellation releases seats but never edits the itinerary.
#[derive(Debug)]
pub struct Trip {
    pub reservation_id: ReservationId,
    pub customer_id: CustomerId,
    pub departure_date: NaiveDate,
    segments: Vec<SegmentRef>,
}

impl Trip {
    pub fn new(
        reservation_id: ReservationId,
        customer_id: CustomerId,
        departure_date: NaiveDate,
        segments: Vec<SegmentRef>,
    ) -> Trip {
        Trip {
            reservation_id,
            customer_id,
            departure_date,
            segments,
        }
    }

    pub fn segments(&self) -> &[SegmentRef] {
        &self.segments
    }

    pub fn contains(&self, segment: &SegmentRef) -> bool {
        self.segments.iter().any(|s| **s == **segment)
    }

    /// Time spent airborne only.
    pub fn in_flight_time(&self) -> Minutes {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// First departure to last arrival, layovers included.
    pub fn total_trip_time(&self) -> Minutes {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => Minutes::between(first.departure_time, last.arrival_time),
            _ => Minutes(0),
        }
    }

    pub fn itinerary(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reservation_id, self.itinerary())
    }
}
