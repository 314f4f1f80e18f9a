use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::sync::Arc;
use tabled::Tabled;

pub type AirportId = Arc<str>;

/// (longitude, latitude)
pub type Location = (f64, f64);

#[derive(Clone, Debug, PartialEq)]
pub struct Airport {
    pub id: AirportId,
    pub name: String,
    pub location: Location,
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Code to airport lookup. Built once at load time and never mutated after.
#[derive(Debug, Default)]
pub struct AirportRegistry {
    airports: HashMap<AirportId, Airport>,
}

impl AirportRegistry {
    pub fn new(airports: HashMap<AirportId, Airport>) -> AirportRegistry {
        AirportRegistry { airports }
    }

    pub fn location(&self, id: &str) -> Option<Location> {
        self.airports.get(id).map(|a| a.location)
    }

    /// Airports ordered by code.
    pub fn sorted(&self) -> Vec<&Airport> {
        let mut airports = self.airports.values().collect::<Vec<_>>();
        airports.sort_by(|a, b| a.id.cmp(&b.id));
        airports
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }
}

#[derive(Tabled)]
pub struct AirportRow {
    #[tabled(rename = "Code")]
    code: AirportId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
    #[tabled(rename = "Latitude")]
    latitude: String,
}

impl Airport {
    pub fn row(&self) -> AirportRow {
        AirportRow {
            code: self.id.clone(),
            name: self.name.clone(),
            longitude: format!("{:.4}", self.location.0),
            latitude: format!("{:.4}", self.location.1),
        }
    }
}
