//! Flight schedule import format
//!
//! One entry per operating flight, with optional codeshare designators,
//! route endpoints, and planning attributes. Accepts either a wrapped
//! `{"flights": [...]}` document or a bare array.

use serde::{Deserialize, Serialize};

/// One side of a route: the airport and the country it sits in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointImport {
    pub airport: String,
    pub country: String,
}

/// A planned route between two airports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteImport {
    /// Route code, e.g. "ZRH-JFK"
    pub name: String,
    pub origin: EndpointImport,
    pub destination: EndpointImport,
}

/// A codeshare designator sold on an operating flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignatorImport {
    /// The alias code, e.g. "UA9715"
    pub code: String,

    /// Carrier selling seats under the alias, when known
    #[serde(default)]
    pub marketing_airline: Option<String>,
}

/// A complete operating flight entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightImport {
    /// Operating flight number, e.g. "LX15"
    pub flight_number: String,

    /// Carrier flying the aircraft
    pub operating_airline: String,

    /// Marketing aliases pointing at this flight
    #[serde(default)]
    pub designators: Vec<DesignatorImport>,

    /// Planned route detail; a flight may lack it
    #[serde(default)]
    pub route: Option<RouteImport>,

    #[serde(default)]
    pub aircraft_type: Option<String>,

    #[serde(default)]
    pub aircraft_config: Option<String>,

    #[serde(default)]
    pub terminal: Option<String>,

    #[serde(default)]
    pub season: Option<String>,
}

/// A full schedule import document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightImportFile {
    #[serde(alias = "schedule")]
    pub flights: Vec<FlightImport>,
}

impl FlightImportFile {
    /// Parse an import document from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        // Try the wrapped document first
        if let Ok(file) = serde_json::from_str::<FlightImportFile>(json) {
            return Ok(file);
        }

        // Try a bare array of flights
        if let Ok(flights) = serde_json::from_str::<Vec<FlightImport>>(json) {
            return Ok(FlightImportFile { flights });
        }

        // Fall back to standard parsing (will give a proper error)
        serde_json::from_str(json)
    }

    /// Number of flights in the document
    pub fn flight_count(&self) -> usize {
        self.flights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPED: &str = r#"{
        "flights": [
            {
                "flight_number": "LX15",
                "operating_airline": "Swiss",
                "designators": [
                    {"code": "UA9715", "marketing_airline": "United Airlines"}
                ],
                "route": {
                    "name": "ZRH-JFK",
                    "origin": {"airport": "Zurich", "country": "Switzerland"},
                    "destination": {"airport": "JFK", "country": "USA"}
                },
                "aircraft_type": "Boeing 777-300ER",
                "aircraft_config": "77W"
            }
        ]
    }"#;

    #[test]
    fn test_parse_wrapped_document() {
        let file = FlightImportFile::from_json(WRAPPED).unwrap();
        assert_eq!(file.flight_count(), 1);

        let flight = &file.flights[0];
        assert_eq!(flight.flight_number, "LX15");
        assert_eq!(flight.designators[0].code, "UA9715");
        assert_eq!(
            flight.route.as_ref().unwrap().origin.airport,
            "Zurich"
        );
        assert!(flight.terminal.is_none());
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{"flight_number": "BA711", "operating_airline": "British Airways"}]"#;
        let file = FlightImportFile::from_json(json).unwrap();
        assert_eq!(file.flight_count(), 1);
        assert!(file.flights[0].route.is_none());
        assert!(file.flights[0].designators.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(FlightImportFile::from_json("not json").is_err());
    }
}
