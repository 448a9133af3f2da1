//! Repository pattern for flight graph operations

use crate::{DbConnection, DbError, Result};
use groundtruth_core::{Airline, Flight, FlightDesignator, FlightImport, FlightImportFile, FlightRecord};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use tracing::instrument;

/// Outcome of a flight-code resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The code matched a flight, directly or through an alias
    Found(FlightRecord),
    /// No flight or designator carries the code
    NotFound,
}

/// Repository for all flight graph operations
#[derive(Clone)]
pub struct FlightRepository {
    db: DbConnection,
}

/// The single resolution statement, bound with `$code`.
///
/// Direct operating-flight matches take precedence over designator aliases.
/// Wherever several rows could match, the lowest record id wins, so
/// resolution is deterministic even on ambiguous data. Every planning
/// traversal is optional: a missing route, config, terminal or season
/// leaves its field empty without eliminating the row.
const RESOLVE_FLIGHT_QUERY: &str = r#"
    LET $direct = (SELECT * FROM flight WHERE flight_number = $code ORDER BY id ASC LIMIT 1)[0];
    LET $desig = (SELECT * FROM flight_designator WHERE code = $code ORDER BY id ASC LIMIT 1)[0];
    LET $aliased_id = (SELECT out FROM aliases WHERE in = $desig.id ORDER BY out ASC LIMIT 1)[0].out;
    LET $flight_id = $direct.id ?? $aliased_id;
    LET $is_codeshare = ($direct IS NONE AND $aliased_id IS NOT NONE);
    LET $flight = (SELECT * FROM flight WHERE id = $flight_id LIMIT 1)[0];
    LET $op_airline = (SELECT in.name AS name FROM operates WHERE out = $flight_id ORDER BY name ASC LIMIT 1)[0].name;
    LET $mkt_airline = (SELECT in.name AS name FROM markets WHERE out = $desig.id ORDER BY name ASC LIMIT 1)[0].name;
    LET $route_id = (SELECT out FROM serves WHERE in = $flight_id ORDER BY out ASC LIMIT 1)[0].out;
    LET $orig_id = (SELECT out FROM origin WHERE in = $route_id LIMIT 1)[0].out;
    LET $dest_id = (SELECT out FROM destination WHERE in = $route_id LIMIT 1)[0].out;
    LET $config_id = (SELECT out FROM planned_config WHERE in = $flight_id LIMIT 1)[0].out;
    RETURN {
        operating_flight_number: $flight.flight_number,
        is_codeshare: $is_codeshare,
        operating_airline: $op_airline,
        marketing_airline: $mkt_airline,
        route_code: (SELECT VALUE name FROM route WHERE id = $route_id LIMIT 1)[0],
        origin_airport: (SELECT VALUE name FROM airport WHERE id = $orig_id LIMIT 1)[0],
        origin_country: (SELECT out.name AS name FROM located_in WHERE in = $orig_id LIMIT 1)[0].name,
        destination_airport: (SELECT VALUE name FROM airport WHERE id = $dest_id LIMIT 1)[0],
        destination_country: (SELECT out.name AS name FROM located_in WHERE in = $dest_id LIMIT 1)[0].name,
        aircraft_config_code: (SELECT VALUE code FROM aircraft_config WHERE id = $config_id LIMIT 1)[0],
        aircraft_type: (SELECT out.name AS name FROM of_type WHERE in = $config_id LIMIT 1)[0].name,
        terminal: (SELECT out.name AS name FROM planned_terminal WHERE in = $flight_id LIMIT 1)[0].name,
        season: (SELECT out.name AS name FROM planned_in_season WHERE in = $flight_id LIMIT 1)[0].name
    };
"#;

/// Index of the final RETURN in `RESOLVE_FLIGHT_QUERY` (each LET occupies
/// one result slot)
const RESOLVE_RETURN_INDEX: usize = 12;

impl FlightRepository {
    /// Create a new repository
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    // ==========================================
    // RESOLUTION
    // ==========================================

    /// Resolve a normalized flight code to a single flat record.
    ///
    /// Issues exactly one statement per call and never retries; store
    /// failures bubble up with the driver message intact.
    #[instrument(skip(self))]
    pub async fn resolve_flight(&self, code: &str) -> Result<Resolution> {
        let mut response = self
            .db
            .query(RESOLVE_FLIGHT_QUERY)
            .bind(("code", code.to_string()))
            .await?;

        let rows: Vec<ResolvedRow> = response.take(RESOLVE_RETURN_INDEX)?;

        match rows.into_iter().next() {
            Some(row) if row.operating_flight_number.is_some() => {
                Ok(Resolution::Found(row.into_record(code)))
            }
            _ => Ok(Resolution::NotFound),
        }
    }

    // ==========================================
    // NODE OPERATIONS
    // ==========================================

    /// Get or create a flight by operating number
    #[instrument(skip(self, flight), fields(number = %flight.flight_number))]
    pub async fn upsert_flight(&self, flight: Flight) -> Result<Flight> {
        let existing: Vec<Flight> = self
            .db
            .query("SELECT * FROM flight WHERE flight_number = $number ORDER BY id ASC LIMIT 1")
            .bind(("number", flight.flight_number.clone()))
            .await?
            .take(0)?;

        if let Some(found) = existing.into_iter().next() {
            return Ok(found);
        }

        let created: Option<Flight> = self.db.create("flight").content(flight).await?;
        created.ok_or_else(|| DbError::CreateFailed("flight".into()))
    }

    /// Get or create an airline by name
    #[instrument(skip(self, airline), fields(name = %airline.name))]
    pub async fn upsert_airline(&self, airline: Airline) -> Result<Airline> {
        let existing: Vec<Airline> = self
            .db
            .query("SELECT * FROM airline WHERE name = $name ORDER BY id ASC LIMIT 1")
            .bind(("name", airline.name.clone()))
            .await?
            .take(0)?;

        if let Some(found) = existing.into_iter().next() {
            return Ok(found);
        }

        let created: Option<Airline> = self.db.create("airline").content(airline).await?;
        created.ok_or_else(|| DbError::CreateFailed("airline".into()))
    }

    /// Create a designator.
    ///
    /// Codes are deliberately not unique: several designators may carry the
    /// same code, and resolution breaks the tie by record id.
    #[instrument(skip(self, designator), fields(code = %designator.code))]
    pub async fn create_designator(&self, designator: FlightDesignator) -> Result<FlightDesignator> {
        let created: Option<FlightDesignator> = self
            .db
            .create("flight_designator")
            .content(designator)
            .await?;
        created.ok_or_else(|| DbError::CreateFailed("flight_designator".into()))
    }

    // ==========================================
    // EDGE OPERATIONS
    // ==========================================

    /// Point a designator at the flight it aliases
    #[instrument(skip(self))]
    pub async fn link_alias(&self, designator: &RecordId, flight: &RecordId) -> Result<()> {
        self.db
            .query("RELATE $from->aliases->$to")
            .bind(("from", designator.clone()))
            .bind(("to", flight.clone()))
            .await?;
        Ok(())
    }

    /// Record the carrier operating a flight
    #[instrument(skip(self))]
    pub async fn link_operates(&self, airline: &RecordId, flight: &RecordId) -> Result<()> {
        self.db
            .query("RELATE $from->operates->$to")
            .bind(("from", airline.clone()))
            .bind(("to", flight.clone()))
            .await?;
        Ok(())
    }

    /// Record the carrier marketing a designator
    #[instrument(skip(self))]
    pub async fn link_markets(&self, airline: &RecordId, designator: &RecordId) -> Result<()> {
        self.db
            .query("RELATE $from->markets->$to")
            .bind(("from", airline.clone()))
            .bind(("to", designator.clone()))
            .await?;
        Ok(())
    }

    // ==========================================
    // IMPORT
    // ==========================================

    /// Load one imported flight and its planning attributes into the graph
    #[instrument(skip(self, import), fields(number = %import.flight_number))]
    pub async fn import_flight(&self, import: &FlightImport) -> Result<()> {
        let flight = self.upsert_flight(Flight::new(&import.flight_number)).await?;
        let flight_id = require_id(flight.id, "flight")?;

        let airline = self
            .upsert_airline(Airline::new(&import.operating_airline))
            .await?;
        self.link_operates(&require_id(airline.id, "airline")?, &flight_id)
            .await?;

        for designator in &import.designators {
            let desig = self
                .create_designator(FlightDesignator::new(&designator.code))
                .await?;
            let desig_id = require_id(desig.id, "flight_designator")?;
            self.link_alias(&desig_id, &flight_id).await?;

            if let Some(marketing) = &designator.marketing_airline {
                let marketing = self.upsert_airline(Airline::new(marketing)).await?;
                self.link_markets(&require_id(marketing.id, "airline")?, &desig_id)
                    .await?;
            }
        }

        if let Some(route) = &import.route {
            let route_id = self.upsert_node("route", "name", &route.name).await?;
            self.relate(&flight_id, "serves", &route_id).await?;

            let orig = self.upsert_node("airport", "name", &route.origin.airport).await?;
            self.relate(&route_id, "origin", &orig).await?;
            let orig_country = self
                .upsert_node("country", "name", &route.origin.country)
                .await?;
            self.relate(&orig, "located_in", &orig_country).await?;

            let dest = self
                .upsert_node("airport", "name", &route.destination.airport)
                .await?;
            self.relate(&route_id, "destination", &dest).await?;
            let dest_country = self
                .upsert_node("country", "name", &route.destination.country)
                .await?;
            self.relate(&dest, "located_in", &dest_country).await?;
        }

        // Aircraft type hangs off the config node, so a type without a
        // config has nowhere to attach
        if let Some(config) = &import.aircraft_config {
            let config_id = self.upsert_node("aircraft_config", "code", config).await?;
            self.relate(&flight_id, "planned_config", &config_id).await?;

            if let Some(aircraft_type) = &import.aircraft_type {
                let type_id = self
                    .upsert_node("aircraft_type", "name", aircraft_type)
                    .await?;
                self.relate(&config_id, "of_type", &type_id).await?;
            }
        }

        if let Some(terminal) = &import.terminal {
            let terminal_id = self.upsert_node("terminal", "name", terminal).await?;
            self.relate(&flight_id, "planned_terminal", &terminal_id).await?;
        }

        if let Some(season) = &import.season {
            let season_id = self.upsert_node("season", "name", season).await?;
            self.relate(&flight_id, "planned_in_season", &season_id).await?;
        }

        Ok(())
    }

    /// Load a whole schedule document; returns the number of flights loaded
    #[instrument(skip(self, file))]
    pub async fn import_schedule(&self, file: &FlightImportFile) -> Result<usize> {
        for flight in &file.flights {
            self.import_flight(flight).await?;
        }
        Ok(file.flight_count())
    }

    // ==========================================
    // STATS
    // ==========================================

    /// Get graph statistics
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<GraphStats> {
        let stats: Vec<GraphStats> = self
            .db
            .query(
                r#"
                RETURN {
                    flight_count: (SELECT count() FROM flight GROUP ALL)[0].count ?? 0,
                    designator_count: (SELECT count() FROM flight_designator GROUP ALL)[0].count ?? 0,
                    airline_count: (SELECT count() FROM airline GROUP ALL)[0].count ?? 0,
                    route_count: (SELECT count() FROM route GROUP ALL)[0].count ?? 0
                }
            "#,
            )
            .await?
            .take(0)?;

        stats
            .into_iter()
            .next()
            .ok_or_else(|| DbError::QueryFailed("stats".into()))
    }

    // ==========================================
    // INTERNALS
    // ==========================================

    /// Get or create a node holding a single named field.
    ///
    /// Table and field names come from the fixed schema above, never from
    /// input; only the value is bound.
    async fn upsert_node(&self, table: &str, field: &str, value: &str) -> Result<RecordId> {
        let select = format!("SELECT id FROM {table} WHERE {field} = $value ORDER BY id ASC LIMIT 1");
        let existing: Vec<NodeRow> = self
            .db
            .query(select)
            .bind(("value", value.to_string()))
            .await?
            .take(0)?;

        if let Some(row) = existing.into_iter().next() {
            return Ok(row.id);
        }

        let create = format!("CREATE {table} SET {field} = $value");
        let created: Vec<NodeRow> = self
            .db
            .query(create)
            .bind(("value", value.to_string()))
            .await?
            .take(0)?;

        created
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| DbError::CreateFailed(table.to_string()))
    }

    /// Create one graph edge. Edge table names are literals from the fixed
    /// schema, injected before the statement is sent.
    async fn relate(&self, from: &RecordId, table: &str, to: &RecordId) -> Result<()> {
        let statement = format!("RELATE $from->{table}->$to");
        self.db
            .query(statement)
            .bind(("from", from.clone()))
            .bind(("to", to.clone()))
            .await?;
        Ok(())
    }
}

fn require_id(id: Option<RecordId>, table: &str) -> Result<RecordId> {
    id.ok_or_else(|| DbError::CreateFailed(table.to_string()))
}

// ==========================================
// RESULT TYPES
// ==========================================

/// Single-column projection of a node's record id, used by `upsert_node`
/// when it runs `SELECT id ...` / `CREATE ...`.
#[derive(Debug, Deserialize)]
struct NodeRow {
    id: RecordId,
}

/// Raw projection of the resolution statement, before reduction
#[derive(Debug, Deserialize)]
struct ResolvedRow {
    #[serde(default)]
    operating_flight_number: Option<String>,
    #[serde(default)]
    is_codeshare: Option<bool>,
    #[serde(default)]
    operating_airline: Option<String>,
    #[serde(default)]
    marketing_airline: Option<String>,
    #[serde(default)]
    route_code: Option<String>,
    #[serde(default)]
    origin_airport: Option<String>,
    #[serde(default)]
    origin_country: Option<String>,
    #[serde(default)]
    destination_airport: Option<String>,
    #[serde(default)]
    destination_country: Option<String>,
    #[serde(default)]
    aircraft_type: Option<String>,
    #[serde(default)]
    aircraft_config_code: Option<String>,
    #[serde(default)]
    terminal: Option<String>,
    #[serde(default)]
    season: Option<String>,
}

impl ResolvedRow {
    /// Reduce the raw row to the flat record. The marketing airline is
    /// reported only when resolution went through the alias path.
    fn into_record(self, code: &str) -> FlightRecord {
        let is_codeshare = self.is_codeshare.unwrap_or(false);
        let mut record = FlightRecord::new(
            code,
            self.operating_flight_number.unwrap_or_default(),
            is_codeshare,
        );
        record.operating_airline = self.operating_airline;
        record.marketing_airline = if is_codeshare {
            self.marketing_airline
        } else {
            None
        };
        record.route_code = self.route_code;
        record.origin_airport = self.origin_airport;
        record.origin_country = self.origin_country;
        record.destination_airport = self.destination_airport;
        record.destination_country = self.destination_country;
        record.aircraft_type = self.aircraft_type;
        record.aircraft_config_code = self.aircraft_config_code;
        record.terminal = self.terminal;
        record.season = self.season;
        record
    }
}

/// Node counts for the stats command
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphStats {
    #[serde(default)]
    pub flight_count: i64,
    #[serde(default)]
    pub designator_count: i64,
    #[serde(default)]
    pub airline_count: i64,
    #[serde(default)]
    pub route_count: i64,
}
