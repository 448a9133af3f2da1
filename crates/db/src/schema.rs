//! SurrealDB schema definitions

use crate::{DbConnection, Result};
use tracing::info;

/// Initialize the database schema
pub async fn initialize_schema(db: &DbConnection) -> Result<()> {
    info!("Initializing database schema...");

    // Define tables and fields
    db.query(SCHEMA_DEFINITION).await?;

    info!("Schema initialized successfully");
    Ok(())
}

const SCHEMA_DEFINITION: &str = r#"
-- ============================================
-- NODE TABLES
-- ============================================

-- Operating flights
DEFINE TABLE flight SCHEMAFULL;
DEFINE FIELD flight_number ON flight TYPE string;

-- Marketing/codeshare designators
DEFINE TABLE flight_designator SCHEMAFULL;
DEFINE FIELD code ON flight_designator TYPE string;

DEFINE TABLE airline SCHEMAFULL;
DEFINE FIELD name ON airline TYPE string;

DEFINE TABLE route SCHEMAFULL;
DEFINE FIELD name ON route TYPE string;

DEFINE TABLE airport SCHEMAFULL;
DEFINE FIELD name ON airport TYPE string;

DEFINE TABLE country SCHEMAFULL;
DEFINE FIELD name ON country TYPE string;

DEFINE TABLE aircraft_config SCHEMAFULL;
DEFINE FIELD code ON aircraft_config TYPE string;

DEFINE TABLE aircraft_type SCHEMAFULL;
DEFINE FIELD name ON aircraft_type TYPE string;

DEFINE TABLE terminal SCHEMAFULL;
DEFINE FIELD name ON terminal TYPE string;

DEFINE TABLE season SCHEMAFULL;
DEFINE FIELD name ON season TYPE string;

-- ============================================
-- GRAPH EDGE TABLES
-- ============================================

-- A designator aliases exactly one operating flight
DEFINE TABLE aliases SCHEMAFULL;
DEFINE FIELD in ON aliases TYPE record<flight_designator>;
DEFINE FIELD out ON aliases TYPE record<flight>;

-- The carrier flying the aircraft
DEFINE TABLE operates SCHEMAFULL;
DEFINE FIELD in ON operates TYPE record<airline>;
DEFINE FIELD out ON operates TYPE record<flight>;

-- The carrier selling seats under a designator
DEFINE TABLE markets SCHEMAFULL;
DEFINE FIELD in ON markets TYPE record<airline>;
DEFINE FIELD out ON markets TYPE record<flight_designator>;

DEFINE TABLE serves SCHEMAFULL;
DEFINE FIELD in ON serves TYPE record<flight>;
DEFINE FIELD out ON serves TYPE record<route>;

DEFINE TABLE origin SCHEMAFULL;
DEFINE FIELD in ON origin TYPE record<route>;
DEFINE FIELD out ON origin TYPE record<airport>;

DEFINE TABLE destination SCHEMAFULL;
DEFINE FIELD in ON destination TYPE record<route>;
DEFINE FIELD out ON destination TYPE record<airport>;

DEFINE TABLE located_in SCHEMAFULL;
DEFINE FIELD in ON located_in TYPE record<airport>;
DEFINE FIELD out ON located_in TYPE record<country>;

DEFINE TABLE planned_config SCHEMAFULL;
DEFINE FIELD in ON planned_config TYPE record<flight>;
DEFINE FIELD out ON planned_config TYPE record<aircraft_config>;

DEFINE TABLE of_type SCHEMAFULL;
DEFINE FIELD in ON of_type TYPE record<aircraft_config>;
DEFINE FIELD out ON of_type TYPE record<aircraft_type>;

DEFINE TABLE planned_terminal SCHEMAFULL;
DEFINE FIELD in ON planned_terminal TYPE record<flight>;
DEFINE FIELD out ON planned_terminal TYPE record<terminal>;

DEFINE TABLE planned_in_season SCHEMAFULL;
DEFINE FIELD in ON planned_in_season TYPE record<flight>;
DEFINE FIELD out ON planned_in_season TYPE record<season>;

-- ============================================
-- INDEXES
-- ============================================

-- Operating flight numbers are the canonical identity
DEFINE INDEX idx_flight_number ON flight FIELDS flight_number UNIQUE;

-- Designator codes are NOT unique: several designators may carry the same
-- code; resolution breaks ties by record id
DEFINE INDEX idx_designator_code ON flight_designator FIELDS code;

DEFINE INDEX idx_airline_name ON airline FIELDS name UNIQUE;
DEFINE INDEX idx_airport_name ON airport FIELDS name UNIQUE;
DEFINE INDEX idx_country_name ON country FIELDS name UNIQUE;
"#;
