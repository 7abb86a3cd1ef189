pub mod configuration;
pub mod domain;
pub mod helper;
pub mod live_search;
pub mod ports;
pub mod repositories;
pub mod routes;
pub mod search_client;
pub mod startup;
pub mod telemetry;
pub mod use_cases;
