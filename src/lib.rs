pub mod configuration;
pub mod domain;
pub mod routes;
pub mod session_state;
pub mod startup;
pub mod submission_store;
pub mod telemetry;
mod utils;

extern crate tera;
