//! PulseOps backend library exports

pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
