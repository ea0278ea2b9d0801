pub mod error;
pub mod evaluators;
pub mod events;
pub mod fetch;
pub mod geo;
pub mod infra;
pub mod output;
pub mod parser;
pub mod services;
pub mod trips;
pub mod units;
pub mod window;
