pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::toml_config::CampusConfig;
pub use core::{coordinator::EnrollmentCoordinator, seat_ledger::SeatLedger};
pub use utils::error::{EnrollError, Result};
