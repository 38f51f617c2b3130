pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod occupancy;
pub mod random;
pub mod snapshot;
pub mod state;
