use crate::clock::ClockError;
use crate::config::ConfigError;
use crate::snapshot::SnapshotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Clock(#[from] ClockError),
}
