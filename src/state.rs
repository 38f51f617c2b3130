use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
}

impl SpotStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Available => Self::Occupied,
            Self::Occupied => Self::Available,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Transition class of a spot. Premium spots use their own flip probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotClass {
    Premium,
    Standard,
}

/// Static description of one simulated lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotConfig {
    pub lot_id: String,
    pub zone_id: String,
    pub total_spots: u32,
}

impl LotConfig {
    pub fn new(lot_id: impl Into<String>, zone_id: impl Into<String>, total_spots: u32) -> Self {
        Self {
            lot_id: lot_id.into(),
            zone_id: zone_id.into(),
            total_spots,
        }
    }

    /// Built-in lots used when the configuration does not list any.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Lot_A", "zone_1", 492),
            Self::new("Lot_B", "zone_2", 166),
            Self::new("Lot_C", "zone_3", 188),
        ]
    }

    /// Spot id for a 1-based index within this lot.
    pub fn spot_id(&self, index: u32) -> String {
        spot_id(&self.lot_id, index)
    }
}

pub fn spot_id(lot_id: &str, index: u32) -> String {
    format!("{lot_id}_Spot_{index}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotRecord {
    pub spot_id: String,
    pub status: SpotStatus,
}

/// One entry of the snapshot array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRecord {
    pub lot_id: String,
    pub zone_type: String,
    pub total_spots: u32,
    pub available_spots: u32,
    pub updated_at: String,
    pub parking_status: Vec<SpotRecord>,
}

impl LotRecord {
    pub fn counted_available(&self) -> usize {
        self.parking_status
            .iter()
            .filter(|spot| spot.status.is_available())
            .count()
    }
}

/// Linear scan for the record of `lot_id`.
pub fn find_lot<'a>(records: &'a [LotRecord], lot_id: &str) -> Option<&'a LotRecord> {
    records.iter().find(|record| record.lot_id == lot_id)
}
