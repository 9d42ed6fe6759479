use thiserror::Error;

/// Conditions that mean the snapshot itself cannot be trusted.
///
/// Ordinary domain rejections (unknown enemy, blocked exit, missing item) are
/// not errors; they come back as structured results with `success: false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The player's current location is not a key of the world map.
    #[error("corrupted state: player location '{location_id}' does not exist")]
    CorruptState { location_id: String },

    /// Stats outside their allowed ranges (usually from a hand-edited save).
    #[error("corrupted state: invalid stats ({0})")]
    InvalidStats(String),
}
