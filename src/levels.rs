//! Level data artifact handling.
//!
//! A level pack may arrive as a precomputed JSON array. Decoding
//! validates every spec so a malformed one can never reach the
//! engine; any failure falls back to local generation, logged and
//! non-fatal.

use thiserror::Error;

use crate::sim::{LevelGenerator, LevelSpec, SpecError};

/// Why a level data artifact was rejected.
#[derive(Debug, Error)]
pub enum LevelDataError {
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level data holds no levels")]
    Empty,
    #[error("level {id} is invalid: {reason}")]
    Invalid { id: u32, reason: SpecError },
}

/// Decode and validate an ordered level pack.
pub fn decode_levels(json: &str) -> Result<Vec<LevelSpec>, LevelDataError> {
    let levels: Vec<LevelSpec> = serde_json::from_str(json)?;
    if levels.is_empty() {
        return Err(LevelDataError::Empty);
    }
    for level in &levels {
        level
            .validate()
            .map_err(|reason| LevelDataError::Invalid {
                id: level.id,
                reason,
            })?;
    }
    Ok(levels)
}

/// Use the fetched artifact when present and valid; otherwise generate
/// `count` levels locally from `seed`. Never fails.
pub fn load_or_generate(json: Option<&str>, count: u32, seed: u64) -> Vec<LevelSpec> {
    if let Some(json) = json {
        match decode_levels(json) {
            Ok(levels) => {
                log::info!("loaded {} levels from artifact", levels.len());
                return levels;
            }
            Err(err) => {
                log::warn!("level data rejected ({err}), generating locally");
            }
        }
    } else {
        log::info!("no level data artifact, generating locally");
    }

    LevelGenerator::new(seed).generate_many(count)
}
