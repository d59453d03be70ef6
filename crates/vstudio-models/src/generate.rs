//! Text-to-video generation requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl FromStr for Dimension {
    type Err = ModelError;

    /// Parse `"1280x720"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidDimension(s.to_string());

        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single-scene avatar video driven by a text script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateVideoRequest {
    pub avatar_id: String,
    pub input_text: String,
    pub voice_id: String,
    pub dimension: Dimension,
    #[serde(default)]
    pub caption: bool,
}

impl GenerateVideoRequest {
    /// Check that every required field is present.
    pub fn validate(&self) -> ModelResult<()> {
        if self.avatar_id.trim().is_empty() {
            return Err(ModelError::MissingField("avatar_id"));
        }
        if self.input_text.trim().is_empty() {
            return Err(ModelError::MissingField("input_text"));
        }
        if self.voice_id.trim().is_empty() {
            return Err(ModelError::MissingField("voice_id"));
        }
        Ok(())
    }
}
