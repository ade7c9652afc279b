use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Matches the `VARCHAR(20)` column in `region_codes`.
pub const MAX_REGION_CODE_LEN: usize = 20;

/// Identifier of a geographic ingestion target, e.g. a US zip code `"97230"`.
///
/// Used both as the `zipCode` query value sent to the offers endpoint and as
/// the partition key for stored offers. The registry owns these; the
/// ingestion pipeline only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Parses a region code, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRegionCode`] if the code is empty, longer
    /// than [`MAX_REGION_CODE_LEN`], or contains whitespace or control
    /// characters.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let code = raw.trim();
        let invalid = |reason| CoreError::InvalidRegionCode {
            code: raw.to_string(),
            reason,
        };

        if code.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if code.chars().count() > MAX_REGION_CODE_LEN {
            return Err(invalid("longer than 20 characters"));
        }
        if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("contains whitespace or control characters"));
        }

        Ok(Self(code.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of this region's entry in the marker store.
    #[must_use]
    pub fn marker_key(&self) -> String {
        format!("{}__last_update", self.0)
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RegionCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RegionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
