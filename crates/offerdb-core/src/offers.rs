use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RegionCode;

/// `SalesProgramType` values that are grouped under [`SPECIAL_PROGRAM_TAB`].
pub const SPECIAL_PROGRAM_TYPES: [&str; 2] = ["AcuraLoyaltyAppreciation", "AcuraConquest"];

/// Tab label shown for loyalty and conquest programs.
pub const SPECIAL_PROGRAM_TAB: &str = "Special Program";

/// A promotional offer in the fixed shape every stored offer conforms to.
///
/// String fields are never absent: anything the remote endpoint omitted is
/// stored as `""` so a batch can be bulk-written column by column. Offers are
/// replaced as a whole on re-ingestion, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOffer {
    /// Upstream offer identifier (`Id`).
    pub offer_id: String,
    pub model_year: String,
    pub start_date: String,
    pub end_date: String,
    pub is_featured: bool,
    pub sales_program_name: String,
    pub sales_program_type: String,
    pub model_group_name: String,
    pub photo_url: String,
    pub description: String,
    pub series_item_name: String,
    /// Display grouping derived from `sales_program_type`; see [`tab_for_program_type`].
    pub tab: String,
    pub region_code: RegionCode,
    /// Shared by every offer normalized in the same ingestion cycle.
    pub created_at: DateTime<Utc>,
}

/// Derives the display tab for a `SalesProgramType`.
///
/// Loyalty and conquest programs collapse into [`SPECIAL_PROGRAM_TAB`]; every
/// other program type is its own tab.
#[must_use]
pub fn tab_for_program_type(sales_program_type: &str) -> String {
    if SPECIAL_PROGRAM_TYPES.contains(&sales_program_type) {
        SPECIAL_PROGRAM_TAB.to_string()
    } else {
        sales_program_type.to_string()
    }
}
