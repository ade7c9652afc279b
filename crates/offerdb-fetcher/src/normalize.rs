//! Normalization from [`RawOffer`] to [`offerdb_core::CanonicalOffer`].
//!
//! Infallible: every raw record yields exactly one canonical offer, however
//! sparse. Missing strings become `""` and `IsFeatured` defaults to `false`.
//! NUL characters are dropped from every string; Postgres `TEXT` rejects them.

use chrono::{DateTime, Utc};
use offerdb_core::{tab_for_program_type, CanonicalOffer, RegionCode};

use crate::types::RawOffer;

/// Normalizes a batch fetched for `region`.
///
/// Every output offer carries `region` and the same `created_at`, so one
/// ingestion cycle is identifiable as a unit. Output order and length match
/// the input.
#[must_use]
pub fn normalize_offers(
    raw: Vec<RawOffer>,
    region: &RegionCode,
    created_at: DateTime<Utc>,
) -> Vec<CanonicalOffer> {
    raw.into_iter()
        .map(|offer| normalize_offer(offer, region, created_at))
        .collect()
}

/// Normalizes a single raw offer.
#[must_use]
pub fn normalize_offer(
    raw: RawOffer,
    region: &RegionCode,
    created_at: DateTime<Utc>,
) -> CanonicalOffer {
    let sales_program_type = text(raw.sales_program_type);
    let tab = tab_for_program_type(&sales_program_type);

    CanonicalOffer {
        offer_id: text(raw.id),
        model_year: text(raw.model_year),
        start_date: text(raw.start_date),
        end_date: text(raw.end_date),
        is_featured: raw.is_featured.unwrap_or(false),
        sales_program_name: text(raw.sales_program_name),
        sales_program_type,
        model_group_name: text(raw.model_group_name),
        photo_url: text(raw.photo_url),
        description: text(raw.description),
        series_item_name: text(raw.series_item_name),
        tab,
        region_code: region.clone(),
        created_at,
    }
}

fn text(value: Option<String>) -> String {
    match value {
        Some(s) if s.contains('\0') => s.replace('\0', ""),
        Some(s) => s,
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
