pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::OffersClient;
pub use error::FetchError;
pub use normalize::{normalize_offer, normalize_offers};
pub use types::{OffersResponse, RawOffer};
