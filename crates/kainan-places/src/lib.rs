pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::{PlacesClient, PlacesQuery};
pub use error::PlacesError;
pub use normalize::{infer_category, normalize_place, normalize_places};
pub use types::{PlaceResult, PlacesPage};
