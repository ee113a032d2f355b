//! Response shapes for the Places Web Service (Nearby Search, Text Search, Details).

use serde::Deserialize;

/// The status/results envelope shared by the search endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    pub next_page_token: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsEnvelope {
    pub status: String,
    pub result: Option<PlaceResult>,
    pub error_message: Option<String>,
}

/// One page of search results plus the token for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct PlacesPage {
    pub results: Vec<PlaceResult>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub geometry: Option<Geometry>,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub price_level: Option<u8>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub business_status: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub formatted_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
    pub editorial_summary: Option<EditorialSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorialSummary {
    pub overview: Option<String>,
}
