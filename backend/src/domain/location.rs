//! Coordinate extraction from free-text or map-link location strings.
//!
//! Devices report `last_known_location` either as a map URL carrying
//! `q=<lat>,<lng>` or as loose text containing a `lat, lng` pair. Extraction is
//! best effort and never fails loudly.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

static PAIR_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn pair_regex() -> Option<&'static Regex> {
    PAIR_RE
        .get_or_init(|| {
            match Regex::new(r"(-?\d+\.\d+)\s*,\s*(-?\d+\.\d+)") {
                Ok(re) => Some(re),
                Err(error) => {
                    tracing::error!(%error, "coordinate pattern failed to compile");
                    None
                }
            }
        })
        .as_ref()
}

/// WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a pair, rejecting values outside WGS84 ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// OpenStreetMap link centred on the coordinates.
    pub fn map_link(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=15/{lat}/{lng}",
            lat = self.latitude,
            lng = self.longitude,
        )
    }
}

/// Extract coordinates from a location string.
///
/// Tries the `q` query parameter of a URL first, then any `lat,lng` pair in
/// the text. Returns `None` when neither yields a valid pair.
///
/// # Examples
/// ```
/// use guardian_vision::domain::extract_coordinates;
///
/// let coords = extract_coordinates("https://maps.google.com/?q=12.34,56.78").expect("pair");
/// assert_eq!((coords.latitude, coords.longitude), (12.34, 56.78));
/// assert!(extract_coordinates("no coordinates here").is_none());
/// ```
pub fn extract_coordinates(raw: &str) -> Option<Coordinates> {
    from_query_parameter(raw).or_else(|| from_loose_text(raw))
}

fn from_query_parameter(raw: &str) -> Option<Coordinates> {
    let url = Url::parse(raw.trim()).ok()?;
    let (_, value) = url.query_pairs().find(|(key, _)| key == "q")?;
    let (lat, lng) = value.split_once(',')?;
    Coordinates::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?)
}

fn from_loose_text(raw: &str) -> Option<Coordinates> {
    pair_regex()?.captures_iter(raw).find_map(|captures| {
        let lat = captures.get(1)?.as_str().parse().ok()?;
        let lng = captures.get(2)?.as_str().parse().ok()?;
        Coordinates::new(lat, lng)
    })
}
