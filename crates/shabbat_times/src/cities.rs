//! Built-in city catalog

use serde::Serialize;
use shabbat_common::FieldError;

const MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn city(name: &'static str, country: &'static str, latitude: f64, longitude: f64) -> City {
    City {
        name,
        country,
        latitude,
        longitude,
    }
}

pub static CITIES: [City; 20] = [
    city("New York", "United States", 40.7128, -74.0060),
    city("Los Angeles", "United States", 34.0522, -118.2437),
    city("Chicago", "United States", 41.8781, -87.6298),
    city("London", "United Kingdom", 51.5074, -0.1278),
    city("Paris", "France", 48.8566, 2.3522),
    city("Tokyo", "Japan", 35.6762, 139.6503),
    city("Sydney", "Australia", -33.8688, 151.2093),
    city("Berlin", "Germany", 52.5200, 13.4050),
    city("Rome", "Italy", 41.9028, 12.4964),
    city("Madrid", "Spain", 40.4168, -3.7038),
    city("Toronto", "Canada", 43.6532, -79.3832),
    city("Dubai", "United Arab Emirates", 25.2048, 55.2708),
    city("Singapore", "Singapore", 1.3521, 103.8198),
    city("Mumbai", "India", 19.0760, 72.8777),
    city("São Paulo", "Brazil", -23.5505, -46.6333),
    city("Mexico City", "Mexico", 19.4326, -99.1332),
    city("Amsterdam", "Netherlands", 52.3676, 4.9041),
    city("Barcelona", "Spain", 41.3851, 2.1734),
    city("Vienna", "Austria", 48.2082, 16.3738),
    city("Stockholm", "Sweden", 59.3293, 18.0686),
];

/// Case-insensitive substring match on name or country, first five in catalog order.
pub fn search_cities(query: &str) -> Vec<City> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    CITIES
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle) || c.country.to_lowercase().contains(&needle)
        })
        .take(MAX_RESULTS)
        .copied()
        .collect()
}

/// Field errors for a location submitted by a client.
pub fn validate_location(city_name: &str, latitude: f64, longitude: f64) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if city_name.trim().is_empty() {
        errors.push(FieldError::new("city_name", "City name is required"));
    }
    errors.extend(coordinate_errors(latitude, longitude));
    errors
}

pub fn coordinate_errors(latitude: f64, longitude: f64) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !(-90.0..=90.0).contains(&latitude) {
        errors.push(FieldError::new(
            "latitude",
            "Latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        errors.push(FieldError::new(
            "longitude",
            "Longitude must be between -180 and 180",
        ));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_matches_nothing() {
        assert!(search_cities("").is_empty());
        assert!(search_cities("   ").is_empty());
    }

    #[test]
    fn test_country_match_is_case_insensitive() {
        let names: Vec<_> = search_cities("SPAIN").iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Madrid", "Barcelona"]);
    }

    #[test]
    fn test_results_are_capped() {
        // "a" appears in far more than five entries
        let results = search_cities("a");
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].name, "New York");
    }

    #[test]
    fn test_location_validation() {
        assert!(validate_location("Paris", 48.8566, 2.3522).is_empty());
        let errors = validate_location(" ", 95.0, -181.0);
        assert_eq!(errors.len(), 3);
    }
}
