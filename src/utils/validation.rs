use validator::ValidationError;

use crate::error::{Error, Result};

/// Both coordinates must be present and within WGS84 bounds before a company
/// or job can be saved.
pub fn require_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(f64, f64)> {
    match (latitude, longitude) {
        (Some(lat), Some(lng))
            if lat.is_finite()
                && lng.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lng) =>
        {
            Ok((lat, lng))
        }
        _ => Err(Error::BadRequest("coordinates_required".into())),
    }
}

/// ISO 3166-1 alpha-2, any case.
pub fn validate_country_code(code: &str) -> std::result::Result<(), ValidationError> {
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("country_code"))
    }
}

pub fn validate_picture_count(pictures: &[String]) -> std::result::Result<(), ValidationError> {
    if pictures.len() <= crate::services::upload_service::MAX_PICTURES {
        Ok(())
    } else {
        Err(ValidationError::new("too_many_pictures"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_must_be_present_and_in_range() {
        assert_eq!(require_coordinates(Some(36.0), Some(-5.6)).unwrap(), (36.0, -5.6));
        assert!(require_coordinates(None, Some(1.0)).is_err());
        assert!(require_coordinates(Some(91.0), Some(1.0)).is_err());
        assert!(require_coordinates(Some(1.0), Some(-181.0)).is_err());
        assert!(require_coordinates(Some(f64::NAN), Some(1.0)).is_err());
    }

    #[test]
    fn country_codes_are_two_letters() {
        assert!(validate_country_code("es").is_ok());
        assert!(validate_country_code("ESP").is_err());
        assert!(validate_country_code("E1").is_err());
    }
}
