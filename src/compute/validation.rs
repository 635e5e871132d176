//! Validation for geographic coordinates and search radii.
//!
//! The index itself accepts any coordinates; these checks exist for callers
//! that want to reject bad input before it is inserted.

use crate::error::{Result, TierGridError};
use tiergrid_types::entity::Locatable;
use tiergrid_types::units::DistanceUnit;

/// Validates a latitude/longitude pair.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use tiergrid::compute::validation::validate_coordinates;
///
/// assert!(validate_coordinates(-6.2088, 106.8456).is_ok());
/// assert!(validate_coordinates(95.0, 0.0).is_err());
/// assert!(validate_coordinates(0.0, 200.0).is_err());
/// ```
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() {
        return Err(TierGridError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !longitude.is_finite() {
        return Err(TierGridError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(TierGridError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(TierGridError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    Ok(())
}

/// Validates an entity's id and position.
pub fn validate_entity<E: Locatable + ?Sized>(entity: &E) -> Result<()> {
    if entity.id().is_empty() {
        return Err(TierGridError::InvalidInput(
            "Entity id must not be empty".to_string(),
        ));
    }

    validate_coordinates(entity.latitude(), entity.longitude())
        .map_err(|e| TierGridError::InvalidInput(format!("Entity '{}': {}", entity.id(), e)))
}

/// Validates a search radius in miles.
///
/// Ensures radius is positive, finite, and not exceeding Earth's circumference.
///
/// # Examples
///
/// ```
/// use tiergrid::compute::validation::validate_radius;
///
/// assert!(validate_radius(5.0).is_ok());
/// assert!(validate_radius(0.0).is_err());
/// assert!(validate_radius(-1.0).is_err());
/// assert!(validate_radius(f64::INFINITY).is_err());
/// ```
pub fn validate_radius(radius_miles: f64) -> Result<()> {
    if !radius_miles.is_finite() {
        return Err(TierGridError::InvalidInput(format!(
            "Radius must be finite, got: {}",
            radius_miles
        )));
    }
    if radius_miles <= 0.0 {
        return Err(TierGridError::InvalidInput(format!(
            "Radius must be positive, got: {}",
            radius_miles
        )));
    }
    let circumference = DistanceUnit::Miles.earth_circumference();
    if radius_miles > circumference {
        return Err(TierGridError::InvalidInput(format!(
            "Radius {} exceeds Earth's circumference ({} miles)",
            radius_miles, circumference
        )));
    }
    Ok(())
}
