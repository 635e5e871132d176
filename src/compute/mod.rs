//! Projection, tier grid, distance and validation helpers.

pub mod distance;
pub mod projection;
pub mod tier;
pub mod validation;

pub use distance::{SearchBounds, haversine_miles, planar_distance};
pub use projection::{ProjectedRect, Projector, SinusoidalProjector};
pub use tier::{BoxId, BoxRange, TierPlotter, best_fit, best_fit_in, field_name_for};
