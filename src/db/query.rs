//! Coarse radius filters built from the tier grid.

use crate::compute::distance::SearchBounds;
use crate::compute::projection::Projector;
use crate::compute::tier::{TierPlotter, best_fit};
use crate::storage::Filter;

/// Stored field holding the serialized entity.
pub const JSON_FIELD: &str = "json";
/// Keyword field that marks entity documents.
pub const METAFILE_FIELD: &str = "metafile";
pub const METAFILE_DOC: &str = "doc";
pub const LATITUDE_FIELD: &str = "lat";
pub const LONGITUDE_FIELD: &str = "lon";

/// A radius query translated into a store filter.
///
/// The filter selects every document whose box, at each tier from the
/// coarsest configured tier down to the tier fitted to the radius, touches
/// the circle's bounding box. It never misses a point inside the circle but
/// may return points outside it.
#[derive(Debug, Clone)]
pub struct ProximityQuery {
    latitude: f64,
    longitude: f64,
    radius_miles: f64,
    tier: u32,
    bounds: SearchBounds,
    filter: Filter,
}

impl ProximityQuery {
    /// Build the query for a circle against `plotters`, which cover the
    /// configured tier range in ascending order.
    pub fn new<P: Projector>(
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
        plotters: &[TierPlotter<P>],
    ) -> Self {
        let bounds = SearchBounds::around(latitude, longitude, radius_miles);
        let tier = select_tier(radius_miles, plotters);

        // Finest tier first: `And` resolves its first clause through the postings.
        let mut clauses: Vec<Filter> = plotters
            .iter()
            .filter(|plotter| plotter.tier_level() <= tier)
            .rev()
            .map(|plotter| {
                let ranges = bounds
                    .project(plotter.projector())
                    .iter()
                    .map(|rect| Filter::box_range(plotter.tier_field_name(), plotter.covering(rect)))
                    .collect();
                Filter::Or(ranges)
            })
            .collect();
        clauses.push(Filter::term(METAFILE_FIELD, METAFILE_DOC));

        log::debug!(
            "Radius query ({}, {}) r={}mi at tier {} over {} interval(s)",
            latitude,
            longitude,
            radius_miles,
            tier,
            bounds.lon_intervals.len()
        );

        Self {
            latitude,
            longitude,
            radius_miles,
            tier,
            bounds,
            filter: Filter::And(clauses),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    /// Finest tier the filter constrains.
    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn bounds(&self) -> &SearchBounds {
        &self.bounds
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn into_filter(self) -> Filter {
        self.filter
    }
}

/// Best-fit tier for the radius, clamped into the plotters' tier range.
fn select_tier<P: Projector>(radius_miles: f64, plotters: &[TierPlotter<P>]) -> u32 {
    let fit = best_fit(radius_miles);
    match (plotters.first(), plotters.last()) {
        (Some(coarsest), Some(finest)) => fit.clamp(coarsest.tier_level(), finest.tier_level()),
        _ => fit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::projection::SinusoidalProjector;
    use crate::storage::Document;

    fn plotters(range: std::ops::RangeInclusive<u32>) -> Vec<TierPlotter> {
        range
            .map(|tier| TierPlotter::new(tier, SinusoidalProjector, "_localTier"))
            .collect()
    }

    fn document_at(plotters: &[TierPlotter], latitude: f64, longitude: f64) -> Document {
        plotters.iter().fold(
            Document::new("x").with_keyword(METAFILE_FIELD, METAFILE_DOC),
            |doc, plotter| {
                doc.with_box(
                    plotter.tier_field_name(),
                    plotter.tier_box_id(latitude, longitude),
                )
            },
        )
    }

    fn tier_clauses(query: &ProximityQuery) -> &[Filter] {
        match query.filter() {
            Filter::And(clauses) => &clauses[..clauses.len() - 1],
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_tier_is_clamped_to_range() {
        let plotters = plotters(11..=14);

        assert_eq!(ProximityQuery::new(0.0, 0.0, 10.0, &plotters).tier(), 11);
        assert_eq!(ProximityQuery::new(0.0, 0.0, 1.0, &plotters).tier(), 14);
        assert_eq!(ProximityQuery::new(0.0, 0.0, 500.0, &plotters).tier(), 11);
        assert_eq!(ProximityQuery::new(0.0, 0.0, 0.01, &plotters).tier(), 14);
        assert_eq!(ProximityQuery::new(0.0, 0.0, 3.0, &plotters).tier(), 13);
    }

    #[test]
    fn test_filter_has_one_clause_per_tier_and_marker() {
        let plotters = plotters(11..=14);
        let query = ProximityQuery::new(40.0, -74.0, 3.0, &plotters);

        let Filter::And(clauses) = query.filter() else {
            panic!("expected an And filter");
        };
        // tiers 13, 12, 11 plus the metafile term
        assert_eq!(clauses.len(), 4);
        assert_eq!(clauses[3], Filter::term(METAFILE_FIELD, METAFILE_DOC));

        match &clauses[0] {
            Filter::Or(ranges) => match &ranges[0] {
                Filter::BoxRange { field, .. } => assert_eq!(field, "_localTier13"),
                other => panic!("unexpected clause {:?}", other),
            },
            other => panic!("unexpected clause {:?}", other),
        }
    }

    #[test]
    fn test_antimeridian_splits_ranges() {
        let plotters = plotters(11..=14);
        let query = ProximityQuery::new(0.0, 179.99, 5.0, &plotters);

        assert_eq!(query.bounds().lon_intervals.len(), 2);
        for clause in tier_clauses(&query) {
            let Filter::Or(ranges) = clause else {
                panic!("expected Or clause");
            };
            assert_eq!(ranges.len(), 2);
        }

        let across = document_at(&plotters, 0.0, -179.99);
        assert!(query.filter().matches(&across));
    }

    #[test]
    fn test_center_and_nearby_points_match() {
        let plotters = plotters(11..=14);
        let query = ProximityQuery::new(-6.2088, 106.8456, 2.0, &plotters);

        assert!(query.filter().matches(&document_at(&plotters, -6.2088, 106.8456)));
        assert!(query.filter().matches(&document_at(&plotters, -6.2188, 106.8556)));
        assert!(!query.filter().matches(&document_at(&plotters, -6.9175, 107.6191)));
    }

    #[test]
    fn test_unmarked_documents_do_not_match() {
        let plotters = plotters(11..=14);
        let query = ProximityQuery::new(10.0, 10.0, 5.0, &plotters);

        let mut doc = document_at(&plotters, 10.0, 10.0);
        doc.set(METAFILE_FIELD, crate::storage::FieldValue::Keyword("other".into()));
        assert!(!query.filter().matches(&doc));
    }
}
