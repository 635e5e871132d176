//! Proximity index over point-located entities.
//!
//! This module defines [`ProximityIndex`], which turns entities into tiered
//! index documents, runs radius and nearest-neighbor queries against the
//! committed generation of its [`IndexStore`], and decodes the hits back
//! into entities.

use crate::builder::IndexBuilder;
use crate::compute::distance::{haversine_miles, planar_distance};
use crate::compute::projection::SinusoidalProjector;
use crate::compute::tier::TierPlotter;
use crate::compute::validation::validate_radius;
use crate::config::Config;
use crate::error::{Result, TierGridError};
use crate::storage::{Document, FieldValue, IndexStore, IndexWriter, StoreStats};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::Path;
use tiergrid_types::entity::{Entity, Locatable};

mod query;

pub use query::{
    JSON_FIELD, LATITUDE_FIELD, LONGITUDE_FIELD, METAFILE_DOC, METAFILE_FIELD, ProximityQuery,
};

/// Proximity search over entities of type `E`.
///
/// Every stored entity carries one box id per tier in the configured range.
/// A radius query selects the candidates whose boxes touch the circle's
/// bounding box, so results can include entities slightly outside the
/// radius but never miss one inside it. Use
/// [`find_within_radius_exact`](Self::find_within_radius_exact) for
/// distance-checked results.
///
/// Writes become visible once the write session commits (when the last
/// concurrent writer finishes). Deletes and clears commit immediately and
/// never publish entities an open writer has only staged.
///
/// `ProximityIndex` is `Send + Sync`: share it by reference or in an `Arc`.
///
/// # Examples
///
/// ```rust
/// use tiergrid::{Entity, ProximityIndex};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let index: ProximityIndex = ProximityIndex::memory()?;
///
/// index.insert(&Entity::new("1", "Jakarta", -6.2088, 106.8456))?;
/// index.insert(&Entity::new("2", "Bandung", -6.9175, 107.6191))?;
///
/// let near_jakarta = index.find_within_radius(-6.2, 106.84, 5.0)?;
/// assert_eq!(near_jakarta.len(), 1);
/// assert_eq!(near_jakarta[0].name, "Jakarta");
///
/// let nearest = index.find_nearest(-6.9, 107.6)?.unwrap();
/// assert_eq!(nearest.name, "Bandung");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProximityIndex<E = Entity> {
    store: IndexStore,
    plotters: Vec<TierPlotter>,
    config: Config,
    _entity: PhantomData<fn() -> E>,
}

impl<E> ProximityIndex<E>
where
    E: Locatable + Serialize + DeserializeOwned,
{
    /// Open or create a disk-backed index in directory `path` with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(Config::default().with_storage_path(path.as_ref()))
    }

    /// Index that is never written to disk.
    pub fn memory() -> Result<Self> {
        Self::open_with_config(Config::default())
    }

    /// Open an index from a full configuration.
    ///
    /// The tier range is fixed here from the configured search radii. Opening
    /// an existing directory with different radii requires reindexing.
    pub fn open_with_config(config: Config) -> Result<Self> {
        config.validate().map_err(TierGridError::InvalidInput)?;

        let store = match &config.storage_path {
            Some(path) => IndexStore::open(path)?,
            None => IndexStore::memory(),
        };

        let plotters: Vec<TierPlotter> = config
            .tier_range()
            .map(|tier| TierPlotter::new(tier, SinusoidalProjector, &config.tier_field_prefix))
            .collect();

        log::debug!(
            "Proximity index using tiers {}..={} (prefix {})",
            config.start_tier(),
            config.end_tier(),
            config.tier_field_prefix
        );

        Ok(Self {
            store,
            plotters,
            config,
            _entity: PhantomData,
        })
    }

    pub fn builder() -> IndexBuilder {
        IndexBuilder::new()
    }

    /// Insert or replace an entity (matched by id).
    pub fn insert(&self, entity: &E) -> Result<()> {
        let doc = self.document_for(entity)?;
        self.store.upsert(doc)
    }

    /// Insert or replace several entities as one write.
    ///
    /// Nothing is staged if any entity fails to serialize.
    pub fn insert_all<'a, I>(&self, entities: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        let docs = entities
            .into_iter()
            .map(|entity| self.document_for(entity))
            .collect::<Result<Vec<_>>>()?;
        self.store.upsert_all(docs)
    }

    /// Open a writer whose inserts stay invisible until it (and every other
    /// concurrent writer) finishes.
    pub fn writer(&self) -> Result<EntityWriter<'_, E>> {
        Ok(EntityWriter {
            index: self,
            inner: self.store.writer()?,
        })
    }

    /// Remove the entity with the same id as `entity`. Returns whether one was stored.
    pub fn remove(&self, entity: &E) -> Result<bool> {
        self.store.remove(&entity.id())
    }

    pub fn remove_by_id(&self, id: &str) -> Result<bool> {
        self.store.remove(id)
    }

    /// Remove every committed entity. Entities staged by open writers are kept.
    pub fn clear(&self) -> Result<()> {
        self.store.clear_all()
    }

    pub fn get(&self, id: &str) -> Result<Option<E>> {
        self.store
            .get(id)?
            .map(|doc| decode_payload(&doc))
            .transpose()
    }

    /// Number of committed entities.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Generation of the last commit.
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Block until all open writers have finished and committed.
    pub fn wait_for_writers(&self) {
        self.store.wait_for_writers();
    }

    /// Commit pending writes and close the index. Later operations fail with
    /// [`TierGridError::StoreClosed`].
    pub fn close(&self) -> Result<()> {
        self.store.close()?;
        log::info!("Closed proximity index");
        Ok(())
    }

    /// Entities whose grid boxes fall within `radius_miles` of the point.
    ///
    /// Results are in id order and capped at `max_results`. They may include
    /// entities slightly beyond the radius.
    pub fn find_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
    ) -> Result<Vec<E>> {
        validate_radius(radius_miles)?;
        self.candidates(latitude, longitude, radius_miles, self.config.max_results)?
            .iter()
            .map(decode_payload)
            .collect()
    }

    /// Number of entities the grid places within `radius_miles` of the point.
    ///
    /// Counts the same candidates as [`Self::find_within_radius`] but is not
    /// capped at `max_results` and decodes nothing.
    pub fn count_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
    ) -> Result<usize> {
        validate_radius(radius_miles)?;
        let query = self.query_for(latitude, longitude, radius_miles);
        self.store.count(query.filter())
    }

    /// Entities within `radius_miles` great-circle distance, closest first,
    /// paired with their distance in miles. Capped at `max_results`.
    pub fn find_within_radius_exact(
        &self,
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
    ) -> Result<Vec<(E, f64)>> {
        validate_radius(radius_miles)?;

        let mut hits = Vec::new();
        for doc in self.candidates(latitude, longitude, radius_miles, usize::MAX)? {
            let (lat, lon) = stored_position(&doc)?;
            let distance = haversine_miles(latitude, longitude, lat, lon);
            if distance <= radius_miles {
                hits.push((doc, distance));
            }
        }
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(self.config.max_results);

        hits.iter()
            .map(|(doc, distance)| decode_payload(doc).map(|entity| (entity, *distance)))
            .collect()
    }

    /// Entity closest to the point, by straight-line distance in degrees.
    ///
    /// The search radius starts at `nearest_initial_radius_miles` and doubles
    /// until some candidate turns up or it reaches
    /// `nearest_radius_ceiling_miles`. Among the candidates of that radius the
    /// closest wins; on a tie the first in id order wins.
    pub fn find_nearest(&self, latitude: f64, longitude: f64) -> Result<Option<E>> {
        let ceiling = self.config.nearest_radius_ceiling_miles;
        let mut radius = self.config.nearest_initial_radius_miles;
        let mut candidates = Vec::new();

        while candidates.is_empty() && radius < ceiling {
            candidates = self.candidates(latitude, longitude, radius, usize::MAX)?;
            if candidates.is_empty() {
                log::debug!("No candidates within {} miles, widening", radius);
            }
            radius *= 2.0;
        }

        let mut best: Option<(&Document, f64)> = None;
        for doc in &candidates {
            let (lat, lon) = stored_position(doc)?;
            let distance = planar_distance(latitude, longitude, lat, lon);
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((doc, distance));
            }
        }

        best.map(|(doc, _)| decode_payload(doc)).transpose()
    }

    pub fn start_tier(&self) -> u32 {
        self.config.start_tier()
    }

    pub fn end_tier(&self) -> u32 {
        self.config.end_tier()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying document store.
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Build the coarse filter for a circle without running it.
    pub fn query_for(&self, latitude: f64, longitude: f64, radius_miles: f64) -> ProximityQuery {
        ProximityQuery::new(latitude, longitude, radius_miles, &self.plotters)
    }

    fn candidates(
        &self,
        latitude: f64,
        longitude: f64,
        radius_miles: f64,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let query = self.query_for(latitude, longitude, radius_miles);
        self.store.query(query.filter(), limit)
    }

    fn document_for(&self, entity: &E) -> Result<Document> {
        let id = entity.id().into_owned();
        let json = serde_json::to_string(entity).map_err(|source| {
            TierGridError::PayloadEncoding {
                id: id.clone(),
                source,
            }
        })?;

        let latitude = entity.latitude();
        let longitude = entity.longitude();

        let mut doc = Document::new(id)
            .with_text(JSON_FIELD, json)
            .with_keyword(METAFILE_FIELD, METAFILE_DOC)
            .with_float(LATITUDE_FIELD, latitude)
            .with_float(LONGITUDE_FIELD, longitude);
        for plotter in &self.plotters {
            doc.set(
                plotter.tier_field_name(),
                FieldValue::Box(plotter.tier_box_id(latitude, longitude)),
            );
        }
        Ok(doc)
    }
}

/// Writer handle returned by [`ProximityIndex::writer`].
pub struct EntityWriter<'a, E> {
    index: &'a ProximityIndex<E>,
    inner: IndexWriter<'a>,
}

impl<E> EntityWriter<'_, E>
where
    E: Locatable + Serialize + DeserializeOwned,
{
    /// Stage an entity. It is not visible to queries until the session commits.
    pub fn insert(&self, entity: &E) -> Result<()> {
        self.inner.upsert(self.index.document_for(entity)?);
        Ok(())
    }

    /// Release the writer, committing if it was the last one open.
    pub fn finish(self) -> Result<()> {
        self.inner.finish()
    }
}

fn decode_payload<E: DeserializeOwned>(doc: &Document) -> Result<E> {
    let json = doc.text(JSON_FIELD).ok_or_else(|| {
        TierGridError::InvalidFormat(format!("document '{}' has no payload", doc.id()))
    })?;
    serde_json::from_str(json).map_err(|source| TierGridError::MalformedPayload {
        id: doc.id().to_string(),
        source,
    })
}

fn stored_position(doc: &Document) -> Result<(f64, f64)> {
    match (doc.float(LATITUDE_FIELD), doc.float(LONGITUDE_FIELD)) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(TierGridError::InvalidFormat(format!(
            "document '{}' has no stored position",
            doc.id()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::borrow::Cow;

    fn city(id: &str, latitude: f64, longitude: f64) -> Entity {
        Entity::new(id, format!("city-{}", id), latitude, longitude)
    }

    #[test]
    fn test_document_carries_every_tier() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        let doc = index.document_for(&city("1", 40.7128, -74.0060)).unwrap();

        assert_eq!(doc.keyword(METAFILE_FIELD), Some(METAFILE_DOC));
        assert_eq!(doc.float(LATITUDE_FIELD), Some(40.7128));
        for tier in 11..=14 {
            assert!(doc.box_id(&format!("_localTier{}", tier)).is_some());
        }
        assert!(doc.box_id("_localTier10").is_none());
        assert!(doc.box_id("_localTier15").is_none());
    }

    #[test]
    fn test_insert_get_roundtrip() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        let entity = city("7", 51.5074, -0.1278).with_property("population", 8_982_000);

        index.insert(&entity).unwrap();
        assert_eq!(index.get("7").unwrap(), Some(entity));
        assert_eq!(index.get("8").unwrap(), None);
    }

    #[test]
    fn test_invalid_radius() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                index.find_within_radius(0.0, 0.0, radius),
                Err(TierGridError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_count_within_radius_is_not_capped() {
        let config = Config::default().with_max_results(2);
        let index: ProximityIndex = ProximityIndex::open_with_config(config).unwrap();
        let cities: Vec<Entity> = (0..5)
            .map(|i| city(&i.to_string(), 10.0, 10.0 + i as f64 * 0.001))
            .collect();
        index.insert_all(&cities).unwrap();

        assert_eq!(index.find_within_radius(10.0, 10.0, 1.0).unwrap().len(), 2);
        assert_eq!(index.count_within_radius(10.0, 10.0, 1.0).unwrap(), 5);
        assert_eq!(index.count_within_radius(-10.0, -10.0, 1.0).unwrap(), 0);
        assert!(index.count_within_radius(10.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_exact_variant_filters_and_sorts() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        index
            .insert_all(&[
                city("far", 0.0, 0.14),
                city("near", 0.0, 0.01),
                city("mid", 0.0, 0.05),
            ])
            .unwrap();

        let hits = index.find_within_radius_exact(0.0, 0.0, 5.0).unwrap();
        let ids: Vec<&str> = hits.iter().map(|(e, _)| e.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(hits[0].1 < hits[1].1);
        assert!(hits.iter().all(|(_, d)| *d <= 5.0));
    }

    #[test]
    fn test_nearest_tie_breaks_by_id_order() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        index
            .insert_all(&[city("b", 0.0, 0.1), city("a", 0.0, -0.1)])
            .unwrap();

        let nearest = index.find_nearest(0.0, 0.0).unwrap().unwrap();
        assert_eq!(nearest.id, "a");
    }

    #[test]
    fn test_nearest_on_empty_index() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        assert!(index.find_nearest(10.0, 10.0).unwrap().is_none());
    }

    #[test]
    fn test_malformed_payload_is_reported() {
        let index: ProximityIndex = ProximityIndex::memory().unwrap();
        let mut doc = index.document_for(&city("1", 1.0, 1.0)).unwrap();
        doc.set(JSON_FIELD, FieldValue::Text("{not json".into()));
        index.store().upsert(doc).unwrap();

        match index.find_within_radius(1.0, 1.0, 1.0) {
            Err(TierGridError::MalformedPayload { id, .. }) => assert_eq!(id, "1"),
            other => panic!("expected malformed payload, got {:?}", other.map(|v| v.len())),
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Airport {
        iata: String,
        lat: f64,
        lon: f64,
    }

    impl Locatable for Airport {
        fn id(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.iata)
        }

        fn latitude(&self) -> f64 {
            self.lat
        }

        fn longitude(&self) -> f64 {
            self.lon
        }
    }

    #[test]
    fn test_custom_entity_type() {
        let index = ProximityIndex::<Airport>::memory().unwrap();
        let cgk = Airport {
            iata: "CGK".into(),
            lat: -6.1256,
            lon: 106.6558,
        };
        index.insert(&cgk).unwrap();

        assert_eq!(index.find_within_radius(-6.13, 106.66, 2.0).unwrap(), vec![cgk.clone()]);
        assert!(index.remove(&cgk).unwrap());
        assert!(index.is_empty());
    }
}
