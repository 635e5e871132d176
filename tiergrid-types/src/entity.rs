use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Anything with a stable identifier and a geographic position.
///
/// Implement this for your own record type to store it in a proximity index.
/// The index only reads these three values; the rest of the record travels as
/// an opaque serialized payload.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use tiergrid_types::entity::Locatable;
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Store {
///     code: u64,
///     lat: f64,
///     lon: f64,
/// }
///
/// impl Locatable for Store {
///     fn id(&self) -> Cow<'_, str> {
///         Cow::Owned(self.code.to_string())
///     }
///     fn latitude(&self) -> f64 {
///         self.lat
///     }
///     fn longitude(&self) -> f64 {
///         self.lon
///     }
/// }
///
/// let store = Store { code: 42, lat: 1.0, lon: 2.0 };
/// assert_eq!(store.id(), "42");
/// ```
pub trait Locatable {
    /// Unique, stable key of the record.
    fn id(&self) -> Cow<'_, str>;

    /// Latitude in degrees, [-90, 90].
    fn latitude(&self) -> f64;

    /// Longitude in degrees, [-180, 180].
    fn longitude(&self) -> f64;

    /// Position as a `geo` point (x = longitude, y = latitude).
    fn point(&self) -> Point<f64> {
        Point::new(self.longitude(), self.latitude())
    }
}

/// A named, point-located record such as a city.
///
/// Extra attributes live in `properties` and are round-tripped untouched.
///
/// # Examples
///
/// ```
/// use tiergrid_types::entity::Entity;
///
/// let bandung = Entity::new("2", "Bandung", -6.9175, 107.6191)
///     .with_property("province", "West Java");
///
/// assert_eq!(bandung.properties["province"], "West Java");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Entity {
    /// Create an entity without extra properties.
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            properties: Map::new(),
        }
    }

    /// Attach a free-form property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Locatable for Entity {
    fn id(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.id)
    }

    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}
