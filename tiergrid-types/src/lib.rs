//! # tiergrid-types
//!
//! Core data types shared by the tiergrid proximity index.
//!
//! - **Entity types**: the `Locatable` trait and a ready-made `Entity` record
//! - **Units**: `DistanceUnit` with the earth constants used for tier fitting
//!
//! All types are serializable with Serde and interoperate with the `geo`
//! crate's point primitive.
//!
//! ## Examples
//!
//! ```rust
//! use tiergrid_types::entity::{Entity, Locatable};
//!
//! let jakarta = Entity::new("1", "Jakarta", -6.2088, 106.8456);
//! assert_eq!(jakarta.id(), "1");
//! assert_eq!(jakarta.point().x(), 106.8456);
//! ```

pub mod entity;
pub mod units;
