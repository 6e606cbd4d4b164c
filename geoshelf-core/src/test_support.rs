//! Sample documents and deterministic identifier sources for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::{DocumentId, IdSource};

/// A feature collection with a point and a line string.
pub const FEATURE_COLLECTION: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": {"type": "Point", "coordinates": [-0.1, 51.6]},
      "properties": {"name": "Highgate"}
    },
    {
      "type": "Feature",
      "geometry": {"type": "LineString", "coordinates": [[-0.05, 51.5], [2.35, 51.55]]},
      "properties": {"name": "Eastbound"}
    }
  ]
}"#;

/// A single point feature with nested properties.
pub const POINT_FEATURE: &str = r#"{
  "type": "Feature",
  "geometry": {"type": "Point", "coordinates": [13.4, 52.52]},
  "properties": {"name": "Berlin", "tags": {"capital": true, "rivers": ["Spree"]}}
}"#;

/// Valid JSON that breaks the GeoJSON grammar.
pub const INVALID_GEOJSON: &str = r#"{"type": "Feature", "properties": {}}"#;

/// Text that is not JSON at all.
pub const NOT_JSON: &str = "{ this is not json";

/// Always yields the same identifier.
#[derive(Debug, Clone, Copy)]
pub struct ConstantIdSource(pub DocumentId);

impl IdSource for ConstantIdSource {
    fn next_id(&self) -> DocumentId {
        self.0
    }
}

/// Yields `1, 2, 3, ...` encoded as UUIDs.
#[derive(Debug, Default)]
pub struct SequentialIdSource {
    next: AtomicU64,
}

impl SequentialIdSource {
    /// Identifier that the `n`th call to [`IdSource::next_id`] returns,
    /// counting from one.
    #[must_use]
    pub const fn nth(n: u64) -> DocumentId {
        DocumentId::from_uuid(Uuid::from_u128(n as u128))
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> DocumentId {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        Self::nth(value.wrapping_add(1))
    }
}
