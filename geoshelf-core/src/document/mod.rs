//! Validated GeoJSON documents.
//!
//! A [`Document`] is only ever constructed through validation, so holding one
//! proves the underlying JSON follows the GeoJSON grammar (RFC 7946). The
//! JSON tree is kept verbatim, foreign members included, and every geometry
//! is also converted into [`geo`] types for spatial queries such as
//! [`Document::bounding_rect`].

use std::{fmt, str::FromStr};

use geo::{BoundingRect, Coord, Geometry, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

mod grammar;

/// Top-level GeoJSON object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// A collection of features.
    FeatureCollection,
    /// A single feature.
    Feature,
    /// A single position.
    Point,
    /// Several positions.
    MultiPoint,
    /// Two or more connected positions.
    LineString,
    /// Several line strings.
    MultiLineString,
    /// Linear rings describing an area and its holes.
    Polygon,
    /// Several polygons.
    MultiPolygon,
    /// A heterogeneous set of geometries.
    GeometryCollection,
}

impl DocumentKind {
    /// Look up a kind by its GeoJSON `type` name.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let kind = match name {
            "FeatureCollection" => Self::FeatureCollection,
            "Feature" => Self::Feature,
            "Point" => Self::Point,
            "MultiPoint" => Self::MultiPoint,
            "LineString" => Self::LineString,
            "MultiLineString" => Self::MultiLineString,
            "Polygon" => Self::Polygon,
            "MultiPolygon" => Self::MultiPolygon,
            "GeometryCollection" => Self::GeometryCollection,
            _ => return None,
        };
        Some(kind)
    }

    /// The GeoJSON `type` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FeatureCollection => "FeatureCollection",
            Self::Feature => "Feature",
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
        }
    }

    /// Whether this kind is a geometry rather than a feature wrapper.
    #[must_use]
    pub const fn is_geometry(self) -> bool {
        !matches!(self, Self::FeatureCollection | Self::Feature)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while parsing or validating a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text was not JSON at all.
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The JSON did not follow the GeoJSON grammar.
    #[error("invalid GeoJSON at {path}: {message}")]
    Grammar {
        /// JSON path of the offending node, for example `$.features[2].geometry`.
        path: String,
        /// What was wrong with the node.
        message: String,
    },
}

/// A parsed, structurally valid GeoJSON object.
///
/// Cloning produces a fully independent deep copy.
///
/// # Examples
///
/// ```
/// use geoshelf_core::{Document, DocumentKind};
///
/// # fn main() -> Result<(), geoshelf_core::DocumentError> {
/// let document = Document::parse(
///     r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}, "properties": null}"#,
/// )?;
/// assert_eq!(document.kind(), DocumentKind::Feature);
/// assert_eq!(document.geometries().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    value: Value,
    kind: DocumentKind,
    geometries: Vec<Geometry<f64>>,
}

impl Document {
    /// Parse GeoJSON text.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Validate an already decoded JSON tree.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let (kind, geometries) = grammar::validate(&value)?;
        Ok(Self {
            value,
            kind,
            geometries,
        })
    }

    /// Top-level GeoJSON type.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Canonical JSON structure of the document.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consume the document, returning its JSON structure.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Compact JSON text for the document.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        self.value.to_string()
    }

    /// Every geometry in document order. Features without geometry are
    /// skipped.
    #[must_use]
    pub fn geometries(&self) -> &[Geometry<f64>] {
        &self.geometries
    }

    /// Smallest axis-aligned rectangle (longitude, latitude) covering every
    /// geometry, or `None` when the document has no coordinates.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometries
            .iter()
            .filter_map(|geometry| geometry.bounding_rect())
            .reduce(|acc, rect| {
                Rect::new(
                    Coord {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    Coord {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                )
            })
    }
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
