//! GeoJSON grammar checks.
//!
//! Validation walks the JSON tree once, converting each geometry into its
//! `geo` counterpart as it goes. Errors carry the JSON path of the node that
//! broke the grammar.

use std::fmt;

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde_json::{Map, Value};

use super::{DocumentError, DocumentKind};

/// A line string needs at least two positions.
const MIN_LINE_POSITIONS: usize = 2;
/// A closed linear ring needs at least four positions.
const MIN_RING_POSITIONS: usize = 4;
/// A bounding box holds at least a south-west and a north-east corner.
const MIN_BBOX_VALUES: usize = 4;

type Object = Map<String, Value>;

/// Dotted JSON path used in error messages.
#[derive(Debug, Clone)]
struct JsonPath(String);

impl JsonPath {
    fn root() -> Self {
        Self(String::from("$"))
    }

    fn member(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    fn index(&self, position: usize) -> Self {
        Self(format!("{}[{position}]", self.0))
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn invalid(path: &JsonPath, message: impl Into<String>) -> DocumentError {
    DocumentError::Grammar {
        path: path.to_string(),
        message: message.into(),
    }
}

/// Validate `value` as a GeoJSON object, returning its kind and geometries.
pub(super) fn validate(value: &Value) -> Result<(DocumentKind, Vec<Geometry<f64>>), DocumentError> {
    let path = JsonPath::root();
    let object = expect_object(value, &path)?;
    let kind = read_kind(object, &path)?;
    let mut geometries = Vec::new();
    match kind {
        DocumentKind::FeatureCollection => feature_collection(object, &path, &mut geometries)?,
        DocumentKind::Feature => feature(object, &path, &mut geometries)?,
        _ => geometries.push(geometry(object, kind, &path)?),
    }
    Ok((kind, geometries))
}

fn expect_object<'a>(value: &'a Value, path: &JsonPath) -> Result<&'a Object, DocumentError> {
    value
        .as_object()
        .ok_or_else(|| invalid(path, "expected a JSON object"))
}

fn expect_array<'a>(value: &'a Value, path: &JsonPath) -> Result<&'a [Value], DocumentError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(path, "expected an array"))
}

fn required<'a>(object: &'a Object, name: &str, path: &JsonPath) -> Result<&'a Value, DocumentError> {
    object
        .get(name)
        .ok_or_else(|| invalid(path, format!("missing `{name}` member")))
}

fn read_kind(object: &Object, path: &JsonPath) -> Result<DocumentKind, DocumentError> {
    let type_path = path.member("type");
    let name = required(object, "type", path)?
        .as_str()
        .ok_or_else(|| invalid(&type_path, "`type` must be a string"))?;
    DocumentKind::from_type_name(name)
        .ok_or_else(|| invalid(&type_path, format!("unknown GeoJSON type `{name}`")))
}

fn check_bbox(object: &Object, path: &JsonPath) -> Result<(), DocumentError> {
    let Some(bbox) = object.get("bbox") else {
        return Ok(());
    };
    let bbox_path = path.member("bbox");
    let values = expect_array(bbox, &bbox_path)?;
    if values.len() < MIN_BBOX_VALUES || !values.len().is_multiple_of(2) {
        return Err(invalid(
            &bbox_path,
            "`bbox` must hold an even number of values, at least four",
        ));
    }
    for (position, item) in values.iter().enumerate() {
        number(item, &bbox_path.index(position))?;
    }
    Ok(())
}

fn feature_collection(
    object: &Object,
    path: &JsonPath,
    geometries: &mut Vec<Geometry<f64>>,
) -> Result<(), DocumentError> {
    check_bbox(object, path)?;
    let features_path = path.member("features");
    let features = expect_array(required(object, "features", path)?, &features_path)?;
    for (position, item) in features.iter().enumerate() {
        let item_path = features_path.index(position);
        let member = expect_object(item, &item_path)?;
        let kind = read_kind(member, &item_path)?;
        if kind != DocumentKind::Feature {
            return Err(invalid(
                &item_path,
                format!("expected a Feature, found `{kind}`"),
            ));
        }
        feature(member, &item_path, geometries)?;
    }
    Ok(())
}

fn feature(
    object: &Object,
    path: &JsonPath,
    geometries: &mut Vec<Geometry<f64>>,
) -> Result<(), DocumentError> {
    check_bbox(object, path)?;
    match object.get("properties") {
        None | Some(Value::Null | Value::Object(_)) => {}
        Some(_) => {
            return Err(invalid(
                &path.member("properties"),
                "`properties` must be an object or null",
            ));
        }
    }
    match object.get("id") {
        None | Some(Value::String(_) | Value::Number(_)) => {}
        Some(_) => {
            return Err(invalid(
                &path.member("id"),
                "`id` must be a string or a number",
            ));
        }
    }
    match required(object, "geometry", path)? {
        Value::Null => {}
        value => {
            let geometry_path = path.member("geometry");
            geometries.push(nested_geometry(value, &geometry_path)?);
        }
    }
    Ok(())
}

fn nested_geometry(value: &Value, path: &JsonPath) -> Result<Geometry<f64>, DocumentError> {
    let object = expect_object(value, path)?;
    let kind = read_kind(object, path)?;
    if !kind.is_geometry() {
        return Err(invalid(
            path,
            format!("expected a geometry, found `{kind}`"),
        ));
    }
    geometry(object, kind, path)
}

fn geometry(
    object: &Object,
    kind: DocumentKind,
    path: &JsonPath,
) -> Result<Geometry<f64>, DocumentError> {
    check_bbox(object, path)?;
    if kind == DocumentKind::GeometryCollection {
        let members_path = path.member("geometries");
        let members = expect_array(required(object, "geometries", path)?, &members_path)?;
        let children = members
            .iter()
            .enumerate()
            .map(|(position, item)| nested_geometry(item, &members_path.index(position)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Geometry::GeometryCollection(GeometryCollection(children)));
    }

    let coordinates = required(object, "coordinates", path)?;
    let coords_path = path.member("coordinates");
    let converted = match kind {
        DocumentKind::Point => Geometry::Point(Point(position(coordinates, &coords_path)?)),
        DocumentKind::MultiPoint => Geometry::MultiPoint(MultiPoint(
            positions(coordinates, &coords_path)?
                .into_iter()
                .map(Point)
                .collect(),
        )),
        DocumentKind::LineString => Geometry::LineString(line_string(coordinates, &coords_path)?),
        DocumentKind::MultiLineString => Geometry::MultiLineString(MultiLineString(
            each(coordinates, &coords_path, line_string)?,
        )),
        DocumentKind::Polygon => Geometry::Polygon(polygon(coordinates, &coords_path)?),
        DocumentKind::MultiPolygon => {
            Geometry::MultiPolygon(MultiPolygon(each(coordinates, &coords_path, polygon)?))
        }
        DocumentKind::FeatureCollection
        | DocumentKind::Feature
        | DocumentKind::GeometryCollection => {
            return Err(invalid(path, format!("expected a geometry, found `{kind}`")));
        }
    };
    Ok(converted)
}

fn each<T>(
    value: &Value,
    path: &JsonPath,
    parse: fn(&Value, &JsonPath) -> Result<T, DocumentError>,
) -> Result<Vec<T>, DocumentError> {
    expect_array(value, path)?
        .iter()
        .enumerate()
        .map(|(position, item)| parse(item, &path.index(position)))
        .collect()
}

fn number(value: &Value, path: &JsonPath) -> Result<f64, DocumentError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| invalid(path, "expected a number"))
}

fn position(value: &Value, path: &JsonPath) -> Result<Coord<f64>, DocumentError> {
    let [x, y, extra @ ..] = expect_array(value, path)? else {
        return Err(invalid(path, "a position holds at least two numbers"));
    };
    for (offset, item) in extra.iter().enumerate() {
        number(item, &path.index(offset.saturating_add(2)))?;
    }
    Ok(Coord {
        x: number(x, &path.index(0))?,
        y: number(y, &path.index(1))?,
    })
}

fn positions(value: &Value, path: &JsonPath) -> Result<Vec<Coord<f64>>, DocumentError> {
    each(value, path, position)
}

fn line_string(value: &Value, path: &JsonPath) -> Result<LineString<f64>, DocumentError> {
    let coords = positions(value, path)?;
    if coords.len() < MIN_LINE_POSITIONS {
        return Err(invalid(path, "a line string needs at least two positions"));
    }
    Ok(LineString::new(coords))
}

fn linear_ring(value: &Value, path: &JsonPath) -> Result<LineString<f64>, DocumentError> {
    let coords = positions(value, path)?;
    if coords.len() < MIN_RING_POSITIONS {
        return Err(invalid(path, "a linear ring needs at least four positions"));
    }
    if coords.first() != coords.last() {
        return Err(invalid(
            path,
            "a linear ring must end where it starts",
        ));
    }
    Ok(LineString::new(coords))
}

fn polygon(value: &Value, path: &JsonPath) -> Result<Polygon<f64>, DocumentError> {
    let mut rings = each(value, path, linear_ring)?.into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn grammar_path(value: &Value) -> String {
        match validate(value).expect_err("document should be rejected") {
            DocumentError::Grammar { path, .. } => path,
            DocumentError::Json(err) => panic!("unexpected JSON error: {err}"),
        }
    }

    #[rstest]
    #[case(json!({"type": "Point", "coordinates": [1.0, 2.0]}), DocumentKind::Point)]
    #[case(json!({"type": "Point", "coordinates": [1.0, 2.0, 30.0]}), DocumentKind::Point)]
    #[case(json!({"type": "Point", "coordinates": [1.0, 2.0, 3.0, 4.0]}), DocumentKind::Point)]
    #[case(json!({"type": "MultiPoint", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}), DocumentKind::MultiPoint)]
    #[case(json!({"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]}), DocumentKind::LineString)]
    #[case(
        json!({"type": "MultiLineString", "coordinates": [[[1.0, 2.0], [3.0, 4.0]]]}),
        DocumentKind::MultiLineString
    )]
    #[case(
        json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}),
        DocumentKind::Polygon
    )]
    #[case(
        json!({"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]}),
        DocumentKind::MultiPolygon
    )]
    #[case(
        json!({"type": "GeometryCollection", "geometries": [{"type": "Point", "coordinates": [0.0, 0.0]}]}),
        DocumentKind::GeometryCollection
    )]
    #[case(json!({"type": "Feature", "geometry": null, "properties": {}}), DocumentKind::Feature)]
    fn accepts_each_geometry_kind(#[case] value: Value, #[case] expected: DocumentKind) {
        let (kind, _) = validate(&value).expect("valid GeoJSON");
        assert_eq!(kind, expected);
    }

    #[rstest]
    #[case(json!([1, 2, 3]), "$")]
    #[case(json!({"coordinates": [0.0, 0.0]}), "$")]
    #[case(json!({"type": 7}), "$.type")]
    #[case(json!({"type": "Circle"}), "$.type")]
    #[case(json!({"type": "Point"}), "$")]
    #[case(json!({"type": "Point", "coordinates": [0.0]}), "$.coordinates")]
    #[case(json!({"type": "Point", "coordinates": [0.0, "north"]}), "$.coordinates[1]")]
    #[case(json!({"type": "Point", "coordinates": [0.0, 1.0, 2.0, null]}), "$.coordinates[3]")]
    #[case(json!({"type": "LineString", "coordinates": [[0.0, 0.0]]}), "$.coordinates")]
    #[case(
        json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.5, 0.5]]]}),
        "$.coordinates[0]"
    )]
    #[case(json!({"type": "Point", "coordinates": [0.0, 0.0], "bbox": [0.0, 0.0]}), "$.bbox")]
    #[case(json!({"type": "FeatureCollection"}), "$")]
    #[case(json!({"type": "FeatureCollection", "features": {}}), "$.features")]
    #[case(
        json!({"type": "FeatureCollection", "features": [{"type": "Point", "coordinates": [0.0, 0.0]}]}),
        "$.features[0]"
    )]
    #[case(json!({"type": "Feature", "properties": {}}), "$")]
    #[case(json!({"type": "Feature", "geometry": null, "properties": []}), "$.properties")]
    #[case(json!({"type": "Feature", "geometry": null, "id": true}), "$.id")]
    #[case(
        json!({"type": "Feature", "geometry": {"type": "Feature", "geometry": null}}),
        "$.geometry"
    )]
    #[case(
        json!({"type": "GeometryCollection", "geometries": [{"type": "Point", "coordinates": []}]}),
        "$.geometries[0].coordinates"
    )]
    fn rejects_with_path(#[case] value: Value, #[case] expected_path: &str) {
        assert_eq!(grammar_path(&value), expected_path);
    }

    #[rstest]
    fn features_without_geometry_contribute_nothing() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": null},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [5.0, 6.0]}, "properties": null}
            ]
        });
        let (_, geometries) = validate(&value).expect("valid collection");
        assert_eq!(
            geometries,
            vec![Geometry::Point(Point(Coord { x: 5.0, y: 6.0 }))]
        );
    }

    #[rstest]
    fn polygon_keeps_holes_as_interiors() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
                [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]]
            ]
        });
        let (_, geometries) = validate(&value).expect("valid polygon");
        let Some(Geometry::Polygon(polygon)) = geometries.first() else {
            panic!("expected a polygon, found {geometries:?}");
        };
        assert_eq!(polygon.interiors().len(), 1);
    }

    #[rstest]
    fn foreign_members_are_tolerated() {
        let value = json!({
            "type": "Point",
            "coordinates": [0.0, 0.0],
            "title": "origin",
            "crs": {"type": "name"}
        });
        assert!(validate(&value).is_ok());
    }
}
