//! Map view of a stored document.
//!
//! The page is self-contained apart from Leaflet, which is loaded from a CDN,
//! and OpenStreetMap tiles.

use geo::Rect;
use geoshelf_core::{Document, DocumentId};

const LEAFLET_BASE: &str = "https://unpkg.com/leaflet@1.9.4/dist";
const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Degrees added around a bounding box with no width or height.
const DEGENERATE_PADDING: f64 = 0.01;

/// `[[south, west], [north, east]]` shown for documents without geometry.
const WORLD_BOUNDS: [[f64; 2]; 2] = [[-60.0, -180.0], [75.0, 180.0]];

/// Render `document` as an HTML page with a Leaflet map framing its
/// geometries.
#[must_use]
pub fn render_map(id: DocumentId, document: &Document) -> String {
    let payload = script_safe_json(document);
    let [[south, west], [north, east]] = map_bounds(document.bounding_rect());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{id}</title>
<link rel="stylesheet" href="{LEAFLET_BASE}/leaflet.css">
<script src="{LEAFLET_BASE}/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const documentData = {payload};
const map = L.map("map");
L.tileLayer("{TILE_URL}", {{
  maxZoom: 19,
  attribution: '{TILE_ATTRIBUTION}'
}}).addTo(map);
L.geoJSON(documentData).addTo(map);
map.fitBounds([[{south}, {west}], [{north}, {east}]]);
</script>
</body>
</html>
"#
    )
}

/// Canonical JSON with every `<` escaped, so string content such as
/// `</script>` cannot end the enclosing element.
fn script_safe_json(document: &Document) -> String {
    document.to_canonical_string().replace('<', "\\u003c")
}

fn map_bounds(rect: Option<Rect<f64>>) -> [[f64; 2]; 2] {
    let Some(rect) = rect else {
        return WORLD_BOUNDS;
    };
    let (min, max) = (rect.min(), rect.max());
    let pad_x = if rect.width() > 0.0 { 0.0 } else { DEGENERATE_PADDING };
    let pad_y = if rect.height() > 0.0 { 0.0 } else { DEGENERATE_PADDING };
    [
        [min.y - pad_y, min.x - pad_x],
        [max.y + pad_y, max.x + pad_x],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;
    use geoshelf_core::test_support::{FEATURE_COLLECTION, POINT_FEATURE};
    use rstest::rstest;

    fn id() -> DocumentId {
        "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().expect("valid id")
    }

    #[rstest]
    fn embeds_document_and_leaflet() {
        let document = Document::parse(FEATURE_COLLECTION).expect("valid document");
        let html = render_map(id(), &document);
        assert!(html.contains("<title>67e55044-10b1-426f-9247-bb680e5fe0c8</title>"));
        assert!(html.contains("leaflet@1.9.4/dist/leaflet.js"));
        assert!(html.contains(&document.to_canonical_string()));
        assert!(html.contains("map.fitBounds([[51.5, -0.1], [51.6, 2.35]]);"));
    }

    #[rstest]
    fn escapes_markup_inside_the_payload() {
        let document = Document::parse(
            r#"{"type": "Feature", "geometry": null,
                "properties": {"note": "</script><script>alert(1)</script>"}}"#,
        )
        .expect("valid document");
        let html = render_map(id(), &document);
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains(r"\u003c/script>\u003cscript>alert(1)\u003c/script>"));
    }

    #[rstest]
    fn pads_point_documents() {
        let document = Document::parse(POINT_FEATURE).expect("valid document");
        let [[south, west], [north, east]] = map_bounds(document.bounding_rect());
        assert!(south < 52.52 && north > 52.52);
        assert!(west < 13.4 && east > 13.4);
    }

    #[rstest]
    fn keeps_non_degenerate_boxes() {
        let rect = Rect::new(coord! { x: 1.0, y: 2.0 }, coord! { x: 3.0, y: 4.0 });
        assert_eq!(map_bounds(Some(rect)), [[2.0, 1.0], [4.0, 3.0]]);
    }

    #[rstest]
    fn falls_back_to_world_view() {
        let document = Document::parse(r#"{"type": "FeatureCollection", "features": []}"#)
            .expect("valid document");
        assert_eq!(map_bounds(document.bounding_rect()), WORLD_BOUNDS);
        let html = render_map(id(), &document);
        assert!(html.contains("map.fitBounds([[-60, -180], [75, 180]]);"));
    }
}
