use std::path::Path;

use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;
use tracing::debug;

use super::FacilitySource;
use crate::classify::{classify_amenity_label, classify_building_label};
use crate::error::{ExtractError, Result};
use crate::facility::{Address, CanonicalFacility, FacilityId, Location, SourceKind};
use crate::normalize::AttributeBag;
use crate::validate::validate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawShapeRecord {
    pub id: Option<String>,
    pub osm_id: String,
    pub name: Option<String>,
    pub type_label: Option<String>,
    /// First vertex as `(x, y)`, i.e. `(lon, lat)`.
    pub vertex: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeLayer {
    pub kind: SourceKind,
    pub municipality: String,
    pub department: String,
}

impl ShapeLayer {
    pub fn amenities(municipality: &str, department: &str) -> Self {
        Self::new(SourceKind::Amenities, municipality, department)
    }

    pub fn buildings(municipality: &str, department: &str) -> Self {
        Self::new(SourceKind::Buildings, municipality, department)
    }

    fn new(kind: SourceKind, municipality: &str, department: &str) -> Self {
        Self {
            kind,
            municipality: municipality.to_string(),
            department: department.to_string(),
        }
    }

    pub fn facility(&self, record: RawShapeRecord) -> Option<CanonicalFacility> {
        let Some((lon, lat)) = record.vertex else {
            debug!(osm_id = %record.osm_id, "skipping shape without vertices");
            return None;
        };
        let bag = AttributeBag::from_name(record.name.as_deref());
        let name = bag.names.first().map(String::as_str);
        let label = record.type_label.as_deref().unwrap_or("");

        let classification = match self.kind {
            SourceKind::Buildings => classify_building_label(label, name)
                .and_then(|classification| validate(classification, &bag.names)),
            _ => Some(classify_amenity_label(label, name)),
        };
        let Some(classification) = classification else {
            debug!(osm_id = %record.osm_id, label, "dropping unclassified building");
            return None;
        };

        let address = Address {
            city: Some(self.municipality.clone()),
            province: Some(self.department.clone()),
            ..bag.address
        };
        Some(CanonicalFacility::new(
            FacilityId::new(self.kind, record.osm_id),
            bag.names,
            classification,
            Location::from_degrees(lat, lon),
            address,
        ))
    }
}

pub struct ShapeSource<I> {
    layer: ShapeLayer,
    records: I,
}

impl<I> ShapeSource<I>
where
    I: Iterator<Item = RawShapeRecord>,
{
    pub fn new(layer: ShapeLayer, records: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            layer,
            records: records.into_iter(),
        }
    }
}

impl<I> FacilitySource for ShapeSource<I>
where
    I: Iterator<Item = RawShapeRecord>,
{
    fn kind(&self) -> SourceKind {
        self.layer.kind
    }

    fn facilities(&mut self) -> Box<dyn Iterator<Item = Result<CanonicalFacility>> + '_> {
        let layer = &self.layer;
        Box::new(
            self.records
                .by_ref()
                .filter_map(move |record| layer.facility(record).map(Ok)),
        )
    }
}

pub fn read_shapefile(path: &Path) -> Result<Vec<RawShapeRecord>> {
    let shapefile_error = |source| ExtractError::Shapefile {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = shapefile::Reader::from_path(path).map_err(shapefile_error)?;
    let mut records = Vec::new();
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item.map_err(shapefile_error)?;
        let Some(osm_id) = field_text(&record, "osm_id") else {
            debug!(path = %path.display(), "skipping shape without osm_id");
            continue;
        };
        records.push(RawShapeRecord {
            id: field_text(&record, "id"),
            osm_id,
            name: field_text(&record, "name"),
            type_label: field_text(&record, "type"),
            vertex: first_vertex(&shape),
        });
    }
    Ok(records)
}

pub fn open_shapefile(
    path: &Path,
    layer: ShapeLayer,
) -> Result<ShapeSource<std::vec::IntoIter<RawShapeRecord>>> {
    Ok(ShapeSource::new(layer, read_shapefile(path)?))
}

fn field_text(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        FieldValue::Character(Some(text)) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        FieldValue::Numeric(Some(number)) => Some(format_number(*number)),
        FieldValue::Integer(number) => Some(number.to_string()),
        _ => None,
    }
}

/// dBase stores OSM ids as numerics; print integral values without a fraction.
fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

fn first_vertex(shape: &Shape) -> Option<(f64, f64)> {
    match shape {
        Shape::Point(point) => Some((point.x, point.y)),
        Shape::PointM(point) => Some((point.x, point.y)),
        Shape::PointZ(point) => Some((point.x, point.y)),
        Shape::Polygon(polygon) => polygon
            .rings()
            .first()
            .and_then(|ring| ring.points().first())
            .map(|point| (point.x, point.y)),
        Shape::PolygonM(polygon) => polygon
            .rings()
            .first()
            .and_then(|ring| ring.points().first())
            .map(|point| (point.x, point.y)),
        Shape::PolygonZ(polygon) => polygon
            .rings()
            .first()
            .and_then(|ring| ring.points().first())
            .map(|point| (point.x, point.y)),
        Shape::Polyline(line) => line
            .parts()
            .first()
            .and_then(|part| part.first())
            .map(|point| (point.x, point.y)),
        Shape::Multipoint(points) => points.points().first().map(|point| (point.x, point.y)),
        _ => None,
    }
}
