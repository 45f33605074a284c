use std::fmt;

pub const DEFAULT_COUNTRY: &str = "Nicaragua";

/// Top-level facility category.
///
/// There is no "unknown" variant: a record that cannot be categorised is
/// never turned into a [`CanonicalFacility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmenityType {
    Health,
    Education,
    Community,
    Other,
}

impl AmenityType {
    pub fn as_str(self) -> &'static str {
        match self {
            AmenityType::Health => "health",
            AmenityType::Education => "education",
            AmenityType::Community => "community",
            AmenityType::Other => "other",
        }
    }
}

impl fmt::Display for AmenityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub amenity: AmenityType,
    pub facility_type: Option<String>,
}

impl Classification {
    pub fn new(amenity: AmenityType, facility_type: Option<String>) -> Self {
        Self {
            amenity,
            facility_type,
        }
    }

    pub fn with_type(amenity: AmenityType, facility_type: &str) -> Self {
        Self::new(amenity, Some(facility_type.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Node,
    Amenities,
    Buildings,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Node => "node",
            SourceKind::Amenities => "amenities",
            SourceKind::Buildings => "buildings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityId {
    pub source: SourceKind,
    pub osm_id: String,
}

impl FacilityId {
    pub fn new(source: SourceKind, osm_id: impl Into<String>) -> Self {
        Self {
            source,
            osm_id: osm_id.into(),
        }
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source.as_str(), self.osm_id)
    }
}

/// Coordinates kept in their source text form so reruns reproduce them exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub lat: String,
    pub lon: String,
}

impl Location {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self::new(format!("{lat}"), format!("{lon}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub full_addr: Option<String>,
    pub housename: Option<String>,
    pub building_no: Option<String>,
    pub street: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: Option<String>,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            full_addr: None,
            housename: None,
            building_no: None,
            street: None,
            district: None,
            city: None,
            province: None,
            country: DEFAULT_COUNTRY.to_string(),
            postal_code: None,
        }
    }
}

impl Address {
    /// City, else district, else empty. Blank values do not count.
    pub fn municipality(&self) -> &str {
        non_blank(&self.city)
            .or_else(|| non_blank(&self.district))
            .unwrap_or("")
    }

    pub fn department(&self) -> &str {
        self.province.as_deref().unwrap_or("")
    }

    /// `full_addr` when present, else `building_no,street` when both exist.
    pub fn display_full(&self) -> Option<String> {
        if let Some(full) = non_blank(&self.full_addr) {
            return Some(full.to_string());
        }
        match (non_blank(&self.building_no), non_blank(&self.street)) {
            (Some(number), Some(street)) => Some(format!("{number},{street}")),
            _ => None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub version: Option<String>,
    pub timestamp: Option<String>,
    pub changeset: Option<String>,
    pub uid: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFacility {
    pub id: FacilityId,
    pub names: Vec<String>,
    pub amenity: AmenityType,
    pub facility_type: Option<String>,
    pub location: Location,
    pub address: Address,
    pub provenance: Provenance,
}

impl CanonicalFacility {
    pub fn new(
        id: FacilityId,
        names: Vec<String>,
        classification: Classification,
        location: Location,
        address: Address,
    ) -> Self {
        Self {
            id,
            names,
            amenity: classification.amenity,
            facility_type: classification.facility_type,
            location,
            address,
            provenance: Provenance::default(),
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn display_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn municipality_prefers_city_over_district() {
        let address = Address {
            district: Some("Distrito V".into()),
            city: Some("Managua".into()),
            ..Address::default()
        };
        assert_eq!(address.municipality(), "Managua");

        let address = Address {
            district: Some("Distrito V".into()),
            city: Some("  ".into()),
            ..Address::default()
        };
        assert_eq!(address.municipality(), "Distrito V");
        assert_eq!(Address::default().municipality(), "");
    }

    #[test]
    fn display_full_builds_from_number_and_street() {
        let address = Address {
            building_no: Some("12".into()),
            street: Some("Calle Real".into()),
            ..Address::default()
        };
        assert_eq!(address.display_full().as_deref(), Some("12,Calle Real"));

        let only_street = Address {
            street: Some("Calle Real".into()),
            ..Address::default()
        };
        assert_eq!(only_street.display_full(), None);

        let full = Address {
            full_addr: Some("Del parque 2c al sur".into()),
            building_no: Some("12".into()),
            ..Address::default()
        };
        assert_eq!(full.display_full().as_deref(), Some("Del parque 2c al sur"));
    }

    #[test]
    fn facility_id_is_source_qualified() {
        let id = FacilityId::new(SourceKind::Buildings, "-42");
        assert_eq!(id.to_string(), "buildings/-42");
        assert_eq!(id.osm_id, "-42");
    }
}
