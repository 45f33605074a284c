use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::error::Result;
use crate::facility::{AmenityType, CanonicalFacility};

pub const PLACES_HEADER: [&str; 9] = [
    "osm_id",
    "name",
    "type",
    "facility_type",
    "lat",
    "lon",
    "municipality",
    "department",
    "country",
];
pub const ALTNAMES_HEADER: [&str; 2] = ["osm_id", "name"];
pub const ADDRESSES_HEADER: [&str; 6] = [
    "osm_id",
    "full_addr",
    "postal_code",
    "municipality",
    "department",
    "country",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRow {
    pub osm_id: String,
    pub name: String,
    pub amenity_type: AmenityType,
    pub facility_type: Option<String>,
    pub lat: String,
    pub lon: String,
    pub municipality: String,
    pub department: String,
    pub country: String,
}

impl PlaceRow {
    pub fn from_facility(facility: &CanonicalFacility) -> Self {
        Self {
            osm_id: facility.id.osm_id.clone(),
            name: facility.display_name().to_string(),
            amenity_type: facility.amenity,
            facility_type: facility.facility_type.clone(),
            lat: facility.location.lat.clone(),
            lon: facility.location.lon.clone(),
            municipality: facility.address.municipality().to_string(),
            department: facility.address.department().to_string(),
            country: facility.address.country.clone(),
        }
    }

    fn record(&self) -> [&str; 9] {
        [
            &self.osm_id,
            &self.name,
            self.amenity_type.as_str(),
            self.facility_type.as_deref().unwrap_or(""),
            &self.lat,
            &self.lon,
            &self.municipality,
            &self.department,
            &self.country,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltNameRow {
    pub osm_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    pub osm_id: String,
    pub full_addr: String,
    pub postal_code: Option<String>,
    pub municipality: String,
    pub department: String,
    pub country: String,
}

impl AddressRow {
    /// `None` unless the facility has a full address or both a number and a street.
    pub fn from_facility(facility: &CanonicalFacility) -> Option<Self> {
        let address = &facility.address;
        let full_addr = address.display_full()?;
        Some(Self {
            osm_id: facility.id.osm_id.clone(),
            full_addr,
            postal_code: address.postal_code.clone(),
            municipality: address.municipality().to_string(),
            department: address.department().to_string(),
            country: address.country.clone(),
        })
    }

    fn record(&self) -> [&str; 6] {
        [
            &self.osm_id,
            &self.full_addr,
            self.postal_code.as_deref().unwrap_or(""),
            &self.municipality,
            &self.department,
            &self.country,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct TablePaths<'a> {
    pub places: &'a Path,
    pub altnames: &'a Path,
    pub addresses: &'a Path,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub places: Vec<PlaceRow>,
    pub altnames: Vec<AltNameRow>,
    pub addresses: Vec<AddressRow>,
}

impl Tables {
    pub fn build<I>(facilities: I) -> Self
    where
        I: IntoIterator<Item = CanonicalFacility>,
    {
        let mut tables = Self::default();
        for facility in facilities {
            tables.places.push(PlaceRow::from_facility(&facility));
            tables
                .altnames
                .extend(facility.names.iter().map(|name| AltNameRow {
                    osm_id: facility.id.osm_id.clone(),
                    name: name.clone(),
                }));
            tables.addresses.extend(AddressRow::from_facility(&facility));
        }
        tables
    }

    pub fn write(&self, paths: &TablePaths<'_>) -> Result<()> {
        write_places(paths.places, &self.places)?;

        let mut writer = Writer::from_path(paths.altnames)?;
        writer.write_record(ALTNAMES_HEADER)?;
        for row in &self.altnames {
            writer.write_record([&row.osm_id, &row.name])?;
        }
        writer.flush()?;

        let mut writer = Writer::from_path(paths.addresses)?;
        writer.write_record(ADDRESSES_HEADER)?;
        for row in &self.addresses {
            writer.write_record(row.record())?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn write_places(path: &Path, places: &[PlaceRow]) -> Result<()> {
    let mut writer: Writer<File> = Writer::from_path(path)?;
    writer.write_record(PLACES_HEADER)?;
    for row in places {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
}
