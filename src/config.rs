use std::path::PathBuf;

use crate::sources::shape::ShapeLayer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// OSM extract, relative to `data_dir`. `.pbf` selects the PBF reader.
    pub osm_file: PathBuf,
    pub shapefile_dir: PathBuf,
    pub amenities_layer: String,
    pub buildings_layer: String,
    pub shapefile_municipality: String,
    pub shapefile_department: String,
    pub out_dir: PathBuf,
    pub places_file: String,
    pub altnames_file: String,
    pub addresses_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("OSM_DATA"),
            osm_file: PathBuf::from("nicaragua-latest.osm").join("nicaragua-latest.osm"),
            shapefile_dir: PathBuf::from("managua_nicaragua.imposm-shapefiles"),
            amenities_layer: "managua_nicaragua_osm_amenities".to_string(),
            buildings_layer: "managua_nicaragua_osm_buildings".to_string(),
            shapefile_municipality: "Managua".to_string(),
            shapefile_department: "Managua".to_string(),
            out_dir: PathBuf::from("."),
            places_file: "osm_places.csv".to_string(),
            altnames_file: "osm_altnames.csv".to_string(),
            addresses_file: "osm_addresses.csv".to_string(),
        }
    }
}

impl Config {
    pub fn osm_path(&self) -> PathBuf {
        self.data_dir.join(&self.osm_file)
    }

    pub fn amenities_path(&self) -> PathBuf {
        self.layer_path(&self.amenities_layer)
    }

    pub fn buildings_path(&self) -> PathBuf {
        self.layer_path(&self.buildings_layer)
    }

    fn layer_path(&self, layer: &str) -> PathBuf {
        self.data_dir
            .join(&self.shapefile_dir)
            .join(layer)
            .with_extension("shp")
    }

    pub fn amenities(&self) -> ShapeLayer {
        ShapeLayer::amenities(&self.shapefile_municipality, &self.shapefile_department)
    }

    pub fn buildings(&self) -> ShapeLayer {
        ShapeLayer::buildings(&self.shapefile_municipality, &self.shapefile_department)
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }
}
