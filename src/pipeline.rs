use std::fs;

use tracing::info;

use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::sources::osm::OsmNodeSource;
use crate::sources::shape::open_shapefile;
use crate::sources::{collect_facilities, FacilitySource};
use crate::tables::{write_places, PlaceRow, TablePaths, Tables};

pub fn build_tables<'a, I>(sources: I) -> Result<Tables>
where
    I: IntoIterator<Item = &'a mut dyn FacilitySource>,
{
    let mut facilities = Vec::new();
    for source in sources {
        facilities.extend(collect_facilities(source)?);
    }
    Ok(Tables::build(facilities))
}

/// Every source is opened before any is read so a missing file fails fast.
pub fn extract_all(config: &Config) -> Result<Tables> {
    let mut nodes = OsmNodeSource::open(&config.osm_path())?;
    let mut amenities = open_shapefile(&config.amenities_path(), config.amenities())?;
    let mut buildings = open_shapefile(&config.buildings_path(), config.buildings())?;
    let sources: [&mut dyn FacilitySource; 3] = [&mut nodes, &mut amenities, &mut buildings];
    build_tables(sources)
}

fn ensure_out_dir(config: &Config) -> Result<()> {
    if !config.out_dir.as_os_str().is_empty() {
        fs::create_dir_all(&config.out_dir).map_err(|source| ExtractError::CreateDir {
            path: config.out_dir.clone(),
            source,
        })?;
    }
    Ok(())
}

pub fn run(config: &Config) -> Result<Tables> {
    let tables = extract_all(config)?;
    ensure_out_dir(config)?;

    let places = config.output_path(&config.places_file);
    let altnames = config.output_path(&config.altnames_file);
    let addresses = config.output_path(&config.addresses_file);
    tables.write(&TablePaths {
        places: &places,
        altnames: &altnames,
        addresses: &addresses,
    })?;
    info!(
        places = tables.places.len(),
        altnames = tables.altnames.len(),
        addresses = tables.addresses.len(),
        "wrote tables to {}",
        config.out_dir.display()
    );
    Ok(tables)
}

pub fn amenity_places(config: &Config) -> Result<Vec<PlaceRow>> {
    let mut amenities = open_shapefile(&config.amenities_path(), config.amenities())?;
    let facilities = collect_facilities(&mut amenities)?;
    Ok(facilities.iter().map(PlaceRow::from_facility).collect())
}

pub fn write_amenity_places(config: &Config, output: &std::path::Path) -> Result<usize> {
    let places = amenity_places(config)?;
    write_places(output, &places)?;
    Ok(places.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::AmenityType;
    use crate::sources::shape::tests::write_layer;
    use crate::sources::shape::{RawShapeRecord, ShapeLayer, ShapeSource};
    use csv::ReaderBuilder;
    use tempfile::tempdir;

    const OSM_SAMPLE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="test">
  <node id="100" lat="12.1500" lon="-86.2700" version="2" timestamp="2016-01-01T00:00:00Z" changeset="5" uid="1" user="a">
    <tag k="amenity" v="hospital" />
    <tag k="name" v="Hospital Bertha Calderón" />
    <tag k="addr:housenumber" v="12" />
    <tag k="addr:street" v="Calle Real" />
    <tag k="addr:district" v="Distrito III" />
    <tag k="addr:city" v="Managua" />
    <tag k="is_in:state" v="Managua" />
  </node>
  <node id="101" lat="12.1000" lon="-86.2000">
    <tag k="amenity" v="fast_food" />
    <tag k="internet_access" v="wlan" />
    <tag k="name" v="Tacos Express" />
  </node>
  <node id="102" lat="12.9000" lon="-84.9000">
    <tag k="name" v="Centro de Salud Waspán" />
    <tag k="addr:full" v="Frente al parque" />
    <tag k="postal_code" v="61000" />
  </node>
  <node id="103" lat="12.4300" lon="-86.8800">
    <tag k="shop" v="bakery" />
  </node>
</osm>
"#;

    fn shape(osm_id: &str, name: Option<&str>, label: &str) -> RawShapeRecord {
        RawShapeRecord {
            id: None,
            osm_id: osm_id.into(),
            name: name.map(String::from),
            type_label: Some(label.into()),
            vertex: Some((-86.25, 12.13)),
        }
    }

    fn run_sample() -> Tables {
        let mut nodes = OsmNodeSource::from_xml(OSM_SAMPLE.as_bytes());
        let mut amenities = ShapeSource::new(
            ShapeLayer::amenities("Managua", "Managua"),
            vec![
                shape("-200", Some("Universidad Centroamericana"), "university"),
                shape("-201", Some("Estación de Bomberos"), "fire_station"),
            ],
        );
        let mut buildings = ShapeSource::new(
            ShapeLayer::buildings("Managua", "Managua"),
            vec![
                shape("-300", Some("Pulpería La Esperanza"), "hospital"),
                shape("-301", None, "yes"),
                shape("-302", Some("Policlínica Oriental"), "yes"),
            ],
        );
        let sources: [&mut dyn FacilitySource; 3] = [&mut nodes, &mut amenities, &mut buildings];
        build_tables(sources).unwrap()
    }

    #[test]
    fn merges_sources_in_order() {
        let tables = run_sample();
        let ids: Vec<&str> = tables.places.iter().map(|row| row.osm_id.as_str()).collect();
        assert_eq!(ids, vec!["100", "102", "-200", "-201", "-302"]);

        let types: Vec<(AmenityType, Option<&str>)> = tables
            .places
            .iter()
            .map(|row| (row.amenity_type, row.facility_type.as_deref()))
            .collect();
        assert_eq!(
            types,
            vec![
                (AmenityType::Health, Some("hospital")),
                (AmenityType::Health, Some("health_centre")),
                (AmenityType::Education, Some("university")),
                (AmenityType::Other, Some("fire_station")),
                (AmenityType::Health, Some("clinic")),
            ]
        );
    }

    #[test]
    fn derives_municipality_and_addresses() {
        let tables = run_sample();
        let hospital = &tables.places[0];
        assert_eq!(hospital.municipality, "Managua");
        assert_eq!(hospital.department, "Managua");
        assert_eq!(tables.places[2].municipality, "Managua");

        let addresses: Vec<(&str, &str)> = tables
            .addresses
            .iter()
            .map(|row| (row.osm_id.as_str(), row.full_addr.as_str()))
            .collect();
        assert_eq!(
            addresses,
            vec![("100", "12,Calle Real"), ("102", "Frente al parque")]
        );
        assert_eq!(tables.addresses[1].postal_code.as_deref(), Some("61000"));
    }

    #[test]
    fn no_health_row_keeps_an_access_type() {
        let tables = run_sample();
        assert!(tables.places.iter().all(|row| {
            row.facility_type
                .as_deref()
                .map_or(true, |t| !t.contains("internet") && !t.contains("access"))
        }));
    }

    #[test]
    fn rerun_writes_identical_files() {
        let dir = tempdir().unwrap();
        let mut outputs = Vec::new();
        for attempt in 0..2 {
            let places = dir.path().join(format!("places_{attempt}.csv"));
            let altnames = dir.path().join(format!("altnames_{attempt}.csv"));
            let addresses = dir.path().join(format!("addresses_{attempt}.csv"));
            run_sample()
                .write(&TablePaths {
                    places: &places,
                    altnames: &altnames,
                    addresses: &addresses,
                })
                .unwrap();
            outputs.push(
                [places, altnames, addresses]
                    .iter()
                    .map(|path| std::fs::read(path).unwrap())
                    .collect::<Vec<_>>(),
            );
        }
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn missing_source_aborts_before_writing() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let osm_dir = data_dir.join("nicaragua-latest.osm");
        std::fs::create_dir_all(&osm_dir).unwrap();
        std::fs::write(osm_dir.join("nicaragua-latest.osm"), OSM_SAMPLE).unwrap();

        let config = Config {
            data_dir,
            out_dir: dir.path().join("out"),
            ..Config::default()
        };
        let err = run(&config).unwrap_err();
        assert!(matches!(err, ExtractError::Shapefile { .. }));
        assert!(!config.output_path(&config.places_file).exists());
    }

    #[test]
    fn amenity_places_reads_the_amenities_layer() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        std::fs::create_dir_all(dir.path().join(&config.shapefile_dir)).unwrap();
        write_layer(
            &config.amenities_path(),
            &[
                (Some(-501.0), Some("Universidad Americana"), "university"),
                (Some(-502.0), Some("Gasolinera Puma"), "fuel"),
            ],
        );

        let output = dir.path().join("amenity_places.csv");
        assert_eq!(write_amenity_places(&config, &output).unwrap(), 2);
        let mut reader = ReaderBuilder::new().from_path(&output).unwrap();
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|row| row.unwrap().iter().map(String::from).collect())
            .collect();
        assert_eq!(rows[0][0], "-501");
        assert_eq!(rows[0][2], "education");
        assert_eq!(rows[0][3], "university");
        assert_eq!(rows[0][6], "Managua");
        assert_eq!(rows[1][0], "-502");
        assert_eq!(rows[1][3], "fuel");
    }

    #[test]
    fn altnames_include_display_name() {
        let tables = run_sample();
        let dir = tempdir().unwrap();
        let places = dir.path().join("p.csv");
        let altnames = dir.path().join("a.csv");
        let addresses = dir.path().join("d.csv");
        tables
            .write(&TablePaths {
                places: &places,
                altnames: &altnames,
                addresses: &addresses,
            })
            .unwrap();
        let mut reader = ReaderBuilder::new().from_path(&altnames).unwrap();
        let names: Vec<String> = reader
            .records()
            .map(|row| row.unwrap()[1].to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Hospital Bertha Calderón",
                "Centro de Salud Waspán",
                "Universidad Centroamericana",
                "Estación de Bomberos",
                "Policlínica Oriental",
            ]
        );
    }
}
