use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    #[error("failed to open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to create output directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("malformed OSM XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed OSM XML attribute: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),
    #[error("failed to read OSM PBF {path:?}: {source}")]
    Pbf {
        path: PathBuf,
        source: osmpbfreader::Error,
    },
    #[error("failed to read shapefile {path:?}: {source}")]
    Shapefile {
        path: PathBuf,
        source: shapefile::Error,
    },
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
