pub mod osm;
pub mod shape;

use tracing::info;

use crate::error::Result;
use crate::facility::{CanonicalFacility, SourceKind};

pub trait FacilitySource {
    fn kind(&self) -> SourceKind;

    /// Unclassifiable or rejected records are skipped; an `Err` item ends the run.
    fn facilities(&mut self) -> Box<dyn Iterator<Item = Result<CanonicalFacility>> + '_>;
}

pub fn collect_facilities(source: &mut dyn FacilitySource) -> Result<Vec<CanonicalFacility>> {
    let facilities = source.facilities().collect::<Result<Vec<_>>>()?;
    info!(
        source = source.kind().as_str(),
        "found {} facilities",
        facilities.len()
    );
    Ok(facilities)
}
