use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use osmpbfreader::{OsmObj, OsmPbfReader};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::FacilitySource;
use crate::classify::classify_bag;
use crate::error::{ExtractError, Result};
use crate::facility::{CanonicalFacility, FacilityId, Location, Provenance, SourceKind};
use crate::normalize::normalize_tags;
use crate::validate::validate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTaggedNode {
    pub id: String,
    pub lat: String,
    pub lon: String,
    pub provenance: Provenance,
    pub tags: Vec<(String, String)>,
}

fn get_attr_value(event: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn is_coordinate(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

fn node_from_start(event: &BytesStart<'_>) -> Result<Option<RawTaggedNode>> {
    let id = get_attr_value(event, b"id")?;
    let lat = get_attr_value(event, b"lat")?.filter(|value| is_coordinate(value));
    let lon = get_attr_value(event, b"lon")?.filter(|value| is_coordinate(value));
    let (Some(id), Some(lat), Some(lon)) = (id, lat, lon) else {
        debug!("skipping node without id or coordinates");
        return Ok(None);
    };
    let provenance = Provenance {
        version: get_attr_value(event, b"version")?,
        timestamp: get_attr_value(event, b"timestamp")?,
        changeset: get_attr_value(event, b"changeset")?,
        uid: get_attr_value(event, b"uid")?,
        user: get_attr_value(event, b"user")?,
    };
    Ok(Some(RawTaggedNode {
        id,
        lat,
        lon,
        provenance,
        tags: Vec::new(),
    }))
}

fn push_tag(node: &mut Option<RawTaggedNode>, event: &BytesStart<'_>) -> Result<()> {
    let Some(node) = node.as_mut() else {
        return Ok(());
    };
    let key = get_attr_value(event, b"k")?;
    let value = get_attr_value(event, b"v")?;
    if let (Some(key), Some(value)) = (key, value) {
        node.tags.push((key, value));
    }
    Ok(())
}

/// Lazy stream of nodes from an OSM XML document.
///
/// Tags of ways and relations are ignored. The stream stops after the
/// first error.
pub struct XmlNodes<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    current: Option<RawTaggedNode>,
    finished: bool,
}

impl<R: BufRead> XmlNodes<R> {
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            current: None,
            finished: false,
        }
    }

    fn next_node(&mut self) -> Result<Option<RawTaggedNode>> {
        loop {
            let node = match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => return Ok(None),
                Event::Start(e) => {
                    match e.name().as_ref() {
                        b"node" => self.current = node_from_start(&e)?,
                        b"tag" => push_tag(&mut self.current, &e)?,
                        _ => {}
                    }
                    None
                }
                Event::Empty(e) => match e.name().as_ref() {
                    b"node" => node_from_start(&e)?,
                    b"tag" => {
                        push_tag(&mut self.current, &e)?;
                        None
                    }
                    _ => None,
                },
                Event::End(e) if e.name().as_ref() == b"node" => self.current.take(),
                _ => None,
            };
            self.buf.clear();
            if node.is_some() {
                return Ok(node);
            }
        }
    }
}

impl<R: BufRead> Iterator for XmlNodes<R> {
    type Item = Result<RawTaggedNode>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_node() {
            Ok(Some(node)) => Some(Ok(node)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn pbf_node(node: &osmpbfreader::Node) -> RawTaggedNode {
    RawTaggedNode {
        id: node.id.0.to_string(),
        lat: format!("{}", node.lat()),
        lon: format!("{}", node.lon()),
        provenance: Provenance::default(),
        tags: node
            .tags
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    }
}

pub fn node_facility(node: RawTaggedNode) -> Option<CanonicalFacility> {
    let bag = normalize_tags(node.tags.iter().map(|(key, value)| (key.as_str(), value.as_str())));
    let classification = classify_bag(&bag)?;
    let Some(classification) = validate(classification, &bag.names) else {
        debug!(node = %node.id, "dropping implausible health classification");
        return None;
    };
    let facility = CanonicalFacility::new(
        FacilityId::new(SourceKind::Node, node.id),
        bag.names,
        classification,
        Location::new(node.lat, node.lon),
        bag.address,
    );
    Some(facility.with_provenance(node.provenance))
}

enum NodeInput {
    Xml(XmlNodes<Box<dyn BufRead>>),
    Pbf {
        reader: OsmPbfReader<File>,
        path: PathBuf,
    },
}

pub struct OsmNodeSource {
    input: NodeInput,
}

impl OsmNodeSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let input = match path.extension().and_then(|ext| ext.to_str()) {
            Some("pbf") => NodeInput::Pbf {
                reader: OsmPbfReader::new(file),
                path: path.to_path_buf(),
            },
            _ => {
                let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
                NodeInput::Xml(XmlNodes::new(reader))
            }
        };
        Ok(Self { input })
    }

    pub fn from_xml<R: BufRead + 'static>(reader: R) -> Self {
        let reader: Box<dyn BufRead> = Box::new(reader);
        Self {
            input: NodeInput::Xml(XmlNodes::new(reader)),
        }
    }

    pub fn nodes(&mut self) -> Box<dyn Iterator<Item = Result<RawTaggedNode>> + '_> {
        match &mut self.input {
            NodeInput::Xml(nodes) => Box::new(nodes),
            NodeInput::Pbf { reader, path } => {
                let path = path.clone();
                Box::new(reader.iter().filter_map(move |obj| match obj {
                    Ok(OsmObj::Node(node)) => Some(Ok(pbf_node(&node))),
                    Ok(_) => None,
                    Err(source) => Some(Err(ExtractError::Pbf {
                        path: path.clone(),
                        source,
                    })),
                }))
            }
        }
    }
}

impl FacilitySource for OsmNodeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Node
    }

    fn facilities(&mut self) -> Box<dyn Iterator<Item = Result<CanonicalFacility>> + '_> {
        Box::new(self.nodes().filter_map(|node| match node {
            Ok(node) => node_facility(node).map(Ok),
            Err(err) => Some(Err(err)),
        }))
    }
}
