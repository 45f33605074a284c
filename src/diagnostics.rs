use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::sources::osm::RawTaggedNode;

pub fn count_elements<R: BufRead>(inner: R) -> Result<BTreeMap<String, usize>> {
    let mut reader = Reader::from_reader(inner);
    reader.trim_text(true);
    let mut counts = BTreeMap::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                *counts.entry(name).or_insert(0) += 1;
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(counts)
}

pub fn distinct_tag_keys<I>(nodes: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = Result<RawTaggedNode>>,
{
    let mut keys = BTreeSet::new();
    for node in nodes {
        keys.extend(node?.tags.into_iter().map(|(key, _)| key));
    }
    Ok(keys.into_iter().collect())
}

pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}
