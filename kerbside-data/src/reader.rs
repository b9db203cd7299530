//! Streaming reader for OSM XML extracts.
//!
//! Only nodes and ways are surfaced. Relations, node tags and metadata
//! attributes are skipped without buffering.

use std::{collections::BTreeMap, io::BufRead, io::BufReader};

use camino::Utf8Path;
use cap_std::fs_utf8;
use kerbside_core::{NodeId, WayId};
use log::{debug, warn};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::ImportError;

/// A raw element of an OSM extract.
#[derive(Debug, Clone, PartialEq)]
pub enum OsmElement {
    /// A node with its degree-valued position. Missing or unparseable
    /// coordinates are carried as `NaN` for the importer to reject.
    Node { id: NodeId, lat: f64, lon: f64 },
    /// A way with its tags and ordered node references.
    Way {
        id: WayId,
        tags: BTreeMap<String, String>,
        refs: Vec<NodeId>,
    },
}

/// Iterator over the nodes and ways of an OSM XML document.
///
/// Yields at most one error, after which iteration stops.
///
/// # Examples
/// ```
/// use kerbside_data::{OsmElement, OsmXmlReader};
///
/// let xml = br#"<?xml version="1.0"?>
/// <osm version="0.6">
///   <node id="1" lat="43.0" lon="-79.0"/>
/// </osm>"#;
/// let elements: Vec<_> = OsmXmlReader::new(&xml[..]).collect::<Result<_, _>>()?;
/// assert_eq!(elements, vec![OsmElement::Node { id: 1, lat: 43.0, lon: -79.0 }]);
/// # Ok::<(), kerbside_data::ImportError>(())
/// ```
pub struct OsmXmlReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_way: Option<PendingWay>,
    finished: bool,
}

struct PendingWay {
    id: WayId,
    tags: BTreeMap<String, String>,
    refs: Vec<NodeId>,
}

impl PendingWay {
    fn new(id: WayId) -> Self {
        Self {
            id,
            tags: BTreeMap::new(),
            refs: Vec::new(),
        }
    }

    fn into_element(self) -> OsmElement {
        OsmElement::Way {
            id: self.id,
            tags: self.tags,
            refs: self.refs,
        }
    }
}

impl OsmXmlReader<BufReader<fs_utf8::File>> {
    /// Open the extract at `path`.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ImportError> {
        let file = kerbside_fs::open_utf8_file(path).map_err(|source| ImportError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> OsmXmlReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            pending_way: None,
            finished: false,
        }
    }

    fn advance(&mut self) -> Result<Option<OsmElement>, ImportError> {
        let Self {
            reader,
            buf,
            pending_way,
            ..
        } = self;
        loop {
            buf.clear();
            let position = u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX);
            let event = reader
                .read_event_into(buf)
                .map_err(|source| ImportError::xml(position, source))?;
            match event {
                Event::Start(element) => match element.name().as_ref() {
                    b"node" => {
                        if let Some(node) = parse_node(&element, position)? {
                            return Ok(Some(node));
                        }
                    }
                    b"way" => {
                        *pending_way = parse_id(&element, "way", position)?.map(PendingWay::new);
                    }
                    _ => record_child(pending_way.as_mut(), &element, position)?,
                },
                Event::Empty(element) => match element.name().as_ref() {
                    b"node" => {
                        if let Some(node) = parse_node(&element, position)? {
                            return Ok(Some(node));
                        }
                    }
                    b"way" => {
                        if let Some(id) = parse_id(&element, "way", position)? {
                            return Ok(Some(PendingWay::new(id).into_element()));
                        }
                    }
                    _ => record_child(pending_way.as_mut(), &element, position)?,
                },
                Event::End(element) if element.name().as_ref() == b"way" => {
                    if let Some(way) = pending_way.take() {
                        return Ok(Some(way.into_element()));
                    }
                }
                Event::Eof => {
                    if let Some(way) = pending_way.take() {
                        debug!("extract ended inside way {}", way.id);
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmXmlReader<R> {
    type Item = Result<OsmElement, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let outcome = self.advance().transpose();
        if !matches!(outcome, Some(Ok(_))) {
            self.finished = true;
        }
        outcome
    }
}

fn record_child(
    way: Option<&mut PendingWay>,
    element: &BytesStart<'_>,
    position: u64,
) -> Result<(), ImportError> {
    let Some(way) = way else {
        return Ok(());
    };
    match element.name().as_ref() {
        b"nd" => match attribute(element, b"ref", position)?.map(|raw| raw.parse::<NodeId>()) {
            Some(Ok(node)) => way.refs.push(node),
            _ => warn!("way {} has a node reference without a valid id; skipping it", way.id),
        },
        b"tag" => {
            if let (Some(key), Some(value)) = (
                attribute(element, b"k", position)?,
                attribute(element, b"v", position)?,
            ) {
                way.tags.insert(key, value);
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_node(element: &BytesStart<'_>, position: u64) -> Result<Option<OsmElement>, ImportError> {
    let Some(id) = parse_id(element, "node", position)? else {
        return Ok(None);
    };
    let degrees = |key: &[u8]| -> Result<f64, ImportError> {
        Ok(attribute(element, key, position)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(f64::NAN))
    };
    Ok(Some(OsmElement::Node {
        id,
        lat: degrees(b"lat")?,
        lon: degrees(b"lon")?,
    }))
}

fn parse_id(
    element: &BytesStart<'_>,
    kind: &str,
    position: u64,
) -> Result<Option<i64>, ImportError> {
    let raw = attribute(element, b"id", position)?;
    match raw.as_deref().map(str::parse::<i64>) {
        Some(Ok(id)) => Ok(Some(id)),
        _ => {
            warn!("skipping {kind} at byte {position} without a valid id: {raw:?}");
            Ok(None)
        }
    }
}

fn attribute(
    element: &BytesStart<'_>,
    key: &[u8],
    position: u64,
) -> Result<Option<String>, ImportError> {
    for attr in element.attributes().with_checks(false) {
        let attr = attr.map_err(|source| ImportError::xml(position, source))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|source| ImportError::xml(position, source))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
