//! Synchronous geometry parsers.
//!
//! Legacy and XML mesh parsers come from the rendering toolkit; they plug in
//! through [`GeometryReader`] and are looked up by [`MeshFormat`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::description::DataSetDescription;
use crate::data::PolyData;
use crate::util::{Error, Result};

/// Mesh file formats parsed by toolkit readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Legacy `.vtk` polydata
    Legacy,
    /// XML `.vtp` polydata
    Xml,
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

/// Parses a raw byte buffer into geometry.
pub trait GeometryReader {
    fn parse(&self, source_name: &str, bytes: &[u8]) -> Result<PolyData>;
}

/// Reads JSON dataset descriptions with inline values.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPolyDataReader;

impl GeometryReader for JsonPolyDataReader {
    fn parse(&self, source_name: &str, bytes: &[u8]) -> Result<PolyData> {
        DataSetDescription::from_slice(source_name, bytes)?.to_polydata_inline(source_name)
    }
}

/// Registered readers by format.
#[derive(Clone, Default)]
pub struct ReaderSet {
    readers: HashMap<MeshFormat, Rc<dyn GeometryReader>>,
}

impl ReaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, format: MeshFormat, reader: Rc<dyn GeometryReader>) {
        self.readers.insert(format, reader);
    }

    pub fn with(mut self, format: MeshFormat, reader: Rc<dyn GeometryReader>) -> Self {
        self.register(format, reader);
        self
    }

    /// Reader for `format`, or [`Error::NoReader`].
    pub fn get(&self, format: MeshFormat) -> Result<&dyn GeometryReader> {
        self.readers
            .get(&format)
            .map(|r| r.as_ref())
            .ok_or_else(|| Error::NoReader(format.to_string()))
    }
}

impl fmt::Debug for ReaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.readers.keys()).finish()
    }
}
