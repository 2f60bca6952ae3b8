//! Source descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// What a source is and which loader handles it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// One legacy `.vtk` polydata file
    SingleLegacyMesh,
    /// One XML `.vtp` polydata file
    SingleXmlMesh,
    /// Several XML polydata files forming a time series
    XmlMeshSeries,
    /// One dataset-description bundle
    RemoteCompressedDataset,
    /// A bundle of dataset-description timesteps
    RemoteCompressedSeries,
    /// Declarative multi-object scene
    SceneBundle,
}

impl SourceKind {
    pub const ALL: [SourceKind; 6] = [
        Self::SingleLegacyMesh,
        Self::SingleXmlMesh,
        Self::XmlMeshSeries,
        Self::RemoteCompressedDataset,
        Self::RemoteCompressedSeries,
        Self::SceneBundle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SingleLegacyMesh => "single-legacy-mesh",
            Self::SingleXmlMesh => "single-xml-mesh",
            Self::XmlMeshSeries => "xml-mesh-series",
            Self::RemoteCompressedDataset => "remote-compressed-dataset",
            Self::RemoteCompressedSeries => "remote-compressed-series",
            Self::SceneBundle => "scene-bundle",
        }
    }

    /// Whether the location is an ordered list of URLs.
    pub fn takes_list(self) -> bool {
        matches!(self, Self::XmlMeshSeries)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| Error::InvalidSource(format!("unknown source kind {:?}", s)))
    }
}

/// Where a source lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Single(String),
    List(Vec<String>),
}

impl Location {
    pub fn urls(&self) -> &[String] {
        match self {
            Self::Single(url) => std::slice::from_ref(url),
            Self::List(urls) => urls,
        }
    }
}

/// Tagged description of one load request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    pub location: Location,
    /// The URL names a local container file rather than a served bundle.
    #[serde(default)]
    pub origin_is_local_file: bool,
}

impl SourceDescriptor {
    pub fn new(kind: SourceKind, location: Location) -> Self {
        Self { kind, location, origin_is_local_file: false }
    }

    pub fn single(kind: SourceKind, url: impl Into<String>) -> Self {
        Self::new(kind, Location::Single(url.into()))
    }

    pub fn list<I, S>(kind: SourceKind, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(kind, Location::List(urls.into_iter().map(Into::into).collect()))
    }

    /// Scene bundle packed in a local zip file.
    pub fn local_scene(path: impl Into<String>) -> Self {
        Self { origin_is_local_file: true, ..Self::single(SourceKind::SceneBundle, path) }
    }

    /// Check the location shape against the kind.
    pub fn validate(&self) -> Result<()> {
        match (&self.location, self.kind.takes_list()) {
            (Location::Single(url), false) if url.is_empty() => {
                Err(Error::InvalidSource(format!("{} needs a non-empty URL", self.kind)))
            }
            (Location::Single(_), false) => Ok(()),
            (Location::List(urls), true) if urls.is_empty() => {
                Err(Error::InvalidSource(format!("{} needs at least one URL", self.kind)))
            }
            (Location::List(_), true) => Ok(()),
            (Location::List(_), false) => {
                Err(Error::InvalidSource(format!("{} takes a single URL, got a list", self.kind)))
            }
            (Location::Single(_), true) => {
                Err(Error::InvalidSource(format!(
                    "{} takes a URL list, got a single URL",
                    self.kind
                )))
            }
        }
    }

    /// The single URL of this source.
    pub fn url(&self) -> Result<&str> {
        match &self.location {
            Location::Single(url) => Ok(url),
            Location::List(_) => {
                Err(Error::InvalidSource(format!("{} has no single URL", self.kind)))
            }
        }
    }
}
