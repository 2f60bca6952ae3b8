//! Fetching and decoding of dataset sources.

mod compression;
mod container;
mod description;
mod fetch;
mod http;
mod reader;

pub use compression::{gunzip, gzip, is_gzip};
pub use container::ZipFetcher;
pub use description::{ArrayDescription, ArrayRef, AttributesDescription, DataSetDescription};
pub use fetch::{
    join_url, parent_url, FetchPolicy, Fetcher, FileFetcher, MemoryFetcher, PolicyFetcher,
};
pub use http::{index_location, HttpDataSetReader, SeriesReader};
pub use reader::{GeometryReader, JsonPolyDataReader, MeshFormat, ReaderSet};
