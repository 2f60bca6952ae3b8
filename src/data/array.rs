//! Named numeric arrays and attribute collections.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Storage type of an array as it appears in dataset descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataType {
    #[serde(rename = "Int8Array")]
    Int8,
    #[serde(rename = "Uint8Array")]
    Uint8,
    #[serde(rename = "Int16Array")]
    Int16,
    #[serde(rename = "Uint16Array")]
    Uint16,
    #[serde(rename = "Int32Array")]
    Int32,
    #[serde(rename = "Uint32Array")]
    Uint32,
    #[serde(rename = "Float32Array")]
    #[default]
    Float32,
    #[serde(rename = "Float64Array")]
    Float64,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Decode a little-endian buffer into values.
    pub fn decode_le(self, bytes: &[u8]) -> Result<Vec<f64>> {
        let size = self.size();
        if bytes.len() % size != 0 {
            return Err(Error::parse(
                format!("{:?} array", self),
                format!("{} bytes is not a multiple of element size {}", bytes.len(), size),
            ));
        }
        let values = bytes
            .chunks_exact(size)
            .map(|c| match self {
                Self::Int8 => c[0] as i8 as f64,
                Self::Uint8 => c[0] as f64,
                Self::Int16 => LittleEndian::read_i16(c) as f64,
                Self::Uint16 => LittleEndian::read_u16(c) as f64,
                Self::Int32 => LittleEndian::read_i32(c) as f64,
                Self::Uint32 => LittleEndian::read_u32(c) as f64,
                Self::Float32 => LittleEndian::read_f32(c) as f64,
                Self::Float64 => LittleEndian::read_f64(c),
            })
            .collect();
        Ok(values)
    }
}

/// A named array of tuples.
#[derive(Clone, Debug, PartialEq)]
pub struct DataArray {
    pub name: String,
    pub number_of_components: usize,
    pub data_type: DataType,
    pub values: Vec<f64>,
}

impl DataArray {
    /// Create a single-component array.
    pub fn scalars(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, 1, values)
    }

    pub fn new(name: impl Into<String>, number_of_components: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            number_of_components: number_of_components.max(1),
            data_type: DataType::default(),
            values,
        }
    }

    pub fn tuple_count(&self) -> usize {
        self.values.len() / self.number_of_components
    }

    /// Value range of the array.
    ///
    /// Single-component arrays report their value range, multi-component
    /// arrays the range of tuple magnitudes. Non-finite values are skipped.
    /// Returns `None` when no finite value exists.
    pub fn range(&self) -> Option<[f64; 2]> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut visit = |v: f64| {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        };

        if self.number_of_components == 1 {
            self.values.iter().copied().for_each(&mut visit);
        } else {
            self.values
                .chunks_exact(self.number_of_components)
                .map(|t| t.iter().map(|v| v * v).sum::<f64>().sqrt())
                .for_each(&mut visit);
        }

        (min <= max).then_some([min, max])
    }
}

/// Arrays attached to points, cells or the whole dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataSetAttributes {
    arrays: Vec<DataArray>,
    active_scalars: Option<usize>,
}

impl DataSetAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an array and return its index.
    pub fn add_array(&mut self, array: DataArray) -> usize {
        self.arrays.push(array);
        self.arrays.len() - 1
    }

    pub fn arrays(&self) -> &[DataArray] {
        &self.arrays
    }

    pub fn array(&self, index: usize) -> Option<&DataArray> {
        self.arrays.get(index)
    }

    pub fn array_by_name(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Mark an array as the active scalars. Out-of-range indices clear it.
    pub fn set_active_scalars(&mut self, index: Option<usize>) {
        self.active_scalars = index.filter(|&i| i < self.arrays.len());
    }

    /// The designated active scalar array, if any.
    pub fn scalars(&self) -> Option<&DataArray> {
        self.active_scalars.and_then(|i| self.arrays.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }
}
