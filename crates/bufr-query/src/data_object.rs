use core::fmt;
use core::str::FromStr;

use bufr_model::TypeInfo;

/// Caller-requested element type for [`crate::ResultSet::get`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverrideType {
    Int,
    Int32,
    Int64,
    Float,
    Double,
    String,
}

impl OverrideType {
    pub const fn as_str(self) -> &'static str {
        match self {
            OverrideType::Int => "int",
            OverrideType::Int32 => "int32",
            OverrideType::Int64 => "int64",
            OverrideType::Float => "float",
            OverrideType::Double => "double",
            OverrideType::String => "string",
        }
    }

    pub const fn is_string(self) -> bool {
        matches!(self, OverrideType::String)
    }
}

impl fmt::Display for OverrideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrideType {
    type Err = ParseOverrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(OverrideType::Int),
            "int32" => Ok(OverrideType::Int32),
            "int64" => Ok(OverrideType::Int64),
            "float" => Ok(OverrideType::Float),
            "double" => Ok(OverrideType::Double),
            "string" => Ok(OverrideType::String),
            _ => Err(ParseOverrideError),
        }
    }
}

/// Failed to parse an [`OverrideType`] from its config spelling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseOverrideError;

impl fmt::Display for ParseOverrideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown or unsupported override type")
    }
}

impl std::error::Error for ParseOverrideError {}

/// Typed element storage of an assembled result array.
///
/// A tagged sum instead of a polymorphic base class: the variant is picked
/// once at construction, from the merged type info or a caller override.
/// Integer variants map missing inputs to the type's MAX; float variants
/// pass the missing sentinel through; string variants decode to `""`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValues {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Str(Vec<String>),
}

impl DataValues {
    pub(crate) fn from_type_info(info: &TypeInfo, data: &[f64], threshold: f64) -> DataValues {
        if info.is_string() {
            Self::strings(data, threshold)
        } else if info.is_integer() {
            match (info.is_signed(), info.is_64bit()) {
                (true, true) => DataValues::Int64(Self::ints(data, threshold, i64::MAX)),
                (true, false) => {
                    DataValues::Int32(Self::ints(data, threshold, i64::from(i32::MAX))
                        .into_iter()
                        .map(|v| v as i32)
                        .collect())
                }
                (false, true) => DataValues::UInt64(
                    Self::ints(data, threshold, i64::MAX)
                        .into_iter()
                        .map(|v| v.max(0) as u64)
                        .collect(),
                ),
                (false, false) => DataValues::UInt32(
                    Self::ints(data, threshold, i64::from(u32::MAX))
                        .into_iter()
                        .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
                        .collect(),
                ),
            }
        } else if info.is_64bit() {
            DataValues::Float64(data.to_vec())
        } else {
            DataValues::Float32(data.iter().map(|&v| v as f32).collect())
        }
    }

    pub(crate) fn from_override(
        override_type: OverrideType,
        data: &[f64],
        threshold: f64,
    ) -> DataValues {
        match override_type {
            OverrideType::Int | OverrideType::Int32 => DataValues::Int32(
                Self::ints(data, threshold, i64::from(i32::MAX))
                    .into_iter()
                    .map(|v| v as i32)
                    .collect(),
            ),
            OverrideType::Int64 => DataValues::Int64(Self::ints(data, threshold, i64::MAX)),
            OverrideType::Float => {
                DataValues::Float32(data.iter().map(|&v| v as f32).collect())
            }
            OverrideType::Double => DataValues::Float64(data.to_vec()),
            OverrideType::String => Self::strings(data, threshold),
        }
    }

    fn ints(data: &[f64], threshold: f64, missing: i64) -> Vec<i64> {
        data.iter()
            .map(|&v| {
                if v.abs() >= threshold {
                    missing
                } else {
                    v.round() as i64
                }
            })
            .collect()
    }

    fn strings(data: &[f64], threshold: f64) -> DataValues {
        DataValues::Str(
            data.iter()
                .map(|&v| {
                    if v.abs() >= threshold {
                        String::new()
                    } else {
                        unpack_chars(v)
                    }
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            DataValues::Int32(v) => v.len(),
            DataValues::Int64(v) => v.len(),
            DataValues::UInt32(v) => v.len(),
            DataValues::UInt64(v) => v.len(),
            DataValues::Float32(v) => v.len(),
            DataValues::Float64(v) => v.len(),
            DataValues::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A typed N-dimensional result array for one queried field.
#[derive(Debug, Clone, PartialEq)]
pub struct DataObject {
    pub field_name: String,
    pub group_by_field_name: String,
    pub dims: Vec<usize>,
    pub dim_paths: Vec<String>,
    pub data: DataValues,
}

/// Decode a character value: BUFR packs left-justified ASCII into the eight
/// bytes of the word, NUL or space padded.
pub fn unpack_chars(value: f64) -> String {
    let bytes = value.to_le_bytes();
    let text: String = bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    text.trim_end().to_string()
}

/// Pack up to eight ASCII characters into a value word; the inverse of
/// [`unpack_chars`].
pub fn pack_chars(text: &str) -> f64 {
    let mut bytes = [0u8; 8];
    for (slot, byte) in bytes.iter_mut().zip(text.bytes()) {
        *slot = byte;
    }
    f64::from_le_bytes(bytes)
}
