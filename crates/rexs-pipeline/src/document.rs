//! Serialized form of REXS model documents
//!
//! ```json
//! {"model": {
//!     "application_id": "gearbox-designer", "application_version": "3.1",
//!     "date": "2024-01-15T10:00:00+01:00", "version": "1.4", "language": "en",
//!     "components": [{"id": 1, "type": "gear_casing", "name": "Casing",
//!         "attributes": [{"id": "temperature_lubricant", "unit": "C", "floating_point": 73.2}]}],
//!     "relations": [{"id": 1, "type": "assembly", "refs": [{"id": 1, "role": "assembly"}]}],
//!     "load_spectrum": {"id": 1, "load_cases": [], "accumulation": null}
//! }}
//! ```
//!
//! An attribute carries its value under a key naming the value type.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use rexs_ir::{CodedType, Matrix, ValueData, ValueType, byte_offset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Top-level document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub model: RawModel,
}

impl ModelDocument {
    /// Parse a document from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] with the byte offset of the syntax error.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Parse {
            message: format!("JSON parse error: {e}"),
            offset: byte_offset(json, e.line(), e.column()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawModel {
    pub application_id: String,
    pub application_version: String,
    #[serde(default)]
    pub date: Option<String>,
    pub version: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub components: Vec<RawComponent>,
    #[serde(default)]
    pub relations: Vec<RawRelation>,
    #[serde(default)]
    pub load_spectrum: Option<RawLoadSpectrum>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComponent {
    pub id: u64,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAttribute {
    pub id: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub coded: Option<CodedType>,
    /// Value keyed by its value type tag
    #[serde(flatten)]
    pub value: Map<String, Json>,
}

/// Attribute value read from a document
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Data(ValueData),
    /// Document id of the referenced component
    Reference(u64),
}

impl RawAttribute {
    /// Value type tag and the converted value
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`] unless exactly one value type key is
    /// present, and an error if the value does not fit its tag.
    pub fn typed_value(&self) -> Result<(ValueType, TypedValue)> {
        let mut tagged = self
            .value
            .iter()
            .filter_map(|(key, json)| key.parse::<ValueType>().ok().map(|t| (t, json)));

        let Some((value_type, json)) = tagged.next() else {
            return Err(Error::Document(format!("attribute '{}' has no value", self.id)));
        };
        if tagged.next().is_some() {
            return Err(Error::Document(format!(
                "attribute '{}' has more than one value",
                self.id
            )));
        }

        let value = convert(value_type, json).map_err(|e| {
            Error::Document(format!(
                "attribute '{}' has an invalid {value_type} value: {e}",
                self.id
            ))
        })?;
        Ok((value_type, value))
    }
}

fn parse<T: DeserializeOwned>(json: &Json) -> Result<T> {
    Ok(T::deserialize(json)?)
}

fn matrix<T: DeserializeOwned>(json: &Json) -> Result<Matrix<T>> {
    Ok(Matrix::new(parse::<Vec<Vec<T>>>(json)?))
}

fn convert(value_type: ValueType, json: &Json) -> Result<TypedValue> {
    let data = match value_type {
        ValueType::ReferenceComponent => return Ok(TypedValue::Reference(parse(json)?)),
        ValueType::Boolean => ValueData::Boolean(parse(json)?),
        ValueType::Integer => ValueData::Integer(parse(json)?),
        ValueType::FloatingPoint => ValueData::FloatingPoint(parse(json)?),
        ValueType::String => ValueData::String(parse(json)?),
        ValueType::Enum => ValueData::Enum(parse(json)?),
        ValueType::FileReference => ValueData::FileReference(parse(json)?),
        ValueType::DateTime => ValueData::DateTime(parse::<DateTime<FixedOffset>>(json)?),
        ValueType::BooleanArray => ValueData::BooleanArray(parse(json)?),
        ValueType::IntegerArray => ValueData::IntegerArray(parse(json)?),
        ValueType::FloatingPointArray => ValueData::FloatingPointArray(parse(json)?),
        ValueType::StringArray => ValueData::StringArray(parse(json)?),
        ValueType::EnumArray => ValueData::EnumArray(parse(json)?),
        ValueType::ArrayOfIntegerArrays => ValueData::ArrayOfIntegerArrays(parse(json)?),
        ValueType::BooleanMatrix => ValueData::BooleanMatrix(matrix(json)?),
        ValueType::IntegerMatrix => ValueData::IntegerMatrix(matrix(json)?),
        ValueType::FloatingPointMatrix => ValueData::FloatingPointMatrix(matrix(json)?),
        ValueType::StringMatrix => ValueData::StringMatrix(matrix(json)?),
    };
    Ok(TypedValue::Data(data))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRelation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub relation_type: String,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub refs: Vec<RawReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReference {
    /// Document id of the referenced component
    pub id: u64,
    pub role: String,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLoadSpectrum {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub load_cases: Vec<RawLoadCase>,
    #[serde(default)]
    pub accumulation: Option<RawLoadCase>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLoadCase {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub components: Vec<RawLoadComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLoadComponent {
    /// Document id of the component the attributes apply to
    pub id: u64,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}
