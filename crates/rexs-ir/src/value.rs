//! Typed attribute values
#![allow(clippy::must_use_candidate)] // Accessors are clear at call sites without #[must_use].

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value type tag declared by a schema attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    Integer,
    FloatingPoint,
    String,
    Enum,
    ReferenceComponent,
    FileReference,
    DateTime,
    BooleanArray,
    IntegerArray,
    FloatingPointArray,
    StringArray,
    EnumArray,
    ArrayOfIntegerArrays,
    BooleanMatrix,
    IntegerMatrix,
    FloatingPointMatrix,
    StringMatrix,
}

impl ValueType {
    /// Every value type, in declaration order
    pub const ALL: [ValueType; 18] = [
        Self::Boolean,
        Self::Integer,
        Self::FloatingPoint,
        Self::String,
        Self::Enum,
        Self::ReferenceComponent,
        Self::FileReference,
        Self::DateTime,
        Self::BooleanArray,
        Self::IntegerArray,
        Self::FloatingPointArray,
        Self::StringArray,
        Self::EnumArray,
        Self::ArrayOfIntegerArrays,
        Self::BooleanMatrix,
        Self::IntegerMatrix,
        Self::FloatingPointMatrix,
        Self::StringMatrix,
    ];

    /// Tag as written in schema and model documents
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::FloatingPoint => "floating_point",
            Self::String => "string",
            Self::Enum => "enum",
            Self::ReferenceComponent => "reference_component",
            Self::FileReference => "file_reference",
            Self::DateTime => "date_time",
            Self::BooleanArray => "boolean_array",
            Self::IntegerArray => "integer_array",
            Self::FloatingPointArray => "floating_point_array",
            Self::StringArray => "string_array",
            Self::EnumArray => "enum_array",
            Self::ArrayOfIntegerArrays => "array_of_integer_arrays",
            Self::BooleanMatrix => "boolean_matrix",
            Self::IntegerMatrix => "integer_matrix",
            Self::FloatingPointMatrix => "floating_point_matrix",
            Self::StringMatrix => "string_matrix",
        }
    }

    /// Whether values of this type are range-checked against an interval
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::FloatingPoint
                | Self::IntegerArray
                | Self::FloatingPointArray
                | Self::ArrayOfIntegerArrays
                | Self::IntegerMatrix
                | Self::FloatingPointMatrix
        )
    }

    /// Whether values of this type are checked against an enum value set
    pub const fn is_enum(self) -> bool {
        matches!(self, Self::Enum | Self::EnumArray)
    }

    /// Whether values of this type may be flagged for coded output
    pub const fn is_codable(self) -> bool {
        matches!(
            self,
            Self::IntegerArray
                | Self::FloatingPointArray
                | Self::IntegerMatrix
                | Self::FloatingPointMatrix
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownValueType(s.to_string()))
    }
}

/// Compact element encoding for coded arrays and matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodedType {
    Int32,
    Float32,
    Float64,
}

impl CodedType {
    /// Tag as written in model documents
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Whether this encoding can represent elements of the given value type
    pub const fn supports(self, value_type: ValueType) -> bool {
        match self {
            Self::Int32 => matches!(
                value_type,
                ValueType::IntegerArray | ValueType::IntegerMatrix
            ),
            Self::Float32 | Self::Float64 => matches!(
                value_type,
                ValueType::FloatingPointArray | ValueType::FloatingPointMatrix
            ),
        }
    }
}

impl fmt::Display for CodedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodedType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int32" => Ok(Self::Int32),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            other => Err(Error::UnknownCodedType(other.to_string())),
        }
    }
}

/// Row-major two dimensional value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: Vec<Vec<T>>,
}

impl<T> Matrix<T> {
    /// Create a matrix from its rows
    pub fn new(rows: Vec<Vec<T>>) -> Self {
        Self { rows }
    }

    /// Rows of the matrix
    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns of the first row (zero for an empty matrix)
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// All elements in row-major order
    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().flatten()
    }

    /// Check that every row has the same number of columns
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRectangular`] naming the first offending row.
    pub fn ensure_rectangular(&self) -> Result<()> {
        let expected = self.column_count();
        match self.rows.iter().position(|row| row.len() != expected) {
            Some(row) => Err(Error::NotRectangular {
                row,
                expected,
                found: self.rows[row].len(),
            }),
            None => Ok(()),
        }
    }

    fn map<U>(self, f: impl Fn(T) -> U) -> Matrix<U> {
        Matrix::new(
            self.rows
                .into_iter()
                .map(|row| row.into_iter().map(&f).collect())
                .collect(),
        )
    }
}

/// Payload of an attribute value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueData {
    /// No value supplied yet
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    FloatingPoint(f64),
    String(String),
    Enum(String),
    /// Internal id of a component in the same model
    ReferenceComponent(u64),
    FileReference(String),
    DateTime(DateTime<FixedOffset>),
    BooleanArray(Vec<bool>),
    IntegerArray(Vec<i64>),
    FloatingPointArray(Vec<f64>),
    StringArray(Vec<String>),
    EnumArray(Vec<String>),
    ArrayOfIntegerArrays(Vec<Vec<i64>>),
    BooleanMatrix(Matrix<bool>),
    IntegerMatrix(Matrix<i64>),
    FloatingPointMatrix(Matrix<f64>),
    StringMatrix(Matrix<String>),
}

#[allow(clippy::cast_precision_loss)] // Range checks on integers tolerate f64 rounding.
const fn widen(value: i64) -> f64 {
    value as f64
}

impl ValueData {
    /// Value type of the payload, `None` when empty
    pub const fn value_type(&self) -> Option<ValueType> {
        let value_type = match self {
            Self::Empty => return None,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::FloatingPoint(_) => ValueType::FloatingPoint,
            Self::String(_) => ValueType::String,
            Self::Enum(_) => ValueType::Enum,
            Self::ReferenceComponent(_) => ValueType::ReferenceComponent,
            Self::FileReference(_) => ValueType::FileReference,
            Self::DateTime(_) => ValueType::DateTime,
            Self::BooleanArray(_) => ValueType::BooleanArray,
            Self::IntegerArray(_) => ValueType::IntegerArray,
            Self::FloatingPointArray(_) => ValueType::FloatingPointArray,
            Self::StringArray(_) => ValueType::StringArray,
            Self::EnumArray(_) => ValueType::EnumArray,
            Self::ArrayOfIntegerArrays(_) => ValueType::ArrayOfIntegerArrays,
            Self::BooleanMatrix(_) => ValueType::BooleanMatrix,
            Self::IntegerMatrix(_) => ValueType::IntegerMatrix,
            Self::FloatingPointMatrix(_) => ValueType::FloatingPointMatrix,
            Self::StringMatrix(_) => ValueType::StringMatrix,
        };
        Some(value_type)
    }

    /// Check if no value has been supplied
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Convert the payload to the shape required by `target`
    ///
    /// Integers widen to floating point, strings become enum codes or file
    /// references. An empty payload conforms to every type. Matrices must be
    /// rectangular.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the payload cannot take the target
    /// shape and [`Error::NotRectangular`] for ragged matrices.
    pub fn conform(self, target: ValueType) -> Result<Self> {
        let found = match self.value_type() {
            None => return Ok(self),
            Some(found) if found == target => return self.ensure_shape(),
            Some(found) => found,
        };

        let converted = match (self, target) {
            (Self::Integer(v), ValueType::FloatingPoint) => Self::FloatingPoint(widen(v)),
            (Self::IntegerArray(v), ValueType::FloatingPointArray) => {
                Self::FloatingPointArray(v.into_iter().map(widen).collect())
            }
            (Self::IntegerMatrix(m), ValueType::FloatingPointMatrix) => {
                Self::FloatingPointMatrix(m.map(widen))
            }
            (Self::String(s), ValueType::Enum) => Self::Enum(s),
            (Self::String(s), ValueType::FileReference) => Self::FileReference(s),
            (Self::StringArray(v), ValueType::EnumArray) => Self::EnumArray(v),
            _ => return Err(Error::type_mismatch(target.as_str(), found.as_str())),
        };

        converted.ensure_shape()
    }

    fn ensure_shape(self) -> Result<Self> {
        match &self {
            Self::BooleanMatrix(m) => m.ensure_rectangular()?,
            Self::IntegerMatrix(m) => m.ensure_rectangular()?,
            Self::FloatingPointMatrix(m) => m.ensure_rectangular()?,
            Self::StringMatrix(m) => m.ensure_rectangular()?,
            _ => {}
        }
        Ok(self)
    }

    /// Apply `predicate` to every numeric element, `true` if all pass
    ///
    /// Non-numeric payloads have no numeric elements and always pass.
    pub fn all_numbers(&self, mut predicate: impl FnMut(f64) -> bool) -> bool {
        match self {
            Self::Integer(v) => predicate(widen(*v)),
            Self::FloatingPoint(v) => predicate(*v),
            Self::IntegerArray(v) => v.iter().all(|x| predicate(widen(*x))),
            Self::FloatingPointArray(v) => v.iter().all(|x| predicate(*x)),
            Self::ArrayOfIntegerArrays(v) => v.iter().flatten().all(|x| predicate(widen(*x))),
            Self::IntegerMatrix(m) => m.elements().all(|x| predicate(widen(*x))),
            Self::FloatingPointMatrix(m) => m.elements().all(|x| predicate(*x)),
            _ => true,
        }
    }

    /// Enum codes carried by the payload
    pub fn enum_codes(&self) -> Vec<&str> {
        match self {
            Self::Enum(code) => vec![code.as_str()],
            Self::EnumArray(codes) => codes.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("<empty>"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::FloatingPoint(v) => write!(f, "{v}"),
            Self::String(v) | Self::Enum(v) | Self::FileReference(v) => f.write_str(v),
            Self::ReferenceComponent(v) => write!(f, "#{v}"),
            Self::DateTime(v) => f.write_str(&v.to_rfc3339()),
            Self::BooleanArray(v) => write!(f, "{v:?}"),
            Self::IntegerArray(v) => write!(f, "{v:?}"),
            Self::FloatingPointArray(v) => write!(f, "{v:?}"),
            Self::StringArray(v) | Self::EnumArray(v) => write!(f, "{v:?}"),
            Self::ArrayOfIntegerArrays(v) => write!(f, "{v:?}"),
            Self::BooleanMatrix(m) => write!(f, "{:?}", m.rows()),
            Self::IntegerMatrix(m) => write!(f, "{:?}", m.rows()),
            Self::FloatingPointMatrix(m) => write!(f, "{:?}", m.rows()),
            Self::StringMatrix(m) => write!(f, "{:?}", m.rows()),
        }
    }
}

macro_rules! impl_from_for_value_data {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ValueData {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value_data! {
    bool => Boolean,
    i64 => Integer,
    f64 => FloatingPoint,
    String => String,
    DateTime<FixedOffset> => DateTime,
    Vec<bool> => BooleanArray,
    Vec<i64> => IntegerArray,
    Vec<f64> => FloatingPointArray,
    Vec<String> => StringArray,
    Vec<Vec<i64>> => ArrayOfIntegerArrays,
    Matrix<bool> => BooleanMatrix,
    Matrix<i64> => IntegerMatrix,
    Matrix<f64> => FloatingPointMatrix,
    Matrix<String> => StringMatrix,
}

impl From<i32> for ValueData {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for ValueData {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<&str>> for ValueData {
    fn from(value: Vec<&str>) -> Self {
        Self::StringArray(value.into_iter().map(str::to_string).collect())
    }
}

/// An attribute value with its optional output encoding
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Value {
    data: ValueData,
    coded: Option<CodedType>,
}

impl Value {
    /// Create an uncoded value
    pub fn new(data: impl Into<ValueData>) -> Self {
        Self {
            data: data.into(),
            coded: None,
        }
    }

    /// Create an empty value
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flag the value for coded output
    #[must_use]
    pub fn with_coded(mut self, coded: CodedType) -> Self {
        self.coded = Some(coded);
        self
    }

    /// Payload of the value
    pub fn data(&self) -> &ValueData {
        &self.data
    }

    /// Consume the value, returning its payload
    pub fn into_data(self) -> ValueData {
        self.data
    }

    /// Coded output encoding, if flagged
    pub fn coded(&self) -> Option<CodedType> {
        self.coded
    }

    /// Check if no payload has been supplied
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value type of the payload, `None` when empty
    pub fn value_type(&self) -> Option<ValueType> {
        self.data.value_type()
    }
}

impl From<ValueData> for Value {
    fn from(data: ValueData) -> Self {
        Self { data, coded: None }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.data, f)
    }
}
