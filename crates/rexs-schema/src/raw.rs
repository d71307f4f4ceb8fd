//! Raw schema records as produced by a schema document parser
//!
//! Records mirror the persisted database model one-to-one. Converting a
//! [`RawSchema`] into a [`SchemaModel`] resolves unit and attribute
//! references and enforces the model invariants.

use crate::model::{
    Bound, EnumValue, EnumValueSet, Interval, SchemaAttribute, SchemaComponent, SchemaModel,
    SchemaUnit, Status,
};
use crate::{Error, Result};
use chrono::NaiveDate;
use rexs_ir::{ValueType, Version};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSchema {
    pub version: String,
    pub language: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub units: Vec<RawUnit>,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
    #[serde(default)]
    pub components: Vec<RawComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUnit {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAttribute {
    pub id: String,
    pub name: String,
    pub value_type: ValueType,
    /// Id of a unit declared in the same document
    pub unit: u64,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub interval: Option<RawInterval>,
    #[serde(default)]
    pub enum_values: Vec<RawEnumValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInterval {
    #[serde(default)]
    pub min: Option<RawBound>,
    #[serde(default)]
    pub max: Option<RawBound>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawBound {
    pub value: f64,
    #[serde(default)]
    pub open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnumValue {
    pub value: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComponent {
    pub id: String,
    pub name: String,
    /// Ids of the attributes this component type permits
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl From<RawBound> for Bound {
    fn from(bound: RawBound) -> Self {
        if bound.open {
            Self::Open(bound.value)
        } else {
            Self::Closed(bound.value)
        }
    }
}

impl From<RawInterval> for Interval {
    fn from(raw: RawInterval) -> Self {
        Self::new(
            raw.min.map_or(Bound::Unset, Bound::from),
            raw.max.map_or(Bound::Unset, Bound::from),
        )
    }
}

impl RawAttribute {
    fn into_attribute(self, units: &HashMap<u64, SchemaUnit>) -> Result<SchemaAttribute> {
        let unit = units.get(&self.unit).cloned().ok_or_else(|| {
            Error::InvalidSchema(format!(
                "attribute '{}' references unknown unit {}",
                self.id, self.unit
            ))
        })?;

        let mut attribute = if self.value_type.is_enum() {
            let values = self
                .enum_values
                .into_iter()
                .map(|v| EnumValue::new(v.value, v.name))
                .collect();
            SchemaAttribute::new_enum(
                self.id,
                self.name,
                self.value_type,
                unit,
                EnumValueSet::new(values),
            )?
        } else {
            SchemaAttribute::new(self.id, self.name, self.value_type, unit)?
        };

        if let Some(symbol) = self.symbol {
            attribute = attribute.with_symbol(symbol);
        }
        if let Some(interval) = self.interval {
            attribute = attribute.with_interval(interval.into());
        }
        Ok(attribute)
    }
}

impl TryFrom<RawSchema> for SchemaModel {
    type Error = Error;

    fn try_from(raw: RawSchema) -> Result<Self> {
        let version = Version::parse(&raw.version)?;

        let units: HashMap<u64, SchemaUnit> = raw
            .units
            .iter()
            .map(|u| (u.id, SchemaUnit::new(u.id, u.name.clone())))
            .collect();

        let mut attributes = HashMap::with_capacity(raw.attributes.len());
        for raw_attribute in raw.attributes {
            let attribute = Arc::new(raw_attribute.into_attribute(&units)?);
            if let Some(previous) = attributes.insert(attribute.id.clone(), attribute) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate attribute id '{}'",
                    previous.id
                )));
            }
        }

        let components = raw
            .components
            .into_iter()
            .map(|c| {
                let permitted = c
                    .attributes
                    .iter()
                    .map(|id| {
                        attributes.get(id).cloned().ok_or_else(|| {
                            Error::InvalidSchema(format!(
                                "component '{}' references unknown attribute '{id}'",
                                c.id
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SchemaComponent::new(c.id, c.name, permitted))
            })
            .collect::<Result<Vec<_>>>()?;

        let unit_list = raw
            .units
            .into_iter()
            .map(|u| SchemaUnit::new(u.id, u.name))
            .collect();

        let mut model = SchemaModel::new(
            version,
            raw.language,
            unit_list,
            attributes.into_values().collect(),
            components,
        )?
        .with_status(raw.status);

        if let Some(date) = raw.date {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| Error::InvalidFormat(format!("invalid date '{date}': {e}")))?;
            model = model.with_date(date);
        }

        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_schema() -> RawSchema {
        serde_json::from_str(
            r#"{
                "version": "1.4",
                "language": "en",
                "date": "2022-05-20",
                "status": "RELEASED",
                "units": [{"id": 1, "name": "none"}, {"id": 2, "name": "C"}],
                "attributes": [
                    {
                        "id": "temperature_lubricant",
                        "name": "Lubricant temperature",
                        "value_type": "floating_point",
                        "unit": 2,
                        "symbol": "T",
                        "interval": {
                            "min": {"value": -273.15},
                            "max": {"value": 500.0, "open": true}
                        }
                    },
                    {
                        "id": "lubricant_type",
                        "name": "Lubricant type",
                        "value_type": "enum",
                        "unit": 1,
                        "enum_values": [
                            {"value": "oil", "name": "Oil"},
                            {"value": "grease", "name": "Grease"}
                        ]
                    }
                ],
                "components": [
                    {"id": "gear_casing", "name": "Gear casing",
                     "attributes": ["temperature_lubricant", "lubricant_type"]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_convert_raw_schema() {
        let model = SchemaModel::try_from(raw_schema()).unwrap();
        assert_eq!(model.version, Version::new(1, 4));
        assert_eq!(model.language, "en");
        assert_eq!(model.date, NaiveDate::from_ymd_opt(2022, 5, 20));

        let attribute = model.find_attribute_by_id("temperature_lubricant").unwrap();
        assert_eq!(attribute.unit.name, "C");
        assert_eq!(attribute.symbol.as_deref(), Some("T"));
        let interval = attribute.interval.unwrap();
        assert_eq!(interval.min, Bound::Closed(-273.15));
        assert_eq!(interval.max, Bound::Open(500.0));

        let casing = model.find_component_by_id("gear_casing").unwrap();
        assert!(casing.has_attribute("lubricant_type"));
    }

    #[test]
    fn test_convert_rejects_unknown_unit() {
        let mut raw = raw_schema();
        raw.attributes[0].unit = 99;
        let err = SchemaModel::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("unknown unit 99"));
    }

    #[test]
    fn test_convert_rejects_unknown_component_attribute() {
        let mut raw = raw_schema();
        raw.components[0].attributes.push("bogus".to_string());
        let err = SchemaModel::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_convert_rejects_enum_without_values() {
        let mut raw = raw_schema();
        raw.attributes[1].enum_values.clear();
        assert!(matches!(
            SchemaModel::try_from(raw),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_convert_rejects_bad_version() {
        let mut raw = raw_schema();
        raw.version = "latest".to_string();
        assert!(matches!(SchemaModel::try_from(raw), Err(Error::Value(_))));
    }
}
