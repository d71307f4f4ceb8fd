//! Value validity against schema constraints

use rexs_ir::{Value, ValueData};
use rexs_schema::SchemaAttribute;

/// Check a value against the constraints of its schema attribute
///
/// Numeric types are checked element-wise against the attribute's interval,
/// enum types code-wise against its enum value set. Every other type is
/// unconstrained. An attribute without an interval accepts every number.
pub fn check(attribute: &SchemaAttribute, value: &Value) -> bool {
    let value_type = attribute.value_type;

    if value_type.is_numeric() {
        return attribute
            .interval
            .is_none_or(|interval| value.data().all_numbers(|x| interval.contains(x)));
    }

    if value_type.is_enum() {
        let Some(values) = attribute.enum_values() else {
            return false;
        };
        return codes(value.data()).into_iter().all(|code| values.contains(code));
    }

    true
}

/// Codes of an enum payload, accepting strings that were not yet conformed
fn codes(data: &ValueData) -> Vec<&str> {
    match data {
        ValueData::String(code) => vec![code.as_str()],
        ValueData::StringArray(codes) => codes.iter().map(String::as_str).collect(),
        other => other.enum_codes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexs_ir::{Matrix, ValueType};
    use rexs_schema::{Bound, EnumValue, EnumValueSet, Interval, SchemaUnit};

    fn numeric(value_type: ValueType, interval: Option<Interval>) -> SchemaAttribute {
        let attribute =
            SchemaAttribute::new("width", "Width", value_type, SchemaUnit::new(2, "mm")).unwrap();
        match interval {
            Some(interval) => attribute.with_interval(interval),
            None => attribute,
        }
    }

    fn lubricant(value_type: ValueType) -> SchemaAttribute {
        SchemaAttribute::new_enum(
            "lubricant_type",
            "Lubricant type",
            value_type,
            SchemaUnit::new(1, "none"),
            EnumValueSet::new(vec![
                EnumValue::new("mineral_oil", "Mineral oil"),
                EnumValue::new("synthetic_oil", "Synthetic oil"),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_numeric_without_interval_accepts_everything() {
        let attribute = numeric(ValueType::FloatingPoint, None);
        assert!(check(&attribute, &Value::new(f64::MAX)));
        assert!(check(&attribute, &Value::new(-1.0e12)));

        let default = numeric(ValueType::FloatingPoint, Some(Interval::default()));
        assert!(check(&default, &Value::new(f64::MIN)));
    }

    #[test]
    fn test_scalar_against_closed_interval() {
        let attribute = numeric(
            ValueType::FloatingPoint,
            Some(Interval::new(Bound::Closed(0.0), Bound::Closed(100.0))),
        );
        assert!(check(&attribute, &Value::new(0.0)));
        assert!(check(&attribute, &Value::new(100.0)));
        assert!(!check(&attribute, &Value::new(100.5)));
        assert!(!check(&attribute, &Value::new(-0.1)));
    }

    #[test]
    fn test_left_open_right_closed() {
        let attribute = numeric(
            ValueType::Integer,
            Some(Interval::new(Bound::Open(0.0), Bound::Closed(10.0))),
        );
        assert!(!check(&attribute, &Value::new(0_i64)));
        assert!(check(&attribute, &Value::new(1_i64)));
        assert!(check(&attribute, &Value::new(10_i64)));
        assert!(!check(&attribute, &Value::new(11_i64)));
    }

    #[test]
    fn test_every_array_and_matrix_element_is_checked() {
        let attribute = numeric(
            ValueType::FloatingPointArray,
            Some(Interval::new(Bound::Closed(0.0), Bound::Unset)),
        );
        assert!(check(&attribute, &Value::new(vec![0.0, 1.5, 1.0e9])));
        assert!(!check(&attribute, &Value::new(vec![0.0, -1.5, 2.0])));

        let matrix = numeric(
            ValueType::IntegerMatrix,
            Some(Interval::new(Bound::Unset, Bound::Open(5.0))),
        );
        assert!(check(&matrix, &Value::new(Matrix::new(vec![vec![1_i64, 2], vec![3, 4]]))));
        assert!(!check(&matrix, &Value::new(Matrix::new(vec![vec![1_i64, 2], vec![3, 5]]))));

        let nested = numeric(
            ValueType::ArrayOfIntegerArrays,
            Some(Interval::new(Bound::Closed(1.0), Bound::Closed(3.0))),
        );
        assert!(check(&nested, &Value::new(vec![vec![1_i64], vec![2, 3]])));
        assert!(!check(&nested, &Value::new(vec![vec![1_i64], vec![0]])));
    }

    #[test]
    fn test_enum_codes_must_be_members() {
        let attribute = lubricant(ValueType::Enum);
        assert!(check(&attribute, &Value::new(ValueData::Enum("mineral_oil".to_string()))));
        assert!(check(&attribute, &Value::new("synthetic_oil")));
        assert!(!check(&attribute, &Value::new("water")));
        assert!(!check(&attribute, &Value::new("Mineral oil")));
    }

    #[test]
    fn test_enum_array_codes_must_all_be_members() {
        let attribute = lubricant(ValueType::EnumArray);
        assert!(check(&attribute, &Value::new(vec!["mineral_oil", "synthetic_oil"])));
        assert!(!check(&attribute, &Value::new(vec!["mineral_oil", "grease"])));
    }

    #[test]
    fn test_unconstrained_types_are_always_valid() {
        let attribute = SchemaAttribute::new(
            "name",
            "Name",
            ValueType::String,
            SchemaUnit::new(1, "none"),
        )
        .unwrap()
        .with_interval(Interval::new(Bound::Closed(0.0), Bound::Closed(0.0)));
        assert!(check(&attribute, &Value::new("anything")));

        let none = SchemaUnit::new(1, "none");
        let flag = SchemaAttribute::new("flag", "Flag", ValueType::Boolean, none).unwrap();
        assert!(check(&flag, &Value::new(true)));
    }
}
