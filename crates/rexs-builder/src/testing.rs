//! Schema fixture shared by the unit tests

use rexs_ir::{ValueType, Version};
use rexs_schema::{
    Bound, EnumValue, EnumValueSet, Interval, SchemaAttribute, SchemaComponent, SchemaModel,
    SchemaUnit,
};
use std::sync::Arc;

pub(crate) fn schema(version: Version) -> Arc<SchemaModel> {
    let none = SchemaUnit::new(1, "none");
    let celsius = SchemaUnit::new(2, "C");
    let mm = SchemaUnit::new(3, "mm");
    let newton = SchemaUnit::new(4, "N");

    let attribute = |id: &str, value_type, unit: &SchemaUnit| {
        SchemaAttribute::new(id, id.replace('_', " "), value_type, unit.clone()).unwrap()
    };
    let temperature = Arc::new(
        attribute("temperature_lubricant", ValueType::FloatingPoint, &celsius)
            .with_interval(Interval::new(Bound::Closed(-273.15), Bound::Unset)),
    );
    let width = Arc::new(
        attribute("width", ValueType::FloatingPoint, &mm)
            .with_interval(Interval::new(Bound::Open(0.0), Bound::Unset)),
    );
    let teeth = Arc::new(
        attribute("number_of_teeth", ValueType::Integer, &none)
            .with_interval(Interval::new(Bound::Closed(1.0), Bound::Unset)),
    );
    let flank = Arc::new(attribute("flank_modification", ValueType::FloatingPointArray, &mm));
    let reference = Arc::new(attribute(
        "reference_component_for_position",
        ValueType::ReferenceComponent,
        &none,
    ));
    let force = Arc::new(attribute("axial_force", ValueType::FloatingPoint, &newton));
    let lubricant = Arc::new(
        SchemaAttribute::new_enum(
            "lubricant_type",
            "lubricant type",
            ValueType::Enum,
            none.clone(),
            EnumValueSet::new(vec![
                EnumValue::new("mineral_oil", "Mineral oil"),
                EnumValue::new("synthetic_oil", "Synthetic oil"),
            ]),
        )
        .unwrap(),
    );

    let components = vec![
        SchemaComponent::new(
            "gear_casing",
            "Gear casing",
            vec![temperature.clone(), lubricant.clone()],
        ),
        SchemaComponent::new("gear_unit", "Gear unit", vec![]),
        SchemaComponent::new("planetary_stage", "Planetary stage", vec![]),
        SchemaComponent::new("shaft", "Shaft", vec![width.clone(), force.clone()]),
        SchemaComponent::new(
            "cylindrical_gear",
            "Cylindrical gear",
            vec![width.clone(), teeth.clone(), flank.clone(), reference.clone()],
        ),
        SchemaComponent::new(
            "rolling_bearing_with_detailed_geometry",
            "Rolling bearing",
            vec![width.clone(), reference.clone()],
        ),
        SchemaComponent::new("rolling_element", "Rolling element", vec![width.clone()]),
    ];

    Arc::new(
        SchemaModel::new(
            version,
            "en",
            vec![none, celsius, mm, newton],
            vec![temperature, width, teeth, flank, reference, force, lubricant],
            components,
        )
        .unwrap(),
    )
}

pub(crate) fn schema_1_4() -> Arc<SchemaModel> {
    schema(Version::new(1, 4))
}
