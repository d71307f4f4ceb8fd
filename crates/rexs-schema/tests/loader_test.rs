//! Integration tests for loading schema directories

use rexs_ir::{Severity, Version};
use rexs_schema::{Error, SchemaLoader};
use std::fs;

const SCHEMA_1_4: &str = r#"{
    "version": "1.4",
    "language": "en",
    "date": "2022-05-20",
    "units": [{"id": 1, "name": "none"}, {"id": 2, "name": "C"}],
    "attributes": [
        {"id": "temperature_lubricant", "name": "Lubricant temperature",
         "value_type": "floating_point", "unit": 2}
    ],
    "components": [
        {"id": "gear_casing", "name": "Gear casing", "attributes": ["temperature_lubricant"]}
    ]
}"#;

const SCHEMA_1_4_DE: &str = r"
version: '1.4'
language: de
units:
  - id: 2
    name: C
attributes:
  - id: temperature_lubricant
    name: Schmierstofftemperatur
    value_type: floating_point
    unit: 2
components:
  - id: gear_casing
    name: Getriebegehäuse
    attributes: [temperature_lubricant]
";

const BROKEN_SYNTAX: &str = "{\n  \"version\": \"1.5\",\n  \"language\": \"en\",\n  \"units\": [\n}";

const BROKEN_ENUM: &str = r#"{
    "version": "1.6",
    "language": "en",
    "units": [{"id": 1, "name": "none"}],
    "attributes": [
        {"id": "lubricant_type", "name": "Lubricant type", "value_type": "enum", "unit": 1}
    ]
}"#;

#[test]
fn test_load_directory_with_partial_success() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("rexs_1.4_en.json"), SCHEMA_1_4)?;
    fs::write(dir.path().join("rexs_1.4_de.yaml"), SCHEMA_1_4_DE)?;
    fs::write(dir.path().join("rexs_1.5_en.json"), BROKEN_SYNTAX)?;
    fs::write(dir.path().join("rexs_1.6_en.json"), BROKEN_ENUM)?;
    fs::write(dir.path().join("README.txt"), "not a schema")?;

    let loader = SchemaLoader::new(vec![dir.path().to_path_buf()]);
    let (registry, result) = loader.load();

    assert_eq!(registry.len(), 2);
    let en = registry.get_model(Version::new(1, 4), "en")?;
    let de = registry.get_model(Version::new(1, 4), "de")?;
    assert_eq!(en.find_component_by_id("gear_casing")?.name, "Gear casing");
    assert_eq!(de.find_component_by_id("gear_casing")?.name, "Getriebegehäuse");

    assert_eq!(result.criticals().count(), 2);
    let syntax = result
        .issues()
        .iter()
        .find(|i| i.message.contains("rexs_1.5_en.json"))
        .expect("syntax error reported");
    assert_eq!(syntax.severity, Severity::Critical);
    assert!(syntax.offset.is_some());

    let invariant = result
        .issues()
        .iter()
        .find(|i| i.message.contains("1.6/en"))
        .expect("enum invariant reported");
    assert!(invariant.message.contains("lubricant_type"));

    assert!(matches!(
        registry.get_model(Version::new(1, 5), "en"),
        Err(Error::NotFound(_))
    ));
    Ok(())
}

#[test]
fn test_load_multiple_search_paths() -> anyhow::Result<()> {
    let first = tempfile::tempdir()?;
    let second = tempfile::tempdir()?;
    fs::write(first.path().join("en.json"), SCHEMA_1_4)?;
    fs::write(second.path().join("de.yml"), SCHEMA_1_4_DE)?;

    let mut loader = SchemaLoader::new(vec![first.path().to_path_buf()]);
    loader.add_path(second.path().to_path_buf());
    let (registry, result) = loader.load();

    assert!(result.is_empty());
    assert_eq!(
        registry.keys(),
        vec![
            (Version::new(1, 4), "de".to_string()),
            (Version::new(1, 4), "en".to_string())
        ]
    );
    Ok(())
}
