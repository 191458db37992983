use pretty_assertions::assert_eq;
use prodstruct_cli::{commands, Catalog, CliConfig};
use prodstruct_model::ProductId;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

const CATALOG: &str = r#"{
    "types": [
        { "tag": "ComponentType" },
        {
            "tag": "AssemblyType",
            "partLinks": [{
                "name": "Components",
                "target": "ComponentType",
                "cardinality": "Collection",
                "linkType": {
                    "tag": "ComponentPart",
                    "properties": [{ "name": "Position", "kind": "Int32" }]
                }
            }]
        }
    ],
    "products": [
        { "Id": 10, "Type": "ComponentType", "Name": "Component 10" },
        { "Id": 11, "Type": "ComponentType", "Name": "Component 11" },
        { "Id": 12, "Type": "ComponentType", "Name": "Component 12" },
        {
            "Id": 7, "Type": "AssemblyType", "Name": "Assembly",
            "Identifier": "ABC", "Revision": 1, "Properties": [],
            "Parts": [{
                "Name": "Components", "Type": "ComponentType", "IsCollection": true,
                "Parts": [
                    { "Id": 0, "Product": { "Id": 10, "Type": "ComponentType", "Name": "" } },
                    { "Id": 0, "Product": { "Id": 11, "Type": "ComponentType", "Name": "" } }
                ]
            }]
        }
    ]
}"#;

const CONFIG: &str = r#"
[converter]
persist_recipes = false

[log]
filter = "warn"
"#;

fn write_temp(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn component_links(model: &Value) -> Vec<(i64, i64)> {
    model["Parts"][0]["Parts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["Id"].as_i64().unwrap(), p["Product"]["Id"].as_i64().unwrap()))
        .collect()
}

#[test]
fn files_drive_a_full_session() {
    let catalog_file = write_temp(CATALOG);
    let config_file = write_temp(CONFIG);

    let config = CliConfig::from_path(config_file.path()).unwrap();
    assert!(!config.converter.persist_recipes);
    let session = Catalog::from_path(catalog_file.path())
        .unwrap()
        .load(config.converter)
        .unwrap();

    let encoded: Value =
        serde_json::from_str(&commands::encode(&session, ProductId::new(7), false).unwrap()).unwrap();
    assert_eq!(encoded["Identifier"], "ABC");
    let links = component_links(&encoded);
    assert_eq!(links.iter().map(|l| l.1).collect::<Vec<_>>(), [10, 11]);
    let (first_link, _) = links[0];

    let mut edited = encoded.clone();
    edited["Parts"][0]["Parts"] = json!([
        { "Id": first_link, "Product": { "Id": 10, "Type": "ComponentType", "Name": "" } },
        { "Id": 0, "Product": { "Id": 12, "Type": "ComponentType", "Name": "" } }
    ]);
    let applied: Value =
        serde_json::from_str(&commands::apply(&session, &edited.to_string()).unwrap()).unwrap();
    let after = component_links(&applied);

    assert_eq!(after[0], (first_link, 10));
    assert_eq!(after[1].1, 12);
    assert_ne!(after[1].0, 0);
    assert!(!after.iter().any(|&(id, _)| id == links[1].0));
}

#[test]
fn missing_catalog_file_is_reported() {
    let err = Catalog::from_path("/nonexistent/catalog.json").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/catalog.json"));
}
