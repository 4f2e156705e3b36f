use folio_core::{EditorConfig, Rgb, StyleRecord, ValidationError};
use folio_core_styles::{StoreError, StyleStore};
use pretty_assertions::assert_eq;

fn sample(name: &str) -> StyleRecord {
    StyleRecord {
        name: name.to_string(),
        font_family: "Georgia".to_string(),
        point_size: 16,
        bold: true,
        italic: false,
        underline: true,
        line_spacing: 1.5,
        color: Rgb::new(0x12, 0x34, 0x56),
    }
}

fn temp_store() -> (tempfile::TempDir, StyleStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = StyleStore::open(dir.path().join("styles.json"));
    (dir, store)
}

#[test]
fn test_save_then_fetch_round_trips_every_field() {
    let (_dir, store) = temp_store();
    store.create().unwrap();

    for record in [sample("Body"), StyleRecord::new("Plain")] {
        store.save(&record).unwrap();
        assert_eq!(store.fetch(&record.name).unwrap(), Some(record));
    }
}

#[test]
fn test_empty_name_is_rejected_without_writing() {
    let (_dir, store) = temp_store();
    let err = store.save(&sample("   ")).unwrap_err();

    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptyStyleName)
    ));
    assert!(!store.path().exists());
}

#[test]
fn test_unusable_metrics_are_rejected_without_writing() {
    let (_dir, store) = temp_store();
    let mut style = sample("Flat");
    style.point_size = 0;
    assert!(matches!(
        store.save(&style).unwrap_err(),
        StoreError::Validation(ValidationError::ZeroPointSize)
    ));

    style.point_size = 12;
    style.line_spacing = -1.0;
    assert!(matches!(
        store.save(&style).unwrap_err(),
        StoreError::Validation(ValidationError::InvalidLineSpacing(_))
    ));
    assert!(!store.path().exists());
}

#[test]
fn test_duplicate_names_are_kept_and_first_wins() {
    let (_dir, store) = temp_store();
    let first = sample("Title");
    let mut second = sample("Title");
    second.point_size = 40;

    store.save(&first).unwrap();
    store.save(&second).unwrap();

    assert_eq!(
        store.list_names().unwrap(),
        vec!["Title".to_string(), "Title".to_string()]
    );
    assert_eq!(store.fetch("Title").unwrap(), Some(first));
}

#[test]
fn test_list_names_in_insertion_order() {
    let (_dir, store) = temp_store();
    for name in ["Zeta", "Alpha", "Mid"] {
        store.save(&sample(name)).unwrap();
    }
    assert_eq!(store.list_names().unwrap(), vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_missing_table_reads_empty() {
    let (_dir, store) = temp_store();
    assert!(store.list_names().unwrap().is_empty());
    assert_eq!(store.fetch("anything").unwrap(), None);
}

#[test]
fn test_create_keeps_existing_rows() {
    let (_dir, store) = temp_store();
    store.save(&sample("Keep")).unwrap();
    store.create().unwrap();
    assert_eq!(store.list_names().unwrap(), vec!["Keep"]);
}

#[test]
fn test_cells_are_stored_as_text() {
    let (_dir, store) = temp_store();
    store.save(&sample("Body")).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    let row = &json["rows"][0];
    assert_eq!(row["shrift"], "Georgia");
    assert_eq!(row["pt"], "16");
    assert_eq!(row["bold"], "True");
    assert_eq!(row["italic"], "False");
    assert_eq!(row["underlined"], "True");
    assert_eq!(row["interval"], "1.5");
    assert_eq!(row["color"], "#123456");
    assert_eq!(
        json["columns"],
        serde_json::json!(["name", "shrift", "pt", "bold", "italic", "underlined", "interval", "color"])
    );
}

#[test]
fn test_corrupt_cell_is_reported() {
    let (_dir, store) = temp_store();
    std::fs::write(
        store.path(),
        r##"{
  "columns": ["name", "shrift", "pt", "bold", "italic", "underlined", "interval", "color"],
  "rows": [
    {"name": "Bad", "shrift": "Arial", "pt": "twelve", "bold": "True", "italic": "False",
     "underlined": "False", "interval": "1.0", "color": "#000000"}
  ]
}"##,
    )
    .unwrap();

    assert_eq!(store.list_names().unwrap(), vec!["Bad"]);
    assert!(matches!(
        store.fetch("Bad"),
        Err(StoreError::Corrupt { column: "pt", .. })
    ));
}

#[test]
fn test_foreign_table_is_a_schema_error() {
    let (_dir, store) = temp_store();
    std::fs::write(store.path(), r#"{"columns": ["id"], "rows": []}"#).unwrap();
    assert!(matches!(store.list_names(), Err(StoreError::Schema(_))));
}

#[test]
fn test_store_from_config() {
    let mut config = EditorConfig::default();
    config.style_store_path = "custom/styles.json".into();
    let store = StyleStore::from_config(&config);
    assert_eq!(store.path(), std::path::Path::new("custom/styles.json"));
}
