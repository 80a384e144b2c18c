//! Tests for the ConfigStore

use std::collections::BTreeMap;
use std::fs;

use indexer_core::{
    CollationOptions, CollectionConfig, ConfigStore, Error, IndexDescriptor, IndexKey,
    SnapshotReader,
};
use indexer_test_utils::MemoryCatalog;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn sample() -> Vec<CollectionConfig> {
    let filter = match json!({ "deleted": { "$exists": false } }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    vec![
        CollectionConfig::new(
            "users",
            vec![
                IndexDescriptor::new("idx_email", vec![IndexKey::new("email", 1)])
                    .with_unique()
                    .with_partial_filter(filter),
                IndexDescriptor::new(
                    "idx_name",
                    vec![IndexKey::new("last", 1), IndexKey::new("first", -1)],
                )
                .with_collation(CollationOptions::new("en", true)),
            ],
        ),
        CollectionConfig::new(
            "posts",
            vec![
                IndexDescriptor::new(
                    "idx_search",
                    vec![IndexKey::new("_fts", "text"), IndexKey::new("_ftsx", 1)],
                )
                .with_weights(BTreeMap::from([("title".to_string(), 10), ("body".to_string(), 1)])),
            ],
        ),
        CollectionConfig::new("empty", vec![]),
    ]
}

#[test]
fn test_load_spec_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("indexes.json");
    fs::write(
        &path,
        r#"[
  {
    "collection": "users",
    "indexes": [
      {
        "name": "idx_email",
        "key": [{ "key": "email", "value": 1 }, { "key": "created", "value": -1 }],
        "collationOptions": { "locale": "en", "numericOrdering": false }
      }
    ]
  }
]"#,
    )
    .unwrap();

    let loaded = ConfigStore::new(&path).load().unwrap();

    assert_eq!(
        loaded,
        vec![CollectionConfig::new(
            "users",
            vec![
                IndexDescriptor::new(
                    "idx_email",
                    vec![IndexKey::new("email", 1), IndexKey::new("created", -1)],
                )
                .with_collation(CollationOptions::new("en", false))
            ],
        )]
    );
}

#[test]
fn test_load_legacy_capitalized_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("indexes.json");
    fs::write(
        &path,
        r#"[{"collection":"users","Indexes":[{"Key":[{"Key":"age","Value":1}],"Name":"idx_age","Unique":false,"Weights":null,"PartialFilterExpression":null,"CollationOptions":{"Locale":"","NumericOrdering":false}}]},{"collection":"logs","Indexes":null}]"#,
    )
    .unwrap();

    let loaded = ConfigStore::new(&path).load().unwrap();

    assert_eq!(
        loaded,
        vec![
            CollectionConfig::new(
                "users",
                vec![IndexDescriptor::new("idx_age", vec![IndexKey::new("age", 1)])],
            ),
            CollectionConfig::new("logs", vec![]),
        ]
    );
}

#[test]
fn test_json_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("indexes.json"));

    store.save(&sample()).unwrap();

    assert_eq!(store.load().unwrap(), sample());
}

#[test]
fn test_yaml_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("indexes.yaml"));

    store.save(&sample()).unwrap();

    assert_eq!(store.load().unwrap(), sample());
}

#[test]
fn test_saved_json_uses_documented_field_names() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("indexes.json"));

    store.save(&sample()).unwrap();

    let content = fs::read_to_string(store.path()).unwrap();
    assert!(content.contains("\"collection\": \"users\""));
    assert!(content.contains("\"collationOptions\""));
    assert!(content.contains("\"numericOrdering\": true"));
    assert!(content.contains("\"partialFilterExpression\""));
    assert!(content.ends_with("]\n"));
}

#[test]
fn test_save_overwrites_existing_content() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("indexes.json"));

    store.save(&sample()).unwrap();
    store
        .save(&[CollectionConfig::new("only", vec![])])
        .unwrap();

    assert_eq!(store.load().unwrap(), vec![CollectionConfig::new("only", vec![])]);
}

#[test]
fn test_snapshot_round_trip_through_config() {
    let catalog = MemoryCatalog::new("app")
        .with_collection("users", sample().remove(0).indexes)
        .with_collection("posts", sample().remove(1).indexes)
        .with_collection("empty", vec![]);
    let snapshot = SnapshotReader::new(&catalog).snapshot().unwrap();

    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("indexes.json"));
    store.save(&snapshot).unwrap();

    assert_eq!(store.load().unwrap(), snapshot);
    assert_eq!(snapshot, sample());
}

#[test]
fn test_missing_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("absent.json"));

    let err = store.load().unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("indexes.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigStore::new(&path).load().unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("invalid JSON"));
}

#[test]
fn test_unsupported_extension_is_config_error() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::new(temp.path().join("indexes.toml"));

    assert!(matches!(store.save(&sample()), Err(Error::Config { .. })));
    assert!(matches!(store.load(), Err(Error::Config { .. })));
}

#[test]
fn test_unwritable_target_is_config_error() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();
    let store = ConfigStore::new(blocker.join("indexes.json"));

    assert!(matches!(store.save(&sample()), Err(Error::Config { .. })));
}

#[test]
fn test_load_legacy_collation_key() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("indexes.yaml");
    fs::write(
        &path,
        r#"- collection: users
  Indexes:
    - Name: idx_name
      Key:
        - Key: name
          Value: 1
      Collation:
        Locale: fr
        NumericOrdering: true
"#,
    )
    .unwrap();

    let loaded = ConfigStore::new(&path).load().unwrap();

    assert_eq!(
        loaded,
        vec![CollectionConfig::new(
            "users",
            vec![
                IndexDescriptor::new("idx_name", vec![IndexKey::new("name", 1)])
                    .with_collation(CollationOptions::new("fr", true))
            ],
        )]
    );
}
