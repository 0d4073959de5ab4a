use aam::core::config::{Config, Namespace, Store, StoreKey};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.library_path().is_none());
    assert_eq!(config.settings.minimal_rating, 0);
    assert_eq!(config.settings.log_level, "info");
}

#[test]
fn test_store_roundtrip_through_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");

    let mut config = Config::load_from(&path).unwrap();
    config
        .set(StoreKey::IgnoredSong, Value::from("a,b"))
        .unwrap();
    config
        .set(StoreKey::AssetsPath, Value::from("/games/assets"))
        .unwrap();
    config.save().unwrap();

    let mut reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.get(StoreKey::IgnoredSong), Value::from("a,b"));
    assert_eq!(reloaded.settings.ignored_ids().len(), 2);

    reloaded.reset(Namespace::Assets);
    assert_eq!(reloaded.get(StoreKey::AssetsPath), Value::from(""));
    assert_eq!(reloaded.get(StoreKey::AssetsSongs), Value::Array(vec![]));
}

#[test]
fn test_every_key_has_a_dotted_name() {
    for key in StoreKey::ALL {
        let parsed: StoreKey = key.as_str().parse().unwrap();
        assert_eq!(parsed, key);
        assert!(key.as_str().contains('.'));
    }
}
