use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use paramify::{ParamValue, ParameterStore, Schema, SchemaFormat, SetError};

const SCHEMA: &str = r#"
parameters:
  - name: enabled
    type: bool
    default: true
  - name: volume
    type: int
    default: 5
    min: 0
    max: 10
  - name: gain
    type: float
    default: 0.5
    min: 0.0
    max: 2.0
  - name: mode
    type: select
    default: auto
    choices: [auto, manual]
  - name: tags
    type: list
    default: [alpha, beta]
  - name: label
    type: str
    default: untitled
  - name: notes
    type: text
    default: ""
"#;

fn build_store() -> ParameterStore {
    let schema = Schema::from_document(SCHEMA, SchemaFormat::Yaml).unwrap();
    ParameterStore::new(schema).unwrap()
}

#[test]
fn test_construction_yields_exact_defaults() {
    let store = build_store();
    let params = store.get_parameters();
    assert_eq!(params.len(), 7);
    assert_eq!(params["enabled"], ParamValue::Bool(true));
    assert_eq!(params["volume"], ParamValue::Int(5));
    assert_eq!(params["gain"], ParamValue::Float(0.5));
    assert_eq!(params["mode"], ParamValue::Str("auto".into()));
    assert_eq!(
        params["tags"],
        ParamValue::List(vec![
            ParamValue::Str("alpha".into()),
            ParamValue::Str("beta".into())
        ])
    );
    assert_eq!(params["label"], ParamValue::Str("untitled".into()));
    assert_eq!(params["notes"], ParamValue::Str(String::new()));
}

#[test]
fn test_invalid_default_prevents_construction() {
    let schema = Schema::from_document(
        r#"
parameters:
  - name: volume
    type: int
    default: 42
    max: 10
"#,
        SchemaFormat::Yaml,
    )
    .unwrap();
    let err = ParameterStore::new(schema).unwrap_err();
    assert_eq!(err.violations[0].name, "volume");
}

#[test]
fn test_volume_scenario() {
    let mut store = build_store();

    let err = store.set("volume", 11).unwrap_err();
    assert!(matches!(err, SetError::Validation(_)));
    assert_eq!(store.get("volume"), Some(&ParamValue::Int(5)));

    store.set("volume", 7).unwrap();
    assert_eq!(store.get_parameters()["volume"], ParamValue::Int(7));
}

#[test]
fn test_mode_scenario() {
    let mut store = build_store();
    assert!(store.set("mode", "turbo").is_err());
    assert_eq!(store.get("mode"), Some(&ParamValue::Str("auto".into())));
}

#[test]
fn test_unknown_parameter_scenario() {
    let mut store = build_store();
    let err = store.set("nonexistent", 1).unwrap_err();
    assert!(matches!(err, SetError::UnknownParameter(e) if e.name == "nonexistent"));
}

#[test]
fn test_set_does_not_touch_other_fields() {
    let mut store = build_store();
    let before = store.get_parameters();
    store.set("volume", 9).unwrap();
    let after = store.get_parameters();
    for (name, value) in &before {
        if name != "volume" {
            assert_eq!(&after[name], value, "{} changed", name);
        }
    }
}

#[test]
fn test_failed_set_keeps_snapshot_identical() {
    let mut store = build_store();
    let before = store.get_parameters();
    assert!(store.set("gain", 5.0).is_err());
    assert_eq!(store.get_parameters(), before);
}

#[test]
fn test_idempotent_set_fires_hook_per_call() {
    let mut store = build_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    store
        .on_set("volume", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    store.set("volume", 7).unwrap();
    let once = store.get_parameters();
    store.set("volume", 7).unwrap();
    assert_eq!(store.get_parameters(), once);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_hook_observes_new_value_after_swap() {
    let mut store = build_store();
    let seen: Arc<Mutex<Vec<ParamValue>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store
        .on_set("mode", move |value| {
            sink.lock().unwrap().push(value.clone());
        })
        .unwrap();

    store.set("mode", "manual").unwrap();
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[ParamValue::Str("manual".into())]
    );
}

#[test]
fn test_hook_not_fired_on_failed_set() {
    let mut store = build_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    store
        .on_set("volume", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    assert!(store.set("volume", 11).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_hook_propagates_but_swap_sticks() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let mut store = build_store();
    store
        .on_set("volume", |_| panic!("downstream reconfiguration failed"))
        .unwrap();

    // The hook runs after the swap, so its panic reaches the caller while
    // the new value stays committed.
    let result = catch_unwind(AssertUnwindSafe(|| store.set("volume", 7)));
    assert!(result.is_err());
    assert_eq!(store.get("volume"), Some(&ParamValue::Int(7)));
}

#[test]
fn test_hook_registration_requires_declared_name() {
    let mut store = build_store();
    assert!(store.on_set("nonexistent", |_| {}).is_err());
}

#[test]
fn test_hook_reregistration_replaces_previous() {
    let mut store = build_store();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = first.clone();
    store
        .on_set("volume", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let counter = second.clone();
    store
        .on_set("volume", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    store.set("volume", 3).unwrap();
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_independent_stores_do_not_share_state() {
    let mut a = build_store();
    let b = build_store();
    a.set("volume", 9).unwrap();
    assert_eq!(b.get("volume"), Some(&ParamValue::Int(5)));
}

#[test]
fn test_store_from_json_file() {
    let path = std::env::temp_dir().join(format!("paramify-test-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"parameters": [{"name": "volume", "type": "int", "default": 5, "min": 0, "max": 10}]}"#,
    )
    .unwrap();

    let mut store = ParameterStore::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(store.get("volume"), Some(&ParamValue::Int(5)));
    store.set("volume", 10).unwrap();
    assert!(store.set("volume", -1).is_err());
}

#[test]
fn test_store_from_yaml_file() {
    let path = std::env::temp_dir().join(format!("paramify-test-{}.yaml", std::process::id()));
    std::fs::write(&path, SCHEMA).unwrap();

    let store = ParameterStore::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(store.declarations().len(), 7);
}

#[test]
fn test_unrecognized_extension_rejected() {
    let err = ParameterStore::from_path("params.toml").unwrap_err();
    assert!(err.to_string().contains("extension"));
}
