//! End-to-end behaviour of namespaced stores over every backend.

use std::sync::Arc;

use keyplex::{
    Detached, LocalStorage, Namespace, Plex, SessionStorage, StaticOrigin, StorageBackend,
    StorageError,
};
use keyplex_test::{
    BackendCall, FailingBackend, RecordingBackend, TEST_NAMESPACE, TEST_ORIGIN, plex_over,
    session_config, setup_test_logging_default, temp_local_storage,
};
use serde_json::{Value, json};

/// Run `check` against a session-backed and a durable store.
fn for_each_backend(check: impl Fn(&Plex)) {
    setup_test_logging_default();

    let session = plex_over(SessionStorage::new(), TEST_NAMESPACE);
    check(&session);

    let (local, _dir) = temp_local_storage();
    let local = plex_over(local, TEST_NAMESPACE);
    check(&local);
}

#[test]
fn test_user_id_scenario() {
    for_each_backend(|plex| {
        plex.set("user/id", &42).unwrap();
        assert_eq!(
            plex.backend()
                .get_item("@com.example.app/user/id")
                .unwrap()
                .as_deref(),
            Some("42")
        );
        assert_eq!(plex.get::<Value>("user/id").unwrap(), Some(json!(42)));
        assert!(plex.has("user/id").unwrap());

        plex.del("user/id").unwrap();
        assert_eq!(plex.get::<Value>("user/id").unwrap(), None);
    });
}

#[test]
fn test_cache_wildcard_scenario() {
    for_each_backend(|plex| {
        plex.set("cache/a", &json!({"x": 1})).unwrap();
        plex.set("cache/b", &json!({"x": 2})).unwrap();
        plex.del("cache/%").unwrap();

        let keys = plex.keys().unwrap();
        assert!(!keys.iter().any(|k| k == "@com.example.app/cache/a"));
        assert!(!keys.iter().any(|k| k == "@com.example.app/cache/b"));
    });
}

#[test]
fn test_round_trip_of_json_shapes() {
    let values = [
        json!(null),
        json!(true),
        json!(-17),
        json!(3.5),
        json!("text with \"quotes\" and / slashes"),
        json!([1, "two", {"three": 3}]),
        json!({"nested": {"list": [], "empty": {}}}),
    ];
    for_each_backend(|plex| {
        for (i, value) in values.iter().enumerate() {
            let key = format!("shape/{i}");
            plex.set(&key, value).unwrap();
            let expected = if value.is_null() {
                None
            } else {
                Some(value.clone())
            };
            assert_eq!(plex.get::<Value>(&key).unwrap(), expected, "key {key}");
        }
    });
}

#[test]
fn test_default_for_unwritten_key() {
    for_each_backend(|plex| {
        assert_eq!(plex.get::<Value>("never").unwrap(), None);
        assert_eq!(plex.get_or("never", json!("fallback")).unwrap(), json!("fallback"));
        assert!(!plex.has("never").unwrap());
    });
}

#[test]
fn test_default_only_when_nothing_is_stored() {
    for_each_backend(|plex| {
        plex.set("nullish", &Value::Null).unwrap();
        assert_eq!(plex.get_or("nullish", json!(5)).unwrap(), Value::Null);
        assert_eq!(plex.get::<Value>("nullish").unwrap(), None);
        assert!(!plex.has("nullish").unwrap());

        plex.set("zero", &0).unwrap();
        assert_eq!(plex.get_or("zero", 9).unwrap(), 0);

        plex.set("empty-string", "").unwrap();
        assert_eq!(
            plex.get_or("empty-string", "fallback".to_owned()).unwrap(),
            ""
        );
    });
}

#[test]
fn test_facade_stores_on_one_origin_keep_each_others_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config_for = |namespace: &str| {
        keyplex::Config::from_toml_str(&format!(
            "namespace = \"{namespace}\"\norigin = \"{TEST_ORIGIN}\"\n\
             [storage]\nkind = \"local\"\ndata_dir = {:?}\n",
            dir.path().display().to_string()
        ))
        .unwrap()
    };

    {
        let a = keyplex::open(&config_for("a")).unwrap();
        let b = keyplex::open(&config_for("b")).unwrap();
        a.set("k", &1).unwrap();
        b.set("k", &2).unwrap();
        a.set("other", "x").unwrap();
    }

    let a = keyplex::open(&config_for("a")).unwrap();
    let b = keyplex::open(&config_for("b")).unwrap();
    assert_eq!(a.get::<i32>("k").unwrap(), Some(1));
    assert_eq!(b.get::<i32>("k").unwrap(), Some(2));
    assert_eq!(a.keys().unwrap(), vec!["@a/k", "@a/other", "@b/k"]);

    let on_disk = LocalStorage::open(LocalStorage::origin_file(dir.path(), TEST_NAMESPACE)).unwrap();
    assert_eq!(on_disk.keys().unwrap().len(), 3);
}

#[test]
fn test_absent_read_touches_only_one_path() {
    let backend = RecordingBackend::new();
    let plex = plex_over(backend.clone(), "ns");

    assert_eq!(plex.get_or("missing", 5).unwrap(), 5);
    assert_eq!(backend.calls(), vec![BackendCall::Get("@ns/missing".into())]);
}

#[test]
fn test_plain_delete_removes_exactly_one_path() {
    let backend = RecordingBackend::new();
    let plex = plex_over(backend.clone(), "ns");
    plex.set("a", &1).unwrap();
    plex.set("ab", &2).unwrap();
    backend.clear_calls();

    plex.del("a").unwrap();
    assert_eq!(backend.removed(), vec!["@ns/a"]);
    assert!(!backend.calls().contains(&BackendCall::Keys));
}

#[test]
fn test_wildcard_delete_enumerates_backend() {
    let backend = RecordingBackend::new();
    let plex = plex_over(backend.clone(), "ns");
    plex.set("cache/a", &1).unwrap();
    plex.set("cache/b", &2).unwrap();
    plex.set("keep", &3).unwrap();
    backend.clear_calls();

    assert_eq!(plex.del("cache/%").unwrap(), 2);
    assert_eq!(backend.calls().first(), Some(&BackendCall::Keys));
    assert_eq!(backend.removed(), vec!["@ns/cache/a", "@ns/cache/b"]);
}

#[test]
fn test_wildcard_reaches_textually_similar_namespace() {
    let backend: Arc<dyn StorageBackend> = Arc::new(SessionStorage::new());
    let short = Plex::new(Arc::clone(&backend), Namespace::new("app").unwrap());
    let nested = Plex::new(Arc::clone(&backend), Namespace::new("app/v2").unwrap());
    let unrelated = Plex::new(Arc::clone(&backend), Namespace::new("other").unwrap());

    short.set("v2-flag", &true).unwrap();
    nested.set("flag", &true).unwrap();
    unrelated.set("v2", &true).unwrap();

    // "@app/v2" prefixes both "@app/v2-flag" and "@app/v2/flag".
    assert_eq!(short.del("v2%").unwrap(), 2);
    assert!(!nested.has("flag").unwrap());
    assert!(unrelated.has("v2").unwrap());
}

#[test]
fn test_stores_share_one_backend_without_collisions() {
    let backend: Arc<dyn StorageBackend> = Arc::new(SessionStorage::new());
    let a = Plex::new(Arc::clone(&backend), Namespace::new("com.a").unwrap());
    let b = Plex::new(Arc::clone(&backend), Namespace::new("com.b").unwrap());

    a.set("k", "from a").unwrap();
    b.set("k", "from b").unwrap();

    assert_eq!(a.get::<String>("k").unwrap().as_deref(), Some("from a"));
    assert_eq!(b.get::<String>("k").unwrap().as_deref(), Some("from b"));
    assert_eq!(a.keys().unwrap(), b.keys().unwrap());
    assert_eq!(a.list_keys().unwrap(), vec!["k"]);
}

#[test]
fn test_foreign_writer_garbage_surfaces_as_error() {
    let backend = FailingBackend::new().with_entry("@ns/k", "<xml/>");
    let plex = plex_over(backend, "ns");
    assert!(matches!(
        plex.get::<Value>("k"),
        Err(StorageError::Serialization(_))
    ));
}

#[test]
fn test_write_failures_propagate_unchanged() {
    let plex = plex_over(FailingBackend::new(), "ns");
    assert!(matches!(
        plex.set("k", &1),
        Err(StorageError::QuotaExceeded { needed: 1, quota: 0 })
    ));
}

#[test]
fn test_namespace_from_origin() {
    let host = StaticOrigin::parse(TEST_ORIGIN).unwrap();
    let plex = Plex::from_host(Arc::new(SessionStorage::new()), None, &host).unwrap();
    assert_eq!(plex.namespace().as_str(), TEST_NAMESPACE);
}

#[test]
fn test_detached_host_requires_namespace() {
    let result = Plex::from_host(Arc::new(SessionStorage::new()), None, &Detached);
    assert!(matches!(result, Err(StorageError::MissingHostContext)));
}

#[test]
fn test_durable_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = LocalStorage::origin_file(dir.path(), TEST_NAMESPACE);

    let first = plex_over(LocalStorage::open(&path).unwrap(), "db");
    first.set("settings", &json!({"theme": "dark"})).unwrap();
    drop(first);

    let second = plex_over(LocalStorage::open(&path).unwrap(), "db");
    assert_eq!(
        second.get::<Value>("settings").unwrap(),
        Some(json!({"theme": "dark"}))
    );
}

#[test]
fn test_session_store_forgets_on_end() {
    let backend = Arc::new(SessionStorage::new());
    let plex = Plex::new(Arc::clone(&backend), Namespace::new("ns").unwrap());
    plex.set("k", &1).unwrap();

    backend.end_session().unwrap();
    assert!(!plex.has("k").unwrap());
}

#[test]
fn test_facade_open_from_config() {
    let plex = keyplex::open(&session_config("cfg")).unwrap();
    plex.set("k", &[1, 2, 3]).unwrap();
    assert_eq!(plex.get::<Vec<u8>>("k").unwrap(), Some(vec![1, 2, 3]));
    assert_eq!(plex.path("k"), "@cfg/k");
}
