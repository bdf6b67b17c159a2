use chartpro::api::{SyncOutcome, Synchronizer};
use chartpro::core::{LiveOverlay, OverlayCreate, Point};
use chartpro::error::ChartError;
use chartpro::store::{FileStore, KeyValueStore, STATE_STORAGE_KEY};

#[test]
fn values_survive_reopening_the_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = FileStore::open(dir.path().join("state")).expect("open store");
    store.set(STATE_STORAGE_KEY, "{}").expect("write");

    let reopened = FileStore::open(dir.path().join("state")).expect("reopen store");
    assert_eq!(reopened.get(STATE_STORAGE_KEY).expect("read").as_deref(), Some("{}"));
    assert!(dir.path().join("state").join("chartstatedata.json").exists());
}

#[test]
fn missing_keys_read_as_absent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = FileStore::open(dir.path()).expect("open store");

    assert_eq!(store.get("nothing").expect("read"), None);
    assert!(!store.remove("nothing").expect("remove"));
}

#[test]
fn path_like_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = FileStore::open(dir.path()).expect("open store");

    let err = store.set("../outside", "{}").expect_err("separator in key");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn synchronizer_persists_through_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileStore::open(dir.path()).expect("open store");
    let mut sync = Synchronizer::new(store);
    let overlay = LiveOverlay::from_create(
        "ov1",
        "candle_pane",
        &OverlayCreate::new("segment", vec![Point::new(1, 1.0), Point::new(2, 3.0)]),
    );

    assert_eq!(sync.record_overlay_upserted(&overlay), SyncOutcome::Written);
    let sync = Synchronizer::new(FileStore::open(dir.path()).expect("reopen store"));

    let document = sync.load();
    assert_eq!(document.overlays.len(), 1);
    assert_eq!(document.overlays[0].value.points.len(), 2);
    assert!(!dir.path().join("chartstatedata.json.tmp").exists());
}

#[test]
fn clear_removes_the_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut sync = Synchronizer::new(FileStore::open(dir.path()).expect("open store"));
    let create = OverlayCreate::new("text", Vec::new());
    let overlay = LiveOverlay::from_create("ov1", "candle_pane", &create);
    sync.record_overlay_upserted(&overlay);

    assert_eq!(sync.clear(), SyncOutcome::Written);
    assert!(!dir.path().join("chartstatedata.json").exists());
    assert_eq!(sync.clear(), SyncOutcome::Unchanged);
}
