use chrono::{NaiveDate, NaiveTime};
use photomoments_core::db::{open_store, open_store_in_memory};
use photomoments_core::{
    Moment, MomentRepository, RepoError, SqliteMomentRepository, MOMENTS_KEY,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn sample(id: &str, photo_ref: &str) -> Moment {
    Moment::new(id, photo_ref, date(2024, 1, 15), None, 10.0, 20.0)
}

#[test]
fn load_all_on_fresh_store_returns_empty() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    assert_eq!(repo.load_all().unwrap(), Vec::new());
}

#[test]
fn append_then_load_roundtrip() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "p")).unwrap();

    let loaded = repo.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "1");
    assert_eq!(loaded[0].photo_ref, "p");
    assert_eq!(loaded[0].display_text, "15/01/2024 00:00");
    assert!((loaded[0].latitude - 10.0).abs() < f64::EPSILON);
    assert!((loaded[0].longitude - 20.0).abs() < f64::EPSILON);
}

#[test]
fn append_preserves_insertion_order() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    for id in ["1", "2", "3"] {
        repo.append(&sample(id, "p")).unwrap();
    }

    let ids: Vec<_> = repo.load_all().unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, ["1", "2", "3"]);
}

#[test]
fn append_rejects_duplicate_id() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "first")).unwrap();
    let err = repo.append(&sample("1", "second")).unwrap_err();

    assert!(matches!(err, RepoError::DuplicateId(id) if id == "1"));
    assert_eq!(repo.load_all().unwrap().len(), 1);
}

#[test]
fn replace_at_swaps_only_the_target() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "a")).unwrap();
    repo.append(&sample("2", "b")).unwrap();

    let mut updated = sample("2", "b");
    updated.capture_time = NaiveTime::from_hms_opt(14, 30, 0);
    updated.refresh_display();
    repo.replace_at(1, &updated).unwrap();

    let loaded = repo.load_all().unwrap();
    assert_eq!(loaded[0], sample("1", "a"));
    assert_eq!(loaded[1].display_text, "15/01/2024 14:30");
}

#[test]
fn replace_at_out_of_range_fails() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "p")).unwrap();

    let err = repo.replace_at(1, &sample("1", "p")).unwrap_err();
    assert!(matches!(err, RepoError::OutOfRange { index: 1, len: 1 }));
}

#[test]
fn replace_at_rejects_id_change() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "p")).unwrap();

    let err = repo.replace_at(0, &sample("99", "p")).unwrap_err();
    assert!(matches!(err, RepoError::IdMismatch { index: 0, .. }));

    // Contract violation must not leave a partial write behind.
    assert_eq!(repo.load_all().unwrap()[0].id, "1");
}

#[test]
fn remove_at_shrinks_and_preserves_order() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "first")).unwrap();
    repo.append(&sample("2", "second")).unwrap();

    repo.remove_at(0).unwrap();

    let loaded = repo.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], sample("2", "second"));
}

#[test]
fn remove_at_out_of_range_fails() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    let err = repo.remove_at(0).unwrap_err();
    assert!(matches!(err, RepoError::OutOfRange { index: 0, len: 0 }));
}

#[test]
fn collection_is_persisted_as_one_blob_under_the_fixed_key() {
    let conn = open_store_in_memory().unwrap();
    let repo = SqliteMomentRepository::new(&conn);

    repo.append(&sample("1", "a")).unwrap();
    repo.append(&sample("2", "b")).unwrap();

    let blob: String = conn
        .query_row(
            "SELECT value FROM kv_entries WHERE key = ?1",
            [MOMENTS_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));

    let row_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(row_count, 1);
}

#[test]
fn undecodable_blob_is_fatal_for_the_load() {
    let conn = open_store_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, 'not json at all')",
        [MOMENTS_KEY],
    )
    .unwrap();

    let repo = SqliteMomentRepository::new(&conn);
    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::Corrupt(_)));
}

#[test]
fn blob_with_invalid_record_is_fatal_for_the_load() {
    let conn = open_store_in_memory().unwrap();
    // Decodes fine but violates the empty-id invariant.
    let blob = r#"[{"id":"","photoRef":"p","captureDate":"2024-01-15","captureTime":null,"displayText":"15/01/2024 00:00","latitude":10.0,"longitude":20.0}]"#;
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)",
        rusqlite::params![MOMENTS_KEY, blob],
    )
    .unwrap();

    let repo = SqliteMomentRepository::new(&conn);
    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::Corrupt(_)));
}

#[test]
fn collection_round_trips_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("moments.sqlite3");

    let expected = {
        let conn = open_store(&db_path).unwrap();
        let repo = SqliteMomentRepository::new(&conn);
        repo.append(&sample("1", "a")).unwrap();
        repo.append(&Moment::new(
            "2",
            "b",
            date(2024, 2, 1),
            NaiveTime::from_hms_opt(9, 15, 0),
            -23.5505,
            -46.6333,
        ))
        .unwrap();
        repo.load_all().unwrap()
    };

    let conn = open_store(&db_path).unwrap();
    let repo = SqliteMomentRepository::new(&conn);
    assert_eq!(repo.load_all().unwrap(), expected);
}
