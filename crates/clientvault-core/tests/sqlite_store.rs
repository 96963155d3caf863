use clientvault_core::crypto::encoding;
use clientvault_core::records::{ClientData, PitchDeckData, StrategyData};
use clientvault_core::storage::SqliteStore;
use clientvault_core::{
    KeyMetadataStore, KeySession, KeyState, NewRecord, RecordKind, RecordStore, UnlockOutcome,
    VaultError,
};
use tempfile::TempDir;

const PASSPHRASE: &str = "Correct-Horse-1!";

#[test]
fn test_create_refuses_existing_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("vault.db");

    SqliteStore::create(&path).expect("create should succeed");
    assert!(path.exists());

    let err = SqliteStore::create(&path).err().expect("second create fails");
    assert!(matches!(err, VaultError::Storage(_)));
}

#[test]
fn test_open_missing_file_fails() {
    let dir = TempDir::new().expect("temp dir");
    let err = SqliteStore::open(&dir.path().join("missing.db"))
        .err()
        .expect("open fails");
    assert!(matches!(err, VaultError::NotFound(_)));
}

#[test]
fn test_open_rejects_foreign_database() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("other.db");
    let conn = rusqlite::Connection::open(&path).expect("open sqlite");
    conn.execute_batch("CREATE TABLE notes (body TEXT);")
        .expect("create table");
    drop(conn);

    let err = SqliteStore::open(&path).err().expect("open fails");
    assert!(matches!(err, VaultError::Storage(_)));
}

#[test]
fn test_key_and_records_persist_across_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("vault.db");

    let record_id = {
        let store = SqliteStore::create(&path).expect("create should succeed");
        let mut session = KeySession::load(&store, "user_1").expect("load");
        session.setup(PASSPHRASE).expect("setup");
        session.unlock(PASSPHRASE).expect("unlock");

        let deck = PitchDeckData {
            title: "Seed round".to_string(),
            description: Some("Ten slides".to_string()),
            file_url: None,
        };
        let payload = session.seal(&deck).expect("seal");
        store
            .insert_record(&NewRecord::new("user_1", RecordKind::PitchDeck, payload))
            .expect("insert")
    };

    let store = SqliteStore::open(&path).expect("reopen should succeed");
    let mut session = KeySession::load(&store, "user_1").expect("load");
    assert_eq!(session.state(), KeyState::KeySetLocked);
    assert_eq!(
        session.unlock(PASSPHRASE).expect("unlock"),
        UnlockOutcome::Unlocked
    );

    let record = store
        .get_record("user_1", &record_id)
        .expect("get")
        .expect("record exists");
    let deck: PitchDeckData = session.open(&record).expect("open");
    assert_eq!(deck.title, "Seed round");
}

#[test]
fn test_ciphertext_on_disk_is_opaque() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("vault.db");

    {
        let store = SqliteStore::create(&path).expect("create should succeed");
        let mut session = KeySession::load(&store, "user_1").expect("load");
        session.setup(PASSPHRASE).expect("setup");
        session.unlock(PASSPHRASE).expect("unlock");
        let payload = session
            .seal(&ClientData::new("very-secret@example.com"))
            .expect("seal");
        store
            .insert_record(&NewRecord::new("user_1", RecordKind::Client, payload))
            .expect("insert");
    }

    let bytes = std::fs::read(&path).expect("read store");
    let haystack = String::from_utf8_lossy(&bytes);
    assert!(!haystack.contains("very-secret@example.com"));
    assert!(!haystack.contains(PASSPHRASE));
    assert!(!haystack.contains("user_key_set"));
}

#[test]
fn test_legacy_and_corrupt_rows_do_not_abort_listing() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("vault.db");

    let store = SqliteStore::create(&path).expect("create should succeed");
    let mut session = KeySession::load(&store, "user_1").expect("load");
    session.setup(PASSPHRASE).expect("setup");
    session.unlock(PASSPHRASE).expect("unlock");

    let strategy = StrategyData {
        name: "Warm intros".to_string(),
        details: None,
    };
    let good_id = store
        .insert_record(&NewRecord::new(
            "user_1",
            RecordKind::Strategy,
            session.seal(&strategy).expect("seal"),
        ))
        .expect("insert");

    // Rows written by old clients: a 16-byte IV with a per-record salt whose
    // tag does not verify, and a ciphertext column that is not Base64 at all.
    let conn = rusqlite::Connection::open(&path).expect("open sqlite");
    conn.execute(
        "INSERT INTO records (id, user_id, kind, encrypted_data, iv, salt, created_at, updated_at)
         VALUES (?1, 'user_1', 'strategy', ?2, ?3, ?4, ?5, ?5)",
        rusqlite::params![
            uuid::Uuid::new_v4().to_string(),
            encoding::encode(&[7u8; 48]),
            encoding::encode(&[1u8; 16]),
            encoding::encode(&[2u8; 16]),
            "2020-01-01T00:00:00.000000Z",
        ],
    )
    .expect("insert legacy row");
    conn.execute(
        "INSERT INTO records (id, user_id, kind, encrypted_data, iv, created_at, updated_at)
         VALUES (?1, 'user_1', 'strategy', '%%not-base64%%', ?2, ?3, ?3)",
        rusqlite::params![
            uuid::Uuid::new_v4().to_string(),
            encoding::encode(&[1u8; 12]),
            "2019-01-01T00:00:00.000000Z",
        ],
    )
    .expect("insert corrupt row");
    drop(conn);

    let records = store
        .list_records("user_1", Some(RecordKind::Strategy))
        .expect("list");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id, good_id);
    assert!(records[1].legacy_salt.is_some());

    let opened = session
        .open_all::<StrategyData>(&records)
        .expect("session unlocked");
    assert_eq!(opened.len(), 3);
    assert_eq!(opened[0].data().expect("decrypted").name, "Warm intros");
    assert!(opened[1]
        .error()
        .expect("legacy fails")
        .contains("Authentication failed"));
    assert!(opened[2]
        .error()
        .expect("corrupt fails")
        .contains("at least 16 bytes"));

    // Re-sealing a legacy record clears its salt.
    let resealed = session.seal(&strategy).expect("seal");
    store
        .update_record("user_1", &records[1].id, &resealed)
        .expect("update");
    let updated = store
        .get_record("user_1", &records[1].id)
        .expect("get")
        .expect("exists");
    assert!(updated.legacy_salt.is_none());
    assert!(updated.check_shape().is_ok());

    assert!(store.get_key_metadata("user_1").expect("get").is_some());
}

#[test]
fn test_unparseable_rows_are_skipped_when_listing() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("vault.db");

    let store = SqliteStore::create(&path).expect("create should succeed");
    let mut session = KeySession::load(&store, "user_1").expect("load");
    session.setup(PASSPHRASE).expect("setup");
    session.unlock(PASSPHRASE).expect("unlock");

    let good_id = store
        .insert_record(&NewRecord::new(
            "user_1",
            RecordKind::Client,
            session.seal(&ClientData::new("kept@example.com")).expect("seal"),
        ))
        .expect("insert");

    let iv = encoding::encode(&[1u8; 12]);
    let data = encoding::encode(&[7u8; 32]);
    let conn = rusqlite::Connection::open(&path).expect("open sqlite");
    for (id, kind, created_at) in [
        (uuid::Uuid::new_v4().to_string(), "invoice", "2020-01-01T00:00:00.000000Z"),
        ("not-a-uuid".to_string(), "client", "2020-01-01T00:00:00.000000Z"),
        (uuid::Uuid::new_v4().to_string(), "client", "last tuesday"),
    ] {
        conn.execute(
            "INSERT INTO records (id, user_id, kind, encrypted_data, iv, created_at, updated_at)
             VALUES (?1, 'user_1', ?2, ?3, ?4, ?5, ?5)",
            rusqlite::params![id, kind, data, iv, created_at],
        )
        .expect("insert unparseable row");
    }
    drop(conn);

    let all = store.list_records("user_1", None).expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, good_id);

    let clients = store
        .list_records("user_1", Some(RecordKind::Client))
        .expect("list clients");
    assert_eq!(clients.len(), 1);

    let opened = session
        .open_all::<ClientData>(&clients)
        .expect("session unlocked");
    assert_eq!(opened[0].data().expect("decrypted").email, "kept@example.com");
}
