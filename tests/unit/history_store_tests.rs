/*!
 * Tests for the search history store backed by a real database file
 */

use platecheck::database::{DatabaseConnection, ProfileRepository, SearchHistoryRepository};
use platecheck::vehicle_utils::VehicleType;

use crate::common;

#[tokio::test]
async fn test_history_afterReopen_shouldKeepEntriesAndCounts() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("data").join("platecheck.db");

    {
        let repo = SearchHistoryRepository::new(DatabaseConnection::open(&path).unwrap());
        repo.record_search("30A12345", VehicleType::Car).await.unwrap();
        repo.record_search("30a12345", VehicleType::Car).await.unwrap();
        repo.record_search("59X123456", VehicleType::Motorcycle).await.unwrap();
    }

    let repo = SearchHistoryRepository::new(DatabaseConnection::open(&path).unwrap());
    let car = repo
        .find("30A12345", VehicleType::Car)
        .await
        .unwrap()
        .expect("entry should survive reopening");

    assert_eq!(car.search_count, 2);
    assert_eq!(repo.list_recent(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_open_withLegacyDatabaseFile_shouldMigrateDuplicates() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("legacy.db");

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                license_plate TEXT NOT NULL,
                vehicle_type TEXT NOT NULL,
                search_count INTEGER DEFAULT 1,
                last_searched DATETIME DEFAULT CURRENT_TIMESTAMP,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO search_history (license_plate, vehicle_type, search_count, last_searched, created_at)
                VALUES ('51f99999', 'car', 2, '2024-01-01 10:00:00', '2024-01-01 10:00:00');
            INSERT INTO search_history (license_plate, vehicle_type, search_count, last_searched, created_at)
                VALUES ('51F99999', 'car', 1, '2024-02-01 10:00:00', '2024-02-01 10:00:00');
            "#,
        )
        .unwrap();
    }

    let repo = SearchHistoryRepository::new(DatabaseConnection::open(&path).unwrap());
    let entries = repo.list_recent(10).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].license_plate, "51F99999");
    assert_eq!(entries[0].search_count, 3);

    let entry = repo.record_search("51F99999", VehicleType::Car).await.unwrap();
    assert_eq!(entry.search_count, 4);
}

fn journal_mode(db: &DatabaseConnection) -> String {
    db.execute(|conn| Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?))
        .unwrap()
}

#[test]
fn test_open_withFreshOrLegacyFile_shouldUseWalJournal() {
    let dir = common::create_temp_dir().unwrap();
    let fresh_path = dir.path().join("fresh.db");
    let legacy_path = dir.path().join("legacy.db");
    {
        let conn = rusqlite::Connection::open(&legacy_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                license_plate TEXT NOT NULL,
                vehicle_type TEXT NOT NULL,
                search_count INTEGER DEFAULT 1,
                last_searched DATETIME DEFAULT CURRENT_TIMESTAMP,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            INSERT INTO search_history (license_plate, vehicle_type) VALUES ('30a12345', 'car');
            "#,
        )
        .unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
    }

    let fresh = DatabaseConnection::open(&fresh_path).unwrap();
    let legacy = DatabaseConnection::open(&legacy_path).unwrap();

    assert_eq!(journal_mode(&fresh), "wal");
    assert_eq!(journal_mode(&legacy), "wal");
}

#[tokio::test]
async fn test_open_withUnwritableLocation_shouldFailInitialization() {
    let dir = common::create_temp_dir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let result = DatabaseConnection::open(blocker.join("platecheck.db"));

    assert!(matches!(
        result,
        Err(platecheck::StorageError::Initialization(_))
    ));
}

#[tokio::test]
async fn test_profiles_andHistory_shouldShareOneConnection() {
    let dir = common::create_temp_dir().unwrap();
    let db = DatabaseConnection::open(dir.path().join("platecheck.db")).unwrap();
    let history = SearchHistoryRepository::new(db.clone());
    let profiles = ProfileRepository::new(db.clone());

    history.record_search("30A12345", VehicleType::Car).await.unwrap();
    profiles.create_user("Lan", Some("lan@example.com")).await.unwrap();

    let stats = db.stats().unwrap();
    assert_eq!(stats.history_entries, 1);
    assert_eq!(stats.total_searches, 1);
    assert_eq!(stats.user_count, 1);
}
