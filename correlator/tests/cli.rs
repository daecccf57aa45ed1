//! End-to-end checks against the compiled binary and a throwaway SQLite file.

use std::process::Command;

use rusqlite::Connection;

fn seed_db(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE MacAddresses (
            Id INTEGER PRIMARY KEY,
            MacAddress TEXT NOT NULL,
            Rssi INTEGER NOT NULL,
            Std REAL NOT NULL,
            Mean REAL NOT NULL,
            FirstSeen INTEGER NOT NULL,
            LastSeen INTEGER NOT NULL,
            ServiceUUID INTEGER NOT NULL,
            CompanyId INTEGER NOT NULL,
            Random INTEGER NOT NULL,
            AntennaId INTEGER NOT NULL
        );
        CREATE TABLE Metadata (
            AntennaMetadataId INTEGER PRIMARY KEY,
            Longitude REAL NOT NULL,
            Latitude REAL NOT NULL,
            Timestamp INTEGER NOT NULL,
            AntennaId INTEGER NOT NULL
        );",
    )
    .unwrap();

    conn.execute(
        "INSERT INTO Metadata (Longitude, Latitude, Timestamp, AntennaId) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![11.71, 50.4266708374024, 1621775133i64, 1],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO Metadata (Longitude, Latitude, Timestamp, AntennaId) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![11.71, 50.4266708374024, 1621775133i64, 2],
    )
    .unwrap();

    // Two sightings of the same MAC, ~4 minutes apart, same antenna pair's
    // location: should land in one component and a two-hop path.
    conn.execute(
        "INSERT INTO MacAddresses (MacAddress, Rssi, Std, Mean, FirstSeen, LastSeen, ServiceUUID, CompanyId, Random, AntennaId)
         VALUES ('de:ad:be:ef:00:11', -60, 2.0, -60.0, 1621775133, 1621775200, 42, 7, 1, 1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO MacAddresses (MacAddress, Rssi, Std, Mean, FirstSeen, LastSeen, ServiceUUID, CompanyId, Random, AntennaId)
         VALUES ('de:ad:be:ef:00:11', -61, 2.0, -61.0, 1621775250, 1621775400, 42, 7, 1, 2)",
        [],
    )
    .unwrap();
}

#[test]
fn path_mode_prints_a_two_step_chain() {
    let dir = std::env::temp_dir().join(format!("bt-correlator-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let db_path = dir.join("bluetooth.db");
    seed_db(&db_path);

    let output = Command::new(env!("CARGO_BIN_EXE_bt-correlator"))
        .arg(&db_path)
        .args(["-m", "de:ad:be:ef:00:11", "-p"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("path:"), "stdout was: {stdout}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_mac_prints_nothing_and_exits_cleanly() {
    let dir = std::env::temp_dir().join(format!("bt-correlator-test-empty-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let db_path = dir.join("bluetooth.db");
    seed_db(&db_path);

    let output = Command::new(env!("CARGO_BIN_EXE_bt-correlator"))
        .arg(&db_path)
        .args(["-m", "ff:ff:ff:ff:ff:ff", "-p"])
        .output()
        .unwrap();

    assert!(output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}
