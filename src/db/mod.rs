// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Database module - vitals history sink

mod memory;
mod writer;

pub use memory::MemorySink;
pub use writer::{SinkWriter, WriterStats};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::scoring::{risk_label, RiskBand};
use crate::vitals::Reading;

/// Destination for scored readings
pub trait ReadingSink: Send + Sync {
    /// Append one scored reading to the history
    fn record_reading(&self, bed_id: &str, reading: &Reading, score: u32, band: RiskBand) -> Result<()>;

    /// Latest records for a bed, newest first
    fn history(&self, bed_id: &str, limit: usize) -> Result<Vec<HistoryRecord>>;
}

/// One row of vitals history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub source_id: String,
    pub timestamp: DateTime<Utc>,
    pub hr: u32,
    pub spo2: u32,
    pub bp_text: String,
    pub temp: f64,
    pub score: u32,
    pub risk_label: String,
}

impl HistoryRecord {
    pub fn new(bed_id: &str, reading: &Reading, score: u32, band: RiskBand) -> Self {
        Self {
            source_id: bed_id.to_string(),
            timestamp: reading.received_at,
            hr: reading.heart_rate,
            spo2: reading.spo2,
            bp_text: reading.blood_pressure.to_string(),
            temp: reading.temperature,
            score,
            risk_label: risk_label(band, score),
        }
    }
}

/// SQLite history store
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create database
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&config.path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        "#,
        )?;

        let db = Self::from_connection(conn)?;
        info!("Database opened at {:?}", config.path);
        Ok(db)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vitals_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                hr INTEGER NOT NULL,
                spo2 INTEGER NOT NULL,
                bp_text TEXT NOT NULL,
                temp REAL NOT NULL,
                score INTEGER NOT NULL,
                risk_label TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_vitals_source ON vitals_log(source_id, timestamp);
        "#,
        )?;

        Ok(())
    }

    pub fn insert(&self, record: &HistoryRecord) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO vitals_log (source_id, timestamp, hr, spo2, bp_text, temp, score, risk_label)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.source_id,
                format_timestamp(record.timestamp),
                record.hr,
                record.spo2,
                record.bp_text,
                record.temp,
                record.score,
                record.risk_label,
            ],
        )?;

        Ok(())
    }

    /// Delete rows older than `retention_days`
    pub fn cleanup(&self, retention_days: u32) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
        self.delete_before(cutoff)
    }

    pub fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn.lock();
        let deleted = conn.execute(
            "DELETE FROM vitals_log WHERE timestamp < ?1",
            params![format_timestamp(cutoff)],
        )?;

        if deleted > 0 {
            info!("Cleaned up {} history rows older than {}", deleted, cutoff);
        }
        Ok(deleted)
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn.lock();

        let record_count: i64 = conn.query_row("SELECT COUNT(*) FROM vitals_log", [], |row| row.get(0))?;
        let bed_count: i64 =
            conn.query_row("SELECT COUNT(DISTINCT source_id) FROM vitals_log", [], |row| row.get(0))?;

        Ok(DatabaseStats {
            record_count: record_count as usize,
            bed_count: bed_count as usize,
        })
    }
}

impl ReadingSink for Database {
    fn record_reading(&self, bed_id: &str, reading: &Reading, score: u32, band: RiskBand) -> Result<()> {
        self.insert(&HistoryRecord::new(bed_id, reading, score, band))
    }

    fn history(&self, bed_id: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT source_id, timestamp, hr, spo2, bp_text, temp, score, risk_label
             FROM vitals_log WHERE source_id = ?1
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![bed_id, i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
            let timestamp: String = row.get(1)?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
                })?;

            Ok(HistoryRecord {
                source_id: row.get(0)?,
                timestamp,
                hr: row.get(2)?,
                spo2: row.get(3)?,
                bp_text: row.get(4)?,
                temp: row.get(5)?,
                score: row.get(6)?,
                risk_label: row.get(7)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

/// Fixed-width UTC text so lexical order matches time order
fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub record_count: usize,
    pub bed_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::BloodPressure;

    fn reading(id: &str, hr: u32, at: DateTime<Utc>) -> Reading {
        let mut r = Reading::with_defaults(id, at);
        r.heart_rate = hr;
        r.pulse = hr;
        r.blood_pressure = BloodPressure::new(118, 76);
        r
    }

    #[test]
    fn test_record_and_history() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc::now();

        for i in 0..5u32 {
            let at = t0 + chrono::Duration::seconds(i as i64);
            db.record_reading("BED-001", &reading("BED-001", 70 + i, at), i, RiskBand::Monitor)
                .unwrap();
        }
        db.record_reading("BED-002", &reading("BED-002", 99, t0), 9, RiskBand::Critical)
            .unwrap();

        let history = db.history("BED-001", 3).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].hr, 74);
        assert_eq!(history[2].hr, 72);
        assert_eq!(history[0].bp_text, "118/76");
        assert_eq!(history[0].risk_label, "MONITOR (NEWS: 4)");

        let other = db.history("BED-002", 50).unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].risk_label, "CRITICAL (NEWS: 9)");

        assert!(db.history("BED-404", 50).unwrap().is_empty());
        assert_eq!(
            db.stats().unwrap(),
            DatabaseStats {
                record_count: 6,
                bed_count: 2
            }
        );
    }

    #[test]
    fn test_unbounded_limit_is_not_negative() {
        let db = Database::open_in_memory().unwrap();
        for hr in 70..73 {
            db.record_reading("BED-001", &reading("BED-001", hr, Utc::now()), 0, RiskBand::Stable)
                .unwrap();
        }

        assert_eq!(db.history("BED-001", usize::MAX).unwrap().len(), 3);
        assert_eq!(db.history("BED-001", 0).unwrap().len(), 0);
    }

    #[test]
    fn test_timestamp_survives_storage() {
        let db = Database::open_in_memory().unwrap();
        let at = Utc::now();
        db.record_reading("BED-001", &reading("BED-001", 80, at), 0, RiskBand::Stable)
            .unwrap();

        let stored = &db.history("BED-001", 1).unwrap()[0];
        assert_eq!(stored.timestamp.timestamp_micros(), at.timestamp_micros());
    }

    #[test]
    fn test_delete_before() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        let old = now - chrono::Duration::days(40);

        db.record_reading("BED-001", &reading("BED-001", 80, old), 0, RiskBand::Stable)
            .unwrap();
        db.record_reading("BED-001", &reading("BED-001", 81, now), 0, RiskBand::Stable)
            .unwrap();

        assert_eq!(db.cleanup(30).unwrap(), 1);
        let history = db.history("BED-001", 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].hr, 81);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("history").join("ward.db"),
            ..Default::default()
        };

        {
            let db = Database::open(&config).unwrap();
            db.record_reading("BED-001", &reading("BED-001", 80, Utc::now()), 0, RiskBand::Stable)
                .unwrap();
        }

        let reopened = Database::open(&config).unwrap();
        assert_eq!(reopened.history("BED-001", 10).unwrap().len(), 1);
    }
}
