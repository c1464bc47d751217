use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::Serialize;

use crate::error::{RegimeError, Result};
use crate::regime::{RegimeLabel, RegimeScore};
use crate::smoothing::Smoother;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS market_regime_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at TEXT NOT NULL,
    raw_score REAL NOT NULL,
    smoothed_score REAL NOT NULL,
    discrete_regime TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_regime_history_recorded
    ON market_regime_history(recorded_at DESC);
"#;

const SELECT_COLUMNS: &str = "id, recorded_at, raw_score, smoothed_score, discrete_regime";

/// One immutable row of the regime history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeHistoryEntry {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub raw_score: RegimeScore,
    pub smoothed_score: RegimeScore,
    pub label: RegimeLabel,
}

/// Append-only regime history backed by sqlite.
///
/// The connection sits behind a mutex so `record` is a single
/// read-then-append unit within the process; the write transaction is
/// opened `IMMEDIATE` so a second process cannot interleave either.
#[derive(Debug)]
pub struct RegimeStore {
    conn: Mutex<Connection>,
    smoother: Smoother,
}

impl RegimeStore {
    pub fn open(path: &Path, smoother: Smoother) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?, smoother)
    }

    pub fn open_in_memory(smoother: Smoother) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, smoother)
    }

    fn from_connection(conn: Connection, smoother: Smoother) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            smoother,
        })
    }

    pub fn smoother(&self) -> Smoother {
        self.smoother
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RegimeError::LockPoisoned)
    }

    /// Smoothed score of the newest entry, neutral when the history is empty.
    pub fn current_score(&self) -> Result<RegimeScore> {
        Ok(self
            .latest_entry()?
            .map(|e| e.smoothed_score)
            .unwrap_or(RegimeScore::NEUTRAL))
    }

    pub fn latest_entry(&self) -> Result<Option<RegimeHistoryEntry>> {
        Ok(self.recent_history(1)?.into_iter().next())
    }

    /// Smooth `raw` against the newest smoothed score and append a row.
    ///
    /// The timestamp is taken once the write lock is held, so concurrent
    /// callers append in time order. A wall clock that stepped backwards is
    /// held at the newest stored timestamp.
    pub fn record(&self, raw: RegimeScore) -> Result<RegimeHistoryEntry> {
        self.append(raw, None)
    }

    /// Append with an explicit timestamp. `recorded_at` may equal but not
    /// precede the newest entry's timestamp.
    pub fn record_at(
        &self,
        raw: RegimeScore,
        recorded_at: DateTime<Utc>,
    ) -> Result<RegimeHistoryEntry> {
        self.append(raw, Some(recorded_at))
    }

    fn append(
        &self,
        raw: RegimeScore,
        recorded_at: Option<DateTime<Utc>>,
    ) -> Result<RegimeHistoryEntry> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let latest = tx
            .query_row(
                r#"
                SELECT recorded_at, smoothed_score
                FROM market_regime_history
                ORDER BY recorded_at DESC, id DESC
                LIMIT 1
                "#,
                [],
                |row| {
                    let ts: String = row.get(0)?;
                    Ok((parse_timestamp(0, &ts)?, row.get::<_, f64>(1)?))
                },
            )
            .optional()?;
        let latest_at = latest.map(|(ts, _)| ts);

        // Stored timestamps carry microseconds.
        let recorded_at = match recorded_at {
            Some(ts) => {
                let ts = ts.trunc_subsecs(6);
                if let Some(latest) = latest_at.filter(|latest| ts < *latest) {
                    return Err(RegimeError::OutOfOrder {
                        recorded_at: ts,
                        latest,
                    });
                }
                ts
            }
            None => {
                let now = Utc::now().trunc_subsecs(6);
                latest_at.map_or(now, |latest| now.max(latest))
            }
        };
        let prev = latest.map(|(_, smoothed)| RegimeScore::new(smoothed));

        let smoothed = self.smoother.smooth(prev, raw);
        let label = smoothed.label();
        tx.execute(
            r#"
            INSERT INTO market_regime_history (
                recorded_at, raw_score, smoothed_score, discrete_regime
            ) VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                format_timestamp(&recorded_at),
                raw.value(),
                smoothed.value(),
                label.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            id,
            raw = raw.value(),
            previous = prev.map(RegimeScore::value),
            smoothed = smoothed.value(),
            regime = label.as_str(),
            "Recorded regime score"
        );

        Ok(RegimeHistoryEntry {
            id,
            recorded_at,
            raw_score: raw,
            smoothed_score: smoothed,
            label,
        })
    }

    /// `latest - previous` smoothed score; 0.0 with fewer than two rows.
    pub fn score_change(&self) -> Result<f64> {
        let recent = self.recent_history(2)?;
        match recent.as_slice() {
            [latest, previous] => {
                Ok(latest.smoothed_score.value() - previous.smoothed_score.value())
            }
            _ => Ok(0.0),
        }
    }

    /// Newest first.
    pub fn recent_history(&self, limit: usize) -> Result<Vec<RegimeHistoryEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM market_regime_history
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?1
            "#
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], entry_from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM market_regime_history", [], |row| {
                row.get(0)
            })?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Fixed-width RFC 3339 so lexical order in sqlite matches time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<RegimeHistoryEntry> {
    let recorded_at: String = row.get(1)?;
    let smoothed_score = RegimeScore::new(row.get(3)?);
    let label: String = row.get(4)?;
    Ok(RegimeHistoryEntry {
        id: row.get(0)?,
        recorded_at: parse_timestamp(1, &recorded_at)?,
        raw_score: RegimeScore::new(row.get(2)?),
        smoothed_score,
        label: RegimeLabel::parse(&label).unwrap_or_else(|| smoothed_score.label()),
    })
}
