use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use crate::adaptation::types::{AdaptiveParameters, AdaptiveWeights, QualityGateThresholds};
use crate::error::{RegimeError, Result};
use crate::regime_store::{format_timestamp, parse_timestamp};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS adaptive_parameters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parameter_type TEXT NOT NULL UNIQUE,
    parameter_value TEXT NOT NULL,
    regime_score REAL NOT NULL,
    adapted_at TEXT NOT NULL
);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    ScoringWeights,
    OptimizerBlend,
    QualityGates,
}

impl ParameterType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScoringWeights => "scoring_weights",
            Self::OptimizerBlend => "optimizer_blend",
            Self::QualityGates => "quality_gates",
        }
    }
}

/// A stored parameter together with the score it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredParameter<T> {
    pub value: T,
    pub regime_score: f64,
    pub adapted_at: DateTime<Utc>,
}

/// Latest adapted parameters, one row per [`ParameterType`].
#[derive(Debug)]
pub struct AdaptiveParamsStore {
    conn: Mutex<Connection>,
}

impl AdaptiveParamsStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RegimeError::LockPoisoned)
    }

    /// Replace all three parameter rows in one transaction.
    pub fn persist(&self, parameters: &AdaptiveParameters) -> Result<()> {
        self.persist_at(parameters, Utc::now())
    }

    pub fn persist_at(
        &self,
        parameters: &AdaptiveParameters,
        adapted_at: DateTime<Utc>,
    ) -> Result<()> {
        let rows = [
            (
                ParameterType::ScoringWeights,
                serde_json::to_string(&parameters.weights)?,
            ),
            (
                ParameterType::OptimizerBlend,
                serde_json::to_string(&parameters.blend)?,
            ),
            (
                ParameterType::QualityGates,
                serde_json::to_string(&parameters.quality_gates)?,
            ),
        ];
        let adapted_at = format_timestamp(&adapted_at);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (kind, value) in &rows {
            tx.execute(
                r#"
                INSERT INTO adaptive_parameters (
                    parameter_type, parameter_value, regime_score, adapted_at
                ) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(parameter_type) DO UPDATE SET
                    parameter_value = excluded.parameter_value,
                    regime_score = excluded.regime_score,
                    adapted_at = excluded.adapted_at
                "#,
                params![kind.as_str(), value, parameters.regime_score, adapted_at],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            regime_score = parameters.regime_score,
            blend = parameters.blend,
            fundamentals_gate = parameters.quality_gates.fundamentals,
            long_term_gate = parameters.quality_gates.long_term,
            "Persisted adaptive parameters"
        );
        Ok(())
    }

    pub fn load_weights(&self) -> Result<Option<StoredParameter<AdaptiveWeights>>> {
        self.load(ParameterType::ScoringWeights)
    }

    pub fn load_blend(&self) -> Result<Option<StoredParameter<f64>>> {
        self.load(ParameterType::OptimizerBlend)
    }

    pub fn load_quality_gates(&self) -> Result<Option<StoredParameter<QualityGateThresholds>>> {
        self.load(ParameterType::QualityGates)
    }

    /// Score of the most recent adaptation, `None` before the first one.
    pub fn last_adapted_score(&self) -> Result<Option<f64>> {
        let conn = self.lock()?;
        let score = conn.query_row(
            r#"
            SELECT regime_score
            FROM adaptive_parameters
            ORDER BY adapted_at DESC, id DESC
            LIMIT 1
            "#,
            [],
            |row| row.get::<_, f64>(0),
        )
        .optional()?;
        Ok(score)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM adaptive_parameters", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn load<T: DeserializeOwned>(&self, kind: ParameterType) -> Result<Option<StoredParameter<T>>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                r#"
                SELECT parameter_value, regime_score, adapted_at
                FROM adaptive_parameters
                WHERE parameter_type = ?1
                "#,
                [kind.as_str()],
                |row| {
                    let adapted_at: String = row.get(2)?;
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        parse_timestamp(2, &adapted_at)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((value, regime_score, adapted_at)) => Ok(Some(StoredParameter {
                value: serde_json::from_str(&value)?,
                regime_score,
                adapted_at,
            })),
            None => Ok(None),
        }
    }
}
