//! SQLite database for simulation results
//!
//! Persistent storage and querying of session results across runs.
//! Uses WAL mode for concurrent reads during writes. The schema is a
//! lossless round-trip of the SessionResult fields plus an optional
//! per-bet audit table.

use rusqlite::{Connection, Result, params};
use std::path::Path;

use crate::strategy::{BetOutcome, SessionResult, TerminationReason};

/// Database wrapper for simulation results
pub struct ResultDatabase {
    conn: Connection,
}

impl ResultDatabase {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for concurrent reads during writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                strategy TEXT NOT NULL,
                config_json TEXT
            );

            CREATE TABLE IF NOT EXISTS session_results (
                id INTEGER PRIMARY KEY,
                run_id TEXT REFERENCES runs(id),
                session INTEGER NOT NULL,
                seed INTEGER NOT NULL,
                strategy TEXT NOT NULL,
                final_balance REAL NOT NULL,
                peak_balance REAL NOT NULL,
                trough_balance REAL NOT NULL,
                bets_placed INTEGER NOT NULL,
                total_wagered REAL NOT NULL,
                net_profit REAL NOT NULL,
                reason TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_results_run ON session_results(run_id);
            CREATE INDEX IF NOT EXISTS idx_results_strategy ON session_results(strategy);

            -- Per-bet audit trail, written only when requested
            CREATE TABLE IF NOT EXISTS bet_outcomes (
                id INTEGER PRIMARY KEY,
                result_id INTEGER REFERENCES session_results(id),
                bet_index INTEGER NOT NULL,
                amount REAL NOT NULL,
                roll REAL NOT NULL,
                threshold REAL NOT NULL,
                win INTEGER NOT NULL,
                profit REAL NOT NULL,
                balance_after REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_outcomes_result ON bet_outcomes(result_id, bet_index);
            "#,
        )?;
        Ok(())
    }

    /// Create a new run and return its ID
    pub fn create_run(&self, strategy: &str, config_json: Option<&str>) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO runs (id, created_at, strategy, config_json) VALUES (?1, ?2, ?3, ?4)",
            params![id, created_at, strategy, config_json],
        )?;

        Ok(id)
    }

    /// Insert one session result and return its row ID
    pub fn insert_result(&self, run_id: &str, result: &SessionResult) -> Result<i64> {
        self.conn.execute(
            r#"INSERT INTO session_results
               (run_id, session, seed, strategy, final_balance, peak_balance,
                trough_balance, bets_placed, total_wagered, net_profit, reason)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                run_id,
                result.session as i64,
                result.seed as i64,
                result.strategy,
                result.final_balance,
                result.peak_balance,
                result.trough_balance,
                result.bets_placed as i64,
                result.total_wagered,
                result.net_profit,
                result.reason.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a batch of session results
    pub fn insert_results(&self, run_id: &str, results: &[SessionResult]) -> Result<()> {
        for result in results {
            self.insert_result(run_id, result)?;
        }
        Ok(())
    }

    /// Insert the per-bet audit trail for one session
    pub fn insert_outcomes(&self, result_id: i64, outcomes: &[BetOutcome]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            r#"INSERT INTO bet_outcomes
               (result_id, bet_index, amount, roll, threshold, win, profit, balance_after)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
        )?;
        for outcome in outcomes {
            stmt.execute(params![
                result_id,
                outcome.index as i64,
                outcome.amount,
                outcome.roll,
                outcome.threshold,
                outcome.win as i64,
                outcome.profit,
                outcome.balance_after,
            ])?;
        }
        Ok(())
    }

    /// Load all session results for a run, in session order
    pub fn get_results(&self, run_id: &str) -> Result<Vec<SessionResult>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT session, seed, strategy, final_balance, peak_balance,
                      trough_balance, bets_placed, total_wagered, net_profit, reason
               FROM session_results WHERE run_id = ?1 ORDER BY session"#,
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            let reason: String = row.get(9)?;
            Ok(SessionResult {
                session: row.get::<_, i64>(0)? as u64,
                seed: row.get::<_, i64>(1)? as u64,
                strategy: row.get(2)?,
                final_balance: row.get(3)?,
                peak_balance: row.get(4)?,
                trough_balance: row.get(5)?,
                bets_placed: row.get::<_, i64>(6)? as u64,
                total_wagered: row.get(7)?,
                net_profit: row.get(8)?,
                reason: parse_reason(&reason),
            })
        })?;

        rows.collect()
    }

    /// Aggregate stats for one strategy across all stored runs
    pub fn get_strategy_stats(&self, strategy: &str) -> Result<StrategyStats> {
        let mut stmt = self.conn.prepare(
            r#"SELECT
                COUNT(*) as sessions,
                SUM(CASE WHEN net_profit > 0 THEN 1 ELSE 0 END) as profitable,
                AVG(net_profit) as avg_profit,
                AVG(bets_placed) as avg_bets
               FROM session_results
               WHERE strategy = ?1"#,
        )?;

        stmt.query_row(params![strategy], |row| {
            Ok(StrategyStats {
                strategy: strategy.to_string(),
                sessions: row.get(0)?,
                profitable: row.get::<_, Option<u32>>(1)?.unwrap_or(0),
                avg_profit: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                avg_bets: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })
    }

    /// Strategy labels recorded on runs; strategy sweeps record a single
    /// "sweep" run spanning every variant
    pub fn run_strategies(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT strategy FROM runs ORDER BY strategy")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    /// All strategies present in the database
    pub fn strategies(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT strategy FROM session_results ORDER BY strategy")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    /// Get result count
    pub fn result_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM session_results", [], |row| row.get(0))
    }

    /// Get run count
    pub fn run_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))
    }

    /// Get audit row count for one session result
    pub fn outcome_count(&self, result_id: i64) -> Result<u64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM bet_outcomes WHERE result_id = ?1",
            params![result_id],
            |row| row.get(0),
        )
    }
}

fn parse_reason(reason: &str) -> TerminationReason {
    TerminationReason::all()
        .into_iter()
        .find(|r| r.as_str() == reason)
        .unwrap_or(TerminationReason::BetLimitReached)
}

/// Aggregate stats for one strategy
#[derive(Debug, Clone)]
pub struct StrategyStats {
    pub strategy: String,
    pub sessions: u32,
    pub profitable: u32,
    pub avg_profit: f64,
    pub avg_bets: f64,
}

impl StrategyStats {
    pub fn profit_rate(&self) -> f64 {
        if self.sessions == 0 {
            0.0
        } else {
            self.profitable as f64 / self.sessions as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(session: u64, net_profit: f64) -> SessionResult {
        SessionResult {
            session,
            seed: 42 + session,
            strategy: "martingale".to_string(),
            final_balance: 100.0 + net_profit,
            peak_balance: 110.0,
            trough_balance: 80.0,
            bets_placed: 250,
            total_wagered: 400.0,
            net_profit,
            reason: TerminationReason::BetLimitReached,
        }
    }

    #[test]
    fn test_create_database() {
        let db = ResultDatabase::open_in_memory().unwrap();
        assert_eq!(db.result_count().unwrap(), 0);
        assert_eq!(db.run_count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_load_results() {
        let db = ResultDatabase::open_in_memory().unwrap();
        let run_id = db.create_run("martingale", None).unwrap();

        db.insert_result(&run_id, &sample_result(0, -5.0)).unwrap();
        db.insert_result(&run_id, &sample_result(1, 3.0)).unwrap();

        let loaded = db.get_results(&run_id).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].session, 0);
        assert_eq!(loaded[0].net_profit, -5.0);
        assert_eq!(loaded[1].reason, TerminationReason::BetLimitReached);
        assert_eq!(loaded[1].strategy, "martingale");
    }

    #[test]
    fn test_strategy_stats() {
        let db = ResultDatabase::open_in_memory().unwrap();
        let run_id = db.create_run("martingale", Some("{}")).unwrap();
        for i in 0..4 {
            let profit = if i % 2 == 0 { 10.0 } else { -10.0 };
            db.insert_result(&run_id, &sample_result(i, profit)).unwrap();
        }

        let stats = db.get_strategy_stats("martingale").unwrap();
        assert_eq!(stats.sessions, 4);
        assert_eq!(stats.profitable, 2);
        assert_eq!(stats.profit_rate(), 0.5);
        assert_eq!(stats.avg_profit, 0.0);
    }

    #[test]
    fn test_outcome_audit_trail() {
        let db = ResultDatabase::open_in_memory().unwrap();
        let run_id = db.create_run("flat", None).unwrap();
        let result_id = db.insert_result(&run_id, &sample_result(0, 1.0)).unwrap();

        let outcomes = vec![
            BetOutcome {
                index: 0,
                amount: 1.0,
                roll: 12.5,
                threshold: 49.5,
                win: true,
                profit: 1.0,
                balance_after: 101.0,
            },
            BetOutcome {
                index: 1,
                amount: 1.0,
                roll: 99.0,
                threshold: 49.5,
                win: false,
                profit: -1.0,
                balance_after: 100.0,
            },
        ];
        db.insert_outcomes(result_id, &outcomes).unwrap();
        assert_eq!(db.outcome_count(result_id).unwrap(), 2);
    }

    #[test]
    fn test_lists_distinct_strategies() {
        let db = ResultDatabase::open_in_memory().unwrap();
        let run_id = db.create_run("mixed", None).unwrap();
        db.insert_result(&run_id, &sample_result(0, 0.5)).unwrap();
        let mut other = sample_result(1, 0.5);
        other.strategy = "flat".to_string();
        db.insert_result(&run_id, &other).unwrap();

        assert_eq!(db.strategies().unwrap(), vec!["flat", "martingale"]);
    }

    #[test]
    fn test_lists_run_strategies() {
        let db = ResultDatabase::open_in_memory().unwrap();
        db.create_run("sweep", None).unwrap();
        db.create_run("flat", None).unwrap();
        assert_eq!(db.run_strategies().unwrap(), vec!["flat", "sweep"]);
    }
}
