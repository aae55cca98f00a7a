//! SQLite-backed goal, task, and profile storage.
//!
//! Provides persistent storage for:
//! - Goals and their chapter progress
//! - Tasks (deleted with their goal)
//! - The single-row gamification profile
//! - Key-value store for application state (the serialized session machine)
//!
//! `Database` implements the store traits the core dispatches effects to.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::data_dir;
use crate::board::{Board, Goal, Task};
use crate::effects::{GoalStore, ProfileStore, TaskStore};
use crate::error::{DatabaseError, Result};
use crate::gamification::{Profile, ProfileStats};
use crate::timer::SessionMachine;

const MACHINE_KEY: &str = "session_machine";

/// SQLite database for study data.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/flowstate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("flowstate.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS goals (
                    id                 TEXT PRIMARY KEY,
                    title              TEXT NOT NULL,
                    deadline           TEXT NOT NULL,
                    completed_chapters INTEGER NOT NULL DEFAULT 0,
                    total_chapters     INTEGER NOT NULL DEFAULT 1,
                    color              TEXT NOT NULL DEFAULT '#10b981',
                    created_at         TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id         TEXT PRIMARY KEY,
                    title      TEXT NOT NULL,
                    completed  INTEGER NOT NULL DEFAULT 0,
                    goal_id    TEXT REFERENCES goals(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS profile (
                    id                 INTEGER PRIMARY KEY CHECK (id = 1),
                    xp                 INTEGER NOT NULL DEFAULT 0,
                    level              INTEGER NOT NULL DEFAULT 1,
                    sessions_completed INTEGER NOT NULL DEFAULT 0,
                    total_time_min     INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_goal_id ON tasks(goal_id);
                CREATE INDEX IF NOT EXISTS idx_goals_deadline ON goals(deadline);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, deadline, completed_chapters, total_chapters, color, created_at
             FROM goals
             ORDER BY deadline, rowid",
        )?;
        let rows = stmt.query_map([], row_to_goal)?;
        let goals = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, completed, goal_id, created_at
             FROM tasks
             ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], row_to_task)?;
        let tasks = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn load_board(&self) -> Result<Board> {
        Ok(Board::new(self.list_goals()?, self.list_tasks()?))
    }

    /// Stored level is ignored; it is re-derived from xp.
    pub fn load_profile(&self) -> Result<Profile> {
        let stats = self
            .conn
            .query_row(
                "SELECT xp, level, sessions_completed, total_time_min FROM profile WHERE id = 1",
                [],
                |row| {
                    Ok(ProfileStats {
                        xp: row.get(0)?,
                        level: row.get(1)?,
                        sessions_completed: row.get(2)?,
                        total_time_min: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(stats.map(Profile::from).unwrap_or_default())
    }

    /// The persisted session machine, with its profile replaced by the
    /// profile table (the source of truth for stats).
    pub fn load_machine(&self) -> Result<SessionMachine> {
        let profile = self.load_profile()?;
        let machine = match self.kv_get(MACHINE_KEY)? {
            Some(json) => match serde_json::from_str::<SessionMachine>(&json) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable session state");
                    SessionMachine::new()
                }
            },
            None => SessionMachine::new(),
        };
        Ok(machine.with_restored_profile(profile))
    }

    pub fn save_machine(&self, machine: &SessionMachine) -> Result<()> {
        let json = serde_json::to_string(machine)?;
        self.kv_set(MACHINE_KEY, &json)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn parse_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        deadline: parse_ts(2, row.get(2)?)?,
        completed_chapters: row.get(3)?,
        total_chapters: row.get(4)?,
        color: row.get(5)?,
        created_at: parse_ts(6, row.get(6)?)?,
    })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: row.get(2)?,
        goal_id: row.get(3)?,
        created_at: parse_ts(4, row.get(4)?)?,
    })
}

impl TaskStore for Database {
    fn mark_completed(&self, task_id: &str) -> Result<()> {
        self.set_completed(task_id, true)
    }

    fn set_completed(&self, task_id: &str, completed: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE tasks SET completed = ?2 WHERE id = ?1",
            params![task_id, completed],
        )?;
        Ok(())
    }

    fn insert_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, completed, goal_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.id,
                task.title,
                task.completed,
                task.goal_id,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete_task(&self, task_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        Ok(())
    }
}

impl ProfileStore for Database {
    fn persist_stats(&self, stats: &ProfileStats) -> Result<()> {
        self.conn.execute(
            "INSERT INTO profile (id, xp, level, sessions_completed, total_time_min)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                xp = excluded.xp,
                level = excluded.level,
                sessions_completed = excluded.sessions_completed,
                total_time_min = excluded.total_time_min",
            params![
                stats.xp,
                stats.level,
                stats.sessions_completed,
                stats.total_time_min,
            ],
        )?;
        Ok(())
    }
}

impl GoalStore for Database {
    fn persist_progress(&self, goal_id: &str, completed: u32, total: u32) -> Result<()> {
        self.conn.execute(
            "UPDATE goals SET completed_chapters = ?2, total_chapters = ?3 WHERE id = ?1",
            params![goal_id, completed, total],
        )?;
        Ok(())
    }

    fn insert_goal(&self, goal: &Goal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO goals (id, title, deadline, completed_chapters, total_chapters, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                goal.id,
                goal.title,
                goal.deadline.to_rfc3339(),
                goal.completed_chapters,
                goal.total_chapters,
                goal.color,
                goal.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete_goal(&self, goal_id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM goals WHERE id = ?1", params![goal_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::dispatch;
    use crate::tracker::Tracker;
    use chrono::NaiveDate;

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()
    }

    #[test]
    fn goal_and_task_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mut board = Board::default();
        let (goal, fx1) = board.add_goal("Finals", deadline(), None).unwrap();
        let (_, fx2) = board.add_task("Ch 1", Some(&goal.id)).unwrap();
        dispatch(&db, &fx1);
        dispatch(&db, &fx2);

        let loaded = db.load_board().unwrap();
        assert_eq!(loaded.goals(), board.goals());
        assert_eq!(loaded.tasks(), board.tasks());
    }

    #[test]
    fn deleting_goal_cascades_in_storage() {
        let db = Database::open_memory().unwrap();
        let mut board = Board::default();
        let (goal, fx) = board.add_goal("Finals", deadline(), None).unwrap();
        dispatch(&db, &fx);
        let (_, fx) = board.import_tasks(&["a", "b"], Some(&goal.id));
        dispatch(&db, &fx);
        let (_, fx) = board.add_task("general", None).unwrap();
        dispatch(&db, &fx);

        let report = dispatch(&db, &board.delete_goal(&goal.id));

        assert_eq!(report.failed, 0);
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "general");
    }

    #[test]
    fn profile_defaults_then_persists() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.load_profile().unwrap(), Profile::default());

        let profile = Profile::new(1050, 7, 175);
        db.persist_stats(&profile.stats()).unwrap();
        db.persist_stats(&profile.stats()).unwrap();

        let loaded = db.load_profile().unwrap();
        assert_eq!(loaded, profile);
        assert_eq!(loaded.level(), 3);
    }

    #[test]
    fn progress_and_completion_updates() {
        let db = Database::open_memory().unwrap();
        let mut tracker = Tracker::default();
        let (goal, fx) = tracker.add_goal("Finals", deadline(), None).unwrap();
        dispatch(&db, &fx);
        let (task, fx) = tracker.add_task("Ch 1", Some(&goal.id)).unwrap();
        dispatch(&db, &fx);

        dispatch(&db, &tracker.update_progress(&goal.id, 4, 12));
        dispatch(&db, &tracker.toggle_task(&task.id));

        let board = db.load_board().unwrap();
        assert_eq!(board.goals()[0].completed_chapters, 4);
        assert_eq!(board.goals()[0].total_chapters, 12);
        assert!(board.tasks()[0].completed);
        assert_eq!(db.load_profile().unwrap().xp(), 50);
    }

    #[test]
    fn machine_state_survives_reload() {
        let db = Database::open_memory().unwrap();
        let mut machine = SessionMachine::new();
        machine.start_session();
        machine.tick();
        db.save_machine(&machine).unwrap();
        db.persist_stats(&Profile::new(200, 2, 50).stats()).unwrap();

        let loaded = db.load_machine().unwrap();
        assert_eq!(loaded.time_left(), 25 * 60 - 1);
        assert!(loaded.is_active());
        assert_eq!(loaded.profile().xp(), 200);
    }

    #[test]
    fn corrupt_machine_state_falls_back_to_setup() {
        let db = Database::open_memory().unwrap();
        db.kv_set(MACHINE_KEY, "{not json").unwrap();
        let loaded = db.load_machine().unwrap();
        assert!(loaded.is_setup_mode());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().as_deref(), Some("hello"));
    }
}
