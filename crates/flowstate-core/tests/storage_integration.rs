//! Integration tests for on-disk persistence across process restarts.

use chrono::NaiveDate;
use flowstate_core::{dispatch, Config, Database, MachineState, SessionConfig, Tracker};

fn reopen(dir: &tempfile::TempDir) -> Database {
    Database::open_at(&dir.path().join("flowstate.db")).unwrap()
}

fn load_tracker(db: &Database) -> Tracker {
    Tracker::new(db.load_machine().unwrap(), db.load_board().unwrap())
}

#[test]
fn test_board_and_profile_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let deadline = NaiveDate::from_ymd_opt(2026, 12, 18).unwrap();

    let (goal_id, task_id) = {
        let db = reopen(&dir);
        let mut tracker = load_tracker(&db);
        let (goal, fx) = tracker.add_goal("Robotics final", deadline, None).unwrap();
        dispatch(&db, &fx);
        dispatch(&db, &tracker.update_progress(&goal.id, 2, 8));
        let (task, fx) = tracker.add_task("Sensors", Some(&goal.id)).unwrap();
        dispatch(&db, &fx);
        let report = dispatch(&db, &tracker.toggle_task(&task.id));
        assert_eq!(report.applied, 2);
        (goal.id, task.id)
    };

    let db = reopen(&dir);
    let tracker = load_tracker(&db);
    let goal = tracker.board().goal(&goal_id).unwrap();
    assert_eq!(goal.completed_chapters, 2);
    assert_eq!(goal.total_chapters, 8);
    assert!(tracker.board().task(&task_id).unwrap().completed);
    assert_eq!(tracker.machine().profile().xp(), 50);
}

#[test]
fn test_paused_session_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = reopen(&dir);
        let mut tracker = load_tracker(&db);
        tracker
            .configure(SessionConfig::from_minutes(45, 15, 3).unwrap())
            .unwrap();
        tracker.start_session();
        for _ in 0..30 {
            tracker.tick();
        }
        tracker.pause();
        db.save_machine(tracker.machine()).unwrap();
    }

    let db = reopen(&dir);
    let machine = db.load_machine().unwrap();
    assert_eq!(machine.state(), MachineState::Paused);
    assert_eq!(machine.time_left(), 45 * 60 - 30);
    assert_eq!(machine.total_sets(), 3);
}

#[test]
fn test_goal_delete_cascades_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db = reopen(&dir);
    let mut tracker = load_tracker(&db);
    let deadline = NaiveDate::from_ymd_opt(2027, 1, 10).unwrap();

    let (goal, fx) = tracker.add_goal("Thesis", deadline, Some("#6366f1")).unwrap();
    dispatch(&db, &fx);
    let (_, fx) = tracker.import_tasks(&["Outline", "Draft", "Edit"], Some(&goal.id));
    dispatch(&db, &fx);
    let (_, fx) = tracker.add_task("Laundry", None).unwrap();
    dispatch(&db, &fx);
    assert_eq!(db.list_tasks().unwrap().len(), 4);

    dispatch(&db, &tracker.delete_goal(&goal.id));

    let tasks = db.list_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Laundry");
    assert!(db.list_goals().unwrap().is_empty());
}

#[test]
fn test_config_file_drives_session_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[timer]\nwork_minutes = 15\nbreak_minutes = 3\nsets = 5\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    let session = config.session_config().unwrap();

    assert_eq!(session, flowstate_core::timer::preset("15/3/5").unwrap());
}
