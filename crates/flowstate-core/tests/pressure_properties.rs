//! Property and scenario tests for the pressure engine.

use chrono::{Duration, TimeZone, Utc};
use flowstate_core::pressure::{
    days_remaining, overall_pressure, pressure_index, progress_percentage, urgency_tag,
    DEFAULT_HORIZON_DAYS,
};
use flowstate_core::{calculate_all_pressures, Goal, Urgency};
use proptest::prelude::*;

fn goal(days_out: i64, completed: u32, total: u32) -> Goal {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
    let mut goal = Goal::new("Finals", now.date_naive());
    goal.deadline = now + Duration::days(days_out);
    goal.completed_chapters = completed;
    goal.total_chapters = total;
    goal
}

#[test]
fn test_thirty_days_out_with_no_progress_is_critical() {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
    let g = goal(30, 0, 10);
    let report = calculate_all_pressures(std::slice::from_ref(&g), now, DEFAULT_HORIZON_DAYS);

    assert_eq!(report.pressure[&g.id], 100.0);
    assert_eq!(report.urgency[&g.id], Urgency::Critical);
    assert_eq!(report.goals[0].days_left, 30);
    assert_eq!(report.goals[0].progress_pct, 0);
}

#[test]
fn test_zero_total_chapters_reads_as_no_pressure() {
    assert_eq!(pressure_index(0, 0, 10, 365), 0.0);
    assert_eq!(progress_percentage(3, 0), 0);
}

#[test]
fn test_urgency_rules_apply_in_order() {
    // 75 > 70 wins before the deadline rules are consulted.
    assert_eq!(urgency_tag(75.0, 20), Urgency::Critical);
    assert_eq!(urgency_tag(60.0, 20), Urgency::Urgent);
    assert_eq!(urgency_tag(20.0, 20), Urgency::Medium);
    assert_eq!(urgency_tag(20.0, 45), Urgency::Comfortable);
}

#[test]
fn test_overall_is_plain_mean() {
    assert_eq!(overall_pressure(&[]), 0.0);
    assert!((overall_pressure(&[100.0, 0.0, 50.5]) - 50.166_666).abs() < 1e-3);
}

#[test]
fn test_past_deadline_counts_zero_days() {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    assert_eq!(days_remaining(now - Duration::days(3), now), 0);
    // 0 days left with nothing done: full expectation, full gap.
    assert_eq!(pressure_index(0, 5, 0, 365), 100.0);
}

proptest! {
    #[test]
    fn pressure_stays_in_range(
        completed in 0u32..500,
        total in 0u32..500,
        days_left in 0u32..2000,
        total_days in 0u32..2000,
    ) {
        let p = pressure_index(completed, total, days_left, total_days);
        prop_assert!((0.0..=100.0).contains(&p));
    }

    #[test]
    fn more_progress_never_raises_pressure(
        completed in 0u32..100,
        extra in 1u32..100,
        total in 1u32..200,
        days_left in 0u32..365,
    ) {
        let before = pressure_index(completed, total, days_left, 365);
        let after = pressure_index(completed + extra, total, days_left, 365);
        prop_assert!(after <= before);
    }

    #[test]
    fn fewer_days_never_lowers_pressure(
        completed in 0u32..100,
        total in 1u32..100,
        days_left in 1u32..365,
        fewer in 1u32..365,
    ) {
        let later = pressure_index(completed, total, days_left, 365);
        let sooner = pressure_index(completed, total, days_left.saturating_sub(fewer), 365);
        prop_assert!(sooner >= later);
    }

    #[test]
    fn progress_percentage_is_capped(completed in 0u32..1000, total in 1u32..1000) {
        prop_assert!(progress_percentage(completed, total) <= 100);
    }
}
