use chrono::{DateTime, Local};

use crate::error::{Result, TaskError};
use crate::model::{Task, TaskKind};

/// Importance of `task` at instant `now`.
///
/// Deadline tasks ramp up as the due date approaches,
/// `value * due_date_importance * 24 / hours_left`, and once overdue decay as
/// `value * due_date_importance / (decrease_rate * hours_past_due)`.
/// Hobbies score `value * weekly_hours`.
pub fn importance(task: &Task, now: DateTime<Local>) -> Result<f64> {
    match task.kind {
        TaskKind::Deadline => deadline_importance(task, now),
        TaskKind::Hobby => hobby_importance(task),
    }
}

fn deadline_importance(task: &Task, now: DateTime<Local>) -> Result<f64> {
    let hours_left = task
        .time_left_hours(now)
        .ok_or_else(|| TaskError::ScoringPrecondition("task has no due date".to_string()))?;

    if hours_left == 0.0 {
        return Err(TaskError::DivideByZeroAtDeadline { id: task.id() });
    }

    let weight = task.value as f64 * task.due_date_importance as f64;

    if hours_left > 0.0 {
        return Ok(weight * (24.0 / hours_left));
    }

    if task.past_due_importance_decrease_rate == 0 {
        return Err(TaskError::ScoringPrecondition(
            "overdue task has a zero importance decrease rate".to_string(),
        ));
    }
    Ok(weight / (task.past_due_importance_decrease_rate as f64 * -hours_left))
}

fn hobby_importance(task: &Task) -> Result<f64> {
    let hours = task
        .time_per_week_hours()
        .ok_or_else(|| TaskError::ScoringPrecondition("hobby has no time per week".to_string()))?;
    Ok(task.value as f64 * hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn deadline(value: i64, due_date_importance: i64, rate: i64, due_in: Duration) -> Task {
        let mut task = Task::new(TaskKind::Deadline, value, due_date_importance);
        task.past_due_importance_decrease_rate = rate;
        task.due_date = Some(now() + due_in);
        task
    }

    #[test]
    fn due_in_two_hours() {
        let task = deadline(8, 1, 7, Duration::hours(2));
        assert_eq!(importance(&task, now()).unwrap(), 96.0);
    }

    #[test]
    fn overdue_by_three_hours() {
        let task = deadline(8, 1, 7, Duration::hours(-3));
        let score = importance(&task, now()).unwrap();
        assert!((score - 8.0 / 21.0).abs() < 1e-12);
        assert!((score - 0.381).abs() < 1e-3);
    }

    #[test]
    fn closer_deadlines_matter_more() {
        let mut previous = f64::INFINITY;
        for minutes in [1, 30, 60, 90, 24 * 60, 7 * 24 * 60] {
            let task = deadline(3, 2, 1, Duration::minutes(minutes));
            let score = importance(&task, now()).unwrap();
            assert!(score < previous, "{} minutes scored {}", minutes, score);
            previous = score;
        }
    }

    #[test]
    fn overdue_tasks_fade() {
        let mut previous = f64::INFINITY;
        for hours in [1, 2, 5, 48, 1000] {
            let task = deadline(3, 2, 4, Duration::hours(-hours));
            let score = importance(&task, now()).unwrap();
            assert!(score > 0.0);
            assert!(score < previous, "{} hours overdue scored {}", hours, score);
            previous = score;
        }
    }

    #[test]
    fn ramp_and_decay_are_not_inverse() {
        // due_date_importance multiplies on both sides; only the decay rate divides.
        let before = deadline(2, 5, 10, Duration::hours(24));
        let after = deadline(2, 5, 10, Duration::hours(-24));
        assert_eq!(importance(&before, now()).unwrap(), 10.0);
        assert_eq!(importance(&after, now()).unwrap(), 10.0 / 240.0);
    }

    #[test]
    fn exactly_due_is_an_error() {
        let task = deadline(8, 1, 7, Duration::zero());
        assert!(matches!(
            importance(&task, now()),
            Err(TaskError::DivideByZeroAtDeadline { id: None })
        ));
    }

    #[test]
    fn one_millisecond_either_side_is_scored() {
        assert!(importance(&deadline(1, 1, 1, Duration::milliseconds(1)), now()).is_ok());
        assert!(importance(&deadline(1, 1, 1, Duration::milliseconds(-1)), now()).is_ok());
    }

    #[test]
    fn missing_due_date() {
        let task = Task::new(TaskKind::Deadline, 1, 1);
        assert!(matches!(
            importance(&task, now()),
            Err(TaskError::ScoringPrecondition(_))
        ));
    }

    #[test]
    fn zero_decay_rate_only_matters_once_overdue() {
        let upcoming = deadline(1, 1, 0, Duration::hours(4));
        assert_eq!(importance(&upcoming, now()).unwrap(), 6.0);

        let overdue = deadline(1, 1, 0, Duration::hours(-4));
        assert!(matches!(
            importance(&overdue, now()),
            Err(TaskError::ScoringPrecondition(_))
        ));
    }

    #[test]
    fn hobby_scores_weekly_effort() {
        let mut hobby = Task::new(TaskKind::Hobby, 4, 1);
        hobby.time_per_week = NaiveTime::from_hms_opt(1, 45, 0);
        assert_eq!(importance(&hobby, now()).unwrap(), 7.0);

        hobby.time_per_week = None;
        assert!(matches!(
            importance(&hobby, now()),
            Err(TaskError::ScoringPrecondition(_))
        ));
    }

    #[test]
    fn deadline_ignores_weekly_effort_and_absolute_date() {
        let mut task = deadline(8, 1, 7, Duration::hours(2));
        task.time_per_week = NaiveTime::from_hms_opt(5, 0, 0);
        task.absolute_date = true;
        assert_eq!(importance(&task, now()).unwrap(), 96.0);
    }
}
