//! Pure functions over the task collection: the derived (filtered and
//! searched) view and aggregate statistics. No I/O happens here.

use crate::model::{Priority, Task};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn parse(raw: &str) -> Option<Filter> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Filter::All),
            "active" => Some(Filter::Active),
            "completed" => Some(Filter::Completed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.done,
            Filter::Completed => task.done,
        }
    }
}

/// The visible subset: tasks satisfying the filter predicate AND a
/// case-insensitive substring match on `name`. An empty search term
/// matches everything. Order is preserved.
pub fn derived_view<'a>(tasks: &'a [Task], filter: Filter, search: &str) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|task| filter.matches(task) && task.name.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub overdue: usize,
    /// Active tasks broken down by priority.
    pub by_priority: PriorityCounts,
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    stats_at(tasks, OffsetDateTime::now_utc())
}

pub fn stats_at(tasks: &[Task], now: OffsetDateTime) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };

    for task in tasks {
        if task.done {
            stats.completed += 1;
            continue;
        }

        stats.active += 1;
        if task.overdue_at(now) {
            stats.overdue += 1;
        }
        match task.priority {
            Priority::Low => stats.by_priority.low += 1,
            Priority::Medium => stats.by_priority.medium += 1,
            Priority::High => stats.by_priority.high += 1,
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::{Filter, derived_view, stats_at};
    use crate::model::{Priority, Task};
    use time::macros::datetime;

    fn task(id: i64, name: &str, done: bool, priority: Priority, due_date: Option<&str>) -> Task {
        Task {
            id,
            name: name.to_string(),
            done,
            priority,
            due_date: due_date.map(|value| value.to_string()),
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn filter_parse_accepts_known_values() {
        assert_eq!(Filter::parse(" All "), Some(Filter::All));
        assert_eq!(Filter::parse("active"), Some(Filter::Active));
        assert_eq!(Filter::parse("Completed"), Some(Filter::Completed));
        assert_eq!(Filter::parse("overdue"), None);
    }

    #[test]
    fn derived_view_single_active_task() {
        let tasks = vec![task(1, "buy milk", false, Priority::Low, None)];

        let view = derived_view(&tasks, Filter::Active, "");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 1);

        assert!(derived_view(&tasks, Filter::Completed, "").is_empty());

        let searched = derived_view(&tasks, Filter::All, "milk");
        assert_eq!(searched.len(), 1);

        assert!(derived_view(&tasks, Filter::All, "bread").is_empty());
    }

    #[test]
    fn derived_view_requires_both_predicates() {
        let tasks = vec![
            task(1, "buy milk", false, Priority::Low, None),
            task(2, "buy bread", true, Priority::Medium, None),
            task(3, "walk dog", false, Priority::Medium, None),
        ];

        let view = derived_view(&tasks, Filter::Active, "buy");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 1);
    }

    #[test]
    fn derived_view_search_is_case_insensitive() {
        let tasks = vec![task(1, "Buy Milk", false, Priority::Low, None)];
        assert_eq!(derived_view(&tasks, Filter::All, "MILK").len(), 1);
        assert_eq!(derived_view(&tasks, Filter::All, "buy m").len(), 1);
    }

    #[test]
    fn derived_view_empty_search_yields_filter_only_subset() {
        let tasks = vec![
            task(1, "a", false, Priority::Low, None),
            task(2, "b", true, Priority::Low, None),
            task(3, "c", false, Priority::Low, None),
        ];

        assert_eq!(derived_view(&tasks, Filter::All, "").len(), 3);
        assert_eq!(derived_view(&tasks, Filter::Active, "").len(), 2);
        assert_eq!(derived_view(&tasks, Filter::Completed, "").len(), 1);
    }

    #[test]
    fn derived_view_preserves_order() {
        let tasks = vec![
            task(3, "first", false, Priority::Low, None),
            task(1, "second", false, Priority::Low, None),
            task(2, "third", false, Priority::Low, None),
        ];

        let view = derived_view(&tasks, Filter::All, "");
        let ids: Vec<i64> = view.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn stats_counts_add_up() {
        let tasks = vec![
            task(1, "a", false, Priority::Low, Some("2000-01-01")),
            task(2, "b", true, Priority::Low, Some("2000-01-01")),
            task(3, "c", false, Priority::Medium, None),
        ];

        let stats = stats_at(&tasks, datetime!(2026-01-01 00:00 UTC));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completed + stats.active, stats.total);
    }

    #[test]
    fn stats_overdue_tracks_done_flag_live() {
        let mut tasks = vec![task(1, "a", false, Priority::Low, Some("2000-01-01"))];
        let now = datetime!(2026-01-01 00:00 UTC);

        assert_eq!(stats_at(&tasks, now).overdue, 1);

        tasks[0].done = true;
        let stats = stats_at(&tasks, now);
        assert_eq!(stats.overdue, 0);
        assert_eq!(tasks[0].due_date.as_deref(), Some("2000-01-01"));
    }

    #[test]
    fn stats_skips_unparseable_due_dates() {
        let tasks = vec![task(1, "a", false, Priority::Low, Some("someday"))];
        assert_eq!(stats_at(&tasks, datetime!(2026-01-01 00:00 UTC)).overdue, 0);
    }

    #[test]
    fn stats_by_priority_counts_active_tasks_only() {
        let tasks = vec![
            task(1, "a", false, Priority::High, None),
            task(2, "b", false, Priority::High, None),
            task(3, "c", true, Priority::High, None),
            task(4, "d", false, Priority::Low, None),
        ];

        let stats = stats_at(&tasks, datetime!(2026-01-01 00:00 UTC));
        assert_eq!(stats.by_priority.high, 2);
        assert_eq!(stats.by_priority.low, 1);
        assert_eq!(stats.by_priority.medium, 0);
    }

    #[test]
    fn stats_on_empty_collection() {
        let stats = stats_at(&[], datetime!(2026-01-01 00:00 UTC));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.active, 0);
        assert_eq!(stats.overdue, 0);
    }
}
