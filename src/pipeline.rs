//! Pure derived-state pipeline: filtering, sorting and aggregation over raw
//! entity collections.
//!
//! Every function here is referentially transparent and holds no state,
//! which is what allows the offload scheduler to run the same code on a
//! background thread with results identical to inline execution.

use crate::types::{
  DueDateRange, Priority, Project, ProjectStats, ProjectStatus, SortBy, SortOrder, Task,
  TaskFilter, TaskStats, TaskStatus,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Return the subset of `tasks` matching every set field of `filter`,
/// preserving input order. Unset fields impose no constraint.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
  tasks
    .iter()
    .filter(|task| matches_filter(task, filter))
    .cloned()
    .collect()
}

fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
  if let Some(status) = filter.status {
    if task.status != status {
      return false;
    }
  }
  if let Some(priority) = filter.priority {
    if task.priority != priority {
      return false;
    }
  }
  if let Some(assignee) = &filter.assignee {
    if task.assignee_id.as_deref() != Some(assignee.as_str()) {
      return false;
    }
  }
  if let Some(project) = &filter.project {
    if task.project_id != *project {
      return false;
    }
  }
  if let Some(search) = &filter.search {
    let needle = search.to_lowercase();
    if !task.title.to_lowercase().contains(&needle)
      && !task.description.to_lowercase().contains(&needle)
    {
      return false;
    }
  }
  if let Some(range) = &filter.due_date {
    if !matches_due_range(task.due_date, range) {
      return false;
    }
  }
  true
}

fn matches_due_range(due_date: Option<DateTime<Utc>>, range: &DueDateRange) -> bool {
  if !range.is_bounded() {
    return true;
  }
  // An undated task cannot satisfy a bound, so a bounded range excludes it.
  let due = match due_date {
    Some(d) => d,
    None => return false,
  };
  if let Some(from) = range.from {
    if due < from {
      return false;
    }
  }
  if let Some(to) = range.to {
    if due > to {
      return false;
    }
  }
  true
}

/// Return a new vector sorted by `sort_by` in `order`. The input is left
/// untouched; ties keep their relative input order (stable sort).
///
/// A missing due date sorts as the Unix epoch, so undated tasks come first
/// in ascending due-date order.
pub fn sort_tasks(tasks: &[Task], sort_by: SortBy, order: SortOrder) -> Vec<Task> {
  let mut sorted = tasks.to_vec();
  sorted.sort_by(|a, b| {
    let comparison = compare_tasks(a, b, sort_by);
    match order {
      SortOrder::Asc => comparison,
      SortOrder::Desc => comparison.reverse(),
    }
  });
  sorted
}

fn compare_tasks(a: &Task, b: &Task, sort_by: SortBy) -> Ordering {
  match sort_by {
    SortBy::Priority => a.priority.rank().cmp(&b.priority.rank()),
    SortBy::DueDate => {
      let a_due = a.due_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
      let b_due = b.due_date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
      a_due.cmp(&b_due)
    }
    SortBy::Status => a.status.rank().cmp(&b.status.rank()),
    SortBy::Title => compare_titles(&a.title, &b.title),
  }
}

/// Case-insensitive title comparison with a bytewise tiebreak.
fn compare_titles(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}

/// Aggregate statistics over a task collection and the project list.
/// Single pass over each; `completion_rate` is 0 for an empty task list.
pub fn calculate_stats(tasks: &[Task], projects: &[Project]) -> TaskStats {
  let mut stats = TaskStats::default();
  stats.total_tasks = tasks.len();

  for task in tasks {
    match task.status {
      TaskStatus::Todo => stats.todo_tasks += 1,
      TaskStatus::InProgress => stats.in_progress_tasks += 1,
      TaskStatus::Done => stats.completed_tasks += 1,
    }
    match task.priority {
      Priority::Urgent => stats.priority_distribution.urgent += 1,
      Priority::High => stats.priority_distribution.high += 1,
      Priority::Medium => stats.priority_distribution.medium += 1,
      Priority::Low => stats.priority_distribution.low += 1,
    }
  }

  if stats.total_tasks > 0 {
    stats.completion_rate = (stats.completed_tasks as f64 / stats.total_tasks as f64) * 100.0;
  }

  stats.active_projects = projects
    .iter()
    .filter(|p| p.status == ProjectStatus::Active)
    .count();

  stats
}

/// Task breakdown for a single project.
pub fn project_stats(tasks: &[Task], project_id: &str) -> ProjectStats {
  let mut stats = ProjectStats::default();

  for task in tasks.iter().filter(|t| t.project_id == project_id) {
    stats.total_tasks += 1;
    match task.status {
      TaskStatus::Todo => stats.todo_tasks += 1,
      TaskStatus::InProgress => stats.in_progress_tasks += 1,
      TaskStatus::Done => stats.completed_tasks += 1,
    }
  }

  if stats.total_tasks > 0 {
    stats.completion_percentage =
      (stats.completed_tasks as f64 / stats.total_tasks as f64) * 100.0;
  }

  stats
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn task(id: &str, title: &str, status: TaskStatus, priority: Priority) -> Task {
    let now = Utc::now();
    Task {
      id: id.to_string(),
      title: title.to_string(),
      description: String::new(),
      status,
      priority,
      due_date: None,
      assignee_id: None,
      assignee: None,
      project_id: "1".to_string(),
      created_by: "1".to_string(),
      created_at: now,
      updated_at: now,
    }
  }

  fn project(id: &str, status: ProjectStatus) -> Project {
    let now = Utc::now();
    Project {
      id: id.to_string(),
      title: format!("Project {}", id),
      description: String::new(),
      deadline: None,
      priority: Priority::Medium,
      status,
      created_by: "1".to_string(),
      members: vec!["1".to_string()],
      created_at: now,
      updated_at: now,
    }
  }

  fn sample_tasks() -> Vec<Task> {
    let mut a = task("1", "Write docs", TaskStatus::Todo, Priority::Low);
    a.description = "Document the caching layer".to_string();
    a.assignee_id = Some("1".to_string());
    a.due_date = Some(Utc::now() + Duration::days(3));

    let mut b = task("2", "Fix login bug", TaskStatus::InProgress, Priority::Urgent);
    b.assignee_id = Some("2".to_string());
    b.project_id = "2".to_string();
    b.due_date = Some(Utc::now() + Duration::days(1));

    let c = task("3", "Archive old boards", TaskStatus::Done, Priority::Medium);

    vec![a, b, c]
  }

  #[test]
  fn empty_filter_imposes_no_constraint() {
    let tasks = sample_tasks();
    let filtered = filter_tasks(&tasks, &TaskFilter::default());
    assert_eq!(filtered, tasks);
  }

  #[test]
  fn filter_matches_each_field_exactly() {
    let tasks = sample_tasks();

    let by_status = filter_tasks(
      &tasks,
      &TaskFilter {
        status: Some(TaskStatus::InProgress),
        ..TaskFilter::default()
      },
    );
    assert_eq!(by_status.len(), 1);
    assert_eq!(by_status[0].id, "2");

    let by_priority = filter_tasks(
      &tasks,
      &TaskFilter {
        priority: Some(Priority::Low),
        ..TaskFilter::default()
      },
    );
    assert_eq!(by_priority[0].id, "1");

    let by_assignee = filter_tasks(
      &tasks,
      &TaskFilter {
        assignee: Some("2".to_string()),
        ..TaskFilter::default()
      },
    );
    assert_eq!(by_assignee[0].id, "2");

    let by_project = filter_tasks(
      &tasks,
      &TaskFilter {
        project: Some("1".to_string()),
        ..TaskFilter::default()
      },
    );
    assert_eq!(by_project.len(), 2);
  }

  #[test]
  fn search_is_case_insensitive_over_title_and_description() {
    let tasks = sample_tasks();

    let by_title = filter_tasks(
      &tasks,
      &TaskFilter {
        search: Some("LOGIN".to_string()),
        ..TaskFilter::default()
      },
    );
    assert_eq!(by_title[0].id, "2");

    let by_description = filter_tasks(
      &tasks,
      &TaskFilter {
        search: Some("caching".to_string()),
        ..TaskFilter::default()
      },
    );
    assert_eq!(by_description[0].id, "1");
  }

  #[test]
  fn bounded_due_range_excludes_undated_tasks() {
    let tasks = sample_tasks();
    let filtered = filter_tasks(
      &tasks,
      &TaskFilter {
        due_date: Some(DueDateRange {
          from: Some(Utc::now() - Duration::days(1)),
          to: None,
        }),
        ..TaskFilter::default()
      },
    );
    // Task 3 has no due date and must not pass a bounded range.
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|t| t.due_date.is_some()));
  }

  #[test]
  fn unbounded_due_range_keeps_everything() {
    let tasks = sample_tasks();
    let filtered = filter_tasks(
      &tasks,
      &TaskFilter {
        due_date: Some(DueDateRange::default()),
        ..TaskFilter::default()
      },
    );
    assert_eq!(filtered.len(), 3);
  }

  #[test]
  fn due_range_bounds_are_inclusive() {
    let mut t = task("1", "Boundary", TaskStatus::Todo, Priority::Low);
    let due = Utc::now();
    t.due_date = Some(due);

    let filtered = filter_tasks(
      &[t],
      &TaskFilter {
        due_date: Some(DueDateRange {
          from: Some(due),
          to: Some(due),
        }),
        ..TaskFilter::default()
      },
    );
    assert_eq!(filtered.len(), 1);
  }

  #[test]
  fn filter_is_idempotent() {
    let tasks = sample_tasks();
    let filter = TaskFilter {
      project: Some("1".to_string()),
      ..TaskFilter::default()
    };
    let once = filter_tasks(&tasks, &filter);
    let twice = filter_tasks(&once, &filter);
    assert_eq!(once, twice);
  }

  #[test]
  fn priority_sort_uses_rank_not_lexical_order() {
    let tasks = vec![
      task("1", "a", TaskStatus::Todo, Priority::Low),
      task("2", "b", TaskStatus::Todo, Priority::Urgent),
      task("3", "c", TaskStatus::Todo, Priority::Medium),
    ];

    let asc = sort_tasks(&tasks, SortBy::Priority, SortOrder::Asc);
    let order: Vec<_> = asc.iter().map(|t| t.priority).collect();
    assert_eq!(order, vec![Priority::Low, Priority::Medium, Priority::Urgent]);

    let desc = sort_tasks(&tasks, SortBy::Priority, SortOrder::Desc);
    let order: Vec<_> = desc.iter().map(|t| t.priority).collect();
    assert_eq!(order, vec![Priority::Urgent, Priority::Medium, Priority::Low]);
  }

  #[test]
  fn status_sort_uses_workflow_rank() {
    let tasks = vec![
      task("1", "a", TaskStatus::Done, Priority::Low),
      task("2", "b", TaskStatus::Todo, Priority::Low),
      task("3", "c", TaskStatus::InProgress, Priority::Low),
    ];
    let sorted = sort_tasks(&tasks, SortBy::Status, SortOrder::Asc);
    let ids: Vec<_> = sorted.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "1"]);
  }

  #[test]
  fn missing_due_date_sorts_as_epoch() {
    let mut dated = task("1", "dated", TaskStatus::Todo, Priority::Low);
    dated.due_date = Some(Utc::now());
    let undated = task("2", "undated", TaskStatus::Todo, Priority::Low);

    // Documented behavior: undated tasks sort first ascending. Any change
    // here must be deliberate.
    let asc = sort_tasks(&[dated.clone(), undated.clone()], SortBy::DueDate, SortOrder::Asc);
    assert_eq!(asc[0].id, "2");

    let desc = sort_tasks(&[dated, undated], SortBy::DueDate, SortOrder::Desc);
    assert_eq!(desc[0].id, "1");
  }

  #[test]
  fn title_sort_ignores_case() {
    let tasks = vec![
      task("1", "banana", TaskStatus::Todo, Priority::Low),
      task("2", "Apple", TaskStatus::Todo, Priority::Low),
      task("3", "cherry", TaskStatus::Todo, Priority::Low),
    ];
    let sorted = sort_tasks(&tasks, SortBy::Title, SortOrder::Asc);
    let titles: Vec<_> = sorted.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
  }

  #[test]
  fn sort_is_stable_and_leaves_input_untouched() {
    let tasks = vec![
      task("1", "a", TaskStatus::Todo, Priority::Medium),
      task("2", "b", TaskStatus::Todo, Priority::Medium),
      task("3", "c", TaskStatus::Todo, Priority::Low),
    ];
    let sorted = sort_tasks(&tasks, SortBy::Priority, SortOrder::Asc);

    // Ties (ids 1 and 2) keep relative input order
    let ids: Vec<_> = sorted.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
    // Input untouched
    assert_eq!(tasks[0].id, "1");

    // Re-sorting an already-sorted list is a no-op
    let resorted = sort_tasks(&sorted, SortBy::Priority, SortOrder::Asc);
    assert_eq!(resorted, sorted);
  }

  #[test]
  fn stats_match_the_documented_example() {
    let tasks = vec![
      task("1", "a", TaskStatus::Todo, Priority::Low),
      task("2", "b", TaskStatus::Todo, Priority::Medium),
      task("3", "c", TaskStatus::InProgress, Priority::High),
      task("4", "d", TaskStatus::Done, Priority::Urgent),
    ];
    let projects = vec![project("1", ProjectStatus::Active), project("2", ProjectStatus::Archived)];

    let stats = calculate_stats(&tasks, &projects);
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.in_progress_tasks, 1);
    assert_eq!(stats.todo_tasks, 2);
    assert_eq!(stats.completion_rate, 25.0);
    assert_eq!(stats.active_projects, 1);
    assert_eq!(stats.priority_distribution.urgent, 1);
    assert_eq!(stats.priority_distribution.low, 1);
  }

  #[test]
  fn empty_stats_have_zero_completion_rate() {
    let stats = calculate_stats(&[], &[]);
    assert_eq!(stats.completion_rate, 0.0);
    assert_eq!(stats.total_tasks, 0);
  }

  #[test]
  fn project_stats_count_only_that_project() {
    let mut tasks = sample_tasks();
    tasks[2].status = TaskStatus::Done; // project 1
    let stats = project_stats(&tasks, "1");
    assert_eq!(stats.total_tasks, 2);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.completion_percentage, 50.0);

    let empty = project_stats(&tasks, "999");
    assert_eq!(empty.total_tasks, 0);
    assert_eq!(empty.completion_percentage, 0.0);
  }
}
