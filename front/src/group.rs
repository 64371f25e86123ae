//! Partitioning of the task list into priority buckets and the archive.

use chrono::{DateTime, Utc};
use todoman_api::v1::{Task, TaskPriority, TaskStatus};

const BUCKETS: usize = TaskPriority::ALL.len();

/// Active tasks bucketed by priority, plus the archived (finished) tasks.
///
/// Every task of the input lands in exactly one bucket or in the archive.
#[derive(Debug, Default)]
pub struct TaskGroups<'a> {
    buckets: [Vec<&'a Task>; BUCKETS],
    archived: Vec<&'a Task>,
}

impl<'a> TaskGroups<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut groups = Self::default();

        for task in tasks {
            match task.status {
                TaskStatus::NotStarted | TaskStatus::InProgress => {
                    groups.buckets[task.priority.rank()].push(task);
                }
                TaskStatus::Finished => groups.archived.push(task),
            }
        }

        for bucket in &mut groups.buckets {
            bucket.sort_by_key(|task| deadline_key(task));
        }
        groups.archived.sort_by_key(|task| task.priority.rank());

        groups
    }

    pub fn bucket(&self, priority: TaskPriority) -> &[&'a Task] {
        &self.buckets[priority.rank()]
    }

    /// Buckets in rank order, urgent first.
    pub fn buckets(&self) -> impl Iterator<Item = (TaskPriority, &[&'a Task])> + '_ {
        TaskPriority::ALL
            .into_iter()
            .map(move |priority| (priority, self.bucket(priority)))
    }

    pub fn active(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.buckets.iter().flatten().copied()
    }

    pub fn archived(&self) -> &[&'a Task] {
        &self.archived
    }

    pub fn active_len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

// tasks without a deadline share the largest key and sort after everything else
fn deadline_key(task: &Task) -> i64 {
    task.deadline.map_or(i64::MAX, |deadline| deadline.timestamp_millis())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub active: usize,
    pub in_progress: usize,
    pub archived: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn compute(groups: &TaskGroups<'_>, now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            active: groups.active_len(),
            archived: groups.archived().len(),
            ..Self::default()
        };

        for task in groups.active() {
            if task.status == TaskStatus::InProgress {
                stats.in_progress += 1;
            }
            if task.deadline.is_some_and(|deadline| deadline < now) {
                stats.overdue += 1;
            }
        }

        stats
    }
}
