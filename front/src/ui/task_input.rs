//! Create/edit form state for a task.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use todoman_api::v1::{NewTask, Task, TaskPatch, TaskPriority};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Time of day used when a deadline is given as a bare date.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
}

pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
}

pub fn parse_time(input: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
}

/// Deadline is entered as a local date and an optional local time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub priority: TaskPriority,
}

impl TaskForm {
    /// Form prefilled from an existing task, in local time.
    pub fn from_task(task: &Task) -> Self {
        Self::from_task_in(task, &Local)
    }

    pub fn from_task_in<Tz: TimeZone>(task: &Task, tz: &Tz) -> Self {
        let local = task.deadline.map(|deadline| deadline.with_timezone(tz));

        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            date: local.as_ref().map(|deadline| deadline.date_naive()),
            time: local.as_ref().map(|deadline| deadline.time()),
            priority: task.priority,
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline_in(&Local)
    }

    /// `None` without a date. A date alone means the end of that day.
    pub fn deadline_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        let date = self.date?;
        let naive = date.and_time(self.time.unwrap_or_else(end_of_day));

        // a wall-clock time skipped by a DST change falls back to UTC
        let instant = match tz.from_local_datetime(&naive).earliest() {
            Some(local) => local.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&naive),
        };

        Some(instant)
    }

    pub fn new_task(&self) -> NewTask {
        NewTask {
            title: self.title.trim().to_owned(),
            description: self.description.clone(),
            priority: self.priority,
            deadline: self.deadline(),
        }
    }

    /// Patch carrying every editable field; a missing date clears the deadline.
    pub fn patch(&self) -> TaskPatch {
        TaskPatch::default()
            .title(self.title.trim())
            .description(self.description.clone())
            .deadline(self.deadline())
            .priority(self.priority)
    }
}
