use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use todoman_api::v1::{Task, TaskStatus};

use super::Palette;
use crate::urgency::CountdownFrame;

pub fn line(task: &Task, frame: &CountdownFrame, palette: Palette) -> String {
    let status = match task.status {
        TaskStatus::NotStarted => palette.dim(task.status.label()),
        TaskStatus::InProgress => palette.heading(task.status.label()),
        TaskStatus::Finished => task.status.label().to_owned(),
    };

    format!(
        "[{}] {} · {} · {}",
        task.id,
        task.title,
        status,
        palette.paint(&frame.text, frame.color)
    )
}

pub fn archived_line(task: &Task, palette: Palette) -> String {
    format!(
        "[{}] {} · {}",
        task.id,
        palette.dim(&task.title),
        task.priority.label()
    )
}

pub fn detail(task: &Task, now: DateTime<Utc>, palette: Palette) -> String {
    let frame = CountdownFrame::at(task.deadline, now);
    let mut out = String::new();

    let _ = writeln!(out, "{}", palette.heading(&task.title));
    let _ = writeln!(out, "id        {}", task.id);
    let _ = writeln!(out, "status    {}", task.status.label());
    let _ = writeln!(out, "priority  {}", task.priority.label());

    match task.deadline {
        Some(deadline) => {
            let _ = writeln!(
                out,
                "deadline  {} ({})",
                local(deadline),
                palette.paint(&frame.text, frame.color)
            );
        }
        None => {
            let _ = writeln!(out, "deadline  {}", palette.paint(&frame.text, frame.color));
        }
    }

    let _ = writeln!(out, "created   {}", local(task.created_at));
    let _ = writeln!(out, "updated   {}", local(task.updated_at));

    if !task.description.is_empty() {
        out.push('\n');
        for line in task.description.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    out
}

fn local(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use todoman_api::v1::TaskPriority;

    use super::*;

    fn task() -> Task {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        Task {
            id: String::from("65f1"),
            title: String::from("Ship release"),
            description: String::from("Tag it.\nPublish notes."),
            status: TaskStatus::InProgress,
            priority: TaskPriority::Urgent,
            deadline: Some(now + Duration::seconds(90)),
            time_left_seconds: None,
            time_left_human: None,
            is_overdue: false,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn line_shows_id_title_status_and_countdown() {
        let task = task();
        let frame = CountdownFrame::at(task.deadline, task.created_at);

        assert_eq!(
            line(&task, &frame, Palette::PLAIN),
            "[65f1] Ship release · In Progress · 1m 30s left"
        );
    }

    #[test]
    fn detail_includes_description() {
        let task = task();
        let out = detail(&task, task.created_at, Palette::PLAIN);

        assert!(out.starts_with("Ship release\n"));
        assert!(out.contains("priority  Urgent"));
        assert!(out.contains("(1m 30s left)"));
        assert!(out.contains("  Publish notes.\n"));
    }

    #[test]
    fn detail_without_deadline() {
        let mut task = task();
        task.deadline = None;

        let out = detail(&task, task.created_at, Palette::PLAIN);
        assert!(out.contains("deadline  No deadline"));
    }

    #[test]
    fn archived_line_shows_priority() {
        assert_eq!(
            archived_line(&task(), Palette::PLAIN),
            "[65f1] Ship release · Urgent"
        );
    }
}
