pub mod prompt;
pub mod task;
pub mod task_input;
pub mod watch;

use std::{
    fmt::Write as _,
    io::{self, IsTerminal},
};

use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use todoman_api::v1::Task;

use crate::{
    board::{Board, View},
    group::{TaskGroups, TaskStats},
    urgency::{CountdownFrame, Rgb},
};

/// Whether output gets ANSI colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub const PLAIN: Palette = Palette { enabled: false };
    pub const COLORED: Palette = Palette { enabled: true };

    /// Colours for a terminal on stdout, unless `NO_COLOR` is set.
    pub fn detect() -> Self {
        let enabled = io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    pub fn paint(self, text: &str, color: Rgb) -> String {
        if !self.enabled {
            return text.to_owned();
        }

        let Rgb { r, g, b } = color;
        text.with(Color::Rgb { r, g, b }).to_string()
    }

    pub fn heading(self, text: &str) -> String {
        match self.enabled {
            true => text.bold().to_string(),
            false => text.to_owned(),
        }
    }

    pub fn dim(self, text: &str) -> String {
        match self.enabled {
            true => text.dim().to_string(),
            false => text.to_owned(),
        }
    }
}

/// Renders whichever view the board is showing.
pub fn render(board: &Board, now: DateTime<Utc>, palette: Palette) -> String {
    let groups = board.groups();
    let stats = TaskStats::compute(&groups, now);

    let mut out = render_stats(&stats, palette);
    out.push('\n');

    match board.view() {
        View::Active => {
            out.push_str(&render_active(&groups, |task| frame_at(task, now), palette));
        }
        View::Archived => out.push_str(&render_archived(&groups, palette)),
    }

    out
}

pub fn frame_at(task: &Task, now: DateTime<Utc>) -> CountdownFrame {
    CountdownFrame::at(task.deadline, now)
}

pub fn render_stats(stats: &TaskStats, palette: Palette) -> String {
    let overdue = format!("{} overdue", stats.overdue);
    let overdue = match stats.overdue {
        0 => overdue,
        _ => palette.paint(&overdue, Rgb::RED),
    };

    format!(
        "{} active · {} in progress · {} completed · {}\n",
        stats.active, stats.in_progress, stats.archived, overdue
    )
}

/// Active tasks by priority section. `frame` supplies the countdown shown
/// next to each task.
pub fn render_active(
    groups: &TaskGroups<'_>,
    frame: impl Fn(&Task) -> CountdownFrame,
    palette: Palette,
) -> String {
    let mut out = String::new();

    for (priority, bucket) in groups.buckets() {
        let _ = writeln!(
            out,
            "{} ({})",
            palette.heading(priority.label()),
            bucket.len()
        );

        if bucket.is_empty() {
            let _ = writeln!(out, "  {}", palette.dim("No tasks"));
        }

        for &task in bucket {
            let _ = writeln!(out, "  {}", task::line(task, &frame(task), palette));
        }

        out.push('\n');
    }

    out
}

pub fn render_archived(groups: &TaskGroups<'_>, palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Archived"));

    if groups.archived().is_empty() {
        let _ = writeln!(out, "  {}", palette.dim("No archived tasks"));
    }

    for &task in groups.archived() {
        let _ = writeln!(out, "  {}", task::archived_line(task, palette));
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use todoman_api::v1::{TaskPriority, TaskStatus};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn task(id: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: id.to_owned(),
            title: format!("Task {}", id),
            description: String::new(),
            status,
            priority,
            deadline: None,
            time_left_seconds: None,
            time_left_human: None,
            is_overdue: false,
            user_id: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn active_view_lists_every_section_in_rank_order() {
        let mut soon = task("1", TaskStatus::InProgress, TaskPriority::High);
        soon.deadline = Some(now() - Duration::seconds(5));
        let tasks = vec![soon, task("2", TaskStatus::Finished, TaskPriority::Urgent)];

        let groups = TaskGroups::new(&tasks);
        let out = render_active(&groups, |task| frame_at(task, now()), Palette::PLAIN);

        let urgent = out.find("Urgent (0)").unwrap();
        let high = out.find("High (1)").unwrap();
        let medium = out.find("Medium (0)").unwrap();
        let low = out.find("Low (0)").unwrap();
        assert!(urgent < high && high < medium && medium < low);

        assert!(out.contains("5s overdue"));
        assert!(!out.contains("Task 2"));
        assert_eq!(out.matches("No tasks").count(), 3);
    }

    #[test]
    fn archived_view_lists_finished_tasks() {
        let tasks = vec![
            task("1", TaskStatus::Finished, TaskPriority::Low),
            task("2", TaskStatus::NotStarted, TaskPriority::Low),
        ];

        let groups = TaskGroups::new(&tasks);
        let out = render_archived(&groups, Palette::PLAIN);

        assert!(out.contains("Task 1"));
        assert!(!out.contains("Task 2"));
    }

    #[test]
    fn stats_line() {
        let stats = TaskStats {
            active: 4,
            in_progress: 1,
            archived: 2,
            overdue: 0,
        };
        assert_eq!(
            render_stats(&stats, Palette::PLAIN),
            "4 active · 1 in progress · 2 completed · 0 overdue\n"
        );
    }

    #[test]
    fn plain_palette_leaves_text_alone() {
        assert_eq!(Palette::PLAIN.paint("5s overdue", Rgb::RED), "5s overdue");
        assert!(Palette::COLORED
            .paint("5s overdue", Rgb::RED)
            .contains("5s overdue"));
    }
}
