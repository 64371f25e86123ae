//! Live view of the active tasks with ticking countdowns.

use std::{
    collections::HashMap,
    io::{self, Write},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use todoman_api::v1::Task;
use tokio::sync::mpsc;
use tracing::debug;

use super::{frame_at, render_active, render_stats, Palette};
use crate::{
    countdown::{Clock, Countdown, Tick},
    group::{TaskGroups, TaskStats},
    urgency::CountdownFrame,
};

/// Latest countdown frame of every task on screen.
pub struct WatchScreen<'a> {
    groups: TaskGroups<'a>,
    frames: HashMap<String, CountdownFrame>,
    palette: Palette,
}

impl<'a> WatchScreen<'a> {
    pub fn new(tasks: &'a [Task], palette: Palette) -> Self {
        Self {
            groups: TaskGroups::new(tasks),
            frames: HashMap::new(),
            palette,
        }
    }

    /// Active tasks that need a running countdown.
    pub fn timed(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.groups.active().filter(|task| task.deadline.is_some())
    }

    pub fn apply(&mut self, tick: Tick<String>) {
        self.frames.insert(tick.key, tick.frame);
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let stats = TaskStats::compute(&self.groups, now);

        let frame = |task: &Task| match self.frames.get(&task.id) {
            Some(frame) => frame.clone(),
            None => frame_at(task, now),
        };

        let mut out = render_stats(&stats, self.palette);
        out.push('\n');
        out.push_str(&render_active(&self.groups, frame, self.palette));
        out.push_str(&self.palette.dim("Press Ctrl-C to quit."));
        out.push('\n');

        out
    }
}

/// Redraws on every countdown tick until Ctrl-C. All countdowns are
/// stopped before returning.
pub async fn run(tasks: &[Task], clock: Arc<dyn Clock>, palette: Palette) -> io::Result<()> {
    let mut screen = WatchScreen::new(tasks, palette);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let countdowns: Vec<Countdown> = screen
        .timed()
        .map(|task| Countdown::start(task.id.clone(), task.deadline, clock.clone(), tx.clone()))
        .collect();
    drop(tx);

    // without a running countdown the channel is already closed
    if countdowns.is_empty() {
        println!("No deadlines to watch.");
        return Ok(());
    }

    debug!(countdowns = countdowns.len(), "watching tasks");

    let mut stdout = io::stdout();
    draw(&mut stdout, &screen.render(clock.now()))?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                break;
            }
            tick = rx.recv() => {
                let Some(tick) = tick else {
                    break;
                };
                screen.apply(tick);

                // batch ticks that arrived together into one redraw
                while let Ok(tick) = rx.try_recv() {
                    screen.apply(tick);
                }

                draw(&mut stdout, &screen.render(clock.now()))?;
            }
        }
    }

    for countdown in countdowns {
        countdown.stop();
    }

    Ok(())
}

fn draw(out: &mut impl Write, screen: &str) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    out.write_all(screen.as_bytes())?;
    out.flush()
}
