//! Deadline countdown text and urgency colouring.
//!
//! Everything here is a pure function of a deadline and "now", so a
//! countdown can recompute a frame on every tick without keeping state.

use std::fmt;

use chrono::{DateTime, Utc};

pub const MINUTE: i64 = 60;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// No deadline.
    pub const GRAY: Rgb = Rgb::new(163, 163, 163);
    /// Overdue or due within a day.
    pub const RED: Rgb = Rgb::new(239, 68, 68);
    /// Three days or more left.
    pub const BLUE: Rgb = Rgb::new(59, 130, 246);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear interpolation in RGB space. The path from red to
    /// blue never crosses green or yellow.
    pub fn lerp(self, end: Rgb, ratio: f64) -> Rgb {
        let ratio = ratio.clamp(0.0, 1.0);
        let channel = |start: u8, end: u8| {
            let start = f64::from(start);
            let end = f64::from(end);
            (start + (end - start) * ratio).round() as u8
        };

        Rgb {
            r: channel(self.r, end.r),
            g: channel(self.g, end.g),
            b: channel(self.b, end.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Whole seconds from `now` until `deadline`, negative once it has passed.
///
/// The millisecond difference is truncated toward zero, so a deadline half a
/// second away in either direction yields `0`.
pub fn seconds_until(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    let deadline = deadline?;
    let millis = deadline.signed_duration_since(now).num_milliseconds();
    Some(millis / 1000)
}

/// Formats a delta such as `1d 1h 0m 0s left` or `5s overdue`.
pub fn format_remaining(delta: Option<i64>) -> String {
    let Some(delta) = delta else {
        return String::from("No deadline");
    };

    let mut total = delta.unsigned_abs();
    let days = total / DAY as u64;
    total %= DAY as u64;
    let hours = total / HOUR as u64;
    total %= HOUR as u64;
    let minutes = total / MINUTE as u64;
    let seconds = total % MINUTE as u64;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));

    let suffix = if delta < 0 { "overdue" } else { "left" };
    format!("{} {}", parts.join(" "), suffix)
}

pub fn urgency_color(delta: Option<i64>) -> Rgb {
    let Some(delta) = delta else {
        return Rgb::GRAY;
    };

    if delta <= DAY {
        return Rgb::RED;
    }
    if delta >= 3 * DAY {
        return Rgb::BLUE;
    }

    let ratio = (delta - DAY) as f64 / (2 * DAY) as f64;
    Rgb::RED.lerp(Rgb::BLUE, ratio)
}

/// One tick of a countdown display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownFrame {
    pub delta: Option<i64>,
    pub text: String,
    pub color: Rgb,
}

impl CountdownFrame {
    pub fn at(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let delta = seconds_until(deadline, now);

        Self {
            delta,
            text: format_remaining(delta),
            color: urgency_color(delta),
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self.delta, Some(delta) if delta < 0)
    }
}
