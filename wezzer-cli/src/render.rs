//! Plain-text (optionally ANSI-colored) rendering of an [`Outlook`].
//!
//! Trends arrive already computed; this module only decides how they look.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use crossterm::style::{Color, Stylize, style};
use wezzer_core::{Outlook, Trend, TrendedPeriod};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
    width: usize,
}

impl Renderer {
    pub fn new(color: bool, width: usize) -> Self {
        Self {
            color,
            width: width.max(INDENT.len() + 1),
        }
    }

    /// `generated_at` goes into the header; passing it in keeps output reproducible.
    pub fn render(&self, outlook: &Outlook, generated_at: NaiveDateTime) -> String {
        let mut lines = Vec::new();

        let version = format!("wezzer {}", env!("CARGO_PKG_VERSION"));
        let now = generated_at.format("%Y-%m-%d %I:%M %p").to_string();

        lines.push(String::new());
        lines.push(self.paint(&version, Color::Yellow));
        lines.push(format!(
            "Weather for {} ({})",
            outlook.location.display_location(),
            self.paint(&now, Color::Yellow)
        ));

        lines.push(String::new());
        lines.push(self.paint(&format!("{}-Hour Forecast", outlook.hours), Color::Yellow));
        lines.extend(outlook.hourly.iter().map(|p| self.hourly_line(p)));

        lines.push(String::new());
        lines.push(self.paint(
            &format!("{}-Day Extended Forecast", outlook.days),
            Color::Yellow,
        ));
        for period in &outlook.extended {
            lines.push(self.extended_line(period));
            lines.extend(wrap(&period.period.detailed_forecast, self.width, INDENT));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn hourly_line(&self, trended: &TrendedPeriod) -> String {
        let p = &trended.period;
        let start = self.paint(&clock(p.start_time), Color::Cyan);
        let end = self.paint(&clock(p.end_time), Color::Cyan);

        let mut line = format!(
            "{start} - {end} {} {}{}",
            self.marker(trended.trend),
            self.bold(&temperature(p.temperature)),
            p.temperature_unit,
        );

        if !p.short_forecast.is_empty() {
            line.push(' ');
            line.push_str(&p.short_forecast);
        }

        let wind = format!("{} {}", p.wind_speed, p.wind_direction);
        let wind = wind.trim();
        if !wind.is_empty() {
            line.push_str(", wind ");
            line.push_str(wind);
        }

        line
    }

    fn extended_line(&self, trended: &TrendedPeriod) -> String {
        let p = &trended.period;
        let name = if p.name.is_empty() {
            format!("Period {}", p.number)
        } else {
            p.name.clone()
        };

        format!(
            "{}{} {}{}",
            self.paint(&format!("{name}: "), Color::Cyan),
            self.marker(trended.trend),
            self.bold(&temperature(p.temperature)),
            p.temperature_unit,
        )
    }

    fn marker(&self, trend: Trend) -> String {
        match trend {
            Trend::Unset => "\u{25aa}".to_string(),
            Trend::Steady => self.paint("\u{25aa}", Color::Yellow),
            Trend::Rising => self.paint("\u{25b2}", Color::Red),
            Trend::Falling => self.paint("\u{25bc}", Color::Blue),
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn clock(time: Option<DateTime<FixedOffset>>) -> String {
    match time {
        Some(t) => t.format("%I:%M %p").to_string(),
        None => "--:-- --".to_string(),
    }
}

fn temperature(value: Option<f64>) -> String {
    match value {
        Some(t) if t.fract() == 0.0 => format!("{t:.0}"),
        Some(t) => format!("{t:.1}"),
        None => "--".to_string(),
    }
}

/// Greedy word wrap; `width` includes the indent. Over-long words get a line to themselves.
fn wrap(text: &str, width: usize, indent: &str) -> Vec<String> {
    let available = width.saturating_sub(indent.chars().count()).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > available {
            lines.push(format!("{indent}{current}"));
            current.clear();
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 {
        lines.push(format!("{indent}{current}"));
    }
    lines
}
