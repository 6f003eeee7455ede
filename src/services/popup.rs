// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity popup formatting.
//!
//! Each detail line is independent: a missing or zero field drops its own
//! line and nothing else.

use crate::models::ActivityRecord;
pub use crate::time_utils::format_display_date as format_date;

const METERS_PER_KM: f64 = 1000.0;
const MILES_PER_METER: f64 = 0.000621371;
const FEET_PER_METER: f64 = 3.28084;

/// Link text when none is configured.
pub const DEFAULT_LINK_LABEL: &str = "View on intervals.icu";

/// Structured popup content, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    /// (label, value) pairs in display order
    pub details: Vec<(&'static str, String)>,
    pub link: Option<String>,
}

/// Formats activity records for the map popup.
#[derive(Debug, Clone)]
pub struct PopupFormatter {
    link_base: String,
    link_label: String,
}

impl Default for PopupFormatter {
    fn default() -> Self {
        Self::new("https://intervals.icu/activities")
    }
}

impl PopupFormatter {
    pub fn new(link_base: &str) -> Self {
        Self {
            link_base: link_base.trim_end_matches('/').to_string(),
            link_label: DEFAULT_LINK_LABEL.to_string(),
        }
    }

    pub fn with_link_label(mut self, label: &str) -> Self {
        self.link_label = label.to_string();
        self
    }

    /// Collect the lines to show for `record`.
    pub fn content(&self, record: &ActivityRecord) -> PopupContent {
        let mut details = vec![(
            "Type",
            record
                .activity_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
        )];

        if let Some(date) = record.start_date_local.as_deref() {
            details.push(("Date", format_date(date)));
        }
        if record.distance() > 0.0 {
            details.push(("Distance", format_distance(record.distance())));
        }
        if record.elevation_gain() > 0.0 {
            details.push(("Elevation", format_elevation(record.elevation_gain())));
        }
        if record.elapsed_time() > 0.0 {
            details.push(("Time", format_duration(record.elapsed_time())));
        }

        PopupContent {
            title: record
                .name
                .clone()
                .unwrap_or_else(|| "Unnamed Activity".to_string()),
            details,
            link: record
                .id
                .as_deref()
                .map(|id| format!("{}/{}", self.link_base, id)),
        }
    }

    /// Plain-text popup, one line per detail.
    pub fn format_text(&self, record: &ActivityRecord) -> String {
        let content = self.content(record);
        let mut lines = vec![content.title];
        lines.extend(
            content
                .details
                .into_iter()
                .map(|(label, value)| format!("{}: {}", label, value)),
        );
        if let Some(link) = content.link {
            lines.push(link);
        }
        lines.join("\n")
    }

    /// HTML fragment for the map popup. User text is escaped.
    pub fn format_html(&self, record: &ActivityRecord) -> String {
        let content = self.content(record);

        let mut html = String::from("<div class=\"activity-popup\">");
        html.push_str(&format!("<h3>{}</h3>", escape_html(&content.title)));
        html.push_str("<div class=\"details\">");
        for (label, value) in &content.details {
            html.push_str(&format!(
                "<div><strong>{}:</strong> {}</div>",
                label,
                escape_html(value)
            ));
        }
        html.push_str("</div>");
        if let Some(link) = &content.link {
            html.push_str(&format!(
                "<div class=\"link\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></div>",
                escape_html(link),
                escape_html(&self.link_label)
            ));
        }
        html.push_str("</div>");
        html
    }
}

/// `"{km} km ({mi} mi)"`, one decimal each.
pub fn format_distance(meters: f64) -> String {
    format!(
        "{:.1} km ({:.1} mi)",
        meters / METERS_PER_KM,
        meters * MILES_PER_METER
    )
}

/// `"{m} m ({ft} ft)"`, rounded to whole units.
pub fn format_elevation(meters: f64) -> String {
    format!(
        "{} m ({} ft)",
        meters.round() as i64,
        (meters * FEET_PER_METER).round() as i64
    )
}

/// `"{h}h {m}m"` from one hour up, `"{m}m"` below.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
