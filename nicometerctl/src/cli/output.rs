//! Plain-text rendering of zones and scan reports.

use nicometer_core::Category;
use std::fmt::Write;

use crate::simulation::{EventKind, ScanReport};

/// Table of zones, their categories and assets.
pub fn render_zones() -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<12} {:>6}  {:<15} image",
        "zone", "category", "angle", "sound"
    );
    for category in Category::ALL {
        let (start, end) = category.zone_range();
        let closing = if category == Category::Wow { ']' } else { ')' };
        let _ = writeln!(
            out,
            "{:<12} {:<12} {:>6}  {:<15} {}",
            format!("[{start:.1}, {end:.1}{closing}"),
            category.key(),
            category.target_angle(),
            category.sound_id(),
            category.image_id(),
        );
    }
    out
}

/// One line per timeline event, then the summary.
pub fn render_report(report: &ScanReport) -> String {
    let mut out = String::new();
    if let Some(seed) = report.seed {
        let _ = writeln!(out, "seed {seed}");
    }
    for event in &report.events {
        let seconds = event.at_ms as f64 / 1_000.0;
        let line = match &event.kind {
            EventKind::Sound { sound } => format!("sound     {sound}"),
            EventKind::Needle { session, phase } => {
                format!("needle    {session} {phase}")
            }
            EventKind::Scan { session, phase } => {
                format!("scan      {session} {phase}")
            }
            EventKind::ResetRequested { accepted: true } => {
                "reset     requested".to_owned()
            }
            EventKind::ResetRequested { accepted: false } => {
                "reset     ignored".to_owned()
            }
            EventKind::LiveSessions { count } => {
                format!("sessions  {count} live")
            }
        };
        let _ = writeln!(out, "{seconds:>8.3}s  {line}");
    }

    let summary = &report.summary;
    let _ = writeln!(out);
    let _ = writeln!(out, "selected:       {}", summary.selected);
    let _ = writeln!(
        out,
        "revealed:       {}",
        summary
            .revealed
            .map_or_else(|| "-".to_owned(), |category| category.to_string())
    );
    let _ = writeln!(
        out,
        "final angle:    {}",
        summary
            .final_angle
            .map_or_else(|| "-".to_owned(), |angle| format!("{angle:.2}"))
    );
    let _ = writeln!(
        out,
        "visible result: {}",
        summary.visible_result.unwrap_or("-")
    );
    let _ = writeln!(out, "live sessions:  {}", summary.live_sessions);
    if !summary.completed {
        let _ = writeln!(
            out,
            "stopped at the time limit ({} ms) before coming to rest",
            summary.elapsed_ms
        );
    }
    out
}
