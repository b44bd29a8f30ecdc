//! Plain-text rendering of entity tables and generation outcomes.

use timetabler_core::generation::{GenerationSnapshot, GenerationStatus, GENERATION_LEVELS};
use timetabler_core::models::{
    BulkUploadReport, Course, Department, Lecturer, Room, StudentGroup, Timetable, User,
};

/// One row per entity, columns separated by two spaces.
pub trait TableRow {
    fn header() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Timetable {
    fn header() -> &'static [&'static str] {
        &["ID", "NAME", "SEMESTER", "YEAR", "HALF", "ACTIVE", "GENERATED"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.semester.clone(),
            self.year.to_string(),
            format!("{:?}", self.academic_half),
            yes_no(self.is_active),
            yes_no(self.is_generated()),
        ]
    }
}

impl TableRow for Course {
    fn header() -> &'static [&'static str] {
        &["ID", "CODE", "NAME", "LEVEL", "CREDITS", "HOURS/WEEK"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.code.clone(),
            self.name.clone(),
            self.level.to_string(),
            self.credits.to_string(),
            self.weekly_hours().to_string(),
        ]
    }
}

impl TableRow for Lecturer {
    fn header() -> &'static [&'static str] {
        &["ID", "STAFF NO", "NAME", "EMAIL", "MAX HOURS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.staff_number.clone(),
            self.full_name.clone(),
            self.email.clone(),
            self.max_hours_per_week.to_string(),
        ]
    }
}

impl TableRow for Room {
    fn header() -> &'static [&'static str] {
        &["ID", "NAME", "BUILDING", "CAPACITY", "TYPE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.building.clone(),
            self.capacity.to_string(),
            self.room_type.clone(),
        ]
    }
}

impl TableRow for StudentGroup {
    fn header() -> &'static [&'static str] {
        &["ID", "NAME", "LEVEL", "SIZE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.level.to_string(),
            self.size.to_string(),
        ]
    }
}

impl TableRow for Department {
    fn header() -> &'static [&'static str] {
        &["ID", "CODE", "NAME"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.code.clone(), self.name.clone()]
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Render rows as a left-aligned table, padded to the widest cell per column.
pub fn table<R: TableRow>(rows: &[R]) -> String {
    let header: Vec<String> = R::header().iter().map(|h| h.to_string()).collect();
    let body: Vec<Vec<String>> = rows.iter().map(|row| row.cells()).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(body.iter())
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user(user: &User) -> String {
    format!(
        "{} ({}) <{}> role={}",
        user.full_name, user.username, user.email, user.role
    )
}

pub fn upload_report(report: &BulkUploadReport) -> String {
    let mut summary = format!("{}: {} created", report.status, report.created);
    if report.updated > 0 {
        summary.push_str(&format!(", {} updated", report.updated));
    }
    summary.push_str(&format!(", {} skipped", report.skipped));

    let mut lines = vec![summary];
    if let Some(errors) = &report.errors {
        lines.extend(errors.iter().map(|e| format!("  error: {e}")));
    }
    lines.join("\n")
}

/// `Completed` or `Pending` for each generated academic level, highest first.
pub fn level_summary(snapshot: &GenerationSnapshot) -> String {
    GENERATION_LEVELS
        .iter()
        .map(|&level| {
            let state = if snapshot.is_level_completed(level) {
                "Completed"
            } else {
                "Pending"
            };
            format!("Level {level}: {state}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Progress-bar message for the latest snapshot.
pub fn progress_message(snapshot: &GenerationSnapshot) -> String {
    match (&snapshot.status, &snapshot.current) {
        (GenerationStatus::Connecting, _) => "Connecting...".to_string(),
        (_, Some(progress)) => format!("Level {}: {}", progress.level, progress.message),
        (_, None) => "Waiting for progress...".to_string(),
    }
}

/// Final one-line outcome of a run.
pub fn outcome(snapshot: &GenerationSnapshot) -> String {
    match snapshot.status {
        GenerationStatus::Succeeded => snapshot
            .success_message
            .clone()
            .unwrap_or_else(|| "Timetable generated successfully".to_string()),
        GenerationStatus::Failed => format!(
            "Generation failed: {}",
            snapshot.error.as_deref().unwrap_or_default()
        ),
        GenerationStatus::Idle => "Generation cancelled".to_string(),
        GenerationStatus::Connecting | GenerationStatus::Receiving => {
            "Generation did not finish".to_string()
        }
    }
}
