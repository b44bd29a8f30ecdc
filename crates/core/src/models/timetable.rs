use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{DbId, Level};

/// Which half of the academic year a timetable covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicHalf {
    #[default]
    FirstHalf,
    SecondHalf,
}

/// Bookkeeping the backend writes once a generation run succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub generated_at: Option<String>,
    /// Levels processed by the run, in processing order (5 -> 2).
    #[serde(default)]
    pub levels_processed: Vec<Level>,
}

/// A timetable row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    pub id: DbId,
    pub name: String,
    pub semester: String,
    pub year: i32,
    #[serde(default)]
    pub academic_half: AcademicHalf,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub avg_score: Option<f64>,
    #[serde(default)]
    pub generation_metadata: Option<GenerationMetadata>,
}

impl Timetable {
    /// Whether a generation run has already completed for this timetable.
    ///
    /// Only ungenerated timetables may be handed to the progress client.
    pub fn is_generated(&self) -> bool {
        self.generation_metadata
            .as_ref()
            .is_some_and(|meta| meta.generated)
    }
}

/// One scheduled session inside a generated timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub id: DbId,
    pub timetable_id: DbId,
    pub course_id: DbId,
    pub lecturer_id: DbId,
    pub room_id: DbId,
    pub group_id: DbId,
    /// 0 = Monday.
    pub day_of_week: i32,
    /// `HH:MM:SS` as sent by the backend.
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
}

/// Response of `GET /api/timetables/{id}`: the row plus its slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableDetail {
    #[serde(flatten)]
    pub timetable: Timetable,
    #[serde(default)]
    pub slots: Vec<TimetableSlot>,
}

/// DTO for creating a timetable (no slots are generated by this call).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateTimetable {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub semester: String,
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    pub academic_half: AcademicHalf,
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn minimal_timetable_decodes_with_defaults() {
        let json = r#"{"id":42,"name":"2026 S1","semester":"First","year":2026,"is_active":false,"generation_metadata":null}"#;
        let timetable: Timetable = serde_json::from_str(json).unwrap();
        assert_eq!(timetable.academic_half, AcademicHalf::FirstHalf);
        assert!(timetable.generation_metadata.is_none());
        assert!(!timetable.is_generated());
    }

    #[test]
    fn generated_metadata_marks_timetable_generated() {
        let json = r#"{"id":42,"name":"2026 S1","semester":"First","year":2026,"is_active":true,
            "generation_metadata":{"generated":true,"levels_processed":[5,4,3,2]}}"#;
        let timetable: Timetable = serde_json::from_str(json).unwrap();
        assert!(timetable.is_generated());
        let meta = timetable.generation_metadata.unwrap();
        assert_eq!(meta.levels_processed, vec![5, 4, 3, 2]);
        assert!(meta.generated_at.is_none());
    }

    #[test]
    fn detail_flattens_row_and_slots() {
        let json = r#"{"id":1,"name":"T","semester":"First","year":2026,"is_active":false,
            "slots":[{"id":7,"timetable_id":1,"course_id":2,"lecturer_id":3,"room_id":4,"group_id":5,
            "day_of_week":0,"start_time":"08:00:00","end_time":"10:00:00","session_type":"lecture"}]}"#;
        let detail: TimetableDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.timetable.id, 1);
        assert_eq!(detail.slots.len(), 1);
        assert_eq!(detail.slots[0].session_type, "lecture");
    }

    #[test]
    fn academic_half_serializes_snake_case() {
        let json = serde_json::to_value(AcademicHalf::SecondHalf).unwrap();
        assert_eq!(json, "second_half");
    }

    #[test]
    fn create_requires_name_and_plausible_year() {
        let create = CreateTimetable {
            name: String::new(),
            semester: "First".to_string(),
            year: 1999,
            academic_half: AcademicHalf::FirstHalf,
        };
        let errors = create.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("year"));
    }
}
