//! Typed data contracts for the backend's REST resources.
//!
//! Every response body is decoded into one of these structs at the API
//! boundary. Create/update DTOs carry `validator` rules that are checked
//! before a request leaves the client.

mod course;
mod department;
mod group;
mod lecturer;
mod room;
mod timetable;
mod upload;
mod user;

pub use course::{Course, CreateCourse, UpdateCourse};
pub use department::{CreateDepartment, Department};
pub use group::{CreateStudentGroup, StudentGroup, UpdateStudentGroup};
pub use lecturer::{CreateLecturer, Lecturer, UpdateLecturer};
pub use room::{CreateRoom, Room, UpdateRoom};
pub use timetable::{
    AcademicHalf, CreateTimetable, GenerationMetadata, Timetable, TimetableDetail, TimetableSlot,
};
pub use upload::BulkUploadReport;
pub use user::{LoginRequest, TokenResponse, User};
