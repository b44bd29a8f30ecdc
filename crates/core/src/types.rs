/// All backend primary keys are integer row ids.
pub type DbId = i64;

/// An academic level (year of study). Generation runs process them 5 -> 2.
pub type Level = i32;
