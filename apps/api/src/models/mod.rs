pub mod candidate;
pub mod evaluation;
pub mod fields;
pub mod role_track;
