pub mod resume;
pub mod section;
