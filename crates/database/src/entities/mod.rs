pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod instructors;
pub mod students;
