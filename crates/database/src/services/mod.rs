pub mod capacity;
pub mod enrollment;
pub mod scope;

pub use capacity::CapacityService;
pub use enrollment::EnrollmentService;
pub use scope::ScopeService;
