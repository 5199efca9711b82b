// Storage module - engine caches and persisted assignments
pub mod assignment_store;
pub mod readiness_cache;
pub mod survey_cache;

pub use assignment_store::*;
pub use readiness_cache::*;
pub use survey_cache::*;
