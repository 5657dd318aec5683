// Taste profile: onboarding quiz mapping, mapping evaluation, storage and
// manual recalibration.

pub mod eval;
pub mod handlers;
pub mod mapping;
pub mod prompts;
pub mod repo;
pub mod schema;
