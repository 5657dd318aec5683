// Drinking-window alerts, notification preferences, the scheduled alert job
// and email digests.

pub mod alerts;
pub mod email;
pub mod handlers;
pub mod preferences;
pub mod processing;
pub mod repo;
