// LogTrim - app/mod.rs
//
// Application orchestration layer: edit sessions and background export
// jobs. Depends on core; never the other way round.

pub mod export_job;
pub mod session;
