// LogTrim - lib.rs
//
// Library entry point, exposing all non-CLI modules for integration
// testing and programmatic use (a GUI front-end drives the same surface
// through `app::session` and `app::export_job`).

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
