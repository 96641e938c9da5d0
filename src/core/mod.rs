//! Application core
//!
//! - app.rs: the cropper update loop and its analyzer/notifier seams

pub mod app;
