//! Cropper session management module
//!
//! This module contains:
//! - Session state (source image, crop region, buffer slot, analysis results)
//! - Message types driving the session

pub mod messages;
pub mod state;
