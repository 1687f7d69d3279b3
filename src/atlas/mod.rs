//! Atlas generation
//!
//! - Fixed 16x16 grid packing and UV computation
//! - Script support detection from the probe results
//! - Atlas.json descriptor
//! - Preview banner

pub mod language;
pub mod metadata;
pub mod packer;
pub mod preview;
