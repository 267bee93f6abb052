// src/render/mod.rs
pub mod csm;
pub mod dealership;
pub mod report;

pub use csm::{render_csm, skipped_note, CsmTemplate};
pub use dealership::{render_dealership, subject_line, DealershipTemplate};
pub use report::{copy_all, render_section, summary_line, Card, Kind};
