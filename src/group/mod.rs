// src/group/mod.rs
pub mod csm;
pub mod rooftops;
pub mod text;

pub use csm::{group_by_csm, CsmGroup, Ownership, RooftopRef};
pub use rooftops::{
    classify_row, derive_display_name, group_rooftops, DeskPhoneLookup, Grouped, PhoneLine,
    Rooftop, UNASSIGNED_PREFIX,
};
pub use text::{first_name, format_phone, title_case};
