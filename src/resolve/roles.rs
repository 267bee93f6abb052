// src/resolve/roles.rs
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    error::{PipelineError, Result},
    ingest::RowMatrix,
};

/// What an uploaded file is used for, decided from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Lines,
    RooftopInfo,
    DeskPhones,
}

impl Role {
    /// Roles in the order a filename is tested against them.
    pub const ALL: [Role; 3] = [Role::Lines, Role::RooftopInfo, Role::DeskPhones];

    /// `name` must already be lowercased.
    pub fn matches(self, name: &str) -> bool {
        match self {
            Role::Lines => name.contains("lines_with_low") && name.contains("call_volume"),
            // exports sometimes arrive with the name cut short
            Role::RooftopInfo => {
                name.contains("rooftop_information") || name.contains("rooftop_informatio")
            }
            Role::DeskPhones => name.contains("desk_phones"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Lines => "lines with low call volume",
            Role::RooftopInfo => "rooftop information",
            Role::DeskPhones => "desk phones",
        }
    }
}

/// The role a lowercased filename plays, if any. A file plays at most one role.
pub fn classify(name: &str) -> Option<Role> {
    Role::ALL.into_iter().find(|r| r.matches(name))
}

#[derive(Debug, Clone, Copy)]
pub struct RoleFile<'a> {
    pub name: &'a str,
    pub matrix: &'a RowMatrix,
}

/// Files picked for each role.
#[derive(Debug, Clone, Copy)]
pub struct FileRoles<'a> {
    pub lines: RoleFile<'a>,
    pub rooftop_info: RoleFile<'a>,
    pub desk_phones: Option<RoleFile<'a>>,
}

/// Assign files to roles, first match per role in key order. Missing lines or
/// rooftop-information files are an error naming what was available.
pub fn resolve_roles<'a>(files: &BTreeMap<&'a str, &'a RowMatrix>) -> Result<FileRoles<'a>> {
    let mut picked: [Option<RoleFile<'a>>; 3] = [None; 3];

    for (&name, &matrix) in files {
        let Some(role) = classify(name) else {
            debug!(file = name, "no role");
            continue;
        };
        let slot = &mut picked[role as usize];
        if slot.is_none() {
            debug!(file = name, role = role.label(), "role assigned");
            *slot = Some(RoleFile { name, matrix });
        }
    }

    let [lines, rooftop_info, desk_phones] = picked;
    match (lines, rooftop_info) {
        (Some(lines), Some(rooftop_info)) => Ok(FileRoles {
            lines,
            rooftop_info,
            desk_phones,
        }),
        (lines, rooftop_info) => {
            let mut missing = Vec::new();
            if lines.is_none() {
                missing.push(Role::Lines.label().to_string());
            }
            if rooftop_info.is_none() {
                missing.push(Role::RooftopInfo.label().to_string());
            }
            Err(PipelineError::MissingRoleFile {
                available: files.keys().map(|k| k.to_string()).collect(),
                missing,
            })
        }
    }
}
