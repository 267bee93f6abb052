// src/group/csm.rs
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::rooftops::Rooftop;
use crate::{ingest::RowMatrix, resolve::RooftopInfoColumns};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RooftopRef {
    pub rooftop_name: String,
    pub inbox_name: String,
}

/// Rooftops owned by one CSM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsmGroup {
    pub owner: String,
    /// Rooftops with at least one low-volume line.
    pub included: Vec<RooftopRef>,
    /// Rooftops the CSM owns that had no lines in the lines file.
    pub skipped: Vec<String>,
}

impl CsmGroup {
    fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            included: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Nothing to ask this CSM about.
    pub fn is_fully_skipped(&self) -> bool {
        self.included.is_empty()
    }
}

/// Ownership read from the rooftop-information file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ownership {
    /// Later rows overwrite earlier ones for the same rooftop.
    pub rooftop_to_csm: HashMap<String, String>,
    /// Every rooftop per owner in row order, whether or not it has lines.
    pub rooftops_by_csm: Vec<(String, Vec<String>)>,
}

impl Ownership {
    pub fn from_matrix(matrix: &RowMatrix, cols: &RooftopInfoColumns) -> Self {
        let mut own = Ownership::default();
        let mut owner_slot: HashMap<String, usize> = HashMap::new();
        let needed = cols.max_index();

        for row in matrix.data_rows() {
            if row.source_width <= needed {
                continue;
            }
            let rooftop = row.trimmed(Some(cols.rooftop_name));
            let owner = row.trimmed(Some(cols.csm_owner));
            if rooftop.is_empty() || owner.is_empty() {
                continue;
            }
            own.rooftop_to_csm
                .insert(rooftop.to_string(), owner.to_string());

            let slot = *owner_slot.entry(owner.to_string()).or_insert_with(|| {
                own.rooftops_by_csm.push((owner.to_string(), Vec::new()));
                own.rooftops_by_csm.len() - 1
            });
            let names = &mut own.rooftops_by_csm[slot].1;
            if !names.iter().any(|n| n == rooftop) {
                names.push(rooftop.to_string());
            }
        }
        debug!(
            rooftops = own.rooftop_to_csm.len(),
            owners = own.rooftops_by_csm.len(),
            "read rooftop ownership"
        );
        own
    }
}

/// Group rooftops by their CSM. Owners of rooftops with lines come first, in rooftop
/// order; owners only known from the rooftop-information file follow.
pub fn group_by_csm(ownership: &Ownership, rooftops: &[Rooftop], unknown_csm: &str) -> Vec<CsmGroup> {
    let mut groups: Vec<CsmGroup> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut slot_for = |owner: &str, groups: &mut Vec<CsmGroup>| -> usize {
        *slots.entry(owner.to_string()).or_insert_with(|| {
            groups.push(CsmGroup::new(owner));
            groups.len() - 1
        })
    };

    for rooftop in rooftops {
        let owner = ownership
            .rooftop_to_csm
            .get(&rooftop.name)
            .map_or(unknown_csm, String::as_str);
        let slot = slot_for(owner, &mut groups);
        groups[slot].included.push(RooftopRef {
            rooftop_name: rooftop.name.clone(),
            inbox_name: rooftop.inbox_name.clone(),
        });
    }

    let present: HashSet<&str> = rooftops.iter().map(|r| r.name.as_str()).collect();
    for (owner, names) in &ownership.rooftops_by_csm {
        let slot = slot_for(owner.as_str(), &mut groups);
        groups[slot].skipped.extend(
            names
                .iter()
                .filter(|n| !present.contains(n.as_str()))
                .cloned(),
        );
    }

    groups
}
