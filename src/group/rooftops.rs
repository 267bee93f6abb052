// src/group/rooftops.rs
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use super::text::{format_phone, title_case};
use crate::{
    error::{PipelineError, Result},
    ingest::{DataRow, RowMatrix},
    resolve::{DeskPhoneColumns, LinesColumns},
};

/// Display names starting with this are listed after named users.
pub const UNASSIGNED_PREFIX: &str = "Unassigned line";

const UNKNOWN_NAME: &str = "Unknown";

/// One phone line, joined and normalised from a single lines-file row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneLine {
    pub display_name: String,
    pub raw_display_name: String,
    pub raw_name: String,
    pub phone_number: String,
    /// Empty when no desk phone is known.
    pub desk_phone: String,
}

impl PhoneLine {
    pub fn is_unassigned(&self) -> bool {
        self.display_name.starts_with(UNASSIGNED_PREFIX)
    }
}

/// A dealership and its low-volume lines, in source-row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rooftop {
    pub name: String,
    pub inbox_name: String,
    pub lines: Vec<PhoneLine>,
}

/// Rooftops in first-seen order, plus how many rows were too short to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouped {
    pub rooftops: Vec<Rooftop>,
    pub short_rows: usize,
}

/// Name shown for a line. An explicit display name wins; otherwise the owner type
/// and raw name decide.
pub fn derive_display_name(raw_display_name: &str, owner_type: &str, raw_name: &str) -> String {
    if !raw_display_name.is_empty() {
        return title_case(raw_display_name);
    }
    match owner_type.to_uppercase().as_str() {
        "USER" => format!("{UNASSIGNED_PREFIX} - [{}]", title_case(raw_name)),
        // Folded into the unassigned bucket; older exports rendered "Department line - [..]".
        "DEPARTMENT" => format!("{UNASSIGNED_PREFIX} - [{}]", title_case(raw_name)),
        _ if raw_name.is_empty() => UNKNOWN_NAME.to_string(),
        _ => title_case(raw_name),
    }
}

/// Desk-phone numbers keyed by lowercased display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeskPhoneLookup {
    by_name: HashMap<String, String>,
}

impl DeskPhoneLookup {
    pub fn from_matrix(matrix: &RowMatrix, cols: &DeskPhoneColumns) -> Self {
        let mut by_name = HashMap::new();
        for row in matrix.data_rows() {
            let name = row.trimmed(Some(cols.display_name));
            if name.is_empty() {
                continue;
            }
            let phone = format_phone(row.trimmed(Some(cols.phone_number)));
            by_name.insert(name.to_lowercase(), phone);
        }
        debug!(entries = by_name.len(), "built desk phone lookup");
        Self { by_name }
    }

    /// Desk phone for a raw (trimmed) display name; "" when unknown or blank.
    pub fn get(&self, raw_display_name: &str) -> &str {
        if raw_display_name.is_empty() {
            return "";
        }
        self.by_name
            .get(&raw_display_name.to_lowercase())
            .map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// A classified row: the rooftop and inbox it belongs to, and its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow<'a> {
    pub rooftop: &'a str,
    pub inbox_name: &'a str,
    pub line: PhoneLine,
}

/// Classify one lines-file row. `Ok(None)` means the row has no rooftop and is
/// ignored; a row narrower than the columns in use is a `RowShape` error.
pub fn classify_row<'a>(
    row: DataRow<'a>,
    cols: &LinesColumns,
    desk: Option<&DeskPhoneLookup>,
) -> Result<Option<ClassifiedRow<'a>>> {
    let needed = cols.max_index();
    if row.source_width <= needed {
        return Err(PipelineError::RowShape {
            row: row.index,
            needed,
            found: row.source_width,
        });
    }

    let rooftop = row.trimmed(Some(cols.rooftop_name));
    if rooftop.is_empty() {
        return Ok(None);
    }

    let raw_display_name = row.trimmed(Some(cols.display_name));
    let raw_name = row.trimmed(cols.name);
    let display_name = derive_display_name(raw_display_name, row.trimmed(cols.owner_type), raw_name);
    let desk_phone = desk.map_or("", |d| d.get(raw_display_name));

    Ok(Some(ClassifiedRow {
        rooftop,
        inbox_name: row.trimmed(Some(cols.inbox_name)),
        line: PhoneLine {
            display_name,
            raw_display_name: raw_display_name.to_string(),
            raw_name: raw_name.to_string(),
            phone_number: format_phone(row.trimmed(Some(cols.phone_number))),
            desk_phone: desk_phone.to_string(),
        },
    }))
}

/// Group every usable lines-file row by rooftop. The last row seen for a rooftop
/// sets its inbox name.
pub fn group_rooftops(
    matrix: &RowMatrix,
    cols: &LinesColumns,
    desk: Option<&DeskPhoneLookup>,
) -> Grouped {
    let mut grouped = Grouped::default();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in matrix.data_rows() {
        let classified = match classify_row(row, cols, desk) {
            Ok(Some(c)) => c,
            Ok(None) => {
                trace!(row = row.index, "empty rooftop, skipping");
                continue;
            }
            Err(e) => {
                trace!(error = %e, "short row, skipping");
                grouped.short_rows += 1;
                continue;
            }
        };

        let slot = *index.entry(classified.rooftop).or_insert_with(|| {
            grouped.rooftops.push(Rooftop {
                name: classified.rooftop.to_string(),
                inbox_name: String::new(),
                lines: Vec::new(),
            });
            grouped.rooftops.len() - 1
        });
        let rooftop = &mut grouped.rooftops[slot];
        rooftop.inbox_name = classified.inbox_name.to_string();
        rooftop.lines.push(classified.line);
    }

    if grouped.short_rows > 0 {
        warn!(rows = grouped.short_rows, "dropped rows too short for the resolved columns");
    }
    debug!(rooftops = grouped.rooftops.len(), "grouped lines by rooftop");
    grouped
}
