// src/resolve/columns.rs
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Semantic fields looked up in uploaded headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    DisplayName,
    PhoneNumber,
    RooftopName,
    InboxName,
    OwnerType,
    /// Plain "Name"; only ever matched exactly.
    Name,
    CsmOwner,
    DeskPhoneNumber,
}

/// Header fragments per field, highest priority first.
const CANDIDATES: &[(Field, &[&str])] = &[
    (Field::DisplayName, &["display name", "display_name", "displayname"]),
    (Field::PhoneNumber, &["phone number", "phone_number", "number"]),
    (Field::RooftopName, &["rooftop name", "rooftop_name", "rooftop"]),
    (Field::InboxName, &["inbox name", "inbox_name", "inbox"]),
    (Field::OwnerType, &["owner type", "owner_type", "ownertype"]),
    (Field::CsmOwner, &["csm owner", "csm_owner", "csmowner"]),
    (Field::DeskPhoneNumber, &["phone number", "phone_number", "phone numbers"]),
];

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::DisplayName => "display name",
            Field::PhoneNumber => "phone number",
            Field::RooftopName => "rooftop name",
            Field::InboxName => "inbox name",
            Field::OwnerType => "owner type",
            Field::Name => "name",
            Field::CsmOwner => "csm owner",
            Field::DeskPhoneNumber => "phone number",
        }
    }

    pub fn candidates(self) -> &'static [&'static str] {
        CANDIDATES
            .iter()
            .find(|(f, _)| *f == self)
            .map(|(_, c)| *c)
            .unwrap_or(&[])
    }

    /// Resolve with the matching rule this field uses.
    pub fn find(self, headers: &[String]) -> Option<usize> {
        match self {
            Field::Name => find_exact_col_idx(headers, "name"),
            _ => find_col_idx(headers, self.candidates()),
        }
    }
}

/// First header containing a candidate fragment (case-insensitive). Candidates are
/// tried in priority order; within one candidate, headers left to right.
pub fn find_col_idx(headers: &[String], candidates: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    candidates.iter().find_map(|cand| {
        let cand = cand.to_lowercase();
        lowered.iter().position(|h| h.contains(&cand))
    })
}

/// First header equal to `target` after trimming, ignoring case.
pub fn find_exact_col_idx(headers: &[String], target: &str) -> Option<usize> {
    let target = target.to_lowercase();
    headers
        .iter()
        .position(|h| h.trim().to_lowercase() == target)
}

/// A field and the header it resolved to, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    pub field: Field,
    pub header: Option<String>,
}

fn column_matches(headers: &[String], found: &[(Field, Option<usize>)]) -> Vec<ColumnMatch> {
    found
        .iter()
        .map(|&(field, idx)| ColumnMatch {
            field,
            header: idx.and_then(|i| headers.get(i).cloned()),
        })
        .collect()
}

fn require(file: &str, headers: &[String], fields: &[Field]) -> Result<Vec<usize>> {
    let found: Vec<(Field, Option<usize>)> =
        fields.iter().map(|&f| (f, f.find(headers))).collect();
    let missing: Vec<String> = found
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(f, _)| f.label().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumn {
            file: file.to_string(),
            fields: missing,
            headers: headers.to_vec(),
        });
    }
    Ok(found.into_iter().filter_map(|(_, idx)| idx).collect())
}

/// Resolved positions in the lines-with-low-call-volume file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinesColumns {
    pub display_name: usize,
    pub phone_number: usize,
    pub rooftop_name: usize,
    pub inbox_name: usize,
    pub owner_type: Option<usize>,
    pub name: Option<usize>,
}

impl LinesColumns {
    const REQUIRED: [Field; 4] = [
        Field::DisplayName,
        Field::PhoneNumber,
        Field::RooftopName,
        Field::InboxName,
    ];

    pub fn resolve(file: &str, headers: &[String]) -> Result<Self> {
        let req = require(file, headers, &Self::REQUIRED)?;
        Ok(Self {
            display_name: req[0],
            phone_number: req[1],
            rooftop_name: req[2],
            inbox_name: req[3],
            owner_type: Field::OwnerType.find(headers),
            name: Field::Name.find(headers),
        })
    }

    /// Highest column index any classification step reads.
    pub fn max_index(&self) -> usize {
        [
            Some(self.display_name),
            Some(self.phone_number),
            Some(self.rooftop_name),
            Some(self.inbox_name),
            self.owner_type,
            self.name,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }

    pub fn matches(&self, headers: &[String]) -> Vec<ColumnMatch> {
        column_matches(
            headers,
            &[
                (Field::DisplayName, Some(self.display_name)),
                (Field::PhoneNumber, Some(self.phone_number)),
                (Field::RooftopName, Some(self.rooftop_name)),
                (Field::InboxName, Some(self.inbox_name)),
                (Field::OwnerType, self.owner_type),
                (Field::Name, self.name),
            ],
        )
    }
}

/// Resolved positions in the rooftop-information file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RooftopInfoColumns {
    pub rooftop_name: usize,
    pub csm_owner: usize,
}

impl RooftopInfoColumns {
    pub fn resolve(file: &str, headers: &[String]) -> Result<Self> {
        let req = require(file, headers, &[Field::RooftopName, Field::CsmOwner])?;
        Ok(Self {
            rooftop_name: req[0],
            csm_owner: req[1],
        })
    }

    pub fn max_index(&self) -> usize {
        self.rooftop_name.max(self.csm_owner)
    }

    pub fn matches(&self, headers: &[String]) -> Vec<ColumnMatch> {
        column_matches(
            headers,
            &[
                (Field::RooftopName, Some(self.rooftop_name)),
                (Field::CsmOwner, Some(self.csm_owner)),
            ],
        )
    }
}

/// Resolved positions in the optional desk-phones file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskPhoneColumns {
    pub display_name: usize,
    pub phone_number: usize,
}

impl DeskPhoneColumns {
    pub fn resolve(file: &str, headers: &[String]) -> Result<Self> {
        let req = require(file, headers, &[Field::DisplayName, Field::DeskPhoneNumber])?;
        Ok(Self {
            display_name: req[0],
            phone_number: req[1],
        })
    }

    pub fn matches(&self, headers: &[String]) -> Vec<ColumnMatch> {
        column_matches(
            headers,
            &[
                (Field::DisplayName, Some(self.display_name)),
                (Field::DeskPhoneNumber, Some(self.phone_number)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(h: &[&str]) -> Vec<String> {
        h.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn candidate_priority_beats_header_position() {
        let h = headers(&["Phone", "Display Name"]);
        assert_eq!(find_col_idx(&h, &["display name", "display_name"]), Some(1));

        // "number" is lowest priority, so "Phone Number" wins over an earlier "Number"
        let h = headers(&["Number", "Phone Number"]);
        assert_eq!(Field::PhoneNumber.find(&h), Some(1));
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let h = headers(&["ROOFTOP_NAME_FULL"]);
        assert_eq!(find_col_idx(&h, &["rooftop name", "rooftop_name"]), Some(0));
        assert_eq!(find_col_idx(&h, &["inbox"]), None);
    }

    #[test]
    fn exact_resolver_skips_display_name() {
        let h = headers(&["Display Name", "Name"]);
        assert_eq!(find_exact_col_idx(&h, "Name"), Some(1));
        assert_eq!(find_col_idx(&h, &["name"]), Some(0));

        let h = headers(&["  NAME  "]);
        assert_eq!(Field::Name.find(&h), Some(0));
    }

    #[test]
    fn lines_columns_resolve_all() {
        let h = headers(&["Rooftop Name", "Inbox Name", "Display Name", "Phone Number", "Owner Type", "Name"]);
        let cols = LinesColumns::resolve("lines.csv", &h).unwrap();
        assert_eq!(
            cols,
            LinesColumns {
                display_name: 2,
                phone_number: 3,
                rooftop_name: 0,
                inbox_name: 1,
                owner_type: Some(4),
                name: Some(5),
            }
        );
        assert_eq!(cols.max_index(), 5);
    }

    #[test]
    fn compact_headers_resolve() {
        let h = headers(&["RooftopName", "InboxName", "DisplayName", "PhoneNumber", "OwnerType", "Name"]);
        let cols = LinesColumns::resolve("lines.csv", &h).unwrap();
        assert_eq!(cols.display_name, 2);
        assert_eq!(cols.phone_number, 3);
        assert_eq!(cols.owner_type, Some(4));
        assert_eq!(cols.name, Some(5));
    }

    #[test]
    fn missing_required_lists_fields_and_headers() {
        let h = headers(&["Rooftop", "Phone Number"]);
        let err = LinesColumns::resolve("lines.csv", &h).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingColumn {
                file: "lines.csv".into(),
                fields: vec!["display name".into(), "inbox name".into()],
                headers: h,
            }
        );
    }

    #[test]
    fn desk_phone_candidates() {
        let h = headers(&["Display Name", "Phone Numbers"]);
        let cols = DeskPhoneColumns::resolve("desk_phones.csv", &h).unwrap();
        assert_eq!(cols.phone_number, 1);
    }
}
