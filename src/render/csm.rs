// src/render/csm.rs
use serde::Serialize;
use std::fmt::Write;

use crate::group::{first_name, CsmGroup};

/// Follow-up request for one CSM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsmTemplate {
    pub owner: String,
    pub body: String,
    pub rooftop_count: usize,
    /// Owned rooftops that had no lines; shown beside the body, never inside it.
    pub skipped: Vec<String>,
}

/// Render the request, or `None` when the CSM has no included rooftops.
pub fn render_csm(group: &CsmGroup) -> Option<CsmTemplate> {
    if group.is_fully_skipped() {
        return None;
    }

    let mut body = format!(
        "Hi {},\n\
         \n\
         We've identified the following dealerships with low call volume over the past two \
         weeks. To help us follow up, could you please provide a point of contact for each \
         location?\n",
        first_name(&group.owner)
    );
    for r in &group.included {
        let _ = writeln!(body, "• {} – {}", r.rooftop_name, r.inbox_name);
    }
    body.push_str(
        "\nWould you like us to reach out to these dealerships directly, or would you prefer \
         to handle the outreach yourself?\n",
    );

    Some(CsmTemplate {
        owner: group.owner.clone(),
        body,
        rooftop_count: group.included.len(),
        skipped: group.skipped.clone(),
    })
}

/// One-line note listing skipped rooftops, or `None` when there are none.
pub fn skipped_note(skipped: &[String]) -> Option<String> {
    (!skipped.is_empty()).then(|| {
        format!(
            "Skipped {} rooftop(s) with no low-volume lines: {}",
            skipped.len(),
            skipped.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::RooftopRef;
    use pretty_assertions::assert_eq;

    fn group(owner: &str, included: &[(&str, &str)], skipped: &[&str]) -> CsmGroup {
        CsmGroup {
            owner: owner.into(),
            included: included
                .iter()
                .map(|(r, i)| RooftopRef {
                    rooftop_name: r.to_string(),
                    inbox_name: i.to_string(),
                })
                .collect(),
            skipped: skipped.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn greets_first_name_and_lists_rooftops() {
        let t = render_csm(&group("Sam Lee", &[("Acme Ford", "Acme Inbox"), ("Acme Kia", "Kia")], &["Acme VW"]))
            .unwrap();
        let expected = "Hi Sam,\n\
\n\
We've identified the following dealerships with low call volume over the past two weeks. \
To help us follow up, could you please provide a point of contact for each location?\n\
• Acme Ford – Acme Inbox\n\
• Acme Kia – Kia\n\
\n\
Would you like us to reach out to these dealerships directly, or would you prefer to handle \
the outreach yourself?\n";
        assert_eq!(t.body, expected);
        assert_eq!(t.rooftop_count, 2);
        assert!(!t.body.contains("Acme VW"));
        assert_eq!(t.skipped, vec!["Acme VW"]);
    }

    #[test]
    fn fully_skipped_renders_nothing() {
        assert!(render_csm(&group("Pat Kim", &[], &["Zeta Honda"])).is_none());
    }

    #[test]
    fn skipped_note_text() {
        assert_eq!(skipped_note(&[]), None);
        assert_eq!(
            skipped_note(&["A".into(), "B".into()]).as_deref(),
            Some("Skipped 2 rooftop(s) with no low-volume lines: A, B")
        );
    }
}
