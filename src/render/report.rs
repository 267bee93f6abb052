// src/render/report.rs
use std::fmt::Write;

use super::{csm::skipped_note, CsmTemplate, DealershipTemplate};

const RULE_WIDTH: usize = 80;

/// A rendered template shown as a numbered, individually copyable card.
pub trait Card {
    /// Heading shown after `Template {n}: `.
    fn title(&self) -> &str;
    /// Text handed to the clipboard.
    fn body(&self) -> &str;
    /// Footer, e.g. `3 phone line(s)`.
    fn footer(&self) -> String;
    /// Lines shown between heading and body.
    fn preamble(&self) -> Vec<String> {
        Vec::new()
    }
    /// Lines shown after the footer.
    fn notes(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Card for DealershipTemplate {
    fn title(&self) -> &str {
        &self.rooftop_name
    }
    fn body(&self) -> &str {
        &self.body
    }
    fn footer(&self) -> String {
        format!("{} phone line(s)", self.line_count)
    }
    fn preamble(&self) -> Vec<String> {
        vec![format!("Subject: {}", self.subject)]
    }
}

impl Card for CsmTemplate {
    fn title(&self) -> &str {
        &self.owner
    }
    fn body(&self) -> &str {
        &self.body
    }
    fn footer(&self) -> String {
        format!("{} rooftop(s)", self.rooftop_count)
    }
    fn notes(&self) -> Vec<String> {
        skipped_note(&self.skipped).into_iter().collect()
    }
}

/// Which family of templates a section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Dealership,
    Csm,
}

impl Kind {
    fn heading(self) -> &'static str {
        match self {
            Kind::Dealership => "DEALERSHIP TEMPLATES",
            Kind::Csm => "CSM TEMPLATES",
        }
    }
}

/// `Generated 3 template(s) - One per rooftop`
pub fn summary_line(kind: Kind, count: usize) -> String {
    match kind {
        Kind::Dealership => format!("Generated {count} template(s) - One per rooftop"),
        Kind::Csm => format!("Generated {count} CSM template(s) - One per CSM"),
    }
}

/// Every body, each followed by a rule, for a single "copy all" action.
pub fn copy_all<C: Card>(cards: &[C]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    cards
        .iter()
        .map(|c| format!("{}\n\n{rule}\n\n", c.body().trim_end()))
        .collect()
}

/// Render one section of numbered cards followed by its summary line.
pub fn render_section<C: Card>(kind: Kind, cards: &[C]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{}", kind.heading());
    let _ = writeln!(out, "{rule}");

    for (idx, card) in cards.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Template {}: {}", idx + 1, card.title());
        for line in card.preamble() {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let _ = write!(out, "{}", card.body());
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let _ = writeln!(out, "{}", card.footer());
        for note in card.notes() {
            let _ = writeln!(out, "{note}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", summary_line(kind, cards.len()));
    out
}
