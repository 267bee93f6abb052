// src/render/dealership.rs
use serde::Serialize;
use std::fmt::Write;

use crate::group::{PhoneLine, Rooftop};

const SUPPORT_EMAIL: &str = "support@numa.com";

/// Outreach email for one rooftop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealershipTemplate {
    pub rooftop_name: String,
    pub inbox_name: String,
    pub subject: String,
    pub body: String,
    pub line_count: usize,
}

pub fn subject_line(rooftop_name: &str, inbox_name: &str) -> String {
    format!("{rooftop_name} - {inbox_name}: Phoneline forwarding")
}

fn bullet(line: &PhoneLine) -> String {
    let mut s = format!(
        "• {} – Numa IT forwarding number: {}",
        line.display_name, line.phone_number
    );
    if !line.desk_phone.is_empty() {
        let _ = write!(s, " – Desk phone: {}", line.desk_phone);
    }
    s
}

/// Render the outreach email. Named users are listed first, then unassigned lines,
/// each group in source order.
pub fn render_dealership(rooftop: &Rooftop) -> DealershipTemplate {
    let (unassigned, regular): (Vec<&PhoneLine>, Vec<&PhoneLine>) =
        rooftop.lines.iter().partition(|l| l.is_unassigned());

    let mut body = format!(
        "Good morning [Dealership POC],\n\
         \n\
         We've recently noticed a drop in call volume on your account ({} – {})\n\
         \n\
         To ensure you're getting the most out of your Numa subscription, please confirm that \
         missed calls on the following users' direct lines are forwarding to their respective \
         Numa IT forwarding lines after 4 rings (approximately 20 seconds), rather than going to \
         local voicemail (including DND, busy, and after-hours scenarios):\n",
        rooftop.name, rooftop.inbox_name
    );
    for line in regular.into_iter().chain(unassigned) {
        let _ = writeln!(body, "{}", bullet(line));
    }
    let _ = write!(
        body,
        "\n\
         If anyone listed above has left the dealership, or if new staff need a forwarding \
         line, please reply with your updated roster so we can keep your account current.\n\
         \n\
         If you have any questions, feel free to email us at {SUPPORT_EMAIL}.\n"
    );

    DealershipTemplate {
        rooftop_name: rooftop.name.clone(),
        inbox_name: rooftop.inbox_name.clone(),
        subject: subject_line(&rooftop.name, &rooftop.inbox_name),
        body,
        line_count: rooftop.lines.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(display: &str, phone: &str) -> PhoneLine {
        PhoneLine {
            display_name: display.into(),
            raw_display_name: String::new(),
            raw_name: String::new(),
            phone_number: phone.into(),
            desk_phone: String::new(),
        }
    }

    #[test]
    fn subject_format() {
        assert_eq!(
            subject_line("Acme Ford", "Acme Inbox"),
            "Acme Ford - Acme Inbox: Phoneline forwarding"
        );
    }

    #[test]
    fn unassigned_lines_follow_named_users() {
        let rooftop = Rooftop {
            name: "Acme Ford".into(),
            inbox_name: "Sales".into(),
            lines: vec![
                line("Unassigned line - [Parts]", "(555) 000-0001"),
                line("Alice", "(555) 000-0002"),
                line("Unassigned line - [Jane]", "(555) 000-0003"),
                line("Bob", "(555) 000-0004"),
            ],
        };
        let t = render_dealership(&rooftop);
        let bullets: Vec<&str> = t.body.lines().filter(|l| l.starts_with('•')).collect();
        assert_eq!(
            bullets,
            vec![
                "• Alice – Numa IT forwarding number: (555) 000-0002",
                "• Bob – Numa IT forwarding number: (555) 000-0004",
                "• Unassigned line - [Parts] – Numa IT forwarding number: (555) 000-0001",
                "• Unassigned line - [Jane] – Numa IT forwarding number: (555) 000-0003",
            ]
        );
        assert_eq!(t.line_count, 4);
        assert!(t.body.starts_with("Good morning [Dealership POC],\n\n"));
        assert!(t.body.contains("(Acme Ford – Sales)"));
        assert!(t.body.contains("updated roster"));
        assert!(t.body.ends_with("support@numa.com.\n"));
    }

    #[test]
    fn desk_phone_suffix_only_when_known() {
        let mut with_desk = line("Alice", "(555) 000-0002");
        with_desk.desk_phone = "(555) 999-0000".into();
        assert_eq!(
            bullet(&with_desk),
            "• Alice – Numa IT forwarding number: (555) 000-0002 – Desk phone: (555) 999-0000"
        );
        assert_eq!(
            bullet(&line("Bob", "1")),
            "• Bob – Numa IT forwarding number: 1"
        );
    }
}
