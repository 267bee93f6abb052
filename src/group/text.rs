// src/group/text.rs

/// Format a North American number as `(DDD) DDD-DDDD`.
///
/// Non-digits are ignored. Ten digits, or eleven with a leading `1`, are formatted;
/// anything else comes back exactly as given.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return raw.to_string(),
    };
    format!("({}) {}-{}", &local[..3], &local[3..6], &local[6..])
}

/// Uppercase the first letter of every whitespace-delimited word and lowercase the
/// rest. Whitespace is kept as-is.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// First whitespace-delimited token, or the whole string when there is none.
pub fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or(full_name)
}
