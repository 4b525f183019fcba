//! Content line folding for iCalendar (RFC 5545 §3.1).

/// Maximum line length in octets (not including CRLF).
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line to the 75-octet limit and terminates it with CRLF.
///
/// Continuation lines start with a single space. Multi-byte UTF-8
/// characters are never split.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 3);
    let mut rest = line;
    let mut budget = MAX_LINE_OCTETS;

    while rest.len() > budget {
        let mut end = budget;
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single character wider than the budget
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        result.push_str(&rest[..end]);
        result.push_str("\r\n ");
        rest = &rest[end..];
        // Continuation lines lose one octet to the leading space
        budget = MAX_LINE_OCTETS - 1;
    }
    result.push_str(rest);
    result.push_str("\r\n");
    result
}
