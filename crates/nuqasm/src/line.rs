//! Physical-line preprocessing: comment extraction, statement splitting and
//! whitespace normalization.
//!
//! Every statement handed to the classifier has gone through [`normalize`],
//! so classification and element source retention see one canonical spelling
//! per statement.

/// Split a physical line into its code and its trailing `//` comment.
///
/// `//` inside a string literal does not start a comment.
pub fn strip_comment(line: &str) -> (&str, Option<&str>) {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => {
                return (&line[..i], Some(line[i + 2..].trim()));
            }
            _ => {}
        }
        i += 1;
    }
    (line, None)
}

/// Split code into statements.
///
/// A statement ends after `;` or `}` seen at brace depth zero or below. The
/// depth restarts at zero on every physical line, so a gate body spread over
/// several lines yields one piece per body statement and one for the closing
/// brace. Whitespace-only pieces are dropped.
pub fn split_statements(code: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_string = false;

    for c in code.chars() {
        current.push(c);
        match c {
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth <= 0 {
                    flush(&mut current, &mut pieces);
                    depth = 0;
                }
            }
            ';' if !in_string && depth <= 0 => flush(&mut current, &mut pieces),
            _ => {}
        }
    }
    flush(&mut current, &mut pieces);
    pieces
}

fn flush(current: &mut String, pieces: &mut Vec<String>) {
    if !current.trim().is_empty() {
        pieces.push(current.trim().to_string());
    }
    current.clear();
}

/// Canonical spelling of a statement.
///
/// Trims, collapses whitespace runs to one space, drops spaces around `,`
/// and before `;`, and joins a name to the `(` after it: `rz (a) q[0] , q[1] ;`
/// becomes `rz(a) q[0],q[1];`. String literals keep their spacing.
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            ' ' if !in_string => {
                let next = chars.peek().copied();
                let prev = out.chars().last();
                let joins_paren = next == Some('(')
                    && prev.is_some_and(|p| p.is_ascii_alphanumeric() || p == '_');
                if matches!(next, Some(',' | ';')) || prev == Some(',') || joins_paren {
                    continue;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}
