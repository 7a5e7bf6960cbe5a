/// Placeholder shown when a camera never reported its total
pub const UNKNOWN_TOTAL: &str = "-";

/// Substitute `$name` and `${name}` placeholders from `values`.
///
/// `$$` yields a literal `$`. Unknown names and malformed placeholders are
/// left in place untouched.
pub fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let lookup = |name: &str| {
        values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                if is_identifier(name) {
                    if let Some(value) = lookup(name) {
                        out.push_str(value);
                        rest = &braced[end + 1..];
                        continue;
                    }
                }
            }
            out.push('$');
            rest = after;
            continue;
        }

        let len = identifier_len(after);
        match lookup(&after[..len]) {
            Some(value) if len > 0 => {
                out.push_str(value);
                rest = &after[len..];
            }
            _ => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the completion command for one finished session
pub fn render_command(template: &str, camera: &str, fetched: u32, total: Option<u32>) -> String {
    let n = fetched.to_string();
    let total = total.map_or_else(|| UNKNOWN_TOTAL.to_string(), |t| t.to_string());
    substitute(
        template,
        &[("camera", camera), ("n", n.as_str()), ("total", total.as_str())],
    )
}

fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
        .map_or(text.len(), |(i, _)| i)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_len(name) == name.len()
}
