/// Quote a single character if necessary.
fn quote_char(ch: char, out: &mut String) {
    if (ch as u32) < 0x20 {
        out.push_str(&format!("\\x{:02x}", ch as u32));
    } else if ch == '"' || ch == '\\' {
        out.push('\\');
        out.push(ch);
    } else {
        out.push(ch);
    }
}

/// Convert a string into a safely quoted string with quotation marks.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        quote_char(ch, &mut out);
    }
    out.push('"');
    out
}
