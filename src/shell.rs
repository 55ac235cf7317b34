//! POSIX shell quoting for remote command lines.

/// Returns `value` quoted for a POSIX shell when it contains anything beyond
/// a conservative set of safe characters.
///
/// Quoting wraps the value in single quotes and writes embedded quotes as
/// `'\''`.
#[must_use]
pub fn quote(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_safe_char) {
        return value.to_owned();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Joins a program and its arguments into one shell command line.
#[must_use]
pub fn join<'a>(program: &str, args: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = quote(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg));
    }
    line
}

const fn is_safe_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '=' | '+' | ',' | '@')
}
