//! Console text helpers.

use serde_json::{Map, Value};

/// Substitute `${key}` placeholders in `fmt` with values from `args`.
///
/// Strings are inserted without quotes, other values use their JSON form.
/// Unknown keys and unterminated placeholders are kept verbatim.
pub fn format_string(fmt: &str, args: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut rest = fmt;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &tail[..end];
        match args.get(key) {
            Some(Value::String(s)) => out.push_str(s),
            Some(value) => out.push_str(&value.to_string()),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}
