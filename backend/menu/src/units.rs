use regex::Regex;
use serde_json::Value;

/// Strips embedded weight-unit markers from a nutrition value.
///
/// Sodexo mixes plain numbers with strings like `"250 mg"` or `"12g"`.
/// String values lose every `mg`, `kg` and `g` token (case-sensitive, with
/// any whitespace around the token) and are trimmed; anything else passes
/// through untouched.
pub fn strip_units(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(strip_unit_tokens(&s)),
        other => other,
    }
}

pub fn strip_unit_tokens(value: &str) -> String {
    let mut stripped = value.to_string();

    // mg and kg must go before the bare g pass, otherwise "mg" degrades to "m"
    for marker in ["mg", "kg", "g"] {
        let token = Regex::new(&format!(r"\s*{marker}\s*")).unwrap();
        stripped = token.replace_all(&stripped, "").into_owned();
    }

    stripped.trim().to_string()
}
