//! Request-body field validation shared by every handler.

use serde_json::Value;

use super::request::ApiRequest;

/// Extract a required, non-empty text field from the request body.
///
/// Missing fields, `null`, empty strings and non-string values all count as
/// absent.
pub fn required_text(request: &ApiRequest, field: &str) -> Option<String> {
    match request.body_field(field) {
        Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Extract every field in `fields`, or `None` if any one is absent.
pub fn required_texts<const N: usize>(
    request: &ApiRequest,
    fields: [&str; N],
) -> Option<[String; N]> {
    let mut values: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, field) in values.iter_mut().zip(fields) {
        *slot = required_text(request, field)?;
    }
    Some(values)
}
