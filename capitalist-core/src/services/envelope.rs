//! Response envelope interpretation
//!
//! Every reply has the shape `{code, message?, data?}`. `code == 0` means
//! success; anything else is an application-level rejection.

use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};

/// Extract `data` from a successful envelope, or fail with the rejection
pub fn into_data(mut response: JsonValue) -> Result<JsonValue> {
    let code = response_code(&response)?;
    if code != 0 {
        let message = response
            .get("message")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        return Err(Error::Rejected { code, message });
    }

    Ok(response
        .get_mut("data")
        .map(JsonValue::take)
        .unwrap_or(JsonValue::Null))
}

fn response_code(response: &JsonValue) -> Result<i64> {
    match response.get("code") {
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .ok_or_else(|| Error::malformed(format!("response code is not an integer: {}", n))),
        // Some gateways quote numbers
        Some(JsonValue::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| Error::malformed(format!("response code is not an integer: {:?}", s))),
        Some(other) => Err(Error::malformed(format!("unexpected response code: {}", other))),
        None => Err(Error::malformed("response has no code")),
    }
}

/// Look up a required string field of a `data` object
pub(crate) fn required_str<'a>(data: &'a JsonValue, field: &str) -> Result<&'a str> {
    data.get(field)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::malformed(format!("missing or non-string field `{}`", field)))
}
