//! Header/metadata flattening shared by the logging middlewares

use ::http::HeaderMap;

/// Flatten a header map into loggable pairs.
///
/// Multi-valued keys collapse into one `[a], [b]` attribute; values that
/// are not valid UTF-8 are skipped.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(headers.keys_len());
    for key in headers.keys() {
        let values: Vec<&str> = headers
            .get_all(key)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        match values.len() {
            0 => continue,
            1 => pairs.push((key.as_str().to_string(), values[0].to_string())),
            _ => pairs.push((
                key.as_str().to_string(),
                format!("[{}]", values.join("], [")),
            )),
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::http::header::{HeaderName, HeaderValue};

    #[test]
    fn multi_valued_headers_collapse() {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        headers.append(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("10.0.0.1"),
        );
        headers.append(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("10.0.0.2"),
        );

        let pairs = header_pairs(&headers);
        assert!(pairs.contains(&("accept".to_string(), "application/json".to_string())));
        assert!(pairs.contains(&(
            "x-forwarded-for".to_string(),
            "[10.0.0.1], [10.0.0.2]".to_string()
        )));
    }
}
