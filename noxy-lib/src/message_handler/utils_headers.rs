use http::{HeaderMap, HeaderName, HeaderValue};

/// Collect the configured forward headers from the inbound request headers.
/// Values are trimmed of surrounding whitespace; names missing from the request or
/// empty after trimming are omitted. Only the inbound request is consulted, never the
/// response, even when the same name appears in both.
pub(super) fn collect_forward_headers(names: &[HeaderName], req_headers: &HeaderMap) -> HeaderMap {
  let mut forwarded = HeaderMap::new();
  for name in names {
    let Some(value) = req_headers.get(name).and_then(|v| v.to_str().ok()) else {
      continue;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
      continue;
    }
    if let Ok(value) = HeaderValue::from_str(trimmed) {
      forwarded.insert(name.clone(), value);
    }
  }
  forwarded
}

/// Set the collected forward headers verbatim on the outgoing notification request,
/// overwriting any default of the same name.
pub(super) fn apply_forward_headers(headers: &mut HeaderMap, forwarded: &HeaderMap) {
  for (name, value) in forwarded {
    headers.insert(name.clone(), value.clone());
  }
}

/// Single-value read of a header: first occurrence only, empty value treated as absent.
pub(super) fn single_header_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a [u8]> {
  headers.get(name).map(|v| v.as_bytes()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(names: &[&'static str]) -> Vec<HeaderName> {
    names.iter().map(|n| HeaderName::from_static(n)).collect()
  }

  #[test]
  fn collect_takes_configured_names_only() {
    let mut req_headers = HeaderMap::new();
    req_headers.insert("x-test-forward-a", "value-a".parse().unwrap());
    req_headers.insert("x-unrelated", "nope".parse().unwrap());

    let forwarded = collect_forward_headers(&names(&["x-test-forward-a", "x-test-forward-b"]), &req_headers);

    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded.get("x-test-forward-a").unwrap(), "value-a");
  }

  #[test]
  fn collect_trims_values_and_omits_empty_ones() {
    let mut req_headers = HeaderMap::new();
    req_headers.insert("x-test-forward-a", "  padded  ".parse().unwrap());
    req_headers.insert("x-test-forward-b", "   ".parse().unwrap());
    req_headers.insert("x-test-forward-c", "".parse().unwrap());

    let forwarded = collect_forward_headers(
      &names(&["x-test-forward-a", "x-test-forward-b", "x-test-forward-c"]),
      &req_headers,
    );

    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded.get("x-test-forward-a").unwrap(), "padded");
  }

  #[test]
  fn apply_overwrites_existing_entries() {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", "text/plain".parse().unwrap());

    let mut forwarded = HeaderMap::new();
    forwarded.insert("content-type", "application/octet-stream".parse().unwrap());
    forwarded.insert("x-request-id", "abc123".parse().unwrap());
    apply_forward_headers(&mut headers, &forwarded);

    assert_eq!(headers.get("content-type").unwrap(), "application/octet-stream");
    assert_eq!(headers.get("x-request-id").unwrap(), "abc123");
  }

  #[test]
  fn single_value_reads_first_occurrence_and_skips_empty() {
    let name = HeaderName::from_static("x-notify");
    let mut headers = HeaderMap::new();
    assert!(single_header_value(&headers, &name).is_none());

    headers.insert(&name, "".parse().unwrap());
    assert!(single_header_value(&headers, &name).is_none());

    headers.insert(&name, "first".parse().unwrap());
    headers.append(&name, "second".parse().unwrap());
    assert_eq!(single_header_value(&headers, &name).unwrap(), b"first");
  }
}
