// Link cleanup for vendor URLs.

const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "igshid",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "mc_cid",
    "mc_eid",
    "_r",
    "_t",
    "is_from_webapp",
    "sender_device",
];

/// Strip tracking query parameters and fragments from an absolute http(s)
/// URL. Anything that doesn't parse as one is dropped.
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let mut parsed = url::Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.set_fragment(None);

    if parsed.query().is_some() {
        let clean_pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if clean_pairs.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
        }
    }

    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_but_keeps_real_params() {
        let clean =
            canonicalize_url("https://www.youtube.com/watch?v=abc&utm_source=share&fbclid=x")
                .unwrap();
        assert_eq!(clean, "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn drops_query_when_only_tracking_remains() {
        let clean = canonicalize_url("https://www.tiktok.com/@a/video/1?_r=1&_t=8kq").unwrap();
        assert_eq!(clean, "https://www.tiktok.com/@a/video/1");
    }

    #[test]
    fn fragments_are_removed() {
        let clean = canonicalize_url("https://example.com/post#comments").unwrap();
        assert_eq!(clean, "https://example.com/post");
    }

    #[test]
    fn non_http_and_garbage_are_rejected() {
        assert_eq!(canonicalize_url("not a url"), None);
        assert_eq!(canonicalize_url("javascript:alert(1)"), None);
        assert_eq!(canonicalize_url("/relative/path"), None);
    }
}
