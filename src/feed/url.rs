use regex::Regex;

/// Extracts the numeric reader identifier from a profile URL.
///
/// Accepts `/user/show/<id>[-slug]` and `/author/show/<id>[.slug]` URLs
/// with or without a scheme, or a bare numeric identifier.
pub fn extract_reader_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/(user|author)/show/(\d+)").expect("valid profile url regex");
    if let Some(captures) = re.captures(url) {
        return Some(captures[2].to_string());
    }

    let trimmed = url.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(trimmed.to_string());
    }

    None
}
