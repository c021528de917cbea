//! Page title helpers.

/// Encode a title for use in a URL path or file name: spaces become
/// underscores, then the result is percent-encoded.
pub fn encode_api_component(title: &str) -> String {
    urlencoding::encode(&title.replace(' ', "_")).into_owned()
}

/// Inverse of [`encode_api_component`]. Underscores are kept.
pub fn decode_api_component(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

/// Display form of a title: underscores shown as spaces, surrounding
/// whitespace trimmed.
pub fn display_title(title: &str) -> String {
    title.replace('_', " ").trim().to_string()
}

/// Subject page of a talk page: `Talk:X` gives `X`, `User talk:X` gives
/// `User:X`. Titles outside a talk namespace are returned unchanged.
pub fn subject_page(title: &str) -> String {
    let title = display_title(title);
    let Some((namespace, rest)) = title.split_once(':') else {
        return title;
    };
    let namespace = namespace.trim();
    let rest = rest.trim();
    if namespace.eq_ignore_ascii_case("talk") {
        return rest.to_string();
    }
    let lower = namespace.to_ascii_lowercase();
    match lower.strip_suffix(" talk") {
        Some(_) => format!("{}:{}", &namespace[..namespace.len() - " talk".len()], rest),
        None => title,
    }
}
