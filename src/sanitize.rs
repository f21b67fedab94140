//! Cleaning of client supplied text before it is stored.
//!
//! Free text is sanitised once on the way in. The result is safe HTML, so views
//! insert it with `PreEscaped` instead of escaping it again. Values that end up
//! in HTML attributes (e-mail addresses, image URLs) are validated instead and
//! always rendered with normal escaping.

/// Trim `text` and strip any HTML that could run script in a browser.
///
/// Harmless markup such as `<b>` is kept, while `<script>` elements, event
/// handler attributes and `javascript:` links are removed.
pub fn clean_text(text: &str) -> String {
    ammonia::clean(text.trim()).trim().to_owned()
}

/// Undo the escaping [clean_text] applies to text, for prefilling form inputs.
///
/// The result must be escaped again when it is written out.
pub fn editable_text(stored: &str) -> String {
    stored
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Like [clean_text], but `None` for empty input.
pub fn clean_optional_text(text: Option<&str>) -> Option<String> {
    text.map(clean_text).filter(|text| !text.is_empty())
}

/// Derive a URL slug from a title.
///
/// The slug is made of the lowercase ASCII alphanumeric runs in `title`
/// joined by '-'. For example, "Hello, World!" becomes "hello-world".
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Characters that have no place in an attribute value we write out.
fn is_attribute_unsafe(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '`')
}

/// A loose check that `email` looks like an e-mail address.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(is_attribute_unsafe) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

/// Check that `url` is an absolute http(s) URL that can sit in an attribute.
pub fn is_plausible_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(rest) => !rest.is_empty() && !url.chars().any(is_attribute_unsafe),
        None => false,
    }
}

/// Trim `text`, `None` for empty input. The value is not cleaned, so it must be
/// validated before it is stored.
pub fn trimmed(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// The escape character used with [escape_like].
pub const LIKE_ESCAPE: char = '\\';

/// Escape the SQL `LIKE` wildcards in `term` and wrap it in '%' so that it
/// matches anywhere in a column.
///
/// Queries using the result must add `ESCAPE '\'` after the `LIKE` pattern.
pub fn escape_like(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');

    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{
        clean_optional_text, clean_text, editable_text, escape_like, is_plausible_email,
        is_plausible_url, slugify, trimmed,
    };

    #[test]
    fn editable_text_survives_another_save() {
        for typed in ["Fish & chips", "1 < 2 > 0", "literal &lt; entity", "<b>bold</b>"] {
            let stored = clean_text(typed);

            assert_eq!(clean_text(&editable_text(&stored)), stored, "typed {typed:?}");
        }
        assert_eq!(editable_text(&clean_text("Fish & chips")), "Fish & chips");
    }

    #[test]
    fn clean_text_removes_scripts() {
        let got = clean_text("  Lunch<script>alert('pwned')</script>  ");

        assert_eq!(got, "Lunch");
    }

    #[test]
    fn clean_text_removes_event_handlers() {
        let got = clean_text(r#"<img src="x.png" onerror="alert(1)">"#);

        assert!(!got.contains("onerror"), "got {got}");
    }

    #[test]
    fn clean_optional_text_drops_blank_input() {
        assert_eq!(clean_optional_text(Some("   ")), None);
        assert_eq!(clean_optional_text(None), None);
        assert_eq!(clean_optional_text(Some(" a ")), Some("a".to_owned()));
    }

    #[test]
    fn slugify_joins_words() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust  2024 edition "), "rust-2024-edition");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn email_needs_both_sides_of_at() {
        assert!(is_plausible_email("me@example.com"));
        assert!(!is_plausible_email("example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("me@"));
    }

    #[test]
    fn email_rejects_attribute_breakers() {
        assert!(!is_plausible_email(r#"me@x.com" onmouseover="alert(1)"#));
        assert!(!is_plausible_email("me@x.com<b>"));
        assert!(!is_plausible_email("me @x.com"));
    }

    #[test]
    fn url_must_be_http_without_quotes() {
        assert!(is_plausible_url("https://example.com/a.png?w=1&h=2"));
        assert!(is_plausible_url("http://example.com/a.png"));
        assert!(!is_plausible_url("javascript:alert(1)"));
        assert!(!is_plausible_url("/static/a.png"));
        assert!(!is_plausible_url("https://"));
        assert!(!is_plausible_url(r#"https://x.png" onerror="alert(1)"#));
        assert!(!is_plausible_url("https://x.com/a b.png"));
    }

    #[test]
    fn trimmed_keeps_text_as_is() {
        assert_eq!(trimmed(Some(" a&b ")), Some("a&b".to_owned()));
        assert_eq!(trimmed(Some("  ")), None);
    }

    #[test]
    fn escape_like_matches_literal_wildcards() {
        let connection = Connection::open_in_memory().unwrap();
        let matches = |text: &str, term: &str| -> bool {
            connection
                .query_row(
                    "SELECT ?1 LIKE ?2 ESCAPE '\\'",
                    (text, escape_like(term)),
                    |row| row.get(0),
                )
                .unwrap()
        };

        assert!(matches("50% off", "50%"));
        assert!(!matches("500 off", "50%"));
        assert!(matches("snake_case", "e_c"));
        assert!(!matches("snakeXcase", "e_c"));
        assert!(matches("C:\\temp", "\\"));
        assert!(matches("Groceries", "ocer"));
    }
}
