//! Canonical forms of the keys compared across saves.
//!
//! The same function is applied to the stored key and to the candidate, so
//! both rules must be idempotent.

/// Trim whitespace and trailing slashes, then lowercase.
///
/// `" https://TechCrunch.com/article-1/ "` and `"https://techcrunch.com/article-1"`
/// normalize to the same key.
pub fn normalize_url(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_lowercase()
}

/// Lowercase and trim. Used for tool names and fact summaries.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_variants_collapse() {
        let canonical = normalize_url("https://techcrunch.com/article-1");
        for variant in [
            "https://techcrunch.com/article-1/",
            "  HTTPS://TechCrunch.com/Article-1  ",
            "https://techcrunch.com/article-1///",
            "https://techcrunch.com/article-1/ \n",
        ] {
            assert_eq!(normalize_url(variant), canonical, "variant {:?}", variant);
        }
    }

    #[test]
    fn url_normalization_is_idempotent() {
        for raw in ["", "/", " / ", "https://x.io/a/ /", "HTTPS://Example.COM/"] {
            let once = normalize_url(raw);
            assert_eq!(normalize_url(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn name_normalization() {
        assert_eq!(normalize_name("  TestTool "), "testtool");
        assert_eq!(normalize_name("Cursor AI"), "cursor ai");
        for raw in ["", "  ", " Mixed Case\t", "ÉDITEUR"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once, "input {:?}", raw);
        }
    }
}
