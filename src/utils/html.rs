// src/utils/html.rs

/// Cleans free text before it is forwarded to the assessment API.
///
/// Whitelist-based: safe inline tags survive, `<script>` (with its content),
/// `<iframe>` and event-handler attributes are stripped. Surrounding
/// whitespace is trimmed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_keeps_text() {
        let cleaned = clean_html("  Great quiz<script>alert(1)</script> <b>thanks</b> ");
        assert_eq!(cleaned, "Great quiz <b>thanks</b>");
    }
}
