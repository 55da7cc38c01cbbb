/// Escape HTML metacharacters and trim surrounding whitespace before a value
/// is persisted. Applied to free-text fields that come straight from clients.
pub fn sanitize(input: &str) -> String {
    input
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            sanitize("<script>alert(\"hi\")</script>"),
            "&lt;script&gt;alert(&quot;hi&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("  Jane Doe  "), "Jane Doe");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(sanitize("Jl. Merdeka 17"), "Jl. Merdeka 17");
    }
}
