/// Trims the raw provider text and drops one pair of enclosing double quotes.
pub fn normalize_line(raw: &str) -> String {

    let trimmed = raw.trim();

    match trimmed.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner.to_string(),
        None => trimmed.to_string()
    }

}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_strips_one_pair_of_quotes() {

        assert_eq!(normalize_line("\"hello\""), "hello");
        assert_eq!(normalize_line("  \"A line of gold\"  \n"), "A line of gold");
        assert_eq!(normalize_line("\"\"nested\"\""), "\"nested\"");

    }

    #[test]
    fn test_unquoted_text_is_only_trimmed() {

        assert_eq!(normalize_line("hello"), "hello");
        assert_eq!(normalize_line("\t hello world \n"), "hello world");

    }

    #[test]
    fn test_asymmetric_quotes_are_left_alone() {

        assert_eq!(normalize_line("\"hello"), "\"hello");
        assert_eq!(normalize_line("hello\""), "hello\"");
        assert_eq!(normalize_line("\""), "\"");

    }

}
