/// Maximum identifier length accepted by PostgreSQL.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Turn an arbitrary name into a lowercase `[a-z0-9_]` identifier.
///
/// CamelCase boundaries become underscores, runs of other characters collapse
/// into a single underscore, and identifiers starting with a digit get a `_`
/// prefix. The result is truncated to [`MAX_IDENTIFIER_LEN`].
pub fn storage_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() && prev_lower_or_digit && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
        }
    }

    let trimmed = out.trim_end_matches('_');
    let mut identifier = if trimmed.is_empty() {
        "_".to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    };

    identifier.truncate(MAX_IDENTIFIER_LEN);
    identifier
}

#[cfg(test)]
mod tests {
    use super::storage_identifier;

    #[test]
    fn splits_camel_case() {
        assert_eq!(storage_identifier("UniswapV2Factory"), "uniswap_v2_factory");
        assert_eq!(storage_identifier("ERC20"), "erc20");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(storage_identifier("base-sepolia::84532"), "base_sepolia_84532");
        assert_eq!(storage_identifier("  token  "), "token");
    }

    #[test]
    fn guards_leading_digit_and_empty() {
        assert_eq!(storage_identifier("1inch"), "_1inch");
        assert_eq!(storage_identifier("::"), "_");
    }

    #[test]
    fn truncates_long_names() {
        let long = "a".repeat(100);
        assert_eq!(storage_identifier(&long).len(), 63);
    }
}
