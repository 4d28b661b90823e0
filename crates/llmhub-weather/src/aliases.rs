//! Location alias normalization.

/// Informal or commonly misspelled names mapped to canonical `City,CountryCode` queries.
const ALIASES: &[(&str, &str)] = &[("pachikapallam", "Pachikapallam,IN")];

/// Normalize a free-text location query: trim, then apply the alias table
/// (matched case-insensitively). Unknown queries pass through trimmed.
pub fn normalize_query(query: &str) -> String {
    let trimmed = query.trim();
    let lowered = trimmed.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// City part of a `City,CountryCode` query, lowercased, for candidate matching.
pub fn city_part(query: &str) -> String {
    query
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_applies_case_insensitively() {
        assert_eq!(normalize_query("pachikapallam"), "Pachikapallam,IN");
        assert_eq!(normalize_query("  PachiKapallam "), "Pachikapallam,IN");
    }

    #[test]
    fn test_unknown_query_is_trimmed() {
        assert_eq!(normalize_query("  Delhi,IN "), "Delhi,IN");
    }

    #[test]
    fn test_city_part() {
        assert_eq!(city_part("Delhi,IN"), "delhi");
        assert_eq!(city_part("Springfield, IL, US"), "springfield");
        assert_eq!(city_part("Paris"), "paris");
    }
}
