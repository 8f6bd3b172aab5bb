//! RUT/RUN display formatting.

/// Format a Chilean national ID as grouped digits plus check character.
///
/// Separators are discarded; the last remaining character is the check digit.
/// Inputs with fewer than two characters come back cleaned but otherwise
/// unchanged.
///
/// ```
/// assert_eq!(rayen_core::text::format_rut("12345678"), "1.234.567-8");
/// assert_eq!(rayen_core::text::format_rut("11.222.333-k"), "11.222.333-K");
/// ```
pub fn format_rut(raw: &str) -> String {
    let cleaned: Vec<char> = raw.chars().filter(|c| c.is_alphanumeric()).collect();
    if cleaned.len() < 2 {
        return cleaned.into_iter().collect();
    }

    let (body, check) = cleaned.split_at(cleaned.len() - 1);
    let check_digit: String = check[0].to_uppercase().collect();

    let mut grouped: Vec<String> = body
        .rchunks(3)
        .map(|chunk| chunk.iter().collect())
        .collect();
    grouped.reverse();

    format!("{}-{}", grouped.join("."), check_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_digits() {
        assert_eq!(format_rut("12345678"), "1.234.567-8");
        assert_eq!(format_rut("112223334"), "11.222.333-4");
        assert_eq!(format_rut("1234"), "123-4");
        assert_eq!(format_rut("12"), "1-2");
    }

    #[test]
    fn test_format_reformats_existing_separators() {
        assert_eq!(format_rut("11.222.333-4"), "11.222.333-4");
        assert_eq!(format_rut("7.654.321-k"), "7.654.321-K");
        assert_eq!(format_rut(" 7654321 K "), "7.654.321-K");
    }

    #[test]
    fn test_format_short_input_unchanged() {
        assert_eq!(format_rut("5"), "5");
        assert_eq!(format_rut("-"), "");
        assert_eq!(format_rut(""), "");
    }

    #[test]
    fn test_single_dash_and_short_groups() {
        for raw in ["1", "123456789012", "98765432", "55"] {
            let formatted = format_rut(raw);
            if raw.len() < 2 {
                continue;
            }
            assert_eq!(formatted.matches('-').count(), 1, "{formatted}");
            let body = formatted.split('-').next().unwrap();
            assert!(body.split('.').all(|g| !g.is_empty() && g.len() <= 3));
        }
    }
}
