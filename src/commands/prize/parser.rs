use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_WINNERS: u32 = 1;

lazy_static! {
    static ref PRIZE_TOKEN_REGEX: Regex =
        Regex::new(r"(?s)^(?P<name>[^:]*)(?::(?P<count>.*))?$").unwrap();
}

#[readonly::make]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PrizeToken {
    pub name: String,
    pub winners: u32,
}

// Parses the `add_prize` input: a comma separated list of `name` or
// `name:count` items. An unparsable (or non-positive) count falls back to 1,
// items without a name are skipped.
pub fn parse_prize_tokens(text: &str) -> Vec<PrizeToken> {
    text.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .filter_map(parse_prize_token)
        .collect()
}

fn parse_prize_token(item: &str) -> Option<PrizeToken> {
    let captures = PRIZE_TOKEN_REGEX.captures(item)?;
    let name = captures.name("name")?.as_str().trim();
    if name.is_empty() {
        return None;
    }

    let winners = match captures.name("count") {
        Some(count) => match count.as_str().trim().parse::<u32>() {
            Ok(value) if value >= 1 => value,
            _ => DEFAULT_WINNERS,
        },
        None => DEFAULT_WINNERS,
    };

    Some(PrizeToken {
        name: name.to_string(),
        winners,
    })
}

// Splits a comma separated list of prize names.
pub fn parse_prize_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::commands::prize::parser::{parse_prize_names, parse_prize_tokens};

    fn as_pairs(text: &str) -> Vec<(String, u32)> {
        parse_prize_tokens(text)
            .into_iter()
            .map(|token| (token.name.clone(), token.winners))
            .collect()
    }

    #[test]
    fn test_parse_empty_string() {
        assert_eq!(parse_prize_tokens("").is_empty(), true);
        assert_eq!(parse_prize_tokens(" , ,").is_empty(), true);
    }

    #[test]
    fn test_parse_names_with_and_without_count() {
        assert_eq!(
            as_pairs("A:2, B"),
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn test_parse_spaces_around_separator() {
        assert_eq!(as_pairs("  Gaming mouse : 3 "), vec![("Gaming mouse".to_string(), 3)]);
    }

    #[test]
    fn test_parse_unparsable_count_defaults_to_one() {
        assert_eq!(
            as_pairs("A:lots, B:, C:0, D:-4"),
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 1),
                ("C".to_string(), 1),
                ("D".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_parse_only_first_colon_splits() {
        assert_eq!(as_pairs("A:2:3"), vec![("A".to_string(), 1)]);
    }

    #[test]
    fn test_parse_skips_empty_names() {
        assert_eq!(as_pairs(":3, B:2"), vec![("B".to_string(), 2)]);
    }

    #[test]
    fn test_parse_prize_names() {
        assert_eq!(
            parse_prize_names(" Keyboard ,Mouse,, Headset "),
            vec!["Keyboard", "Mouse", "Headset"]
        );
    }
}
