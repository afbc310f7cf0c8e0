use lazy_static::lazy_static;
use regex::Regex;

/// Format-level checks applied after structural binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty string.
    Required,
    /// At least this many characters.
    MinLen(usize),
    /// Absolute URL; an empty value is allowed.
    Url,
    Email,
}

impl Rule {
    pub fn check_str(&self, value: &str) -> Option<String> {
        match self {
            Rule::Required if value.is_empty() => Some("is required".into()),
            Rule::MinLen(min) if value.chars().count() < *min => {
                Some(format!("must be at least {} characters", min))
            }
            Rule::Url if !value.is_empty() && !is_valid_url(value) => {
                Some("must be a valid URL".into())
            }
            Rule::Email if !is_valid_email(value) => Some("must be a valid email address".into()),
            _ => None,
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_valid_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_len_counts_characters_not_bytes() {
        assert_eq!(Rule::MinLen(3).check_str("Zoë"), None);
        assert!(Rule::MinLen(3).check_str("Zo").is_some());
    }

    #[test]
    fn url_accepts_absolute_urls_only() {
        assert_eq!(Rule::Url.check_str("https://example.com/a.png"), None);
        assert_eq!(Rule::Url.check_str(""), None);
        assert!(Rule::Url.check_str("example.com/a.png").is_some());
        assert!(Rule::Url.check_str("just words").is_some());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("jane example.com"));
        assert!(Rule::Email.check_str("nope").is_some());
    }
}
