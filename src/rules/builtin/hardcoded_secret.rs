use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

const SECRET_KEYWORDS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "api_secret",
    "access_token",
    "auth_token",
    "private_key",
    "secret_key",
    "database_url",
    "db_password",
];

/// Literal source text (quotes included) must be longer than this.
const MIN_LITERAL_LEN: usize = 4;

/// Hardcoded Credential (structural)
///
/// Flags declarations and assignments to credential-like names whose value
/// is a non-trivial string literal.
pub(super) fn matches(parsed: &ParsedFile, _language: Language) -> Vec<MatchSite> {
    parsed
        .assignments
        .iter()
        .filter(|a| is_secret_name(&a.target))
        .filter(|a| {
            a.values.iter().any(|v| {
                v.shape.is_string_literal() && v.text.chars().count() > MIN_LITERAL_LEN
            })
        })
        .map(|a| a.site.clone())
        .collect()
}

fn is_secret_name(target: &str) -> bool {
    let lower = target.to_lowercase();
    SECRET_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::{lines, run};

    #[test]
    fn names_match_case_insensitively() {
        assert!(is_secret_name("DB_PASSWORD"));
        assert!(is_secret_name("githubToken"));
        assert!(is_secret_name("config.apiKey"));
        assert!(!is_secret_name("username"));
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn flags_javascript_literals() {
        let code = r#"const password = "hunter2";
let apiKey = process.env.API_KEY;
const token = "";
this.secret = 'ab';
config.authToken = `s3cr3t-value`;
"#;
        assert_eq!(lines(&run(matches, "a.js", code)), vec![1, 5]);
    }

    #[cfg(feature = "python")]
    #[test]
    fn flags_python_literals() {
        let code = "SECRET_KEY = 'django-insecure-123'\npassword = os.environ['PW']\nTOKEN = f'{prefix}-x'\n";
        assert_eq!(lines(&run(matches, "settings.py", code)), vec![1]);
    }

    #[cfg(feature = "go")]
    #[test]
    fn flags_every_go_form() {
        let code = r#"package main

const apiKey = "AKIA1234"

var dbPassword = `raw-secret`

func main() {
	token := "abcdef"
	password = "x"
	secret := os.Getenv("SECRET")
}
"#;
        assert_eq!(lines(&run(matches, "main.go", code)), vec![3, 5, 8]);
    }
}
