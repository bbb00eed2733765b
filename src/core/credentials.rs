use std::error::Error;
use std::fmt;

use crate::core::config::Config;
use crate::core::constants::{BASE_URL_ENV_VAR, TOKEN_ENV_VAR};

const QUICK_FIXES: &[&str] = &[
    "export SLANGIT_TOKEN=...            # Bearer token for the Slangit API",
    "echo 'SLANGIT_TOKEN=...' >> .env    # Or keep it in a .env file next to you",
];

/// Everything needed to talk to the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCredentials {
    pub token: String,
    pub base_url: String,
}

#[derive(Debug)]
pub struct CredentialError {
    message: String,
    quick_fixes: &'static [&'static str],
    exit_code: i32,
}

impl CredentialError {
    pub fn missing_token() -> Self {
        Self {
            message: format!(
                "❌ {TOKEN_ENV_VAR} environment variable not set\n\nPlease set your Slangit API token:\n   export {TOKEN_ENV_VAR}=\"your-token-here\""
            ),
            quick_fixes: QUICK_FIXES,
            exit_code: 2,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CredentialError {}

/// Resolve credentials from the process environment.
///
/// The base URL comes from the command-line override, then
/// `SLANGIT_BASE_URL`, then the config file.
pub fn resolve_credentials(
    config: &Config,
    base_url_override: Option<&str>,
) -> Result<ApiCredentials, CredentialError> {
    resolve_credentials_with(config, base_url_override, |key| std::env::var(key).ok())
}

pub fn resolve_credentials_with<F>(
    config: &Config,
    base_url_override: Option<&str>,
    lookup: F,
) -> Result<ApiCredentials, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    let token = lookup(TOKEN_ENV_VAR)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(CredentialError::missing_token)?;

    let base_url = base_url_override
        .map(str::to_string)
        .or_else(|| lookup(BASE_URL_ENV_VAR))
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| config.base_url().to_string());

    Ok(ApiCredentials { token, base_url })
}

/// Print a credential failure with its quick fixes and exit.
pub fn exit_with_credential_error(err: &CredentialError) -> ! {
    eprintln!("{err}");
    let fixes = err.quick_fixes();
    if !fixes.is_empty() {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in fixes {
            eprintln!("  • {fix}");
        }
    }
    std::process::exit(err.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_BASE_URL;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_token_is_an_error() {
        let vars = env(&[]);
        let err = resolve_credentials_with(&Config::default(), None, |k| vars.get(k).cloned())
            .expect_err("token should be required");
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("SLANGIT_TOKEN"));
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let vars = env(&[("SLANGIT_TOKEN", "   ")]);
        assert!(
            resolve_credentials_with(&Config::default(), None, |k| vars.get(k).cloned()).is_err()
        );
    }

    #[test]
    fn base_url_precedence() {
        let config = Config {
            base_url: Some("https://config.test/api".to_string()),
            ..Config::default()
        };
        let vars = env(&[
            ("SLANGIT_TOKEN", "tok"),
            ("SLANGIT_BASE_URL", "https://env.test/api"),
        ]);

        let creds =
            resolve_credentials_with(&config, Some("https://flag.test/api"), |k| {
                vars.get(k).cloned()
            })
            .unwrap();
        assert_eq!(creds.base_url, "https://flag.test/api");

        let creds = resolve_credentials_with(&config, None, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(creds.base_url, "https://env.test/api");

        let token_only = env(&[("SLANGIT_TOKEN", "tok")]);
        let creds =
            resolve_credentials_with(&config, None, |k| token_only.get(k).cloned()).unwrap();
        assert_eq!(creds.base_url, "https://config.test/api");

        let creds =
            resolve_credentials_with(&Config::default(), None, |k| token_only.get(k).cloned())
                .unwrap();
        assert_eq!(creds.base_url, DEFAULT_BASE_URL);
        assert_eq!(creds.token, "tok");
    }
}
