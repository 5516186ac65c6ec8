use std::{env, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// How credentials with a given backup flag are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackupPolicy {
    /// The flag must be set
    Required,
    /// Either value is accepted
    #[default]
    Allowed,
    /// The flag must be clear
    Disallowed,
}

impl FromStr for CredentialBackupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "allowed" => Ok(Self::Allowed),
            "disallowed" => Ok(Self::Disallowed),
            invalid => Err(invalid.to_string()),
        }
    }
}

/// Settings shared by both ceremonies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasskeyOptions {
    /// Origins accepted in client data besides the current one
    pub allowed_origins: Vec<String>,
    /// Accept the origin of the request running the ceremony
    pub allow_current_origin: bool,
    /// Accept client data with `crossOrigin: true`
    pub allow_cross_origin_iframes: bool,
    pub backup_eligible_credential_policy: CredentialBackupPolicy,
    pub backed_up_credential_policy: CredentialBackupPolicy,
    /// Challenge length in bytes
    pub challenge_size: usize,
    pub timeout: Duration,
    /// RP ID override; falls back to the request host
    pub server_domain: Option<String>,
    /// RP display name; falls back to the RP ID
    pub rp_name: Option<String>,
    /// `required`, `preferred` or `discouraged`
    pub user_verification: String,
}

impl Default for PasskeyOptions {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_current_origin: true,
            allow_cross_origin_iframes: false,
            backup_eligible_credential_policy: CredentialBackupPolicy::Allowed,
            backed_up_credential_policy: CredentialBackupPolicy::Allowed,
            challenge_size: 32,
            timeout: Duration::from_secs(300),
            server_domain: None,
            rp_name: None,
            user_verification: "preferred".to_string(),
        }
    }
}

impl PasskeyOptions {
    /// Builds options from `PASSKEY_*` environment variables.
    ///
    /// Unset variables keep their default. Invalid values are logged and
    /// replaced by the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_origins = env::var("PASSKEY_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        let user_verification = match env::var("PASSKEY_USER_VERIFICATION").ok() {
            None => defaults.user_verification,
            Some(v) => match v.to_lowercase().as_str() {
                "required" => "required".to_string(),
                "preferred" => "preferred".to_string(),
                "discouraged" => "discouraged".to_string(),
                invalid => {
                    tracing::warn!(
                        "Invalid user verification: {}. Using default 'preferred'",
                        invalid
                    );
                    defaults.user_verification
                }
            },
        };

        let challenge_size = match parse_var::<usize>("PASSKEY_CHALLENGE_SIZE") {
            Some(size) if size >= 16 => size,
            Some(size) => {
                tracing::warn!(
                    "Challenge size {} is below the 16 byte minimum. Using default {}",
                    size,
                    defaults.challenge_size
                );
                defaults.challenge_size
            }
            None => defaults.challenge_size,
        };

        Self {
            allowed_origins,
            allow_current_origin: parse_var("PASSKEY_ALLOW_CURRENT_ORIGIN")
                .unwrap_or(defaults.allow_current_origin),
            allow_cross_origin_iframes: parse_var("PASSKEY_ALLOW_CROSS_ORIGIN_IFRAMES")
                .unwrap_or(defaults.allow_cross_origin_iframes),
            backup_eligible_credential_policy: parse_var("PASSKEY_BACKUP_ELIGIBLE_POLICY")
                .unwrap_or(defaults.backup_eligible_credential_policy),
            backed_up_credential_policy: parse_var("PASSKEY_BACKED_UP_POLICY")
                .unwrap_or(defaults.backed_up_credential_policy),
            challenge_size,
            timeout: parse_var::<u64>("PASSKEY_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            server_domain: env::var("PASSKEY_SERVER_DOMAIN")
                .ok()
                .filter(|s| !s.is_empty()),
            rp_name: env::var("PASSKEY_RP_NAME").ok().filter(|s| !s.is_empty()),
            user_verification,
        }
    }
}

/// Reads and parses `name`, warning on values that do not parse.
fn parse_var<T>(name: &str) -> Option<T>
where
    T: FromStr,
{
    let value = env::var(name).ok()?;
    match value.trim().to_lowercase().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Invalid value for {}: {}. Using default", name, value);
            None
        }
    }
}
