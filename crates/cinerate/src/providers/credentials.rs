//! Local format checks for remote provider credentials.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ClientError, ClientResult};
use crate::models::{Credential, ProviderId};

static RE_OPENROUTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-or-[A-Za-z0-9][A-Za-z0-9_-]{15,}$").unwrap());

/// Checks that `credential` is non-empty and shaped like a key for `provider`.
///
/// This never contacts the backend; whether the key is accepted is only
/// known after the provider is used.
pub fn validate_credential(provider: ProviderId, credential: &Credential) -> ClientResult<()> {
    let value = credential.expose();
    if value.trim().is_empty() {
        return Err(ClientError::validation(format!(
            "No credential configured for provider {}",
            provider
        )));
    }

    match provider {
        ProviderId::Local => Err(ClientError::validation(
            "The local provider does not take a credential",
        )),
        ProviderId::OpenRouter => {
            if RE_OPENROUTER_KEY.is_match(value) {
                Ok(())
            } else {
                Err(ClientError::validation(format!(
                    "Credential for provider {} is malformed (expected 'sk-or-...')",
                    provider
                )))
            }
        }
    }
}
