//! Password sources for the reference connection

use crate::target::{TargetError, TargetResult};

/// Supplies the reference password, if any.
///
/// Resolved only after an endpoint has been given, so interactive
/// providers never prompt for subject-only runs.
pub trait CredentialProvider {
    fn password(&self) -> TargetResult<Option<String>>;
}

/// No authentication
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn password(&self) -> TargetResult<Option<String>> {
        Ok(None)
    }
}

/// Password passed on the command line
#[derive(Clone)]
pub struct StaticPassword(String);

impl StaticPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl CredentialProvider for StaticPassword {
    fn password(&self) -> TargetResult<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// Hidden-input terminal prompt
#[derive(Debug, Clone)]
pub struct PromptPassword {
    prompt: String,
}

impl PromptPassword {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for PromptPassword {
    fn default() -> Self {
        Self::new("Redis password")
    }
}

impl CredentialProvider for PromptPassword {
    fn password(&self) -> TargetResult<Option<String>> {
        let password = dialoguer::Password::new()
            .with_prompt(&self.prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| TargetError::Credentials(e.to_string()))?;

        // An empty answer means no AUTH
        Ok(Some(password).filter(|p| !p.is_empty()))
    }
}
