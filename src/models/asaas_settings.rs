use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::crypto::{
    MasterKey, PURPOSE_ASAAS_API_KEY, PURPOSE_ASAAS_WEBHOOK_TOKEN, mask_secret,
};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AsaasEnvironment {
    Sandbox,
    Production,
}

/// Payment-processor settings row as stored. Secrets are encrypted.
#[derive(Debug, Clone)]
pub struct AsaasSettingsRow {
    pub api_key_encrypted: String,
    pub webhook_token_encrypted: Option<String>,
    pub environment: AsaasEnvironment,
    pub pix_enabled: bool,
    pub card_enabled: bool,
    pub updated_at: i64,
}

/// Decrypted settings, only ever held in memory.
#[derive(Clone)]
pub struct AsaasSettings {
    pub api_key: String,
    pub webhook_token: Option<String>,
    pub environment: AsaasEnvironment,
    pub pix_enabled: bool,
    pub card_enabled: bool,
    pub updated_at: i64,
}

impl std::fmt::Debug for AsaasSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsaasSettings")
            .field("api_key", &mask_secret(&self.api_key))
            .field("environment", &self.environment)
            .field("pix_enabled", &self.pix_enabled)
            .field("card_enabled", &self.card_enabled)
            .finish()
    }
}

impl AsaasSettingsRow {
    pub fn decrypt(&self, master_key: &MasterKey) -> Result<AsaasSettings> {
        let api_key = master_key.decrypt(PURPOSE_ASAAS_API_KEY, &self.api_key_encrypted)?;
        let webhook_token = self
            .webhook_token_encrypted
            .as_deref()
            .map(|t| master_key.decrypt(PURPOSE_ASAAS_WEBHOOK_TOKEN, t))
            .transpose()?;
        Ok(AsaasSettings {
            api_key,
            webhook_token,
            environment: self.environment,
            pix_enabled: self.pix_enabled,
            card_enabled: self.card_enabled,
            updated_at: self.updated_at,
        })
    }
}

/// Settings with secrets masked, for admin display.
#[derive(Debug, Clone, Serialize)]
pub struct AsaasSettingsMasked {
    pub api_key: String,
    pub webhook_token: Option<String>,
    pub environment: AsaasEnvironment,
    pub pix_enabled: bool,
    pub card_enabled: bool,
    pub updated_at: i64,
}

impl From<&AsaasSettings> for AsaasSettingsMasked {
    fn from(settings: &AsaasSettings) -> Self {
        Self {
            api_key: mask_secret(&settings.api_key),
            webhook_token: settings.webhook_token.as_deref().map(mask_secret),
            environment: settings.environment,
            pix_enabled: settings.pix_enabled,
            card_enabled: settings.card_enabled,
            updated_at: settings.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAsaasSettings {
    pub api_key: String,
    #[serde(default)]
    pub webhook_token: Option<String>,
    #[serde(default = "default_environment")]
    pub environment: AsaasEnvironment,
    #[serde(default = "default_true")]
    pub pix_enabled: bool,
    #[serde(default = "default_true")]
    pub card_enabled: bool,
}

fn default_environment() -> AsaasEnvironment {
    AsaasEnvironment::Sandbox
}

fn default_true() -> bool {
    true
}
