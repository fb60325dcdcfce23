use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use chatrepl_core::DEFAULT_CAPACITY;
use chatrepl_providers::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

const CONFIG_DIR_NAME: &str = "chatrepl";
const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_CHAT_PROMPT: &str =
    "Translate the following from English into Finnish, Don't translate any other language";
const DEFAULT_TRANSLATE_TEMPLATE: &str = "Translate the following from English into {language}";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ProviderConfig::default_model")]
    pub model: String,
    #[serde(default = "ProviderConfig::default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            user_agent: None,
        }
    }
}

impl ProviderConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    const fn default_temperature() -> f32 {
        DEFAULT_TEMPERATURE
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    #[serde(default = "ChatConfig::default_system_prompt")]
    pub system_prompt: String,
    /// Turns kept in context, system prompt included. Unset means the
    /// built-in default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_capacity: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: Self::default_system_prompt(),
            history_capacity: None,
        }
    }
}

impl ChatConfig {
    fn default_system_prompt() -> String {
        DEFAULT_CHAT_PROMPT.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TranslateConfig {
    #[serde(default = "TranslateConfig::default_system_template")]
    pub system_template: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            system_template: Self::default_system_template(),
        }
    }
}

impl TranslateConfig {
    fn default_system_template() -> String {
        DEFAULT_TRANSLATE_TEMPLATE.to_string()
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR_NAME))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load `~/chatrepl/config.json` (defaults if absent), then apply the
    /// `OPENAI_*` environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            info!("Loading config from {}", config_path.display());
            Self::load_from(&config_path)?
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Override provider settings from environment variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = get("OPENAI_API_KEY") {
            self.provider.api_key = api_key;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.provider.model = model;
        }
        if let Some(user_agent) = get("USER_AGENT_HEADER") {
            self.provider.user_agent = Some(user_agent);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.provider.api_key.trim().is_empty() {
            anyhow::bail!(
                "No API key configured. Set OPENAI_API_KEY or run 'chatrepl init' and edit the config file."
            );
        }
        if self.chat.history_capacity == Some(0) {
            anyhow::bail!("chat.history_capacity must be at least 1 (got 0)");
        }
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your API key (or export OPENAI_API_KEY)");
        println!("   2. Point provider.base_url at any OpenAI-compatible endpoint");
        println!("   3. Run 'chatrepl chat' or 'chatrepl stream' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - provider.model: model identifier sent with each request");
        println!("   - chat.history_capacity: number of turns kept in context");
        println!("   - translate.system_template: system message for 'chatrepl translate'");
        println!();
        Ok(())
    }

    /// Write the default config as pretty JSON, refusing to overwrite.
    pub fn write_template(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let mut template = Self::default();
        template.provider.api_key = "your-api-key-here".to_string();
        template.chat.history_capacity = Some(DEFAULT_CAPACITY);

        std::fs::write(path, serde_json::to_string_pretty(&template)?)?;
        Ok(())
    }
}
