//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use chatrepl_config::Config;
use chatrepl_core::LLMProvider;
use chatrepl_providers::OpenAICompatProvider;
use tracing::info;

mod chat;
mod info;
mod init;
mod translate;
mod version;

pub use chat::{ChatInput, ChatStrategy, ResponseMode};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use translate::{TranslateInput, TranslateStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type, so parameters are passed
/// without runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Loaded configuration plus the provider built from it.
struct CommonComponents {
    config: Config,
    provider: OpenAICompatProvider,
}

impl CommonComponents {
    /// Model for a session: the CLI override, else the configured model,
    /// else the provider's default.
    fn resolve_model(&self, requested: Option<String>) -> String {
        let non_blank = |model: &String| !model.trim().is_empty();
        requested
            .filter(non_blank)
            .or_else(|| Some(self.config.provider.model.clone()).filter(non_blank))
            .unwrap_or_else(|| self.provider.get_default_model().to_string())
    }
}

/// Load and validate configuration, then build the provider.
fn init_common_components() -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;
    config.validate()?;

    let settings = &config.provider;
    info!(
        "Using provider at {} (model: {})",
        settings.base_url, settings.model
    );

    let provider = OpenAICompatProvider::new(settings.api_key.clone())
        .with_base_url(settings.base_url.clone())
        .with_temperature(settings.temperature)
        .with_user_agent(settings.user_agent.clone());

    Ok(CommonComponents { config, provider })
}
