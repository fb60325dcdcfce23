use chatrepl_conversation::{Console, TranslationSession, translation_template};
use tracing::info;

use super::init_common_components;

#[derive(Debug, Clone)]
pub struct TranslateInput {
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for the prompt-template translation example.
#[derive(Debug, Clone, Copy)]
pub struct TranslateStrategy;

impl super::CommandStrategy for TranslateStrategy {
    type Input = TranslateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let template = translation_template(&common.config.translate.system_template)?;
        let model = common.resolve_model(input.model);

        let translations =
            TranslationSession::new(common.provider, template, Console::stdio(), model)
                .run()
                .await?;

        info!("Translation session finished: {translations} translations");
        Ok(())
    }
}
