use chatrepl_config::Config;
use chatrepl_core::DEFAULT_CAPACITY;

/// Strategy for displaying the effective configuration.
///
/// Shows the merged result of the config file and environment overrides,
/// with the API key masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== chatrepl Configuration ===\n");

        println!("Config File:");
        let path = Config::config_path()?;
        let status = if path.exists() { "" } else { " (not found, using defaults)" };
        println!("  Path: {}{status}", path.display());
        println!();

        println!("Provider:");
        println!("  API Key: {}", mask_api_key(&config.provider.api_key));
        println!("  Base URL: {}", config.provider.base_url);
        println!("  Model: {}", config.provider.model);
        println!("  Temperature: {}", config.provider.temperature);
        println!(
            "  User-Agent: {}",
            config.provider.user_agent.as_deref().unwrap_or("(default)")
        );
        println!();

        println!("Chat:");
        println!("  System Prompt: {}", truncate(&config.chat.system_prompt, 60));
        match config.chat.history_capacity {
            Some(capacity) => println!("  History Capacity: {capacity}"),
            None => println!("  History Capacity: {DEFAULT_CAPACITY} (default)"),
        }
        println!();

        println!("Translate:");
        println!(
            "  System Template: {}",
            truncate(&config.translate.system_template, 60)
        );

        if let Err(e) = config.validate() {
            println!();
            println!("⚠️  {e}");
        }

        Ok(())
    }
}

fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
