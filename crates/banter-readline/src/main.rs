use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::{Color, Colorize};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use banter_application::{
    BOT_LABEL, ExchangeOrchestrator, MessageRow, RejectReason, SanitizedRenderer, SendOutcome,
    render_rows,
};
use banter_core::config::SecretConfig;
use banter_core::secret::SecretService;
use banter_core::{BanterError, Message, Sender, Theme, UserProfile};
use banter_infrastructure::{AppStateService, BanterPaths, ConfigService, SecretServiceImpl};
use banter_interaction::GeminiTransport;
use banter_interaction::supported_models::is_known_model;

mod command;
mod helper;
mod logging;

use command::ShellCommand;
use helper::CliHelper;

type Repl = Editor<CliHelper, DefaultHistory>;

#[derive(Parser)]
#[command(name = "banter", version)]
#[command(about = "Banter - chat with Gemini from the terminal", long_about = None)]
struct Cli {
    /// Display name shown on your messages
    #[arg(long)]
    name: Option<String>,

    /// Theme: light, dark or blue
    #[arg(long)]
    theme: Option<String>,

    /// Model ID, overriding secret.json and config.toml
    #[arg(long, env = "BANTER_MODEL")]
    model: Option<String>,

    /// Directory holding config.toml, secret.json and app_state.toml
    #[arg(long, env = "BANTER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Print replies as sanitized HTML rows instead of plain text
    #[arg(long)]
    html: bool,
}

/// Everything the REPL loop needs.
struct Shell {
    orchestrator: ExchangeOrchestrator,
    renderer: SanitizedRenderer,
    profile: UserProfile,
    app_state: AppStateService,
    theme: Theme,
    html: bool,
}

impl Shell {
    fn bot_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::BrightWhite,
            Theme::Blue => Color::BrightCyan,
        }
    }

    fn print_message(&self, message: &Message) {
        if self.html {
            let row = MessageRow::from_message(message, &self.profile, &self.renderer);
            println!("{}", row.to_html());
            return;
        }

        match message.sender() {
            Sender::User => {
                println!("{}", format!("[{}]", self.profile.display_name()).green());
                for line in message.text().lines() {
                    println!("{}", line.green());
                }
            }
            Sender::Bot => {
                println!("{}", format!("[{BOT_LABEL}]").bright_magenta());
                for line in message.text().lines() {
                    println!("{}", line.color(self.bot_color()));
                }
            }
        }
    }

    fn print_typing(&self) {
        let row = MessageRow::typing();
        if self.html {
            println!("{}", row.to_html().bright_black());
        } else {
            println!("{}", format!("[{}] {}", row.sender_label, row.html).bright_black());
        }
    }

    async fn send(&self, text: &str) {
        self.print_typing();
        match self.orchestrator.send_prompt(text).await {
            SendOutcome::Rejected(RejectReason::EmptyInput) => {}
            SendOutcome::Rejected(RejectReason::SendInFlight) => {
                println!("{}", "Still waiting for the previous reply.".yellow());
            }
            SendOutcome::Replied(message) => {
                self.print_message(&message);
                println!();
            }
            SendOutcome::Failed { message, error } => {
                tracing::debug!("Send failed with status {:?}", error.status());
                if self.html {
                    self.print_message(&message);
                } else {
                    println!("{}", format!("[{BOT_LABEL}]").bright_magenta());
                    println!("{}", message.text().red());
                }
                println!();
            }
        }
    }

    fn new_chat(&self) {
        match self.orchestrator.clear() {
            Ok(()) => println!("{}", "Started a new chat.".bright_green()),
            Err(e) if e.is_user_error() => println!("{}", e.to_string().yellow()),
            Err(e) => eprintln!("{}", e.to_string().red()),
        }
    }

    fn switch_theme(&mut self, value: Option<String>) {
        let Some(value) = value else {
            for theme in Theme::available() {
                let marker = if theme == self.theme { "*" } else { " " };
                println!("{} {} ({})", marker, theme.label(), theme);
            }
            return;
        };

        match Theme::parse_loose(&value) {
            Ok(theme) => {
                self.theme = theme;
                if let Err(e) = self.app_state.set_theme(theme) {
                    tracing::warn!("Failed to save theme: {}", e);
                }
                println!("{}", format!("Theme set to {}", theme.label()).bright_green());
            }
            Err(_) => println!(
                "{}",
                format!("Unknown theme '{value}'. Choose light, dark or blue.").yellow()
            ),
        }
    }

    fn print_history(&self) {
        let messages = self.orchestrator.messages();
        if messages.is_empty() {
            println!("{}", "No messages yet.".bright_black());
        }
        for message in &messages {
            println!("{}", message.timestamp().bright_black());
            self.print_message(message);
        }
    }

    fn print_html(&self) {
        let messages = self.orchestrator.messages();
        let rows = render_rows(
            &messages,
            &self.profile,
            &self.renderer,
            self.orchestrator.is_pending(),
        );
        for row in rows {
            println!("{}", row.to_html());
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_black());
    println!("{}", "  /new              start a new chat".bright_black());
    println!("{}", "  /theme [name]     list themes or switch to light, dark or blue".bright_black());
    println!("{}", "  /history          show this conversation".bright_black());
    println!("{}", "  /html             print the conversation as sanitized HTML".bright_black());
    println!("{}", "  /quit             exit".bright_black());
}

/// Picks the model: command line, then `secret.json`, then `config.toml`.
///
/// The key may have come from the environment, so an unreadable
/// `secret.json` is not fatal here; it is logged and skipped.
fn resolve_model(
    cli_model: Option<String>,
    secrets: Result<SecretConfig, BanterError>,
    config_model: &str,
) -> String {
    let secret_model = match secrets {
        Ok(secrets) => secrets.gemini.and_then(|gemini| gemini.model_name),
        Err(e) => {
            tracing::warn!("Ignoring secret.json for model selection: {}", e);
            None
        }
    };

    cli_model
        .or(secret_model)
        .unwrap_or_else(|| config_model.to_string())
}

/// Asks for a display name until a non-blank one is given.
///
/// An empty answer reuses `last` when there is one. Returns `None` when the
/// user cancels.
fn prompt_display_name(rl: &mut Repl, last: Option<String>) -> Result<Option<UserProfile>> {
    let prompt = match &last {
        Some(name) => format!("Your name [{name}]: "),
        None => "Your name: ".to_string(),
    };

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let candidate = if line.trim().is_empty() {
                    last.clone()
                } else {
                    Some(line)
                };
                match candidate.map(UserProfile::new) {
                    Some(Ok(profile)) => return Ok(Some(profile)),
                    _ => println!("{}", "Please enter a name to start chatting.".yellow()),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(None),
            Err(e) => return Err(e).context("Failed to read display name"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = BanterPaths::new(cli.config_dir.as_deref())?;
    paths
        .ensure_config_dir()
        .await
        .with_context(|| format!("Failed to create {}", paths.config_dir().display()))?;
    let _log_guard = logging::init_logging(&paths.logs_dir())?;
    tracing::info!("Starting banter with config dir {:?}", paths.config_dir());

    // ===== Configuration =====
    let config_service = ConfigService::new(&paths);
    config_service.write_default_if_missing()?;
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", paths.config_file().display()))?;

    let secret_service = SecretServiceImpl::new(&paths);
    let api_key = secret_service.gemini_api_key().await?;
    let model = resolve_model(
        cli.model,
        secret_service.load_secrets().await,
        &config.model.name,
    );
    if !is_known_model(&model) {
        tracing::warn!("Model {} is not in the supported list", model);
        println!(
            "{}",
            format!("Warning: '{model}' is not a known Gemini model; sending anyway.").yellow()
        );
    }

    let transport = GeminiTransport::from_config(api_key, &config).with_model(model);
    tracing::info!(
        "Using model {} with up to {} attempt(s) per send",
        transport.model_name(),
        transport.retry_policy().max_attempts()
    );
    let orchestrator = ExchangeOrchestrator::from_config(Arc::new(transport), &config);

    // ===== Profile and theme =====
    let app_state = AppStateService::new(&paths);

    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    let profile = match cli.name {
        Some(name) => UserProfile::new(name)?,
        None => match prompt_display_name(&mut rl, app_state.last_display_name())? {
            Some(profile) => profile,
            None => return Ok(()),
        },
    };
    if let Err(e) = app_state.set_last_display_name(profile.display_name()) {
        tracing::warn!("Failed to save display name: {}", e);
    }

    let theme = match cli.theme {
        Some(value) => {
            let theme = Theme::parse_loose(&value)?;
            if let Err(e) = app_state.set_theme(theme) {
                tracing::warn!("Failed to save theme: {}", e);
            }
            theme
        }
        None => app_state.theme(),
    };

    let mut shell = Shell {
        orchestrator,
        renderer: SanitizedRenderer::new(),
        profile,
        app_state,
        theme,
        html: cli.html,
    };

    println!("{}", "=== Banter ===".bright_magenta().bold());
    println!("{}", shell.profile.greeting().bold());
    if let Ok(avatar) = shell.profile.avatar_url() {
        println!("{}", avatar.bright_black());
    }
    println!(
        "{}",
        format!("Theme: {}. Type /help for commands.", shell.theme.label()).bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(e) => {
                eprintln!("{}", format!("Error: {e:?}").red());
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        match ShellCommand::parse(&line) {
            ShellCommand::Prompt(text) => shell.send(&text).await,
            ShellCommand::New => shell.new_chat(),
            ShellCommand::Theme(value) => shell.switch_theme(value),
            ShellCommand::History => shell.print_history(),
            ShellCommand::Html => shell.print_html(),
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            ShellCommand::Unknown(name) => {
                println!("{}", format!("Unknown command {name}. Type /help.").bright_black());
            }
        }
    }

    tracing::info!("Exiting banter");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_core::config::GeminiConfig;

    fn secrets_with_model(model_name: Option<&str>) -> SecretConfig {
        SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "key".to_string(),
                model_name: model_name.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_model_precedence() {
        assert_eq!(
            resolve_model(
                Some("from-cli".to_string()),
                Ok(secrets_with_model(Some("from-secret"))),
                "from-config"
            ),
            "from-cli"
        );
        assert_eq!(
            resolve_model(None, Ok(secrets_with_model(Some("from-secret"))), "from-config"),
            "from-secret"
        );
        assert_eq!(
            resolve_model(None, Ok(secrets_with_model(None)), "from-config"),
            "from-config"
        );
    }

    #[test]
    fn test_unreadable_secret_file_falls_back_to_config() {
        let secrets = Err(BanterError::serialization("JSON", "expected value"));

        assert_eq!(resolve_model(None, secrets, "from-config"), "from-config");
    }
}
