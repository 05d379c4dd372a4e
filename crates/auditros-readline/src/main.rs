use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use auditros_application::{ControllerDeps, Reply, SessionController};
use auditros_core::AuditSection;
use auditros_core::clock;
use auditros_core::generation::{GenerationMode, MediaPayload};
use auditros_core::secret::SecretService;
use auditros_core::session::{Message, MessageRole};
use auditros_core::storage::KeyValueStore;
use auditros_infrastructure::{
    AuditrosPaths, ChatHistoryStore, ConfigService, ExperienceStore, JsonFileStore,
    SecretServiceImpl, UserRegistryStore,
};
use auditros_interaction::GeminiApiClient;

mod command;
mod helper;

use command::{COMMANDS, Command};
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "auditros")]
#[command(about = "Auditros - audit assistance chat shell", long_about = None)]
struct Cli {
    /// Base directory for config.toml, secret.json, and stored data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Audit module to open at startup, e.g. "Tax Compliance"
    #[arg(long)]
    section: Option<String>,

    /// Generation mode for plain messages
    #[arg(long)]
    mode: Option<GenerationMode>,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct Shell {
    controller: SessionController,
    media_dir: PathBuf,
}

impl Shell {
    /// Runs one command. Returns `false` when the shell should exit.
    async fn execute(&self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Help => print_help(),
            Command::Send(content) => {
                println!("{}", "Processing...".bright_black());
                let reply = self.controller.send_message(&content, None, None).await?;
                self.show_reply(&reply).await?;
            }
            Command::Section(None) => {
                let active = self.controller.active_section();
                for section in AuditSection::iter() {
                    let marker = if section == active { "*" } else { " " };
                    println!("{} {}", marker.bright_green(), section);
                }
            }
            Command::Section(Some(label)) => match AuditSection::parse_loose(&label) {
                Some(section) => {
                    self.controller.select_section(section);
                    print_transcript(&self.controller.messages());
                }
                None => println!("{}", format!("Unknown module: {label}").yellow()),
            },
            Command::Mode(None) => {
                let active = self.controller.mode();
                for mode in GenerationMode::iter() {
                    let marker = if mode == active { "*" } else { " " };
                    println!("{} {} ({})", marker.bright_green(), mode, mode.model_name());
                }
            }
            Command::Mode(Some(name)) => match name.parse::<GenerationMode>() {
                Ok(mode) => {
                    self.controller.set_mode(mode);
                    println!("{}", format!("Mode set to {mode}").green());
                }
                Err(_) => println!("{}", format!("Unknown mode: {name}").yellow()),
            },
            Command::New => {
                let session = self.controller.new_chat();
                println!("{}", format!("New session {}", session.id).green());
                print_transcript(&self.controller.messages());
            }
            Command::Sessions => {
                let sessions = self.controller.sessions();
                if sessions.is_empty() {
                    println!("{}", "No stored sessions.".bright_black());
                }
                for session in sessions {
                    println!(
                        "{}  {}  {}",
                        session.id.bright_black(),
                        session.title.bright_white(),
                        format!("[{}, {} messages]", session.section, session.messages.len())
                            .bright_black()
                    );
                }
            }
            Command::Open(id) => {
                self.controller.open_session(&id)?;
                print_transcript(&self.controller.messages());
            }
            Command::Delete(id) => {
                self.controller.delete_session(&id)?;
                println!("{}", format!("Deleted session {id}").green());
            }
            Command::Upload(path) => {
                let document = self.controller.upload_document(&path)?;
                println!(
                    "{}",
                    format!(
                        "Attached {} ({}, {})",
                        document.name, document.mime_type, document.size
                    )
                    .green()
                );
            }
            Command::Docs => {
                let documents = self.controller.documents();
                if documents.is_empty() {
                    println!("{}", "No evidence attached.".bright_black());
                }
                for doc in documents {
                    println!(
                        "{}  {}  {}",
                        doc.id.bright_black(),
                        doc.name.bright_white(),
                        doc.size.bright_black()
                    );
                }
            }
            Command::Remove(id) => {
                if self.controller.remove_document(&id) {
                    println!("{}", "Document removed.".green());
                } else {
                    println!("{}", format!("No document with id {id}").yellow());
                }
            }
            Command::Image(prompt) => {
                println!("{}", "Generating image...".bright_black());
                let reply = self.controller.generate_image(&prompt, None).await?;
                self.show_reply(&reply).await?;
            }
            Command::Video(prompt) => {
                println!(
                    "{}",
                    "Rendering video. This can take several minutes...".bright_black()
                );
                let reply = self.controller.generate_video(&prompt, None).await?;
                self.show_reply(&reply).await?;
            }
            Command::Speak(text) => {
                let reply = self.controller.synthesize_speech(&text).await?;
                self.show_reply(&reply).await?;
            }
            Command::Login { email, name } => {
                let user = self.controller.login(&name, &email, "")?;
                println!("{}", format!("Signed in as {} <{}>", user.name, user.email).green());
            }
            Command::Logout => {
                self.controller.logout()?;
                println!("{}", "Signed out.".green());
            }
            Command::WhoAmI => match self.controller.current_user() {
                Some(user) => println!("{} <{}>", user.name.bright_white(), user.email),
                None => println!("{}", "Not signed in.".bright_black()),
            },
            Command::Key(key) => {
                self.controller.rotate_api_key(key);
                if let Some(message) = self.controller.messages().last() {
                    print_message(message);
                }
            }
        }
        Ok(true)
    }

    async fn show_reply(&self, reply: &Reply) -> Result<()> {
        print_message(&reply.message);
        if let Some(media) = &reply.media {
            let path = self.save_media(media).await?;
            println!("{}", format!("Saved {}", path.display()).green());
        }
        Ok(())
    }

    async fn save_media(&self, media: &MediaPayload) -> Result<PathBuf> {
        let bytes = match media {
            MediaPayload::Inline { data, .. } => STANDARD
                .decode(data)
                .context("Generated media is not valid base64")?,
            MediaPayload::Remote { uri, .. } => self.controller.download_video(uri).await?,
        };

        fs::create_dir_all(&self.media_dir)?;
        let path = self.media_dir.join(format!(
            "{}.{}",
            clock::wall_clock_id(),
            extension_for(media.mime_type())
        ));
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/L16" | "audio/pcm" => "pcm",
        _ => "bin",
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_magenta());
    for (_, usage) in COMMANDS {
        println!("  {}", usage.bright_black());
    }
    println!("  {}", "quit | exit".bright_black());
    println!(
        "{}",
        "Any other line is sent to the active module.".bright_black()
    );
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{}", format!("> {}", message.content).green()),
        MessageRole::Assistant => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }

    if let Some(sources) = &message.sources {
        for (i, source) in sources.iter().enumerate() {
            println!(
                "  {}",
                format!("[{}] {} {}", i + 1, source.title, source.uri).bright_black()
            );
        }
    }
}

fn print_transcript(messages: &[Message]) {
    for message in messages {
        print_message(message);
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let paths = AuditrosPaths::new(cli.data_dir.as_deref())?;
    paths.ensure_dirs()?;
    paths.ensure_secret_file()?;

    let config = ConfigService::new(paths.config_file()).load()?;
    init_tracing(&config.logging.level);
    tracing::info!("[Shell] Using {}", paths.config_dir().display());

    let api_key = SecretServiceImpl::new(paths.secret_file())
        .gemini_api_key()
        .await;
    if api_key.is_none() {
        println!(
            "{}",
            format!(
                "No Gemini API key found. Set GEMINI_API_KEY, edit {}, or use /key.",
                paths.secret_file().display()
            )
            .yellow()
        );
    }

    // ===== Backend Initialization =====
    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(paths.data_dir()));
    let client = Arc::new(GeminiApiClient::from_config(
        api_key.unwrap_or_default(),
        &config,
    ));

    let controller = SessionController::new(ControllerDeps {
        client,
        sessions: Arc::new(ChatHistoryStore::new(kv.clone())),
        experiences: Arc::new(ExperienceStore::new(kv.clone())),
        users: Arc::new(UserRegistryStore::new(kv)),
        default_mode: cli.mode.unwrap_or(config.generation.default_mode),
        speech_voice: config.generation.speech_voice.clone(),
    })?;

    if let Some(label) = &cli.section {
        match AuditSection::parse_loose(label) {
            Some(section) => controller.select_section(section),
            None => println!("{}", format!("Unknown module: {label}").yellow()),
        }
    }

    let shell = Shell {
        controller,
        media_dir: paths.media_dir(),
    };

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Auditros AI ===".bright_magenta().bold());
    if let Some(user) = shell.controller.current_user() {
        println!("{}", format!("Signed in as {}", user.name).bright_black());
    }
    println!(
        "{}",
        "Type a query, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();
    print_transcript(&shell.controller.messages());

    // ===== Main REPL Loop =====
    loop {
        let prompt = format!(
            "[{} | {}] >> ",
            shell.controller.active_section(),
            shell.controller.mode()
        );

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match command::parse(trimmed) {
                    Ok(command) => command,
                    Err(usage) => {
                        println!("{}", usage.yellow());
                        continue;
                    }
                };

                match shell.execute(command).await {
                    Ok(true) => {}
                    Ok(false) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Err(err) => eprintln!("{}", format!("Error: {err:#}").red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    // Let pending learning extraction finish before exit
    shell.controller.flush_learning().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_media() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("audio/L16;codec=pcm;rate=24000"), "pcm");
        assert_eq!(extension_for("video/mp4"), "mp4");
        assert_eq!(extension_for("application/x-unknown"), "bin");
    }

    #[test]
    fn test_cli_parses_mode() {
        let cli = Cli::parse_from(["auditros", "--mode", "fast", "--section", "Audit Plan"]);
        assert_eq!(cli.mode, Some(GenerationMode::Fast));
        assert_eq!(cli.section.as_deref(), Some("Audit Plan"));
    }
}
