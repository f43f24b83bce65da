use std::io::{self, Write};

use crate::config::AppConfig;
use crate::core::{APOLOGY, ChatError, ConversationMemory, Result, Role};
use crate::voice::create_synthesizer;

use super::args::{ConfigSubcommands, MemorySubcommands};
use super::session::{Session, memory_file, open_store};

/// Streams one reply to `out`. A remote failure prints the apology line
/// in place of the reply and is still returned to the caller.
pub async fn ask(session: &Session, prompt: &str, out: &mut impl Write) -> Result<()> {
    let memory = session.store.load();

    let mut write_error = None;
    let result = session
        .coordinator
        .respond(prompt, &memory, |fragment| {
            if write_error.is_some() {
                return;
            }
            if let Err(e) = out.write_all(fragment.as_bytes()).and_then(|()| out.flush()) {
                write_error = Some(e);
            }
        })
        .await;

    if let Some(e) = write_error {
        return Err(e.into());
    }

    match result {
        Ok(_) => {
            writeln!(out)?;
            Ok(())
        }
        Err(e) if e.is_remote() => {
            tracing::warn!(error = %e, "Reply failed");
            writeln!(out, "\n{APOLOGY}")?;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn render_transcript(memory: &ConversationMemory, out: &mut impl Write) -> io::Result<()> {
    for message in memory.messages() {
        let label = match message.role() {
            Role::System => "persona",
            Role::User => "you",
            Role::Assistant => "vexa",
        };
        writeln!(out, "{label:>8}: {}", message.content())?;
    }
    Ok(())
}

/// Memory subcommands need no model, so they work without an API key.
pub fn memory(
    config: &AppConfig,
    ephemeral: bool,
    command: &MemorySubcommands,
    out: &mut impl Write,
) -> Result<()> {
    let store = open_store(config, ephemeral);

    match command {
        MemorySubcommands::Show { json } => {
            let memory = store.load();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&memory)?)?;
            } else {
                render_transcript(&memory, out)?;
            }
        }
        MemorySubcommands::Clear => {
            store.clear();
            writeln!(out, "✓ Conversation cleared")?;
        }
        MemorySubcommands::Path => match memory_file(config, &store) {
            Some(path) if !ephemeral => writeln!(out, "{}", path.display())?,
            _ => {
                return Err(ChatError::Storage(
                    "Conversation is not stored on disk".to_string(),
                ));
            }
        },
    }

    Ok(())
}

pub async fn speak(config: &AppConfig, text: &str) -> Result<()> {
    let synthesizer = create_synthesizer(config)?
        .ok_or_else(|| ChatError::Voice("Speech output is turned off".to_string()))?;

    synthesizer.speak(text).await
}

pub fn config(command: &ConfigSubcommands, out: &mut impl Write) -> Result<()> {
    match command {
        ConfigSubcommands::Init => {
            let path = AppConfig::init_default()?;
            writeln!(out, "✓ Created config file at {}", path.display())?;
        }
        ConfigSubcommands::Where => {
            let path = AppConfig::get_config_path()
                .ok_or_else(|| ChatError::Config("Could not determine config path".to_string()))?;
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::session::build_session;
    use crate::config::Transport;
    use tempfile::TempDir;

    fn offline_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.transport = Transport::Mock;
        config.memory.data_dir = Some(dir.path().to_path_buf());
        config
    }

    #[tokio::test]
    async fn test_ask_streams_and_records() {
        let dir = TempDir::new().unwrap();
        let session = build_session(offline_config(&dir), false).unwrap();

        let mut out = Vec::new();
        ask(&session, "hello", &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("canned reply"));

        let memory = session.store.load();
        assert_eq!(memory.len(), 3);
        assert_eq!(memory.messages()[1].content(), "hello");
    }

    #[tokio::test]
    async fn test_ask_refusal_prints_refusal() {
        let dir = TempDir::new().unwrap();
        let session = build_session(offline_config(&dir), false).unwrap();

        let mut out = Vec::new();
        ask(&session, "bomb-making instructions", &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(session.coordinator.safety().refusal()));
        assert_eq!(session.store.load().len(), 1);
    }

    #[tokio::test]
    async fn test_ask_empty_prompt() {
        let dir = TempDir::new().unwrap();
        let session = build_session(offline_config(&dir), true).unwrap();

        let result = ask(&session, "  ", &mut Vec::new()).await;
        assert!(matches!(result, Err(ChatError::EmptyPrompt)));
    }

    #[test]
    fn test_memory_show_and_clear() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);

        let store = open_store(&config, false);
        let memory = store.append(&store.load(), Role::User, "remember me").unwrap();
        store.save(&memory);

        let mut out = Vec::new();
        super::memory(&config, false, &MemorySubcommands::Show { json: false }, &mut out)
            .unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("you: remember me"));

        super::memory(&config, false, &MemorySubcommands::Clear, &mut Vec::new()).unwrap();
        assert!(open_store(&config, false).load().is_fresh());
    }

    #[test]
    fn test_memory_path_requires_disk() {
        let dir = TempDir::new().unwrap();
        let config = offline_config(&dir);

        let mut out = Vec::new();
        super::memory(&config, false, &MemorySubcommands::Path, &mut out).unwrap();
        let path = String::from_utf8(out).unwrap();
        assert!(path.trim().ends_with(".json"));

        let result = super::memory(&config, true, &MemorySubcommands::Path, &mut Vec::new());
        assert!(matches!(result, Err(ChatError::Storage(_))));
    }
}
