//! Line-oriented terminal shell.
//!
//! Reads one command per line, dispatches it to the session and writes
//! markdown to the output. Logs go to stderr, so stdout stays readable.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::SessionError;
use crate::formatters;
use crate::models::{Paper, Physicist, Tab};
use crate::session::{SessionHandle, SessionState};

const PROMPT: &str = "quantum> ";

const HELP: &str = "\
Commands:
  physicists                 List the physicists you can research
  select <name>              Discover papers by a physicist (e.g. `select dirac`)
  papers                     Show the discovered papers
  collect <number|id>        Add a discovered paper to your collection
  remove <number|id>         Remove a paper from your collection
  collection                 Show your collection
  chat                       Show the chat transcript
  ask <question>             Ask the assistant about your collection
  tab <discover|collection|chat>
                             Switch view; on the chat tab plain lines are questions
  state                      Show a session summary
  help                       Show this help
  quit                       Leave the archives";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Physicists,
    Select(String),
    Papers,
    Collect(String),
    Remove(String),
    Collection,
    Chat,
    Ask(String),
    Tab(String),
    State,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    /// Parse a line. On the chat tab, lines without a command word are questions,
    /// and so are lines that start with a no-argument command word but go on.
    #[must_use]
    pub fn parse(line: &str, active_tab: Tab) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let word_lower = word.to_lowercase();
        let takes_no_args = matches!(
            word_lower.as_str(),
            "physicists" | "papers" | "collection" | "chat" | "state" | "help" | "?" | "quit" | "exit"
        );
        if active_tab == Tab::Chat && takes_no_args && !rest.is_empty() {
            return Self::Ask(line.to_string());
        }

        match word_lower.as_str() {
            "physicists" => Self::Physicists,
            "select" => Self::Select(rest.to_string()),
            "papers" => Self::Papers,
            "collect" => Self::Collect(rest.to_string()),
            "remove" => Self::Remove(rest.to_string()),
            "collection" => Self::Collection,
            "chat" => Self::Chat,
            "ask" => Self::Ask(rest.to_string()),
            "tab" => Self::Tab(rest.to_string()),
            "state" => Self::State,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ if active_tab == Tab::Chat => Self::Ask(line.to_string()),
            _ => Self::Unknown(word.to_string()),
        }
    }
}

/// Find a paper by 1-based list position or by id.
#[must_use]
pub fn resolve_paper<'a>(papers: &'a [Paper], reference: &str) -> Option<&'a Paper> {
    let reference = reference.trim();
    if let Ok(position) = reference.parse::<usize>() {
        return position.checked_sub(1).and_then(|i| papers.get(i));
    }
    papers.iter().find(|p| p.id == reference)
}

/// Run the shell until `quit` or end of input.
pub async fn run_shell<R, W>(mut reader: R, mut writer: W, session: SessionHandle) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    write_block(&mut writer, "Welcome to the Quantum Archives. Type `help` for commands.").await?;

    loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            tracing::info!("Input closed, leaving shell");
            break;
        }

        let command = Command::parse(&line, session.snapshot().active_tab);
        tracing::debug!(?command, "Shell command");

        if command == Command::Quit {
            break;
        }

        let output = match execute(&session, command).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "Shell command failed");
                e.to_user_message()
            }
        };

        if !output.is_empty() {
            write_block(&mut writer, &output).await?;
        }
    }

    Ok(())
}

async fn execute(session: &SessionHandle, command: Command) -> Result<String, SessionError> {
    match command {
        Command::Empty => Ok(String::new()),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
        Command::Unknown(word) => Ok(format!("Unknown command `{word}`. Type `help` for commands.")),
        Command::Physicists => {
            Ok(formatters::format_physicists_markdown(session.snapshot().selected_physicist))
        }
        Command::Select(name) => {
            if name.is_empty() {
                return Ok("Usage: select <name>".to_string());
            }
            let physicist: Physicist = name.parse()?;
            session.select_physicist(physicist).await?;
            let state = session.settled().await?;
            Ok(formatters::format_discovered_markdown(&state))
        }
        Command::Papers => Ok(formatters::format_discovered_markdown(&session.snapshot())),
        Command::Collect(reference) => {
            let snapshot = session.snapshot();
            let paper = resolve_paper(&snapshot.discovered_papers, &reference)
                .ok_or_else(|| SessionError::UnknownPaper(reference.clone()))?;
            if snapshot.is_collected(paper) {
                return Ok(format!("\"{}\" is already in your collection.", paper.title));
            }
            let state = session.collect(paper.clone()).await?;
            Ok(format!(
                "Collected \"{}\". Your collection now holds {} papers.",
                paper.title,
                state.collected_papers.len()
            ))
        }
        Command::Remove(reference) => {
            let snapshot = session.snapshot();
            let paper = resolve_paper(&snapshot.collected_papers, &reference)
                .ok_or_else(|| SessionError::UnknownPaper(reference.clone()))?;
            let state = session.remove(&paper.id).await?;
            Ok(format!(
                "Removed \"{}\". Your collection now holds {} papers.",
                paper.title,
                state.collected_papers.len()
            ))
        }
        Command::Collection => {
            Ok(formatters::format_collection_markdown(&session.snapshot().collected_papers))
        }
        Command::Chat => {
            let snapshot = session.snapshot();
            Ok(formatters::format_transcript_markdown(
                &snapshot.messages,
                snapshot.collected_papers.len(),
            ))
        }
        Command::Ask(question) => ask(session, &question).await,
        Command::Tab(name) => {
            let Ok(tab) = name.parse::<Tab>() else {
                return Ok("Usage: tab <discover|collection|chat>".to_string());
            };
            let state = session.switch_tab(tab).await?;
            Ok(render_tab(&state))
        }
        Command::State => Ok(format_summary(&session.snapshot())),
    }
}

async fn ask(session: &SessionHandle, question: &str) -> Result<String, SessionError> {
    if question.trim().is_empty() {
        return Ok("Usage: ask <question>".to_string());
    }
    if session.snapshot().is_loading {
        return Ok("Still waiting for the previous answer.".to_string());
    }

    session.send_message(question).await?;
    let state = session.settled().await?;

    Ok(state
        .messages
        .last()
        .map(formatters::format_message_markdown)
        .unwrap_or_default())
}

fn render_tab(state: &SessionState) -> String {
    match state.active_tab {
        Tab::Discover => formatters::format_discovered_markdown(state),
        Tab::Collection => formatters::format_collection_markdown(&state.collected_papers),
        Tab::Chat => {
            formatters::format_transcript_markdown(&state.messages, state.collected_papers.len())
        }
    }
}

fn format_summary(state: &SessionState) -> String {
    let selected = state
        .selected_physicist
        .map_or_else(|| "none".to_string(), |p| p.full_name().to_string());
    let mut output = String::from("# Session\n\n");
    output.push_str(&format!("- **Tab**: {}\n", state.active_tab));
    output.push_str(&format!("- **Physicist**: {selected}\n"));
    output.push_str(&format!("- **Discovered**: {}\n", state.discovered_papers.len()));
    output.push_str(&format!("- **Collected**: {}\n", state.collected_papers.len()));
    output.push_str(&format!("- **Messages**: {}\n", state.messages.len()));
    if state.is_fetching {
        output.push_str("- Fetching papers...\n");
    }
    if state.is_loading {
        output.push_str("- Waiting for an answer...\n");
    }
    output
}

async fn write_block<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        writer.write_all(b"\n").await?;
    }
    writer.flush().await
}
