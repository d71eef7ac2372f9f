//! Markdown output formatting.

use std::borrow::Cow;

use crate::models::{ChatMessage, Paper, Physicist, Role};
use crate::session::SessionState;

/// Longest description shown in paper listings.
const DESCRIPTION_LIMIT: usize = 300;

/// Format the selectable physicists as a numbered list.
#[must_use]
pub fn format_physicists_markdown(selected: Option<Physicist>) -> String {
    let mut output = String::from("# Physicists\n\n");
    for (i, physicist) in Physicist::ALL.iter().enumerate() {
        let marker = if selected == Some(*physicist) { " (selected)" } else { "" };
        output.push_str(&format!("{}. **{}**{marker}\n", i + 1, physicist.full_name()));
    }
    output
}

/// Format the discover view: discovered papers with their collected status.
#[must_use]
pub fn format_discovered_markdown(state: &SessionState) -> String {
    let Some(physicist) = state.selected_physicist else {
        return "Select a physicist to begin your research.".to_string();
    };

    if state.is_fetching {
        return format!("Retrieving papers by {physicist} from the archive...");
    }

    if state.discovered_papers.is_empty() {
        return format!("No papers found for {physicist}.");
    }

    let mut output =
        format!("# Papers by {} ({} results)\n\n", physicist, state.discovered_papers.len());

    for (i, paper) in state.discovered_papers.iter().enumerate() {
        output.push_str(&format_paper_markdown(paper, i + 1, state.is_collected(paper)));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format the collection view.
#[must_use]
pub fn format_collection_markdown(papers: &[Paper]) -> String {
    if papers.is_empty() {
        return "Collection is empty. Go to Discover to find and collect papers.".to_string();
    }

    let mut output = format!("# Your Knowledge Base ({} papers)\n\n", papers.len());

    for (i, paper) in papers.iter().enumerate() {
        output.push_str(&format_paper_markdown(paper, i + 1, true));
        if let Some(at) = paper.collected_at {
            output.push_str(&format!("**Collected**: {}\n", at.format("%Y-%m-%d %H:%M UTC")));
        }
        output.push_str("\n---\n\n");
    }

    output
}

/// Format a single paper as Markdown.
#[must_use]
pub fn format_paper_markdown(paper: &Paper, index: usize, collected: bool) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("## {}. {}\n\n", index, paper.title));

    // Year, author, status
    let mut meta = vec![format!("**Year**: {}", paper.year), format!("**By**: {}", paper.physicist)];
    if collected {
        meta.push("**Collected**".to_string());
    }
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    // Description (truncated)
    let description: Cow<'_, str> = if paper.description.chars().count() > DESCRIPTION_LIMIT {
        let cut: String = paper.description.chars().take(DESCRIPTION_LIMIT).collect();
        Cow::Owned(format!("{cut}..."))
    } else {
        Cow::Borrowed(&paper.description)
    };
    output.push_str(&format!("{description}\n\n"));

    output.push_str(&format!("`id: {}`\n", paper.id));
    output
}

/// Format the chat transcript.
#[must_use]
pub fn format_transcript_markdown(messages: &[ChatMessage], collected: usize) -> String {
    let mut output = format!("# Assistant ({collected} papers in context)\n\n");
    for message in messages {
        output.push_str(&format_message_markdown(message));
        output.push('\n');
    }
    output
}

/// Format one chat message with its grounded sources.
#[must_use]
pub fn format_message_markdown(message: &ChatMessage) -> String {
    if message.is_thinking {
        return "**Assistant**: _Analyzing Quantum Archives..._\n".to_string();
    }

    let speaker = match message.role {
        Role::User => "You",
        Role::Model => "Assistant",
    };
    let mut output = format!("**{speaker}**: {}\n", message.text);

    if !message.sources.is_empty() {
        output.push_str("\n> **Grounded sources**\n");
        for source in &message.sources {
            output.push_str(&format!("> - [{}]({})\n", source.title, source.uri));
        }
    }

    output
}
