use thiserror::Error;

/// Every way a run can fail. Each one is printed and ends the process with status 1.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No template specified")]
    NoTemplate,

    #[error("Error creating API client: {0:#}")]
    Client(#[source] anyhow::Error),

    #[error("Error getting templates: {0:#}")]
    Directory(#[source] anyhow::Error),

    #[error("Template {name} not found{}", suggestion_hint(.suggestions))]
    NotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("Error getting raw content: {0:#}")]
    RawContent(#[source] anyhow::Error),

    #[error("Error creating file: {0}")]
    Create(#[source] std::io::Error),

    #[error("Error writing to file: {0}")]
    Write(#[source] std::io::Error),

    #[error("Error closing file: {0}")]
    Close(#[source] std::io::Error),

    #[error("Error writing output: {0}")]
    Output(#[source] std::io::Error),
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("\nDid you mean: {}?", suggestions.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
