use clap::{ArgAction, Parser};

/// Fetch a .gitignore template from github/gitignore into the current directory.
#[derive(Parser, Debug)]
#[command(name = "gh-gitignore", version, about, long_about = None)]
pub struct Cli {
    /// List available templates and exit
    #[arg(long)]
    pub list: bool,

    /// Template to write to ./.gitignore (case-insensitive, ".gitignore" suffix optional)
    pub template: Option<String>,

    /// Increase log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GH_GITIGNORE_API_URL")]
    pub api_url: Option<String>,
}

impl Cli {
    /// Default log filter for the verbosity flag.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// What the invocation asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Generate(String),
}

impl Cli {
    /// `--list` wins over a template name. An empty name counts as missing.
    pub fn action(&self) -> Option<Action> {
        if self.list {
            return Some(Action::List);
        }
        self.template
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| Action::Generate(t.to_string()))
    }
}
