//! Command-line arguments.

use clap::{Args, Parser, Subcommand};

/// Terminal directory picker with fuzzy search, tags and live previews.
///
/// Prints the chosen path on stdout (or writes it to $NAVGATOR_OUTPUT), so a
/// shell function can `cd "$(navgator)"`.
#[derive(Parser, Debug)]
#[command(name = "navgator", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick a directory interactively (the default)
    Navigate,

    /// Resolve a named context, optionally creating it
    Context(ContextArgs),

    /// Print the JSON schema of the config file
    Schema,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ContextArgs {
    /// Context name, matched against the `context` key of marker files
    pub name: String,

    /// Create the context when it does not exist
    #[arg(long, conflicts_with = "no_create")]
    pub create: bool,

    /// Only look the context up; fail when it does not exist
    #[arg(long)]
    pub no_create: bool,

    /// Template directory (under contexts.templates) to copy into a new context
    #[arg(long, value_name = "ID")]
    pub template: Option<String>,

    /// Description stored in the new context's marker
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Extra tag for a new context (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Print the context as JSON instead of its path
    #[arg(long)]
    pub json: bool,
}
