use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "No navgator config found. Create one in ~/.config/navgator/config.toml (or set $NAVGATOR_CONFIG). Searched: {}",
        display_paths(.searched)
    )]
    ConfigurationMissing { searched: Vec<PathBuf> },

    #[error("Failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("HOME is not set")]
    HomeMissing,

    #[error("No context named '{0}'")]
    ContextNotFound(String),

    #[error("Cannot create context '{name}': {} already exists", .path.display())]
    ContextAlreadyExists { name: String, path: PathBuf },

    #[error("No context named '{0}'. Pass --create to create it or --no-create to only look it up")]
    ContextPolicyUnspecified(String),

    #[error("contexts.root is not configured; cannot create contexts")]
    ContextRootMissing,

    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Invalid context name '{0}'")]
    InvalidContextName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
