//! Log setup. The picker draws on stderr, so interactive sessions only log
//! when `NAVGATOR_LOG_FILE` names a file to write to.

use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "NAVGATOR_LOG";
pub const LOG_FILE_ENV: &str = "NAVGATOR_LOG_FILE";

const DEFAULT_FILTER: &str = "warn";

pub fn init(interactive: bool) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let log_file = env::var_os(LOG_FILE_ENV).filter(|value| !value.is_empty());
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                return;
            }
            Err(err) if !interactive => {
                eprintln!(
                    "navgator: cannot open log file {}: {}",
                    path.to_string_lossy(),
                    err
                );
            }
            Err(_) => return,
        }
    }

    if interactive {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
