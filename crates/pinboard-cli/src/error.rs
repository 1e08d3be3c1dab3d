use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pinboard_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Not logged in. Run `pinboard login` or `pinboard register` first.")]
    NotLoggedIn,
    #[error("Could not determine a data directory; pass --data-dir or set PINBOARD_DATA_DIR")]
    NoDataDir,
}
