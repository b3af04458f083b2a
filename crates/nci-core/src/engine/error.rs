use thiserror::Error;

use super::config::ConfigError;
use crate::core::structure::selection::SelectionParseError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid contact parameters: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid atom selection: {source}")]
    Selection {
        #[from]
        source: SelectionParseError,
    },
}
