// Engine error taxonomy

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Bad request; reported before any file is written.
    #[error("{0}")]
    Validation(String),

    #[error("a generation run is already in progress")]
    AlreadyRunning,

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generation worker: {0}")]
    Runtime(String),
}

impl GenerationError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerationError::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
