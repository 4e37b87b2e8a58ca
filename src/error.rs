use thiserror::Error;

/// Library error type for carousel hosting operations.
///
/// Carousel navigation itself never fails; these cover the edges around it
/// (loading page descriptions and routing events to mounted instances).
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// No mounted carousel at this position on the page.
    #[error("no mounted carousel at index {0}")]
    UnknownInstance(usize),

    /// The instance's event queue is gone (runner exited).
    #[error("event queue for carousel '{0}' is closed")]
    QueueClosed(String),
}
