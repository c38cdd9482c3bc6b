use scene::resources::ResourceError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    #[error("feature `{0}` has no magnitude and is not on the globe")]
    NotRendered(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("view is unmounted")]
    Unmounted,

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
