use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("storage unavailable")]
    StorageUnavailable,

    #[error("storage write failed: {0}")]
    StorageWrite(String),

    #[error("capability unavailable: {0}")]
    Unsupported(&'static str),

    #[error("worker registration failed: {0}")]
    Registration(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    #[error("unknown project id {0}")]
    UnknownProject(u32),

    #[error("malformed project id {0:?}")]
    InvalidProjectId(String),

    #[error("modal markup missing: {0}")]
    MissingMarkup(&'static str),
}

impl ModalError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownProject(_) => "unknown_project",
            Self::InvalidProjectId(_) => "invalid_project_id",
            Self::MissingMarkup(_) => "missing_markup",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("simulated transport failure")]
    Simulated,

    #[error("a submission is already in flight")]
    InFlight,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Invalid(#[from] serde_json::Error),
}
