use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("invalid intent: {0}")]
    InvalidIntent(String),

    #[error("invalid enforcement tier: {0}")]
    InvalidTier(String),

    #[error("invalid sandbox config: {0}")]
    SandboxConfig(String),

    #[error("invalid definition in '{file}': {reason}")]
    Definition { file: String, reason: String },

    #[error("missing frontmatter in '{0}': expected a '---' fenced YAML block")]
    MissingFrontmatter(String),

    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GuardError>;
