use crate::expression::ExpressionKind;

#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    #[error("union requires at least one member")]
    EmptyUnion,
    #[error("union members must share one kind, found {first:?} and {second:?}")]
    MixedUnion {
        first: ExpressionKind,
        second: ExpressionKind,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("language tag must not be empty")]
    EmptyLanguage,
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}
