use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("could not render config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
