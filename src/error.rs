pub type ShowResult<T> = Result<T, ShowError>;

#[derive(thiserror::Error, Debug)]
pub enum ShowError {
    #[error("config error: {0}")]
    Config(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
