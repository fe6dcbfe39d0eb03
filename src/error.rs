use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid keyboard layout: {0}")]
    Layout(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("input device error: {0}")]
    Device(String),

    #[error("JACK error: {0}")]
    Jack(#[from] jack::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait AddMessage<T> {
    fn add_message(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: std::fmt::Display> AddMessage<T> for std::result::Result<T, E> {
    fn add_message(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Device(format!("{}: {}", message.into(), e)))
    }
}
