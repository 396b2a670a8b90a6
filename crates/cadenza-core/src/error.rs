use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {name}: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
