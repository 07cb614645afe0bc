#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] relay_projects::Error),

    #[error(transparent)]
    Transport(#[from] relay_channels::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
