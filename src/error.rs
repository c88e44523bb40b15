use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("badge manifest parse error: {0}")]
    BadgeManifest(#[from] serde_json::Error),

    #[error("surface write error: {0}")]
    SurfaceIo(#[from] std::io::Error),

    #[error("emote has no frames")]
    EmptyAnimation,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
