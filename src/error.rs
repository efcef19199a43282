pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("invalid march configuration: {0}")]
    InvalidMarch(String),

    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn march(msg: impl Into<String>) -> Self {
        Self::InvalidMarch(msg.into())
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }
}
