use thiserror::Error;

/// Invalid scene or camera configuration, detected before any ray is traced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid material id {material} in object {object}")]
    InvalidMaterial { object: usize, material: usize },

    #[error("vector '{0}' is a zero vector")]
    ZeroVector(&'static str),

    #[error("target and position are the same")]
    TargetEqualsPosition,

    #[error("triangle vertices are collinear")]
    DegenerateTriangle,

    #[error("{lens} lens: {message}")]
    Lens {
        lens: &'static str,
        message: &'static str,
    },

    #[error("anti-aliasing factor must be at least one")]
    AntiAliasingFactor,

    #[error("invalid image size {width}x{height}")]
    ImageSize { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("camera cannot render until the image size is set")]
    ImageSizeNotSet,

    #[error("image must be rendered before saving it")]
    NotRendered,

    #[error("unable to build the render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("unable to encode rendering: {0}")]
    Image(#[from] image::ImageError),
}
