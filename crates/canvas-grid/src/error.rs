use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasGridError {
    #[error("Layer index {index} is out of bounds ({count} layers registered)")]
    LayerOutOfBounds { index: usize, count: usize },

    #[error("{surfaces} surfaces supplied for {layers} layers")]
    SurfaceCountMismatch { layers: usize, surfaces: usize },
}

// Create a type alias for convenience
pub type Result<T> = std::result::Result<T, CanvasGridError>;
