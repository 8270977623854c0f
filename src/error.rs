use std::path::PathBuf;

/// Startup failures of the GL backend. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("failed to link shader program `{program}`: {log}")]
    ProgramLink { program: &'static str, log: String },

    #[error("framebuffer `{label}` is not complete (status {status:#x})")]
    IncompleteFramebuffer { label: &'static str, status: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cubemap face {path:?} is {width}x{height}, expected {expected}x{expected}")]
    FaceSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },
}
