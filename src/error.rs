use thiserror::Error;

/// Failures of the generation/render pipeline. None of these are retried
/// internally; callers get a single human-readable failure.
#[derive(Debug, Error)]
pub enum FlowchartError {
    #[error("failed to reach generative API: {0}")]
    UpstreamUnavailable(String),

    #[error("unexpected response format from generative API: {0}")]
    UpstreamFormat(String),

    #[error("no suitable text generation model found")]
    NoEligibleModel,

    #[error("'{0}' not found. Please install @mermaid-js/mermaid-cli")]
    RendererUnavailable(String),

    #[error("failed to generate SVG: {0}")]
    RenderFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
