use thiserror::Error;

/// Failures raised by the filter-aggregate pipeline.
///
/// Only `MissingColumn` is fatal (at load time). The other two are recovered
/// per view by showing a notice in place of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("no tags selected")]
    EmptySelection,
}
