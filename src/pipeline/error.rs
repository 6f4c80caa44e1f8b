//! Pipeline error types.

use thiserror::Error;

use crate::dom::NodeId;

/// Errors that abort [`Pipeline::run`](super::Pipeline::run).
///
/// The tree is left exactly as it was when the error surfaced; there is no
/// rollback.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline root {0} is a text node and has no children to traverse")]
    NotAContainer(NodeId),

    #[error("transform #{index} `{name}` failed")]
    Transform {
        index: usize,
        name: String,
        #[source]
        source: anyhow::Error,
    },
}
