//! Reflow heuristic repairing line-wrap artifacts of PDF text extraction.

mod options;
mod pipeline;

pub use options::{ReflowOptions, ReflowPreset};
pub use pipeline::{ReflowStatus, Reflowed, Reflower};

/// Reflow text with the standard options.
///
/// # Example
///
/// ```
/// use pdfreflow::reflow::reflow_text;
///
/// assert_eq!(reflow_text("inter-\nnational"), "international");
/// assert_eq!(reflow_text("The cat sat on\nthe mat."), "The cat sat on the mat.");
/// ```
pub fn reflow_text(text: &str) -> String {
    Reflower::default().reflow(text).into_text()
}
