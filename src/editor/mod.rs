pub mod intent;
pub mod runtime;
pub mod session;

pub use intent::{Feedback, Intent};
pub use runtime::{EditorEvent, EditorRuntime};
pub use session::{Editor, EditorSnapshot, PreviewUpdate};
