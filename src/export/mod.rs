pub mod plan;

pub use plan::{ExportError, ExportPlan, ExportSegment};
