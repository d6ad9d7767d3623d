pub mod email;
pub mod export;
pub mod tasks;

pub use email::{EmailError, EmailService};
pub use export::{ExportError, TranscriptSegment};
pub use tasks::{TaskRegistry, TaskSnapshot, TaskState};
