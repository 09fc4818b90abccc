//! Records, annotations, and the per-table record store.

mod annotation;
#[allow(clippy::module_inception)]
mod record;
mod store;

pub use annotation::{Annotation, IntoKeys, Message, Severity};
pub use record::{Record, RowStage};
pub use store::RecordStore;
