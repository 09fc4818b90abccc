//! Sift: declarative validation and transformation engine for tabular records.
//!
//! Sift takes a workbook of table definitions (typed fields, cross-table
//! references, computed fields, and row-level hooks) and runs raw rows
//! through a cast/validate/compute pipeline, accumulating severity-tagged
//! annotations on each row instead of failing.
//!
//! # Core Principles
//!
//! - **Declarative**: tables and fields are an explicit configuration tree
//!   built once at startup; only a malformed tree is ever fatal.
//! - **Non-aborting**: bad values become annotations; every row is always
//!   processed to completion.
//! - **Host-agnostic**: ingestion, persistence, and UI belong to the hosting
//!   platform, which talks to sift through hooks and lifecycle events.
//!
//! # Example
//!
//! ```
//! use sift::{FieldDef, Sift, TableConfig, Value, Workbook, WorkbookInput};
//!
//! let workbook = Workbook::new("Enrollment").table(
//!     TableConfig::new("Parents")
//!         .field("email", FieldDef::text("Email Address").unique())
//!         .field("lastName", FieldDef::text("Last Name").required()),
//! );
//!
//! let engine = Sift::new(workbook).unwrap();
//! let mut row = indexmap::IndexMap::new();
//! row.insert("email".to_string(), Value::from("a@x.com"));
//! let input = WorkbookInput::new().table("Parents", vec![row]);
//!
//! let result = engine.process(input).unwrap();
//! // lastName is required and absent, so the row is invalid.
//! assert_eq!(result.summary.invalid_rows, 1);
//! ```

pub mod cast;
pub mod compute;
pub mod error;
pub mod links;
pub mod listener;
pub mod patterns;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod value;

mod engine;

pub use crate::engine::{ProcessResult, ProcessSummary, SeverityCounts, Sift, TableSummary, WorkbookInput};
pub use compute::ComputeInputs;
pub use error::{CastError, ComputeFailure, Result, SiftError};
pub use links::{LinkResolver, ResolvedLink};
pub use listener::{Event, EventHandler, Listener};
pub use patterns::{normalize_phone, Pattern};
pub use pipeline::RecordAccess;
pub use record::{Annotation, IntoKeys, Message, Record, RecordStore, RowStage, Severity};
pub use schema::{
    ComputedField, FieldDef, FieldKind, OptionChoice, Reference, Relationship, StageVisibility,
    TableConfig, Workbook,
};
pub use value::Value;
