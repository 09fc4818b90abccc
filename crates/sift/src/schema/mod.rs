//! Static configuration: fields, tables, and the workbook tree.

mod field;
mod kind;
mod table;
mod workbook;

pub use field::{FieldComputeFn, FieldDef, FieldValidateFn, StageVisibility};
pub use kind::{
    ComputedField, ComputedFn, FieldKind, OptionChoice, Reference, Relationship,
};
pub use table::{BatchComputeFn, RecordComputeFn, TableConfig};
pub use workbook::Workbook;
