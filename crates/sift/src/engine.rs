//! Main engine and public processing API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::listener::{Event, Listener};
use crate::pipeline::Pipeline;
use crate::record::{RecordStore, Severity};
use crate::schema::Workbook;
use crate::value::Value;

/// Raw rows for each table, as produced by the ingestion collaborator.
#[derive(Debug, Clone, Default)]
pub struct WorkbookInput {
    tables: IndexMap<String, Vec<IndexMap<String, Value>>>,
}

impl WorkbookInput {
    /// Create an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply raw rows for one table.
    pub fn table(mut self, name: impl Into<String>, rows: Vec<IndexMap<String, Value>>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }
}

/// Annotation counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

/// Per-table summary of one processing pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSummary {
    /// Rows processed.
    pub rows: usize,
    /// Rows carrying at least one error annotation.
    pub invalid_rows: usize,
    /// Annotation entries by severity.
    pub counts: SeverityCounts,
}

/// Summary of one processing pass over the whole workbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Total rows across all tables.
    pub total_rows: usize,
    /// Total invalid rows across all tables.
    pub invalid_rows: usize,
    /// Annotation entries by severity, all tables combined.
    pub counts: SeverityCounts,
    /// Per-table breakdown in workbook declaration order.
    pub tables: IndexMap<String, TableSummary>,
}

/// Result of processing one workbook input.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Finalized rows per table, with cast values and annotations attached.
    pub tables: IndexMap<String, RecordStore>,
    /// Pass summary.
    pub summary: ProcessSummary,
}

/// The processing engine: a validated workbook plus an optional listener.
///
/// # Example
///
/// ```
/// use sift::{FieldDef, Sift, TableConfig, Workbook, WorkbookInput};
///
/// let workbook = Workbook::new("Enrollment").table(
///     TableConfig::new("Parents")
///         .field("email", FieldDef::text("Email Address").unique())
///         .field("lastName", FieldDef::text("Last Name").required()),
/// );
///
/// let engine = Sift::new(workbook).unwrap();
/// let result = engine.process(WorkbookInput::new()).unwrap();
/// assert_eq!(result.summary.total_rows, 0);
/// ```
pub struct Sift {
    workbook: Workbook,
    listener: Option<Listener>,
}

impl Sift {
    /// Validate the workbook configuration and build an engine.
    ///
    /// A malformed workbook is the only fatal condition in this crate; it is
    /// reported here, before any row processing begins.
    pub fn new(workbook: Workbook) -> Result<Self> {
        workbook.validate()?;
        Ok(Self {
            workbook,
            listener: None,
        })
    }

    /// Attach a lifecycle event listener.
    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The validated workbook.
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Run one full pass over the supplied rows.
    ///
    /// Declared tables with no input process as empty; input for an
    /// undeclared table is a configuration error. Row-level problems never
    /// fail a pass; they come back as annotations on the rows.
    pub fn process(&self, input: WorkbookInput) -> Result<ProcessResult> {
        let mut input = input;
        for name in input.tables.keys() {
            if self.workbook.get_table(name).is_none() {
                return Err(SiftError::UnknownInputTable(name.clone()));
            }
        }

        let mut stores: IndexMap<String, RecordStore> = IndexMap::new();
        for table in self.workbook.tables() {
            let rows = input.tables.shift_remove(&table.name).unwrap_or_default();
            stores.insert(table.name.clone(), RecordStore::from_rows(rows));
        }

        Pipeline::new(&self.workbook).run(&mut stores);

        let summary = summarize(&stores);

        if let Some(listener) = &self.listener {
            listener.dispatch(
                &Event::new("process:completed")
                    .with_context("workbook", self.workbook.name.clone())
                    .with_context("rows", summary.total_rows)
                    .with_context("invalid_rows", summary.invalid_rows),
            );
        }

        Ok(ProcessResult {
            tables: stores,
            summary,
        })
    }
}

fn summarize(stores: &IndexMap<String, RecordStore>) -> ProcessSummary {
    let mut summary = ProcessSummary::default();

    for (name, store) in stores {
        let mut table = TableSummary {
            rows: store.len(),
            ..TableSummary::default()
        };
        for record in store.records() {
            if record.is_invalid() {
                table.invalid_rows += 1;
            }
            for annotation in record.all_annotations() {
                table.counts.add(annotation.severity);
            }
        }

        summary.total_rows += table.rows;
        summary.invalid_rows += table.invalid_rows;
        summary.counts.error += table.counts.error;
        summary.counts.warning += table.counts.warning;
        summary.counts.info += table.counts.info;
        summary.tables.insert(name.clone(), table);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, TableConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rows(values: &[&str]) -> Vec<IndexMap<String, Value>> {
        values
            .iter()
            .map(|v| {
                let mut row = IndexMap::new();
                row.insert("email".to_string(), Value::from(*v));
                row
            })
            .collect()
    }

    fn workbook() -> Workbook {
        Workbook::new("Enrollment").table(
            TableConfig::new("Parents").field("email", FieldDef::text("Email").unique()),
        )
    }

    #[test]
    fn test_unknown_input_table_rejected() {
        let engine = Sift::new(workbook()).unwrap();
        let input = WorkbookInput::new().table("Ghosts", rows(&["a@x.com"]));
        assert!(matches!(
            engine.process(input),
            Err(SiftError::UnknownInputTable(name)) if name == "Ghosts"
        ));
    }

    #[test]
    fn test_summary_counts() {
        let engine = Sift::new(workbook()).unwrap();
        let input = WorkbookInput::new().table("Parents", rows(&["a@x.com", "a@x.com", "b@x.com"]));
        let result = engine.process(input).unwrap();

        assert_eq!(result.summary.total_rows, 3);
        assert_eq!(result.summary.invalid_rows, 1);
        assert_eq!(result.summary.counts.error, 1);
        assert_eq!(result.summary.tables["Parents"].rows, 3);
    }

    #[test]
    fn test_listener_notified_after_pass() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let listener = Listener::new().on("process:*", |event| {
            assert_eq!(event.context["rows"], 1);
            CALLS.fetch_add(1, Ordering::SeqCst);
        });
        let engine = Sift::new(workbook()).unwrap().with_listener(listener);
        engine
            .process(WorkbookInput::new().table("Parents", rows(&["a@x.com"])))
            .unwrap();

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}
