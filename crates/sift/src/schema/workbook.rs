//! Workbook: the explicit configuration tree handed to the engine.

use indexmap::IndexMap;

use crate::error::{Result, SiftError};

use super::kind::FieldKind;
use super::table::TableConfig;

/// A named set of tables forming one configuration unit.
///
/// Built explicitly and passed by value into the engine; there is no ambient
/// global registry.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Workbook name.
    pub name: String,
    tables: IndexMap<String, TableConfig>,
    duplicate_tables: Vec<String>,
}

impl Workbook {
    /// Start a workbook definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: IndexMap::new(),
            duplicate_tables: Vec::new(),
        }
    }

    /// Add a table. Adding two tables with the same name is a configuration
    /// error surfaced by [`Workbook::validate`].
    pub fn table(mut self, table: TableConfig) -> Self {
        if self.tables.contains_key(&table.name) {
            self.duplicate_tables.push(table.name.clone());
        } else {
            self.tables.insert(table.name.clone(), table);
        }
        self
    }

    /// Look up a table by name.
    pub fn get_table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.get(name)
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableConfig> {
        self.tables.values()
    }

    /// Check the whole configuration tree for structural problems.
    ///
    /// Runs at startup, before any row processing; a failure here blocks the
    /// pipeline from starting. Row-processing problems are never reported
    /// this way.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.duplicate_tables.first() {
            return Err(SiftError::DuplicateTable(name.clone()));
        }

        for table in self.tables.values() {
            if let Some(key) = table.duplicate_keys.first() {
                return Err(SiftError::DuplicateField {
                    table: table.name.clone(),
                    key: key.clone(),
                });
            }

            for (key, field) in &table.fields {
                match &field.kind {
                    FieldKind::Option { options } => {
                        if options.is_empty() {
                            return Err(SiftError::EmptyOptions {
                                table: table.name.clone(),
                                key: key.clone(),
                            });
                        }
                        for (i, choice) in options.iter().enumerate() {
                            if options[..i].iter().any(|c| c.key == choice.key) {
                                return Err(SiftError::DuplicateOption {
                                    table: table.name.clone(),
                                    key: key.clone(),
                                    option: choice.key.clone(),
                                });
                            }
                        }
                    }
                    FieldKind::Reference(reference) => {
                        let target = self.tables.get(&reference.table).ok_or_else(|| {
                            SiftError::UnknownReferenceTable {
                                table: table.name.clone(),
                                key: key.clone(),
                                target: reference.table.clone(),
                            }
                        })?;
                        if target.get_field(&reference.foreign_key).is_none() {
                            return Err(SiftError::UnknownForeignKey {
                                table: table.name.clone(),
                                key: key.clone(),
                                target: reference.table.clone(),
                                foreign_key: reference.foreign_key.clone(),
                            });
                        }
                    }
                    FieldKind::Computed(computed) => {
                        for dependency in computed.all_dependencies() {
                            if dependency == key {
                                return Err(SiftError::SelfDependency {
                                    table: table.name.clone(),
                                    key: key.clone(),
                                });
                            }
                            match table.get_field(dependency) {
                                None => {
                                    return Err(SiftError::UnknownDependency {
                                        table: table.name.clone(),
                                        key: key.clone(),
                                        dependency: dependency.to_string(),
                                    });
                                }
                                Some(dep) if matches!(dep.kind, FieldKind::Computed(_)) => {
                                    return Err(SiftError::ComputedDependency {
                                        table: table.name.clone(),
                                        key: key.clone(),
                                        dependency: dependency.to_string(),
                                    });
                                }
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
