//! Tabular fitting data: column store, role bindings and record selection.
//!
//! [`FittingData`] owns a set of equally long numeric columns. Up to four of
//! them are bound to the fitting roles (`x`, `xerr`, `y`, `yerr`), and a
//! boolean mask decides which records take part in projections, domains and
//! statistics.
//!
//! Invariants kept by every method:
//! - every column has `number_of_records()` values
//! - the selection mask has exactly `number_of_records()` entries
//! - the statistics cache matches the current values and mask
//! - a failed call leaves the data untouched
//!
//! Record and column positions exposed to callers are 1-based.

use tracing::{debug, trace};

use crate::data::roles::{resolve_roles, Bindings, ColumnRef, Role, RoleHints};
use crate::error::{Error, Result};
use crate::io::raw::{Cell, Columns, RawDataBuilder};
use crate::math::{Interval, Statistics};
use crate::models::{Arguments, ParametricFunction};

#[derive(Debug, Clone, PartialEq)]
pub struct FittingData {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
    records: usize,
    selection: Vec<bool>,
    bindings: Bindings,
    statistics: Vec<Option<Statistics>>,
}

impl FittingData {
    /// Build from named columns and role hints.
    pub fn new(columns: Columns, hints: RoleHints) -> Result<Self> {
        let records = columns.first().map_or(0, |(_, values)| values.len());

        let mut names: Vec<String> = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            if column.len() != records {
                return Err(Error::ColumnsLength {
                    column: name,
                    expected: records,
                    actual: column.len(),
                });
            }
            if names.contains(&name) {
                return Err(Error::DuplicateColumn(name));
            }
            names.push(name);
            values.push(column);
        }

        let bindings = resolve_roles(&names, &hints)?;
        let mut data = Self {
            statistics: vec![None; names.len()],
            names,
            values,
            records,
            selection: vec![true; records],
            bindings,
        };
        data.refresh_statistics();

        debug!(
            columns = data.names.len(),
            records,
            x = ?data.x_column(),
            xerr = ?data.xerr_column(),
            y = ?data.y_column(),
            yerr = ?data.yerr_column(),
            "created fitting data"
        );
        Ok(data)
    }

    /// Build with default role derivation.
    pub fn from_columns(columns: Columns) -> Result<Self> {
        Self::new(columns, RoleHints::default())
    }

    /// Build from a raw cell grid (see [`RawDataBuilder`]).
    pub fn from_raw(grid: Vec<Vec<Cell>>, hints: RoleHints) -> Result<Self> {
        Self::new(RawDataBuilder::build(grid)?, hints)
    }

    pub fn number_of_records(&self) -> usize {
        self.records
    }

    pub fn number_of_columns(&self) -> usize {
        self.names.len()
    }

    /// Column names in storage order.
    pub fn all_columns(&self) -> &[String] {
        &self.names
    }

    /// Names of the bound role columns, in role order.
    pub fn used_columns(&self) -> Vec<&str> {
        Role::ALL.iter().filter_map(|role| self.role_column(*role)).collect()
    }

    /// All columns with their full (unfiltered) values.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    pub fn role_column(&self, role: Role) -> Option<&str> {
        self.bindings[role.slot()].map(|idx| self.names[idx].as_str())
    }

    /// 1-based position of the column bound to `role`.
    pub fn role_index(&self, role: Role) -> Option<usize> {
        self.bindings[role.slot()].map(|idx| idx + 1)
    }

    pub fn x_column(&self) -> Option<&str> {
        self.role_column(Role::X)
    }

    pub fn xerr_column(&self) -> Option<&str> {
        self.role_column(Role::Xerr)
    }

    pub fn y_column(&self) -> Option<&str> {
        self.role_column(Role::Y)
    }

    pub fn yerr_column(&self) -> Option<&str> {
        self.role_column(Role::Yerr)
    }

    /// Bind `role` to a column, or clear it with `None`.
    ///
    /// Other roles are left as they are.
    pub fn set_role(&mut self, role: Role, column: Option<ColumnRef>) -> Result<()> {
        let resolved = column.map(|c| c.resolve(&self.names)).transpose()?;
        self.bindings[role.slot()] = resolved;
        debug!(%role, column = ?self.role_column(role), "set role");
        Ok(())
    }

    pub fn set_x_column(&mut self, column: impl Into<ColumnRef>) -> Result<()> {
        self.set_role(Role::X, Some(column.into()))
    }

    pub fn set_xerr_column(&mut self, column: impl Into<ColumnRef>) -> Result<()> {
        self.set_role(Role::Xerr, Some(column.into()))
    }

    pub fn set_y_column(&mut self, column: impl Into<ColumnRef>) -> Result<()> {
        self.set_role(Role::Y, Some(column.into()))
    }

    pub fn set_yerr_column(&mut self, column: impl Into<ColumnRef>) -> Result<()> {
        self.set_role(Role::Yerr, Some(column.into()))
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Values of `name`, optionally restricted to the selected records.
    pub fn column_data(&self, name: &str, only_selected: bool) -> Result<Vec<f64>> {
        let idx = self.column_position(name)?;
        Ok(if only_selected {
            self.selected_values(idx)
        } else {
            self.values[idx].clone()
        })
    }

    /// Selected values of the column bound to `role`.
    pub fn role_data(&self, role: Role) -> Option<Vec<f64>> {
        self.bindings[role.slot()].map(|idx| self.selected_values(idx))
    }

    pub fn x(&self) -> Option<Vec<f64>> {
        self.role_data(Role::X)
    }

    pub fn xerr(&self) -> Option<Vec<f64>> {
        self.role_data(Role::Xerr)
    }

    pub fn y(&self) -> Option<Vec<f64>> {
        self.role_data(Role::Y)
    }

    pub fn yerr(&self) -> Option<Vec<f64>> {
        self.role_data(Role::Yerr)
    }

    // ------------------------------------------------------------------
    // Record selection
    // ------------------------------------------------------------------

    pub fn records_indices(&self) -> &[bool] {
        &self.selection
    }

    /// Replace the whole selection mask.
    pub fn set_records_indices(&mut self, mask: Vec<bool>) -> Result<()> {
        if mask.len() != self.records {
            return Err(Error::RecordsSelection {
                expected: self.records,
                actual: mask.len(),
            });
        }
        self.selection = mask;
        self.selection_changed();
        Ok(())
    }

    pub fn select_record(&mut self, record: usize) -> Result<()> {
        self.set_selected(record, true)
    }

    pub fn unselect_record(&mut self, record: usize) -> Result<()> {
        self.set_selected(record, false)
    }

    pub fn select_all_records(&mut self) {
        self.selection.fill(true);
        self.selection_changed();
    }

    pub fn unselect_all_records(&mut self) {
        self.selection.fill(false);
        self.selection_changed();
    }

    pub fn is_selected(&self, record: usize) -> Result<bool> {
        let idx = self.record_position(record)?;
        Ok(self.selection[idx])
    }

    pub fn all_selected(&self) -> bool {
        self.selection.iter().all(|s| *s)
    }

    pub fn non_selected(&self) -> bool {
        !self.selection.iter().any(|s| *s)
    }

    pub fn number_of_selected_records(&self) -> usize {
        self.selection.iter().filter(|s| **s).count()
    }

    /// Select records whose value in `column` lies inside `domain`.
    ///
    /// The predicate is evaluated over the full column, not just the current
    /// selection. With `update_selected == false` it replaces the mask; with
    /// `true` it is AND-ed into it, so records can only drop out.
    pub fn select_by_domain(&mut self, column: &str, domain: Interval, update_selected: bool) -> Result<()> {
        let idx = self.column_position(column)?;
        let predicate = self.values[idx].iter().map(|v| domain.contains(*v)).collect();
        self.apply_predicate(predicate, update_selected);
        Ok(())
    }

    pub fn select_by_x_domain(&mut self, xmin: Option<f64>, xmax: Option<f64>, update_selected: bool) -> Result<()> {
        self.select_by_role_domain(Role::X, Interval::new(xmin, xmax), update_selected)
    }

    pub fn select_by_y_domain(&mut self, ymin: Option<f64>, ymax: Option<f64>, update_selected: bool) -> Result<()> {
        self.select_by_role_domain(Role::Y, Interval::new(ymin, ymax), update_selected)
    }

    /// Select records whose x lies in `x_domain` and whose y lies in `y_domain`.
    pub fn select_by_xy_domain(&mut self, x_domain: Interval, y_domain: Interval, update_selected: bool) -> Result<()> {
        let x_idx = self.bound(Role::X)?;
        let y_idx = self.bound(Role::Y)?;
        let predicate = self.values[x_idx]
            .iter()
            .zip(&self.values[y_idx])
            .map(|(x, y)| x_domain.contains(*x) && y_domain.contains(*y))
            .collect();
        self.apply_predicate(predicate, update_selected);
        Ok(())
    }

    fn select_by_role_domain(&mut self, role: Role, domain: Interval, update_selected: bool) -> Result<()> {
        let idx = self.bound(role)?;
        let predicate = self.values[idx].iter().map(|v| domain.contains(*v)).collect();
        self.apply_predicate(predicate, update_selected);
        Ok(())
    }

    fn apply_predicate(&mut self, predicate: Vec<bool>, update_selected: bool) {
        if update_selected {
            for (selected, keep) in self.selection.iter_mut().zip(predicate) {
                *selected &= keep;
            }
        } else {
            self.selection = predicate;
        }
        self.selection_changed();
    }

    fn set_selected(&mut self, record: usize, selected: bool) -> Result<()> {
        let idx = self.record_position(record)?;
        self.selection[idx] = selected;
        self.selection_changed();
        Ok(())
    }

    fn selection_changed(&mut self) {
        self.refresh_statistics();
        debug!(
            selected = self.number_of_selected_records(),
            records = self.records,
            "selection changed"
        );
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Overwrite one cell (1-based record).
    pub fn set_cell(&mut self, column: &str, record: usize, value: f64) -> Result<()> {
        let col = self.column_position(column)?;
        let row = self.record_position(record)?;
        self.values[col][row] = value;
        self.refresh_column(col);
        debug!(column, record, value, "set cell");
        Ok(())
    }

    /// Overwrite one cell from user-entered text.
    pub fn set_cell_text(&mut self, column: &str, record: usize, text: &str) -> Result<()> {
        self.column_position(column)?;
        self.record_position(record)?;
        let value = text.trim().parse::<f64>().map_err(|_| {
            Error::Set(format!(
                "cannot set record {record} of column {column:?} to {text:?}: value must be a number"
            ))
        })?;
        self.set_cell(column, record, value)
    }

    /// Rename a column in place; roles bound to it follow the new name.
    pub fn set_header(&mut self, old: &str, new: &str) -> Result<()> {
        let idx = self.column_position(old)?;
        if old == new {
            return Ok(());
        }
        if new.trim().is_empty() {
            return Err(Error::Set(format!("cannot rename column {old:?} to an empty header")));
        }
        if self.names.iter().any(|n| n == new) {
            return Err(Error::Set(format!(
                "cannot rename column {old:?} to {new:?}: a column with that name already exists"
            )));
        }
        self.names[idx] = new.to_string();
        debug!(old, new, "renamed column");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    /// `[min, max]` of `name`, or `None` when there are no values.
    pub fn column_domain(&self, name: &str, only_selected: bool) -> Result<Option<Interval>> {
        Ok(Interval::from_values(&self.column_data(name, only_selected)?))
    }

    pub fn x_domain(&self) -> Option<Interval> {
        self.x().and_then(|x| Interval::from_values(&x))
    }

    pub fn y_domain(&self) -> Option<Interval> {
        self.y().and_then(|y| Interval::from_values(&y))
    }

    /// Cached statistics of the selected records of `name`.
    pub fn statistics(&self, name: &str) -> Result<Option<&Statistics>> {
        let idx = self.column_position(name)?;
        Ok(self.statistics[idx].as_ref())
    }

    // ------------------------------------------------------------------
    // Copies
    // ------------------------------------------------------------------

    /// Independent copy, optionally reduced to the role columns and/or the
    /// selected records. Reduced records are renumbered and all selected.
    pub fn copy(&self, only_selected_columns: bool, only_selected_records: bool) -> FittingData {
        let keep_column: Vec<bool> = (0..self.names.len())
            .map(|idx| !only_selected_columns || self.bindings.contains(&Some(idx)))
            .collect();

        let mut names = Vec::new();
        let mut values = Vec::new();
        let mut remap = vec![None; self.names.len()];
        for idx in (0..self.names.len()).filter(|idx| keep_column[*idx]) {
            remap[idx] = Some(names.len());
            names.push(self.names[idx].clone());
            values.push(if only_selected_records {
                self.selected_values(idx)
            } else {
                self.values[idx].clone()
            });
        }

        let (records, selection) = if only_selected_records {
            let kept = self.number_of_selected_records();
            (kept, vec![true; kept])
        } else {
            (self.records, self.selection.clone())
        };

        let mut copy = FittingData {
            statistics: vec![None; names.len()],
            names,
            values,
            records,
            selection,
            bindings: self.bindings.map(|b| b.and_then(|idx| remap[idx])),
        };
        copy.refresh_statistics();
        copy
    }

    /// Copy whose y column holds `y - f(a, x)` for every record.
    pub fn residuals(&self, function: &ParametricFunction, a: &[f64]) -> Result<FittingData> {
        let x_idx = self.bound(Role::X)?;
        let y_idx = self.bound(Role::Y)?;

        let fitted = function.evaluate_many(Arguments::Full(a), &self.values[x_idx])?;
        let mut residuals = self.clone();
        for (y, f) in residuals.values[y_idx].iter_mut().zip(fitted) {
            *y -= f;
        }
        residuals.refresh_column(y_idx);
        Ok(residuals)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn column_position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::ColumnExistence(name.to_string()))
    }

    fn record_position(&self, record: usize) -> Result<usize> {
        if (1..=self.records).contains(&record) {
            Ok(record - 1)
        } else {
            Err(Error::RecordIndex {
                index: record,
                records: self.records,
            })
        }
    }

    fn bound(&self, role: Role) -> Result<usize> {
        self.bindings[role.slot()].ok_or(Error::MissingRole(role))
    }

    fn selected_values(&self, idx: usize) -> Vec<f64> {
        self.values[idx]
            .iter()
            .zip(&self.selection)
            .filter_map(|(v, selected)| selected.then_some(*v))
            .collect()
    }

    fn refresh_statistics(&mut self) {
        for idx in 0..self.names.len() {
            self.refresh_column(idx);
        }
    }

    fn refresh_column(&mut self, idx: usize) {
        self.statistics[idx] = Statistics::maybe_from_values(&self.selected_values(idx));
        trace!(column = %self.names[idx], "refreshed statistics");
    }
}
