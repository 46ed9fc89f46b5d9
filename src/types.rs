use serde::Serialize;

//==============================================================================
// Table model
//==============================================================================

/// A named column of a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One row of text cells, one per column
pub type Row = Vec<String>;

/// In-memory table exchanged between readers and writers.
///
/// Every cell is text. Rows always hold exactly `columns.len()` values:
/// [`Table::push_row`] drops extra values and pads missing ones with `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create an empty table from column names
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Column::new).collect())
    }

    /// Append a row, clamped or padded to the column count.
    ///
    /// Returns the number of values that were dropped.
    pub fn push_row<I, S>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let width = self.columns.len();
        let mut row: Row = Vec::with_capacity(width);
        let mut dropped = 0;
        for value in values {
            if row.len() < width {
                row.push(value.into());
            } else {
                dropped += 1;
            }
        }
        row.resize(width, String::new());
        self.rows.push(row);
        dropped
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has neither columns nor rows
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Index of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell at `row` in the column called `name`
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}
