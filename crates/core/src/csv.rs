//! Lenient CSV tables for published-sheet exports.
//!
//! Sheets are published as CSV with one header row. Parsing is deliberately
//! forgiving: quoted fields keep embedded commas, stray whitespace is
//! trimmed, carriage returns are tolerated, and short rows are padded to the
//! header width. Column-count consistency across rows is not validated.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TableError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// An ordered table of string fields addressed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse raw CSV text into a table.
    ///
    /// Empty or whitespace-only input yields an empty table, not an error.
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the underlying reader rejects the input.
    pub fn parse(input: &str) -> Result<Self, TableError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut fields: Vec<String> = record.iter().map(str::to_owned).collect();
            if fields.len() < headers.len() {
                fields.resize(headers.len(), String::new());
            }
            rows.push(fields);
        }

        Ok(Self { headers, rows })
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows (the header row is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|fields| Row {
            headers: &self.headers,
            fields,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|fields| Row {
            headers: &self.headers,
            fields,
        })
    }

    /// Re-serialize the table as CSV text.
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the underlying writer fails.
    pub fn to_csv(&self) -> Result<String, TableError> {
        if self.headers.is_empty() {
            return Ok(String::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for fields in &self.rows {
            writer.write_record(fields)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| TableError::Csv(err.into_error().into()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// One data row, borrowing the table's header list for name lookups.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    fields: &'a [String],
}

impl Row<'_> {
    /// Field addressed by header name.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == header)?;
        self.field(index)
    }

    /// Field addressed by position.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        self.fields
    }
}
