// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Landmark tables.
//!
//! A [`LandmarkTable`] is an ordered list of [`PoseRecord`]s sharing one fixed
//! column schema:
//!
//! ```text
//! file_name, NOSE_x, NOSE_y, NOSE_score, ..., RIGHT_ANKLE_score, class_no, class_name
//! ```
//!
//! Tables are persisted as comma-delimited text with a header row.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;

use crate::error::{PoseError, Result};
use crate::keypoint::{BodyPart, NUM_LANDMARK_VALUES, Person};

/// Total number of columns in a landmark table.
pub const NUM_COLUMNS: usize = NUM_LANDMARK_VALUES + 3;

/// One accepted image or frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseRecord {
    /// Source file name or 1-based frame number.
    pub file_name: String,
    /// `x, y, score` for each of the 17 keypoints.
    pub landmarks: [f32; NUM_LANDMARK_VALUES],
    /// Class index.
    pub class_no: usize,
    /// Class name.
    pub class_name: String,
}

impl PoseRecord {
    /// Build a record from a detected person.
    #[must_use]
    pub fn from_person(file_name: impl Into<String>, person: &Person, class_no: usize, class_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            landmarks: person.to_landmarks(),
            class_no,
            class_name: class_name.into(),
        }
    }
}

/// Ordered collection of pose records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkTable {
    records: Vec<PoseRecord>,
}

impl LandmarkTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Column names in table order.
    #[must_use]
    pub fn header() -> Vec<String> {
        let mut header = Vec::with_capacity(NUM_COLUMNS);
        header.push("file_name".to_string());
        for part in BodyPart::ALL {
            header.push(format!("{part}_x"));
            header.push(format!("{part}_y"));
            header.push(format!("{part}_score"));
        }
        header.push("class_no".to_string());
        header.push("class_name".to_string());
        header
    }

    /// Append a record.
    pub fn push(&mut self, record: PoseRecord) {
        self.records.push(record);
    }

    /// Append all records of another table.
    pub fn append(&mut self, other: Self) {
        self.records.extend(other.records);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in order.
    #[must_use]
    pub fn records(&self) -> &[PoseRecord] {
        &self.records
    }

    /// Iterate over records.
    pub fn iter(&self) -> std::slice::Iter<'_, PoseRecord> {
        self.records.iter()
    }

    /// Assign one class to every record.
    pub fn set_class(&mut self, class_no: usize, class_name: &str) {
        for record in &mut self.records {
            record.class_no = class_no;
            class_name.clone_into(&mut record.class_name);
        }
    }

    /// Landmark values as a (records, 51) matrix.
    #[must_use]
    pub fn to_array(&self) -> Array2<f32> {
        Array2::from_shape_fn((self.records.len(), NUM_LANDMARK_VALUES), |(r, c)| {
            self.records[r].landmarks[c]
        })
    }

    /// Write the table as comma-delimited text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                PoseError::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let file = fs::File::create(path).map_err(|e| {
            PoseError::IoError(format!("Failed to create {}: {e}", path.display()))
        })?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", Self::header().join(","))?;
        for record in &self.records {
            let mut fields = Vec::with_capacity(NUM_COLUMNS);
            fields.push(escape_field(&record.file_name));
            fields.extend(record.landmarks.iter().map(ToString::to_string));
            fields.push(record.class_no.to_string());
            fields.push(escape_field(&record.class_name));
            writeln!(writer, "{}", fields.join(","))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a table written by [`LandmarkTable::write_csv`].
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the header or any row does not match the schema.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PoseError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse_csv(&content)
    }

    /// Parse comma-delimited table text.
    ///
    /// Quoted fields may contain delimiters, quotes and line breaks.
    ///
    /// # Errors
    ///
    /// Returns `TableError` if the header or any row does not match the schema.
    pub fn parse_csv(content: &str) -> Result<Self> {
        let mut records = split_records(content).into_iter();

        let (_, header) = records
            .next()
            .ok_or_else(|| PoseError::TableError("missing header row".to_string()))?;
        let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        if header != Self::header() {
            return Err(PoseError::TableError(format!(
                "unexpected header with {} columns",
                header.len()
            )));
        }

        let mut table = Self::new();
        for (line_no, mut fields) in records {
            if fields.len() != NUM_COLUMNS {
                return Err(PoseError::TableError(format!(
                    "line {line_no}: expected {NUM_COLUMNS} fields, got {}",
                    fields.len()
                )));
            }

            let mut landmarks = [0.0; NUM_LANDMARK_VALUES];
            for (i, value) in fields[1..=NUM_LANDMARK_VALUES].iter().enumerate() {
                landmarks[i] = value.trim().parse().map_err(|_| {
                    PoseError::TableError(format!("line {line_no}: invalid number '{value}'"))
                })?;
            }
            let class_field = fields[NUM_COLUMNS - 2].trim();
            let class_no = class_field.parse().map_err(|_| {
                PoseError::TableError(format!("line {line_no}: invalid class_no '{class_field}'"))
            })?;

            let class_name = fields.pop().unwrap_or_default();
            table.push(PoseRecord {
                file_name: std::mem::take(&mut fields[0]),
                landmarks,
                class_no,
                class_name,
            });
        }
        Ok(table)
    }
}

impl<'a> IntoIterator for &'a LandmarkTable {
    type Item = &'a PoseRecord;
    type IntoIter = std::slice::Iter<'a, PoseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Quote a field if it contains a delimiter, quote or line break.
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split delimited text into records, each tagged with its 1-based first line.
///
/// Double-quoted fields may span line breaks. Blank lines are skipped.
fn split_records(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = content.chars().peekable();

    let mut finish = |fields: Vec<String>, start_line: usize| {
        let blank = fields.len() == 1 && fields[0].trim().is_empty();
        if !blank {
            records.push((start_line, fields));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                finish(std::mem::take(&mut fields), start_line);
                line += 1;
                start_line = line;
            }
            _ => {
                if c == '\n' {
                    line += 1;
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        finish(fields, start_line);
    }
    records
}
