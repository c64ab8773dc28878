// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Class catalog.
//!
//! The catalog holds the ordered class names. Index `i` of a classifier's
//! output vector is the probability of `names()[i]`. On disk it is a plain
//! label file with one class name per line.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{PoseError, Result};
use crate::media::list_subdirectories;

/// Ordered class names aligned with the classifier output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCatalog {
    names: Vec<String>,
}

impl ClassCatalog {
    /// Create a catalog from ordered names.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if a name is empty, appears twice, contains a
    /// line break, or ends in whitespace. Such names would not survive a
    /// label file round trip.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for name in names {
            catalog.push(name.into())?;
        }
        Ok(catalog)
    }

    fn push(&mut self, name: String) -> Result<()> {
        if name.is_empty() {
            return Err(PoseError::CatalogError("class name is empty".to_string()));
        }
        if name.contains(['\n', '\r']) || name.trim_end() != name {
            return Err(PoseError::CatalogError(format!(
                "class name {name:?} contains a line break or trailing whitespace"
            )));
        }
        if self.names.contains(&name) {
            return Err(PoseError::CatalogError(format!(
                "duplicate class name '{name}'"
            )));
        }
        self.names.push(name);
        Ok(())
    }

    /// Parse label file content.
    ///
    /// Trailing whitespace is trimmed from every line and blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if no class names remain or a name repeats.
    pub fn parse(content: &str) -> Result<Self> {
        let catalog = Self::new(
            content
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty()),
        )?;
        if catalog.is_empty() {
            return Err(PoseError::CatalogError(
                "label file contains no class names".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// Read a label file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or holds no class names.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PoseError::IoError(format!("Failed to read label file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Write a label file, one name per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut content = self.names.join("\n");
        content.push('\n');
        fs::write(path, content).map_err(|e| {
            PoseError::IoError(format!("Failed to write label file {}: {e}", path.display()))
        })
    }

    /// Catalog of a labeled dataset root: its sorted, non-hidden subdirectory names.
    ///
    /// # Errors
    ///
    /// Returns an error if the root can't be listed.
    pub fn from_dataset_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let dirs = list_subdirectories(root.as_ref())?;
        Self::new(
            dirs.iter()
                .filter_map(|d| d.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        )
    }

    /// Name of class `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Index of a class name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether the catalog contains `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl fmt::Display for ClassCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(", "))
    }
}
