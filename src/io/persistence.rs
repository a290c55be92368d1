//! Skeleton documents on disk and Fractint export

use crate::io::error::{IfsError, Result};
use crate::math::formula::FormulaPoint;
use crate::system::mode::{Mode, ModeKind};
use crate::system::skeleton::Skeleton;
use crate::system::transform::Transform;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

/// Source text of the two point formulas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaText {
    /// Prefix expression computing the next x
    pub next_x: String,
    /// Prefix expression computing the next y
    pub next_y: String,
}

/// Serializable state of a skeleton and the mode it is drawn in
///
/// Probabilities are not stored: they are derived from the transforms on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfsDocument {
    /// Generation mode
    #[serde(default)]
    pub mode: ModeKind,
    /// Formula texts, present in formula mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<FormulaText>,
    /// View transform
    #[serde(default)]
    pub frame: Transform,
    /// Transforms of the system
    pub transforms: Vec<Transform>,
    /// Index of the selected transform, 0 being the frame
    #[serde(default)]
    pub selected: usize,
}

impl IfsDocument {
    /// Snapshot of `skeleton` drawn in `mode`
    pub fn capture(mode: &Mode, skeleton: &Skeleton) -> Self {
        Self {
            mode: mode.kind(),
            formula: mode.formula().map(|formula| FormulaText {
                next_x: formula.x_text().to_string(),
                next_y: formula.y_text().to_string(),
            }),
            frame: *skeleton.frame(),
            transforms: skeleton.transforms().to_vec(),
            selected: skeleton.selected(),
        }
    }

    /// Rebuild the mode and skeleton
    ///
    /// Formula mode without stored text uses the standard formulas.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A stored formula does not parse
    /// - The transform list is empty, too long, or `selected` is out of range
    pub fn into_parts(self) -> Result<(Mode, Skeleton)> {
        let mode = match (self.mode, self.formula) {
            (ModeKind::Linear, _) => Mode::Linear,
            (ModeKind::Sinusoidal, _) => Mode::Sinusoidal,
            (ModeKind::Julia, _) => Mode::Julia,
            (ModeKind::Formula, Some(text)) => {
                Mode::Formula(FormulaPoint::new(&text.next_x, &text.next_y)?)
            }
            (ModeKind::Formula, None) => Mode::Formula(FormulaPoint::standard()?),
        };
        let skeleton = Skeleton::from_parts(self.frame, self.transforms, self.selected)?;
        Ok((mode, skeleton))
    }

    /// JSON text of the document
    ///
    /// # Errors
    ///
    /// Returns `IfsError::Serialization` if a coefficient cannot be encoded
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document from JSON text
    ///
    /// # Errors
    ///
    /// Returns `IfsError::Serialization` if the text is not a valid document
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a document from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| IfsError::FileSystem {
            path: path.to_path_buf(),
            operation: "read skeleton",
            source,
        })?;
        let document = serde_json::from_str(&text).map_err(|source| IfsError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded skeleton document");
        Ok(document)
    }

    /// Write the document as pretty JSON, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| IfsError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
        create_parent(path)?;
        std::fs::write(path, text).map_err(|source| IfsError::FileSystem {
            path: path.to_path_buf(),
            operation: "write skeleton",
            source,
        })?;
        info!(path = %path.display(), transforms = self.transforms.len(), "saved skeleton");
        Ok(())
    }
}

/// Fractint `.ifs` entry named `name`
///
/// One line per transform: `a c b d e f p`, Fractint ordering its matrix by rows.
pub fn to_fractint(skeleton: &Skeleton, name: &str) -> String {
    let mut text = format!("{name} {{ ; exported from ifsforge\n");
    for (transform, probability) in skeleton.transforms().iter().zip(skeleton.probabilities()) {
        let Transform { a, b, c, d, e, f } = *transform;
        // Writing to a String cannot fail
        let _ = writeln!(text, "  {a} {c} {b} {d} {e} {f} {probability}");
    }
    text.push_str("}\n");
    text
}

/// Create the directory that will hold `path`
///
/// # Errors
///
/// Returns `IfsError::FileSystem` if the directory cannot be created
pub fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| IfsError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source,
            })
        }
        _ => Ok(()),
    }
}
