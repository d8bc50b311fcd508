use std::path::{Path, PathBuf};

use clap::Parser;

use crate::document::SceneDocument;
use crate::validate::validate;

use super::resolve_path;

/// Checks that a composed scene document contains every node, metadata
/// entry, relationship, and variant set from two source documents.
#[derive(Debug, Parser)]
pub struct ValidateCommand {
    /// First source scene document.
    pub input_a: PathBuf,

    /// Second source scene document.
    pub input_b: PathBuf,

    /// The composed document to validate.
    pub composed: PathBuf,
}

impl ValidateCommand {
    /// Exit code 0 when the composed document checks out, 1 when any
    /// diagnostics were produced, and 2 when a document failed to open.
    pub fn run(self) -> anyhow::Result<i32> {
        let mut source_a = match open_document(&resolve_path(&self.input_a)) {
            Some(doc) => doc,
            None => return Ok(2),
        };
        let mut source_b = match open_document(&resolve_path(&self.input_b)) {
            Some(doc) => doc,
            None => return Ok(2),
        };
        let mut composed = match open_document(&resolve_path(&self.composed)) {
            Some(doc) => doc,
            None => return Ok(2),
        };

        let diagnostics = validate(&mut composed, &mut source_a, &mut source_b);

        if diagnostics.is_empty() {
            println!("Validation PASSED: composed document contains all expected data.");
            Ok(0)
        } else {
            println!("Validation FAILED with the following errors:");
            for diagnostic in &diagnostics {
                println!(" - {}", diagnostic);
            }
            Ok(1)
        }
    }
}

fn open_document(path: &Path) -> Option<SceneDocument> {
    match SceneDocument::open(path) {
        Ok(doc) => Some(doc),
        Err(err) => {
            eprintln!("Failed to open scene document: {}", err);
            None
        }
    }
}
