use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::document::SceneDocument;
use crate::merge::merge;

use super::resolve_path;

/// Composes two scene documents into one, preserving metadata,
/// relationships, and variant sets.
#[derive(Debug, Parser)]
pub struct MergeCommand {
    /// First source scene document.
    pub input_a: PathBuf,

    /// Second source scene document.
    pub input_b: PathBuf,

    /// Where to write the composed document. Overwritten if it exists.
    pub output: PathBuf,
}

impl MergeCommand {
    pub fn run(self) -> anyhow::Result<i32> {
        let input_a = resolve_path(&self.input_a);
        let input_b = resolve_path(&self.input_b);
        let output = resolve_path(&self.output);

        let mut source_a = SceneDocument::open(&input_a)
            .with_context(|| format!("Could not open first source {}", input_a.display()))?;
        let mut source_b = SceneDocument::open(&input_b)
            .with_context(|| format!("Could not open second source {}", input_b.display()))?;

        let mut dest = SceneDocument::new();
        merge(&mut dest, &mut source_a, &mut source_b)
            .context("Could not compose the source documents")?;

        dest.save(&output)
            .with_context(|| format!("Could not save composed document {}", output.display()))?;

        println!(
            "Composed {} + {} into {}",
            self.input_a.display(),
            self.input_b.display(),
            self.output.display()
        );

        Ok(0)
    }
}
