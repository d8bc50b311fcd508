use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::generate::generate_scene;

use super::resolve_path;

/// Writes a randomized scene document, useful as merge and validation test
/// input.
#[derive(Debug, Parser)]
pub struct GenerateCommand {
    /// Where to write the generated document.
    pub output: PathBuf,
}

impl GenerateCommand {
    pub fn run(self) -> anyhow::Result<i32> {
        let output = resolve_path(&self.output);

        let doc = generate_scene(&mut rand::thread_rng());
        doc.save(&output)
            .with_context(|| format!("Could not save generated scene {}", output.display()))?;

        println!("Wrote scene document to {}", self.output.display());

        Ok(0)
    }
}
