//! Defines scenestitch's CLI through clap types.

mod generate;
mod merge;
mod validate;

use std::borrow::Cow;
use std::env;
use std::path::Path;
use std::str::FromStr;

use clap::Parser;
use thiserror::Error;

pub use self::generate::GenerateCommand;
pub use self::merge::MergeCommand;
pub use self::validate::ValidateCommand;

/// Command line options that scenestitch accepts, defined using the clap
/// crate.
#[derive(Debug, Parser)]
#[clap(name = "scenestitch", version, about, author)]
pub struct Options {
    #[clap(flatten)]
    pub global: GlobalOptions,

    /// Subcommand to run in this invocation.
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Options {
    /// Runs the selected subcommand and returns the process exit code.
    pub fn run(self) -> anyhow::Result<i32> {
        match self.subcommand {
            Subcommand::Merge(subcommand) => subcommand.run(),
            Subcommand::Validate(subcommand) => subcommand.run(),
            Subcommand::Generate(subcommand) => subcommand.run(),
        }
    }
}

#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Sets verbosity level. Can be specified multiple times.
    #[clap(long("verbose"), short, global(true), parse(from_occurrences))]
    pub verbosity: u8,

    /// Set color behavior. Valid values are auto, always, and never.
    #[clap(long("color"), global(true), default_value("auto"))]
    pub color: ColorChoice,
}

#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorChoice {
    type Err = ColorChoiceParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(ColorChoiceParseError {
                attempted: source.to_owned(),
            }),
        }
    }
}

impl From<ColorChoice> for env_logger::WriteStyle {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => env_logger::WriteStyle::Auto,
            ColorChoice::Always => env_logger::WriteStyle::Always,
            ColorChoice::Never => env_logger::WriteStyle::Never,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid color choice '{attempted}'. Valid values are: auto, always, never")]
pub struct ColorChoiceParseError {
    attempted: String,
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Merge(MergeCommand),
    Validate(ValidateCommand),
    Generate(GenerateCommand),
}

pub(crate) fn resolve_path(path: &Path) -> Cow<'_, Path> {
    if path.is_absolute() {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(env::current_dir().unwrap().join(path))
    }
}
