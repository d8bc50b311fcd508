//! Absolute hierarchical paths that identify nodes within a scene document,
//! like `/World/Box`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid scene path '{path}': {reason}")]
pub struct InvalidPath {
    path: String,
    reason: &'static str,
}

impl InvalidPath {
    fn new(path: impl Into<String>, reason: &'static str) -> Self {
        InvalidPath {
            path: path.into(),
            reason,
        }
    }
}

/// An absolute path to a node. Paths are valid by construction: they always
/// contain at least one segment and every segment is a legal node name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScenePath {
    segments: Vec<String>,
}

impl ScenePath {
    pub fn parse(source: &str) -> Result<ScenePath, InvalidPath> {
        let rest = source
            .strip_prefix('/')
            .ok_or_else(|| InvalidPath::new(source, "paths must be absolute"))?;

        if rest.is_empty() {
            return Err(InvalidPath::new(source, "the root path names no node"));
        }

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            check_name(segment).map_err(|reason| InvalidPath::new(source, reason))?;
            segments.push(segment.to_owned());
        }

        Ok(ScenePath { segments })
    }

    /// Builds a root-level path out of a single node name.
    pub fn root(name: &str) -> Result<ScenePath, InvalidPath> {
        check_name(name).map_err(|reason| InvalidPath::new(format!("/{}", name), reason))?;
        Ok(ScenePath {
            segments: vec![name.to_owned()],
        })
    }

    /// Extends this path with one child name.
    pub fn child(&self, name: &str) -> Result<ScenePath, InvalidPath> {
        check_name(name).map_err(|reason| InvalidPath::new(format!("{}/{}", self, name), reason))?;

        let mut segments = self.segments.clone();
        segments.push(name.to_owned());
        Ok(ScenePath { segments })
    }

    /// The name of the node this path addresses, i.e. its last segment.
    pub fn name(&self) -> &str {
        self.segments
            .last()
            .expect("scene paths always have at least one segment")
    }

    pub fn parent(&self) -> Option<ScenePath> {
        if self.segments.len() < 2 {
            return None;
        }

        Some(ScenePath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn check_name(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();

    match chars.next() {
        None => return Err("path segments must not be empty"),
        Some(first) if !first.is_ascii_alphabetic() && first != '_' => {
            return Err("node names must start with a letter or underscore")
        }
        Some(_) => {}
    }

    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err("node names may only contain letters, digits, and underscores")
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        for segment in &self.segments {
            write!(formatter, "/{}", segment)?;
        }

        Ok(())
    }
}

impl TryFrom<String> for ScenePath {
    type Error = InvalidPath;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        ScenePath::parse(&source)
    }
}

impl From<ScenePath> for String {
    fn from(path: ScenePath) -> String {
        path.to_string()
    }
}
