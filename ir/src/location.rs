//! Source locations attached to operations and diagnostics.

use std::fmt;
use std::sync::Arc;

/// Where an operation came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Location {
    #[default]
    Unknown,
    FileLineCol { file: Arc<str>, line: u32, col: u32 },
    Name(Arc<str>),
}

impl Location {
    pub fn file(file: impl Into<Arc<str>>, line: u32, col: u32) -> Self {
        Self::FileLineCol { file: file.into(), line, col }
    }

    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Self::Name(name.into())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("loc(unknown)"),
            Self::FileLineCol { file, line, col } => write!(f, "loc({file:?}:{line}:{col})"),
            Self::Name(name) => write!(f, "loc({name:?})"),
        }
    }
}
