use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Accept undecodable leaves as-is instead of failing their container.
    pub passthrough: bool,
}

impl DecodeOptions {
    pub fn passthrough() -> Self {
        Self { passthrough: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{k}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        PathSegment::Key(k.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

/// State of one top-level decode call. Never shared between calls.
#[derive(Debug, Clone, Default)]
pub struct DecodeContext {
    path: Vec<PathSegment>,
    passthrough: bool,
}

impl DecodeContext {
    pub fn new(options: &DecodeOptions) -> Self {
        Self { path: Vec::new(), passthrough: options.passthrough }
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn passthrough(&self) -> bool {
        self.passthrough
    }

    /// `$`, `$.a`, `$.a[2].b`
    pub fn path_string(&self) -> String {
        let mut out = String::from("$");
        for seg in &self.path {
            out.push_str(&seg.to_string());
        }
        out
    }

    /// Push `segment`; the returned scope pops it when dropped, whatever
    /// path the child call took to return.
    pub fn enter(&mut self, segment: impl Into<PathSegment>) -> PathScope<'_> {
        let depth = self.path.len();
        self.path.push(segment.into());
        PathScope { ctx: self, depth }
    }
}

pub struct PathScope<'a> {
    ctx: &'a mut DecodeContext,
    depth: usize,
}

impl Deref for PathScope<'_> {
    type Target = DecodeContext;

    fn deref(&self) -> &DecodeContext {
        self.ctx
    }
}

impl DerefMut for PathScope<'_> {
    fn deref_mut(&mut self) -> &mut DecodeContext {
        self.ctx
    }
}

impl Drop for PathScope<'_> {
    fn drop(&mut self) {
        self.ctx.path.truncate(self.depth);
    }
}
