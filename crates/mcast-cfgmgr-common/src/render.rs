//! Line-oriented builder for `config write` output.

use std::fmt::Display;
use std::ops::AddAssign;

/// Stanza separator.
pub const MARKER: &str = "!";

/// Object to ease building configuration text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigBuilder {
    lines: Vec<String>,
}

impl Display for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for s in &self.lines {
            writeln!(f, "{s}")?;
        }
        Ok(())
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Number of lines collected so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn append(&mut self, stanza: &str) {
        match self.lines.last() {
            Some(x) if x == MARKER && stanza == MARKER => {}
            _ => self.lines.push(stanza.to_owned()),
        }
    }

    fn merge(&mut self, other: &mut Self) {
        for line in other.lines.drain(..) {
            self.append(&line);
        }
    }
}

impl AddAssign<Self> for ConfigBuilder {
    fn add_assign(&mut self, mut rhs: Self) {
        self.merge(&mut rhs);
    }
}

impl AddAssign<String> for ConfigBuilder {
    fn add_assign(&mut self, rhs: String) {
        self.append(&rhs);
    }
}

impl AddAssign<&str> for ConfigBuilder {
    fn add_assign(&mut self, rhs: &str) {
        self.append(rhs);
    }
}
