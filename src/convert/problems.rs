//! Problem accumulation
//!
//! A `ProblemLog` collects the human-readable diagnostics of one import or
//! export call, in the order they were found. Pushing never fails and never
//! stops the walk. Each entry is also logged at TRACE.

use std::slice;

use crate::observability::Logger;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemLog {
    entries: Vec<String>,
    /// Scratch logs hold entries back until they are absorbed.
    scratch: bool,
}

impl ProblemLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose entries are only logged once absorbed into another log
    pub(crate) fn scratch() -> Self {
        Self {
            entries: Vec::new(),
            scratch: true,
        }
    }

    pub fn push(&mut self, problem: impl Into<String>) {
        let problem = problem.into();
        if !self.scratch {
            Logger::trace("CONVERT_PROBLEM", &[("message", &problem)]);
        }
        self.entries.push(problem);
    }

    /// Moves every entry of `other` to the end of this log.
    pub fn absorb(&mut self, other: ProblemLog) {
        for problem in other.entries {
            self.push(problem);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.entries.iter()
    }

    /// True if any entry contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.contains(needle))
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ProblemLog {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut log = ProblemLog::new();
        log.push("first");
        log.push(String::from("second"));
        assert_eq!(log.entries(), &["first".to_string(), "second".to_string()]);
        assert!(log.mentions("sec"));
        assert!(!log.mentions("third"));
    }

    #[test]
    fn test_absorb_appends() {
        let mut log = ProblemLog::new();
        log.push("a");
        let mut scratch = ProblemLog::scratch();
        scratch.push("b");
        scratch.push("c");
        log.absorb(scratch);
        assert_eq!(log.into_vec(), vec!["a", "b", "c"]);
    }
}
