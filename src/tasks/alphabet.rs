//! Fixed symbol tables for observations and actions.
//!
//! An [`Alphabet`] maps each symbol to a stable integer index. The mapping is
//! fixed when the alphabet is built and never changes afterwards, so indices
//! handed to an agent stay valid for the lifetime of the environment.

use std::collections::HashMap;

use crate::error::{TaskError, TaskResult};

/// The 26 upper-case letters used by the copy tasks.
pub const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// An ordered, duplicate-free set of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<String>,
    index: HashMap<String, usize>,
}

impl Alphabet {
    /// Build an alphabet from symbols in index order.
    ///
    /// Fails if the list is empty or contains a duplicate.
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> TaskResult<Self> {
        if symbols.is_empty() {
            return Err(TaskError::InvalidConfig("alphabet must not be empty".into()));
        }
        let mut index = HashMap::with_capacity(symbols.len());
        let mut owned = Vec::with_capacity(symbols.len());
        for (i, s) in symbols.iter().enumerate() {
            let s = s.as_ref().to_string();
            if index.insert(s.clone(), i).is_some() {
                return Err(TaskError::InvalidConfig(format!(
                    "duplicate symbol {s:?} in alphabet"
                )));
            }
            owned.push(s);
        }
        Ok(Self {
            symbols: owned,
            index,
        })
    }

    /// The first `n` upper-case letters, optionally followed by an extra
    /// sentinel symbol.
    pub fn letters(n: usize, sentinel: Option<&str>) -> TaskResult<Self> {
        if n == 0 || n > LETTERS.len() {
            return Err(TaskError::InvalidConfig(format!(
                "n_char must be in 1..={}, got {n}",
                LETTERS.len()
            )));
        }
        let mut symbols: Vec<&str> = LETTERS[..n].to_vec();
        if let Some(s) = sentinel {
            symbols.push(s);
        }
        Self::new(&symbols)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Index of a symbol, if it belongs to the alphabet.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    /// Symbol at an index, if in range.
    pub fn symbol(&self, idx: usize) -> Option<&str> {
        self.symbols.get(idx).map(String::as_str)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Whether every symbol is a single character, in which case sequences
    /// are written without separators.
    pub(crate) fn is_compact(&self) -> bool {
        self.symbols.iter().all(|s| s.chars().count() == 1)
    }

    /// Render a sequence of indices as text.
    ///
    /// Single-character alphabets concatenate (`"LRLL"`); word alphabets use
    /// a space separator (`"Front Front Left"`). Out-of-range indices render
    /// as `?`.
    pub fn render(&self, indices: &[usize]) -> String {
        let sep = if self.is_compact() { "" } else { " " };
        indices
            .iter()
            .map(|&i| self.symbol(i).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Look up a symbol that the caller knows to be present.
    ///
    /// Used by the task grammars on their own built-in tables.
    pub(crate) fn idx(&self, symbol: &str) -> usize {
        match self.index.get(symbol) {
            Some(&i) => i,
            None => unreachable!("symbol {symbol:?} missing from built-in alphabet"),
        }
    }
}
