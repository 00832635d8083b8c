//! Ordered pattern dispatch.
//!
//! A [`Dispatcher`] is a fixed list of bindings, each a whole-line regex and
//! an extractor that turns the captures into a value. Bindings are tried in
//! the order they were added and the first match wins; later bindings are
//! never consulted for that line, even if they would also match.

use regex::{Captures, Regex};

/// Turns the captures of a matched line into a value.
pub type Extractor<T> = fn(&Captures<'_>) -> T;

struct Binding<T> {
    name: &'static str,
    pattern: Regex,
    extract: Extractor<T>,
}

/// Immutable, ordered table of `(pattern, extractor)` bindings.
pub struct Dispatcher<T> {
    bindings: Vec<Binding<T>>,
}

/// Builds a [`Dispatcher`]. The table cannot change once built.
pub struct DispatcherBuilder<T> {
    bindings: Vec<Binding<T>>,
}

impl<T> Dispatcher<T> {
    pub fn builder() -> DispatcherBuilder<T> {
        DispatcherBuilder {
            bindings: Vec::new(),
        }
    }

    /// Run the first binding whose pattern matches the entire `line`.
    ///
    /// Returns `None` when nothing matches.
    pub fn dispatch(&self, line: &str) -> Option<T> {
        self.bindings.iter().find_map(|binding| {
            let caps = binding.pattern.captures(line)?;
            tracing::trace!(binding = binding.name, "line matched");
            Some((binding.extract)(&caps))
        })
    }

    /// Binding names in precedence order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.iter().map(|b| b.name)
    }
}

impl<T> DispatcherBuilder<T> {
    /// Append a binding. `pattern` is anchored to the whole line, so it
    /// should not carry its own `^`/`$`.
    pub fn bind(
        mut self,
        name: &'static str,
        pattern: &str,
        extract: Extractor<T>,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^(?:{pattern})$"))?;
        self.bindings.push(Binding {
            name,
            pattern,
            extract,
        });
        Ok(self)
    }

    pub fn build(self) -> Dispatcher<T> {
        Dispatcher {
            bindings: self.bindings,
        }
    }
}
