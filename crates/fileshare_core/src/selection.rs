use std::collections::BTreeSet;

/// File names marked for a bulk download or delete.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    names: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `name`; returns whether it is now selected.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_owned());
            true
        }
    }

    /// Selects exactly `candidates`, dropping anything else.
    pub fn select_all<I, S>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = candidates.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Selected names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}
