/// Identity of a rendered keyword tag. Removal goes through the handle, never the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeywordHandle(u32);

impl KeywordHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordAdd {
    Added(KeywordHandle),
    Duplicate,
    Blank,
}

/// Ordered, duplicate-free keyword tags attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordSet {
    entries: Vec<(KeywordHandle, String)>,
    next_handle: u32,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the trimmed candidate unless it is blank or already present (exact match).
    pub fn add(&mut self, candidate: &str) -> KeywordAdd {
        let keyword = candidate.trim();
        if keyword.is_empty() {
            return KeywordAdd::Blank;
        }
        if self.contains(keyword) {
            return KeywordAdd::Duplicate;
        }
        self.next_handle += 1;
        let handle = KeywordHandle(self.next_handle);
        self.entries.push((handle, keyword.to_string()));
        KeywordAdd::Added(handle)
    }

    pub fn remove(&mut self, handle: KeywordHandle) -> Option<String> {
        let index = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.iter().any(|(_, existing)| existing == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeywordHandle, &str)> {
        self.entries
            .iter()
            .map(|(handle, keyword)| (*handle, keyword.as_str()))
    }

    /// Keywords in insertion order, as sent in suggestion requests.
    pub fn to_list(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(_, keyword)| keyword.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_input_yields_one_entry() {
        let mut set = KeywordSet::new();
        assert!(matches!(set.add("running"), KeywordAdd::Added(_)));
        assert_eq!(set.add("  running "), KeywordAdd::Duplicate);
        assert_eq!(set.to_list(), vec!["running"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut set = KeywordSet::new();
        set.add("Shoes");
        assert!(matches!(set.add("shoes"), KeywordAdd::Added(_)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn blank_candidates_are_rejected() {
        let mut set = KeywordSet::new();
        assert_eq!(set.add("   "), KeywordAdd::Blank);
        assert!(set.is_empty());
    }

    #[test]
    fn removal_is_by_handle_and_keeps_order() {
        let mut set = KeywordSet::new();
        set.add("a");
        let KeywordAdd::Added(b) = set.add("b") else {
            panic!("expected b to be added");
        };
        set.add("c");

        assert_eq!(set.remove(b), Some("b".to_string()));
        assert_eq!(set.remove(b), None);
        assert_eq!(set.to_list(), vec!["a", "c"]);

        // Re-adding gets a fresh handle.
        let KeywordAdd::Added(again) = set.add("b") else {
            panic!("expected b to be re-added");
        };
        assert_ne!(again, b);
        assert_eq!(set.to_list(), vec!["a", "c", "b"]);
    }
}
