use std::collections::BTreeMap;

///
/// Counts of (expected, actual) variant pairs for one subsystem.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PairCounts(BTreeMap<(String, String), usize>);

impl PairCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, key: (String, String)) {
        *self.0.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, expected: &str, actual: &str) -> usize {
        self.0
            .get(&(expected.to_string(), actual.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Pairs ordered by descending count, then by key.
    pub fn sorted(&self) -> Vec<(&(String, String), usize)> {
        let mut pairs: Vec<_> = self.0.iter().map(|(k, v)| (k, *v)).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        pairs
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn key(e: &str, a: &str) -> (String, String) {
        (e.to_string(), a.to_string())
    }

    #[rstest]
    fn test_identical_pairs_group() {
        let mut counts = PairCounts::new();
        counts.count(key("2", "0"));
        counts.count(key("2", "0"));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("2", "0"), 2);
    }

    #[rstest]
    fn test_sorted_by_count_then_key() {
        let mut counts = PairCounts::new();
        counts.count(key("3", "1"));
        counts.count(key("1", "0"));
        counts.count(key("2", "0"));
        counts.count(key("2", "0"));
        let sorted: Vec<_> = counts
            .sorted()
            .into_iter()
            .map(|((e, a), n)| format!("{e}:{a}:{n}"))
            .collect();
        assert_eq!(sorted, vec!["2:0:2", "1:0:1", "3:1:1"]);
        assert_eq!(counts.len(), 3);
    }
}
