use std::collections::BTreeMap;

use super::record::Record;

/// The frozen result of a resolution run: at most one [`Record`] per name.
///
/// Produced by [`Resolver::finish()`](crate::Resolver::finish) once the
/// pipeline has drained. Iteration is ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct WinnersTable {
    entries: BTreeMap<String, Record>,
}

impl WinnersTable {
    pub(crate) fn from_map(entries: BTreeMap<String, Record>) -> Self {
        Self { entries }
    }

    /// The winning record for `name`, if any record with that name survived
    /// validation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.entries.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a WinnersTable {
    type Item = &'a Record;
    type IntoIter = std::collections::btree_map::Values<'a, String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PriorityClass;

    fn table(records: &[(&str, PriorityClass, u32)]) -> WinnersTable {
        let entries = records
            .iter()
            .map(|&(n, c, w)| (n.to_owned(), Record::new(n, c, w).unwrap()))
            .collect();
        WinnersTable::from_map(entries)
    }

    #[test]
    fn iteration_is_ordered_by_name() {
        let t = table(&[
            ("c", PriorityClass::Root, 1),
            ("a", PriorityClass::Sub, 2),
            ("b", PriorityClass::Child, 3),
        ]);
        assert_eq!(t.names().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn lookup_by_name() {
        let t = table(&[("a", PriorityClass::Sub, 2)]);
        assert_eq!(t.get("a").map(Record::weight), Some(2));
        assert!(t.get("z").is_none());
        assert!(t.contains("a"));
    }

    #[test]
    fn empty_table() {
        let t = WinnersTable::default();
        assert!(t.is_empty());
        assert!(t.into_records().is_empty());
    }
}
