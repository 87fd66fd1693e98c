use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::{Record, WinnersTable};

/// What [`Resolver::resolve()`] did with a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// First record seen for this name.
    Inserted,
    /// The candidate outranked the incumbent, which is returned here.
    Replaced(Record),
    /// The incumbent was kept; the rejected candidate is returned here.
    Rejected(Record),
}

impl Outcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Counters for one resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub inserted: usize,
    pub replaced: usize,
    pub rejected: usize,
}

impl ResolverStats {
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.inserted + self.replaced + self.rejected
    }
}

impl fmt::Display for ResolverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates: {} inserted, {} replaced, {} rejected",
            self.candidates(),
            self.inserted,
            self.replaced,
            self.rejected
        )
    }
}

/// Keeps the highest-ranked record seen so far for every name.
///
/// A candidate replaces the incumbent only if it has a strictly higher class,
/// or the same class and a strictly higher weight. Exact ties keep the
/// incumbent. Because this keeps the per-name maximum of `(class, weight)`,
/// the final table does not depend on the order candidates arrive in.
#[derive(Debug, Default)]
pub struct Resolver {
    winners: BTreeMap<String, Record>,
    stats: ResolverStats,
}

impl Resolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, candidate: Record) -> Outcome {
        let outcome = match self.winners.entry(candidate.name().to_owned()) {
            Entry::Vacant(slot) => {
                debug!(rule = %candidate, "added to result set");
                slot.insert(candidate);
                Outcome::Inserted
            }
            Entry::Occupied(mut slot) => {
                if candidate.outranks(slot.get()) {
                    debug!(rule = %candidate, replaced = %slot.get(), "replaced lower-ranked rule");
                    Outcome::Replaced(slot.insert(candidate))
                } else {
                    debug!(rule = %candidate, kept = %slot.get(), "rejected");
                    Outcome::Rejected(candidate)
                }
            }
        };
        match outcome {
            Outcome::Inserted => self.stats.inserted += 1,
            Outcome::Replaced(_) => self.stats.replaced += 1,
            Outcome::Rejected(_) => self.stats.rejected += 1,
        }
        outcome
    }

    /// Resolve every candidate from `records`, in order.
    pub fn resolve_all(&mut self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.resolve(record);
        }
    }

    /// The current winner for `name`.
    #[must_use]
    pub fn current(&self, name: &str) -> Option<&Record> {
        self.winners.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.winners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Freeze the current winners.
    pub fn finish(self) -> WinnersTable {
        WinnersTable::from_map(self.winners)
    }
}

/// Resolve a batch of records on the calling thread.
pub fn resolve_records(records: impl IntoIterator<Item = Record>) -> WinnersTable {
    let mut resolver = Resolver::new();
    resolver.resolve_all(records);
    resolver.finish()
}
