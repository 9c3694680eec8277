use crate::names::NameId;
use rustc_hash::FxHashSet;

/// Names guaranteed assigned on every control path reaching the current point
///
/// Each branch of a conditional works on its own fork; [`AssignedSet::join`]
/// merges the outcomes back once all branches are analyzed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignedSet {
    names: FxHashSet<NameId>,
}

impl AssignedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: NameId) -> bool {
        self.names.insert(name)
    }

    pub fn contains(&self, name: NameId) -> bool {
        self.names.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Private copy for one branch
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Names this outcome guarantees beyond `base`
    fn contribution<'a>(&'a self, base: &'a AssignedSet) -> impl Iterator<Item = NameId> + 'a {
        self.names.iter().copied().filter(|name| !base.contains(*name))
    }

    /// Merge the outcomes of a conditional back into `self`
    ///
    /// A name survives the join only when every outcome assigned it. A
    /// missing default branch must be passed as an unmodified fork, which
    /// contributes nothing and so empties the intersection. Returns the
    /// names promoted by the join.
    pub fn join<I>(&mut self, outcomes: I) -> Vec<NameId>
    where
        I: IntoIterator<Item = AssignedSet>,
    {
        let mut outcomes = outcomes.into_iter();
        let Some(first) = outcomes.next() else {
            return Vec::new();
        };
        let mut shared: FxHashSet<NameId> = first.contribution(self).collect();
        for outcome in outcomes {
            shared.retain(|name| outcome.contains(*name));
        }

        let mut promoted: Vec<NameId> = shared.into_iter().collect();
        promoted.sort();
        self.names.extend(promoted.iter().copied());
        promoted
    }
}
