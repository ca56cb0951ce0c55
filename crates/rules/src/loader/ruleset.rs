//! Immutable loaded rule collections and the swappable holder around them.

use std::sync::{Arc, RwLock};

use crate::schema::RuleDefinition;

/// An ordered, immutable collection of loaded rules.
///
/// Cloning is cheap (the rules live behind an `Arc`), so a tick can hold
/// its own snapshot while a reload builds the next one.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[RuleDefinition]>,
}

impl RuleSet {
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RuleDefinition> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleDefinition> {
        self.rules.iter()
    }

    /// Rule names in set order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn as_slice(&self) -> &[RuleDefinition] {
        &self.rules
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<RuleDefinition>> for RuleSet {
    fn from(rules: Vec<RuleDefinition>) -> Self {
        Self::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleDefinition;
    type IntoIter = std::slice::Iter<'a, RuleDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Holder for the current [`RuleSet`], replaced wholesale on reload.
///
/// Readers take a snapshot and never see a partially built set.
#[derive(Debug, Clone, Default)]
pub struct SharedRuleSet {
    current: Arc<RwLock<RuleSet>>,
}

impl SharedRuleSet {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: Arc::new(RwLock::new(rules)),
        }
    }

    /// The set in effect right now.
    pub fn snapshot(&self) -> RuleSet {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Swap in `rules`, returning the previous set.
    pub fn replace(&self, rules: RuleSet) -> RuleSet {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, rules)
    }
}

impl From<RuleSet> for SharedRuleSet {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}
