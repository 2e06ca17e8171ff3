//! Variable registry for compiled queries
//!
//! Maps logic variable names (e.g., "?e", "?sort") to compact `VarId`
//! handles used by every clause the compiler emits.

use std::collections::HashMap;
use std::sync::Arc;

/// Compact variable identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u16);

impl VarId {
    /// Get the underlying index value
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registry mapping variable names to `VarId`s
///
/// Besides named variables, the compiler asks for fresh variables whenever a
/// comparison needs a bound value; `fresh` never hands out a name twice.
#[derive(Debug, Default)]
pub struct VarRegistry {
    name_to_id: HashMap<Arc<str>, VarId>,
    id_to_name: Vec<Arc<str>>,
    /// Next suffix to try per fresh-variable base
    next_suffix: HashMap<Arc<str>, usize>,
}

impl VarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get existing VarId or insert a new one
    pub fn get_or_insert(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        self.insert(Arc::from(name))
    }

    /// Allocate a variable that has not been used in this query
    ///
    /// The first request for a base yields `?base`, later ones `?base1`,
    /// `?base2`, and so on. Each base resumes from the suffix after its
    /// last allocation.
    pub fn fresh(&mut self, base: &str) -> VarId {
        let mut n = self.next_suffix.get(base).copied().unwrap_or(0);
        loop {
            let candidate = if n == 0 {
                format!("?{base}")
            } else {
                format!("?{base}{n}")
            };
            n += 1;
            if !self.name_to_id.contains_key(candidate.as_str()) {
                self.next_suffix.insert(Arc::from(base), n);
                return self.insert(Arc::from(candidate));
            }
        }
    }

    fn insert(&mut self, name: Arc<str>) -> VarId {
        // VarId is u16; a search would need tens of thousands of conditions to get here.
        if self.id_to_name.len() >= (u16::MAX as usize) {
            panic!(
                "VarRegistry capacity exceeded ({}). VarId is u16; refusing to wrap.",
                self.id_to_name.len()
            );
        }
        let id = VarId(self.id_to_name.len() as u16);
        self.name_to_id.insert(name.clone(), id);
        self.id_to_name.push(name);
        id
    }

    /// Get the VarId for a name, if it exists
    pub fn get(&self, name: &str) -> Option<VarId> {
        self.name_to_id.get(name).copied()
    }

    /// Get the name for a VarId
    ///
    /// # Panics
    ///
    /// Panics if the VarId was issued by a different registry.
    pub fn name(&self, id: VarId) -> &str {
        &self.id_to_name[id.index()]
    }

    /// Get the name for a VarId, returning None if invalid
    pub fn try_name(&self, id: VarId) -> Option<&str> {
        self.id_to_name.get(id.index()).map(|s| s.as_ref())
    }

    /// Get the number of registered variables
    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert() {
        let mut reg = VarRegistry::new();

        let e = reg.get_or_insert("?e");
        let r = reg.get_or_insert("?r");

        assert_eq!(e, VarId(0));
        assert_eq!(r, VarId(1));
        assert_eq!(reg.get_or_insert("?e"), e);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_fresh_never_reuses_names() {
        let mut reg = VarRegistry::new();

        let a = reg.fresh("v");
        let b = reg.fresh("v");
        let c = reg.fresh("v");

        assert_eq!(reg.name(a), "?v");
        assert_eq!(reg.name(b), "?v1");
        assert_eq!(reg.name(c), "?v2");
    }

    #[test]
    fn test_fresh_skips_named_variables() {
        let mut reg = VarRegistry::new();
        reg.get_or_insert("?sort");

        let sort = reg.fresh("sort");
        assert_eq!(reg.name(sort), "?sort1");
    }

    #[test]
    fn test_fresh_resumes_after_last_suffix() {
        let mut reg = VarRegistry::new();
        let first: Vec<VarId> = (0..2).map(|_| reg.fresh("v")).collect();
        reg.get_or_insert("?v2");
        let rest: Vec<VarId> = (0..100).map(|_| reg.fresh("v")).collect();

        assert_eq!(reg.name(first[1]), "?v1");
        assert_eq!(reg.name(rest[0]), "?v3");
        assert_eq!(reg.name(rest[99]), "?v102");

        let names: std::collections::HashSet<&str> =
            first.iter().chain(&rest).map(|v| reg.name(*v)).collect();
        assert_eq!(names.len(), 102);
        assert!(!names.contains("?v2"));
        assert_eq!(reg.len(), 103);
    }

    #[test]
    fn test_lookup() {
        let mut reg = VarRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.get("?e").is_none());

        let e = reg.get_or_insert("?e");
        assert_eq!(reg.get("?e"), Some(e));
        assert_eq!(reg.try_name(e), Some("?e"));
        assert_eq!(reg.try_name(VarId(9)), None);
    }
}
