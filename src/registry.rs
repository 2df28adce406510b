//! Owning collection of a client's live toplevels.
//!
//! Clients hold a handful of toplevels at most, so lookups are a linear scan
//! over a `Vec`.

use crate::toplevel::{SurfaceId, Toplevel};

#[derive(Debug, Default)]
pub struct ToplevelRegistry {
    toplevels: Vec<Toplevel>,
}

impl ToplevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a toplevel. Callers guarantee identities are unique.
    pub fn insert(&mut self, toplevel: Toplevel) {
        self.toplevels.push(toplevel);
    }

    /// Remove the first toplevel with `id`, if any.
    pub fn remove(&mut self, id: SurfaceId) -> Option<Toplevel> {
        let index = self.toplevels.iter().position(|t| t.id() == id)?;
        Some(self.toplevels.remove(index))
    }

    pub fn find(&self, id: SurfaceId) -> Option<&Toplevel> {
        self.toplevels.iter().find(|t| t.id() == id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.find(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.toplevels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toplevels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toplevel> {
        self.toplevels.iter()
    }

    /// Take every toplevel out, in insertion order.
    pub fn drain(&mut self) -> impl Iterator<Item = Toplevel> + '_ {
        self.toplevels.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toplevel::ClientId;

    fn toplevel(id: u32) -> Toplevel {
        Toplevel::new(SurfaceId(id), 100.0, 50.0, ClientId::next())
    }

    #[test]
    fn test_insert_then_remove_clears_lookup() {
        let mut registry = ToplevelRegistry::new();
        registry.insert(toplevel(7));
        assert!(registry.find(SurfaceId(7)).is_some());

        let removed = registry.remove(SurfaceId(7));
        assert_eq!(removed.map(|t| t.id()), Some(SurfaceId(7)));
        assert!(registry.find(SurfaceId(7)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut registry = ToplevelRegistry::new();
        registry.insert(toplevel(1));
        registry.insert(toplevel(2));

        assert!(registry.remove(SurfaceId(99)).is_none());
        assert_eq!(registry.len(), 2);
        let ids: Vec<_> = registry.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![SurfaceId(1), SurfaceId(2)]);
    }

    #[test]
    fn test_remove_takes_first_match_only() {
        let mut registry = ToplevelRegistry::new();
        registry.insert(toplevel(3));
        registry.insert(toplevel(3));

        registry.remove(SurfaceId(3));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(SurfaceId(3)));
    }

    #[test]
    fn test_drain_empties_registry() {
        let mut registry = ToplevelRegistry::new();
        for id in 1..=3 {
            registry.insert(toplevel(id));
        }
        let drained: Vec<_> = registry.drain().map(|t| t.id().0).collect();
        assert_eq!(drained, vec![1, 2, 3]);
        assert!(registry.is_empty());
    }
}
