use serde::{Deserialize, Serialize};

use crate::catalog::{Module, ModuleKind};

/// Module bar state: a provisional `hovered` highlight and the last
/// `current` module the user committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSelector {
    modules: Vec<Module>,
    hovered: usize,
    current: usize,
}

impl ModuleSelector {
    pub fn new(modules: Vec<Module>) -> Self {
        Self {
            modules,
            hovered: 0,
            current: 0,
        }
    }

    /// Restore a selector from saved indices, clamping them into range
    pub fn with_indices(modules: Vec<Module>, hovered: usize, current: usize) -> Self {
        let last = modules.len().saturating_sub(1);
        Self {
            modules,
            hovered: hovered.min(last),
            current: current.min(last),
        }
    }

    pub fn hover_previous(&mut self) -> bool {
        if self.hovered > 0 {
            self.hovered -= 1;
            true
        } else {
            false
        }
    }

    pub fn hover_next(&mut self) -> bool {
        if self.hovered + 1 < self.modules.len() {
            self.hovered += 1;
            true
        } else {
            false
        }
    }

    /// Make the hovered module current and return it so the caller can reset
    /// the tree for it
    pub fn commit(&mut self) -> Option<ModuleKind> {
        let module = self.modules.get(self.hovered)?;
        self.current = self.hovered;
        log::debug!("Committed module {}", module.name());
        Some(module.kind)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn hovered(&self) -> usize {
        self.hovered
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn hovered_module(&self) -> Option<ModuleKind> {
        self.modules.get(self.hovered).map(|m| m.kind)
    }

    pub fn current_module(&self) -> Option<ModuleKind> {
        self.modules.get(self.current).map(|m| m.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn selector() -> ModuleSelector {
        ModuleSelector::new(Catalog::builtin().modules())
    }

    #[test]
    fn test_hover_is_clamped_at_both_ends() {
        let mut selector = selector();
        assert!(!selector.hover_previous());
        assert_eq!(selector.hovered(), 0);

        assert!(selector.hover_next());
        assert!(selector.hover_next());
        assert!(selector.hover_next());
        assert!(!selector.hover_next());
        assert_eq!(selector.hovered(), 3);
    }

    #[test]
    fn test_hover_does_not_change_current() {
        let mut selector = selector();
        selector.hover_next();
        selector.hover_next();
        assert_eq!(selector.current(), 0);
        assert_eq!(selector.hovered_module(), Some(ModuleKind::Postgresql));
        assert_eq!(selector.current_module(), Some(ModuleKind::Ssh));
    }

    #[test]
    fn test_commit_moves_current() {
        let mut selector = selector();
        selector.hover_next();
        assert_eq!(selector.commit(), Some(ModuleKind::Mysql));
        assert_eq!(selector.current(), 1);
    }

    #[test]
    fn test_commit_on_empty_selector() {
        let mut selector = ModuleSelector::new(Vec::new());
        assert!(!selector.hover_next());
        assert_eq!(selector.commit(), None);
    }

    #[test]
    fn test_with_indices_clamps() {
        let selector = ModuleSelector::with_indices(Catalog::builtin().modules(), 9, 7);
        assert_eq!(selector.hovered(), 3);
        assert_eq!(selector.current(), 3);
    }
}
