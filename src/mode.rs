use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::navigator::HierarchyNavigator;

/// What input currently drives. The tree cursor only exists while drilled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    TreeNavigating(HierarchyNavigator),
    ConfirmPending { resume: ResumeMode },
}

/// The mode a cancelled quit prompt returns to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeMode {
    Browsing,
    TreeNavigating(HierarchyNavigator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Browsing,
    TreeNavigating,
    ConfirmPending,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Browsing => ModeKind::Browsing,
            Mode::TreeNavigating(_) => ModeKind::TreeNavigating,
            Mode::ConfirmPending { .. } => ModeKind::ConfirmPending,
        }
    }

    /// The navigator receiving input, if any
    pub fn navigator(&self) -> Option<&HierarchyNavigator> {
        match self {
            Mode::TreeNavigating(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn navigator_mut(&mut self) -> Option<&mut HierarchyNavigator> {
        match self {
            Mode::TreeNavigating(nav) => Some(nav),
            _ => None,
        }
    }

    /// The navigator to draw, including one parked behind the quit prompt
    pub fn visible_navigator(&self) -> Option<&HierarchyNavigator> {
        match self {
            Mode::TreeNavigating(nav)
            | Mode::ConfirmPending {
                resume: ResumeMode::TreeNavigating(nav),
            } => Some(nav),
            _ => None,
        }
    }

    pub fn is_confirm_pending(&self) -> bool {
        matches!(self, Mode::ConfirmPending { .. })
    }
}

impl From<ResumeMode> for Mode {
    fn from(resume: ResumeMode) -> Self {
        match resume {
            ResumeMode::Browsing => Mode::Browsing,
            ResumeMode::TreeNavigating(nav) => Mode::TreeNavigating(nav),
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Browsing => "Browsing",
            ModeKind::TreeNavigating => "TreeNavigating",
            ModeKind::ConfirmPending => "ConfirmPending",
        };
        f.write_str(name)
    }
}

impl FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "").as_str() {
            "browsing" => Ok(ModeKind::Browsing),
            "treenavigating" | "tree" => Ok(ModeKind::TreeNavigating),
            "confirmpending" | "confirm" => Ok(ModeKind::ConfirmPending),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModuleKind;

    #[test]
    fn test_navigator_only_while_drilled_in() {
        let nav = HierarchyNavigator::new(ModuleKind::Ssh);
        assert!(Mode::Browsing.navigator().is_none());
        assert!(Mode::TreeNavigating(nav.clone()).navigator().is_some());

        let pending = Mode::ConfirmPending {
            resume: ResumeMode::TreeNavigating(nav),
        };
        assert!(pending.navigator().is_none());
        assert!(pending.visible_navigator().is_some());
        assert!(pending.is_confirm_pending());
    }

    #[test]
    fn test_mode_kind_parsing() {
        assert_eq!("TreeNavigating".parse::<ModeKind>().unwrap(), ModeKind::TreeNavigating);
        assert_eq!("confirm_pending".parse::<ModeKind>().unwrap(), ModeKind::ConfirmPending);
        assert_eq!("browsing".parse::<ModeKind>().unwrap(), ModeKind::Browsing);
        assert!("drilling".parse::<ModeKind>().is_err());
    }
}
