//! Health changes and clamping.

use std::fmt;

/// A requested change to a health value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    /// Add the amount (negative for damage).
    Relative(i32),
    /// Replace the value outright.
    Absolute(i32),
}

impl HealthChange {
    pub fn new(amount: i32, relative: bool) -> Self {
        if relative {
            Self::Relative(amount)
        } else {
            Self::Absolute(amount)
        }
    }

    /// Applies the change and clamps the result to `[0, max]`.
    ///
    /// Without a known maximum only the lower bound applies.
    pub fn apply(self, current: i32, max: Option<i32>) -> HealthUpdate {
        let requested = match self {
            Self::Relative(delta) => current.saturating_add(delta),
            Self::Absolute(value) => value,
        };
        let upper = max.map_or(i32::MAX, |max| max.max(0));
        HealthUpdate {
            previous: current,
            requested,
            health: requested.clamp(0, upper),
        }
    }
}

impl fmt::Display for HealthChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative(delta) => write!(f, "{:+}", delta),
            Self::Absolute(value) => write!(f, "={}", value),
        }
    }
}

/// Result of applying a [`HealthChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthUpdate {
    pub previous: i32,
    /// The unclamped target value.
    pub requested: i32,
    /// The stored value after clamping.
    pub health: i32,
}

impl HealthUpdate {
    pub fn was_clamped(&self) -> bool {
        self.requested != self.health
    }

    pub fn is_depleted(&self) -> bool {
        self.health == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_change_clamps_to_max() {
        let update = HealthChange::Relative(20).apply(4, Some(8));
        assert_eq!(update.health, 8);
        assert_eq!(update.requested, 24);
        assert!(update.was_clamped());
    }

    #[test]
    fn damage_below_zero_clamps_to_zero() {
        let update = HealthChange::Relative(-5).apply(4, Some(8));
        assert_eq!(update.health, 0);
        assert!(update.is_depleted());
    }

    #[test]
    fn absolute_change_replaces_value() {
        let update = HealthChange::Absolute(3).apply(7, Some(8));
        assert_eq!(update.health, 3);
        assert!(!update.was_clamped());
    }

    #[test]
    fn unknown_max_only_bounds_below() {
        assert_eq!(HealthChange::Absolute(50).apply(1, None).health, 50);
        assert_eq!(HealthChange::Absolute(-2).apply(1, None).health, 0);
    }

    #[test]
    fn relative_change_saturates() {
        let update = HealthChange::Relative(i32::MAX).apply(10, None);
        assert_eq!(update.health, i32::MAX);
    }

    #[test]
    fn display_shows_sign_or_assignment() {
        assert_eq!(HealthChange::new(-3, true).to_string(), "-3");
        assert_eq!(HealthChange::new(4, true).to_string(), "+4");
        assert_eq!(HealthChange::new(6, false).to_string(), "=6");
    }
}
