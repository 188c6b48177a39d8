//! Temporal gating of context items.
//!
//! The gate filters a context sequence by a declared boundary (`t_target`)
//! before attestation, so the certified context reflects only what was
//! temporally available. The boundary is a bare integer compared directly to
//! item timestamps; the caller declares the unit (a bare year or epoch
//! seconds) and must use the same unit for both.

use crate::context::ContextItem;

/// Gating policy applied to the context sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GatePolicy {
    /// Keep an item iff `timestamp <= t_target`.
    #[default]
    Strict,
    /// Keep all items.
    None,
}

impl GatePolicy {
    /// The policy identifier recorded in the capsule.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::None => "none",
        }
    }

    /// Parses a policy identifier. An absent identifier means [`Self::None`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "none" | "" => Some(Self::None),
            _ => None,
        }
    }
}

/// The outcome of temporal gating: the retained items plus what the gate
/// observed about the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedContext {
    /// Retained items, a stable-order subset of the input.
    pub items: Vec<ContextItem>,

    /// The policy that was applied.
    pub policy: GatePolicy,

    /// The declared boundary.
    pub boundary: i64,

    /// Whether any *input* item (kept or not) had `timestamp > boundary`.
    pub has_post_target: bool,
}

impl GatePolicy {
    /// Applies this policy to a context sequence.
    ///
    /// Filtering is stable and never mutates the input; `has_post_target`
    /// reflects the input sequence, not the retained subset.
    #[must_use]
    pub fn apply(self, items: &[ContextItem], t_target: i64) -> GatedContext {
        let has_post_target = items.iter().any(|item| item.timestamp > t_target);
        let items = match self {
            Self::Strict => items
                .iter()
                .filter(|item| item.timestamp <= t_target)
                .cloned()
                .collect(),
            Self::None => items.to_vec(),
        };
        GatedContext {
            items,
            policy: self,
            boundary: t_target,
            has_post_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(doc_id: &str, timestamp: i64) -> ContextItem {
        ContextItem {
            doc_id: doc_id.to_string(),
            content_hash: "0".repeat(64),
            timestamp,
            source_id: "src".to_string(),
        }
    }

    #[test]
    fn strict_excludes_post_target_and_preserves_order() {
        let items = vec![item("a", 2024), item("b", 2025), item("c", 2026)];
        let gated = GatePolicy::Strict.apply(&items, 2025);

        let kept: Vec<_> = gated.items.iter().map(|i| i.doc_id.as_str()).collect();
        assert_eq!(kept, vec!["a", "b"]);
        assert!(gated.has_post_target);
        assert_eq!(gated.boundary, 2025);
    }

    #[test]
    fn strict_keeps_boundary_timestamp() {
        let items = vec![item("a", 2025)];
        let gated = GatePolicy::Strict.apply(&items, 2025);
        assert_eq!(gated.items.len(), 1);
        assert!(!gated.has_post_target);
    }

    #[test]
    fn none_keeps_everything_but_still_observes() {
        let items = vec![item("a", 2024), item("b", 2026)];
        let gated = GatePolicy::None.apply(&items, 2025);
        assert_eq!(gated.items.len(), 2);
        assert!(gated.has_post_target);
    }

    #[test]
    fn input_is_not_mutated() {
        let items = vec![item("a", 2026)];
        let _ = GatePolicy::Strict.apply(&items, 2020);
        assert_eq!(items[0].timestamp, 2026);
    }

    #[test]
    fn policy_identifiers_round_trip() {
        assert_eq!(GatePolicy::parse("strict"), Some(GatePolicy::Strict));
        assert_eq!(GatePolicy::parse("none"), Some(GatePolicy::None));
        assert_eq!(GatePolicy::parse(""), Some(GatePolicy::None));
        assert_eq!(GatePolicy::parse("open"), None);
        assert_eq!(GatePolicy::Strict.as_str(), "strict");
    }
}
