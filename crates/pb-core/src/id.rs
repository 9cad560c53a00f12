use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide interner behind every `NodeId`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter behind freshly minted IDs. Shared by every prefix so that
/// `button_3` and `card_3` never collide after a rename of the prefix.
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// An opaque, interned identifier for nodes in a project.
/// A 4-byte `Spur` handle: copying, comparing and hashing never touch the string.
///
/// Ordering follows interning order, not string order. It exists so the
/// ID can key ordered graph structures; never sort user-facing output by it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The conventional ID of a project's root node.
    pub fn root() -> Self {
        Self::intern("root")
    }

    /// Mint a fresh ID with a type prefix (e.g. `button_12`).
    ///
    /// Skips candidates that are already interned, so an ID loaded from a
    /// persisted project is never handed out a second time.
    pub fn fresh(prefix: &str) -> Self {
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}_{n}");
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("hero_section");
        let b = NodeId::intern("hero_section");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_section");
        assert_eq!(a.to_string(), "hero_section");
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = NodeId::fresh("button");
        let b = NodeId::fresh("button");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("button_"));
    }

    #[test]
    fn fresh_skips_already_interned_names() {
        // Pre-intern the next few candidates as if they came from a saved project.
        let next = COUNTER.load(Ordering::Relaxed);
        for n in next..next + 3 {
            NodeId::intern(&format!("image_{n}"));
        }
        let minted = NodeId::fresh("image");
        let suffix: u64 = minted.as_str()["image_".len()..].parse().unwrap();
        assert!(suffix >= next + 3);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = NodeId::intern("card_7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"card_7\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
