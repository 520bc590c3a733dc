//! Static capability registry.
//!
//! Describes every remote capability the orchestrator knows about:
//! name, kind, credential location and expected key format, and
//! priority among same-kind capabilities. The registry also owns the
//! completion fallback order — the single source of truth referenced
//! by both the orchestrator and the task router.

use serde::{Deserialize, Serialize};

/// What a capability can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Completion,
    Search,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityKind::Completion => write!(f, "completion"),
            CapabilityKind::Search => write!(f, "search"),
        }
    }
}

/// Static description of a remote capability. Immutable after process
/// start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub name: &'static str,
    pub kind: CapabilityKind,
    /// Environment variable holding the credential.
    pub api_key_env: &'static str,
    /// Required prefix of a plausible credential for this capability.
    pub key_prefix: &'static str,
    /// Priority among same-kind capabilities (1 = highest).
    pub priority: u8,
}

/// Completion capabilities in fallback priority order, then search.
static REGISTRY: [Capability; 4] = [
    Capability {
        name: "sarvam",
        kind: CapabilityKind::Completion,
        api_key_env: "SARVAM_API_KEY",
        key_prefix: "sk_",
        priority: 1,
    },
    Capability {
        name: "krutrim",
        kind: CapabilityKind::Completion,
        api_key_env: "KRUTRIM_API_KEY",
        key_prefix: "kt-",
        priority: 2,
    },
    Capability {
        name: "openai",
        kind: CapabilityKind::Completion,
        api_key_env: "OPENAI_API_KEY",
        key_prefix: "sk-",
        priority: 3,
    },
    Capability {
        name: "tavily",
        kind: CapabilityKind::Search,
        api_key_env: "TAVILY_API_KEY",
        key_prefix: "tvly-",
        priority: 1,
    },
];

impl Capability {
    /// All known capabilities.
    pub fn registry() -> &'static [Capability] {
        &REGISTRY
    }

    /// Look up a capability by name.
    pub fn by_name(name: &str) -> Option<&'static Capability> {
        REGISTRY.iter().find(|c| c.name == name)
    }

    /// Completion capabilities in fixed fallback priority order.
    pub fn completion_order() -> Vec<&'static Capability> {
        let mut completions: Vec<&Capability> = REGISTRY
            .iter()
            .filter(|c| c.kind == CapabilityKind::Completion)
            .collect();
        completions.sort_by_key(|c| c.priority);
        completions
    }

    /// The search capability.
    pub fn search_capability() -> &'static Capability {
        REGISTRY
            .iter()
            .find(|c| c.kind == CapabilityKind::Search)
            .expect("registry always contains a search capability")
    }

    /// Read this capability's credential from the environment, if any.
    pub fn credential(&self) -> Option<String> {
        std::env::var(self.api_key_env).ok().filter(|v| !v.is_empty())
    }

    /// Whether the capability is enabled: credential present and
    /// matching the expected key format. Purely local, no network.
    pub fn is_enabled(&self) -> bool {
        self.credential()
            .map(|key| key.starts_with(self.key_prefix))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_order_is_by_priority() {
        let order: Vec<&str> = Capability::completion_order()
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(order, vec!["sarvam", "krutrim", "openai"]);
    }

    #[test]
    fn test_search_capability_is_tavily() {
        let search = Capability::search_capability();
        assert_eq!(search.name, "tavily");
        assert_eq!(search.kind, CapabilityKind::Search);
    }

    #[test]
    fn test_by_name() {
        assert!(Capability::by_name("krutrim").is_some());
        assert!(Capability::by_name("unknown").is_none());
    }

    #[test]
    fn test_enabled_requires_prefix_match() {
        let cap = Capability::by_name("sarvam").unwrap();

        // SAFETY: tests mutate process env; each test uses a distinct var.
        unsafe { std::env::set_var("SARVAM_API_KEY", "wrong-prefix") };
        assert!(!cap.is_enabled());

        unsafe { std::env::set_var("SARVAM_API_KEY", "sk_valid_key") };
        assert!(cap.is_enabled());

        unsafe { std::env::remove_var("SARVAM_API_KEY") };
        assert!(!cap.is_enabled());
    }
}
