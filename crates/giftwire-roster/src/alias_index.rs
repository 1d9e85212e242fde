use std::collections::HashMap;

use tracing::warn;

use giftwire_core::normalize_alias;

use crate::roster_contract::RosterMember;

/// Mapping from normalized alias to roster member.
///
/// Built once per run as an explicit fold over (member, candidate) pairs in
/// roster iteration order then candidate order; the last writer wins on
/// collision. A collision between two distinct members is a latent
/// mis-routing hazard, so it is surfaced as a warning before the overwrite.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: HashMap<String, RosterMember>,
}

impl AliasIndex {
    pub fn build(members: &[RosterMember]) -> Self {
        let mut entries: HashMap<String, RosterMember> = HashMap::new();
        for member in members {
            for candidate in member.alias_candidates() {
                let Some(key) = normalize_alias(candidate) else {
                    continue;
                };
                if let Some(previous) = entries.get(&key) {
                    if previous.user_id != member.user_id {
                        warn!(
                            alias = %key,
                            previous_user_id = %previous.user_id,
                            replacement_user_id = %member.user_id,
                            "alias collision: later roster entry wins"
                        );
                    }
                }
                entries.insert(key, member.clone());
            }
        }
        Self { entries }
    }

    /// Resolves a free-text alias through the same normalizer that built the
    /// index.
    pub fn resolve(&self, alias: &str) -> Option<&RosterMember> {
        let key = normalize_alias(Some(alias))?;
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
