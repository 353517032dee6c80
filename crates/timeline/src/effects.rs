use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::{Asset, MediaKind, TimelineError};

/// Effect identifier: creation time in UTC milliseconds plus a random suffix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EffectId(pub String);

impl EffectId {
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let nonce = Uuid::new_v4().simple().to_string();
        Self(format!("effect_{}_{}", millis, &nonce[..12]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the source asset taken when a clip is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectDescriptor {
    pub id: EffectId,
    pub name: String,
    pub kind: MediaKind,
    pub locator: String,
}

/// Descriptor contents before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEffect {
    pub name: String,
    pub kind: MediaKind,
    pub locator: String,
}

impl From<&Asset> for NewEffect {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            kind: asset.kind,
            locator: asset.locator.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: BTreeMap<EffectId, EffectDescriptor>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `effect` under a fresh id. Existing entries are never replaced.
    pub fn register(&mut self, effect: NewEffect) -> EffectId {
        loop {
            let id = EffectId::generate();
            if let Entry::Vacant(slot) = self.effects.entry(id.clone()) {
                slot.insert(EffectDescriptor {
                    id: id.clone(),
                    name: effect.name,
                    kind: effect.kind,
                    locator: effect.locator,
                });
                return id;
            }
        }
    }

    pub fn lookup(&self, id: &EffectId) -> Result<&EffectDescriptor, TimelineError> {
        self.effects
            .get(id)
            .ok_or_else(|| TimelineError::EffectNotFound(id.clone()))
    }

    // Only clip removal may drop an effect.
    pub(crate) fn remove(&mut self, id: &EffectId) -> Option<EffectDescriptor> {
        self.effects.remove(id)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects.values()
    }

    pub(crate) fn to_map(&self) -> BTreeMap<EffectId, EffectDescriptor> {
        self.effects.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_effect(name: &str) -> NewEffect {
        NewEffect {
            name: name.to_string(),
            kind: MediaKind::Video,
            locator: format!("file:///media/{}", name),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = EffectRegistry::new();
        let id = registry.register(sample_effect("intro.mp4"));
        let effect = registry.lookup(&id).unwrap();
        assert_eq!(effect.id, id);
        assert_eq!(effect.name, "intro.mp4");
        assert_eq!(effect.locator, "file:///media/intro.mp4");
        assert!(id.as_str().starts_with("effect_"));
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut registry = EffectRegistry::new();
        let ids: HashSet<_> = (0..500)
            .map(|i| registry.register(sample_effect(&format!("{}.mp4", i))))
            .collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(registry.len(), 500);
    }

    #[test]
    fn test_lookup_unknown_is_not_found() {
        let registry = EffectRegistry::new();
        let id = EffectId("effect_0_missing".to_string());
        assert_eq!(
            registry.lookup(&id).unwrap_err(),
            TimelineError::EffectNotFound(id)
        );
    }

    #[test]
    fn test_remove_only_touches_one_entry() {
        let mut registry = EffectRegistry::new();
        let keep = registry.register(sample_effect("a.mp4"));
        let drop = registry.register(sample_effect("b.mp4"));
        assert!(registry.remove(&drop).is_some());
        assert!(registry.lookup(&drop).is_err());
        assert!(registry.lookup(&keep).is_ok());
        assert_eq!(registry.len(), 1);
    }
}
