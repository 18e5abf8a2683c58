use std::{collections::HashMap, sync::Arc};

use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use shared::domain::{EntityId, WireColor, WireId, WireLetter};
use tracing::{debug, warn};

use crate::{
    action::{ActionCatalog, WireAction, DUMMY_ACTION_ID},
    error::{Result, WiresError},
    wire::Wire,
};

/// Declarative layout, usually loaded from a `[[layout]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayoutPrototype {
    pub id: String,
    /// Source of `wires` (and `dummy_wires`, when this layout has none) if
    /// this layout declares no wires of its own. Only one level is followed.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub wires: Option<Vec<String>>,
    #[serde(default)]
    pub dummy_wires: usize,
}

impl LayoutPrototype {
    fn declares_wires(&self) -> bool {
        self.wires.as_ref().is_some_and(|wires| !wires.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct PrototypeFile {
    #[serde(default, rename = "layout")]
    layouts: Vec<LayoutPrototype>,
}

/// Action ids and padding a layout id expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub actions: Vec<String>,
    pub dummy_wires: usize,
}

impl ResolvedLayout {
    pub fn total_wires(&self) -> usize {
        self.actions.len() + self.dummy_wires
    }
}

#[derive(Debug, Default, Clone)]
pub struct LayoutPrototypes {
    by_id: HashMap<String, LayoutPrototype>,
}

impl LayoutPrototypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: PrototypeFile = toml::from_str(raw)?;
        let mut prototypes = Self::new();
        for prototype in file.layouts {
            prototypes.insert(prototype)?;
        }
        Ok(prototypes)
    }

    pub fn insert(&mut self, prototype: LayoutPrototype) -> Result<()> {
        if self.by_id.contains_key(&prototype.id) {
            return Err(WiresError::DuplicateLayout(prototype.id));
        }
        self.by_id.insert(prototype.id.clone(), prototype);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&LayoutPrototype> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn resolve(&self, id: &str) -> Result<ResolvedLayout> {
        let prototype = self
            .get(id)
            .ok_or_else(|| WiresError::UnknownLayout(id.to_string()))?;

        if prototype.declares_wires() {
            return Ok(ResolvedLayout {
                actions: prototype.wires.clone().unwrap_or_default(),
                dummy_wires: prototype.dummy_wires,
            });
        }

        let parent = match prototype.parent.as_deref().map(|parent| (parent, self.get(parent))) {
            Some((_, Some(parent))) => parent,
            Some((parent, None)) => {
                warn!(layout = id, parent, "layout parent is not defined");
                return Ok(ResolvedLayout {
                    actions: Vec::new(),
                    dummy_wires: prototype.dummy_wires,
                });
            }
            None => {
                return Ok(ResolvedLayout {
                    actions: Vec::new(),
                    dummy_wires: prototype.dummy_wires,
                })
            }
        };

        let dummy_wires = if prototype.dummy_wires > 0 {
            prototype.dummy_wires
        } else {
            parent.dummy_wires
        };

        Ok(ResolvedLayout {
            actions: parent.wires.clone().unwrap_or_default(),
            dummy_wires,
        })
    }
}

/// Position of one assembled entry and its colour and letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSlot {
    /// Index into the assembled list: declared actions first, then dummies.
    pub entry: usize,
    pub color: WireColor,
    pub letter: WireLetter,
}

/// Concrete arrangement remembered for a layout id, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedLayout {
    pub slots: Vec<LayoutSlot>,
}

#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: HashMap<String, CachedLayout>,
}

impl LayoutCache {
    pub fn get(&self, id: &str) -> Option<&CachedLayout> {
        self.layouts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layouts.contains_key(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, layout: CachedLayout) {
        self.layouts.insert(id.into(), layout);
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.layouts.clear();
    }
}

/// Turns layout ids into wire lists, reusing cached arrangements so that
/// machines sharing a layout look and behave alike.
#[derive(Debug, Default)]
pub struct LayoutGenerator {
    prototypes: LayoutPrototypes,
    cache: LayoutCache,
}

impl LayoutGenerator {
    pub fn new(prototypes: LayoutPrototypes) -> Self {
        Self {
            prototypes,
            cache: LayoutCache::default(),
        }
    }

    pub fn prototypes(&self) -> &LayoutPrototypes {
        &self.prototypes
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Builds the ordered wires for `owner`. Configuration problems never
    /// fail: they log and yield an empty list.
    pub fn resolve_layout<R: Rng + ?Sized>(
        &mut self,
        owner: EntityId,
        layout_id: &str,
        always_randomize: bool,
        catalog: &ActionCatalog,
        rng: &mut R,
    ) -> Vec<Wire> {
        let resolved = match self.prototypes.resolve(layout_id) {
            Ok(resolved) => resolved,
            Err(error) => {
                warn!(entity = %owner, layout = layout_id, %error, "no wires for unresolvable layout");
                return Vec::new();
            }
        };

        let entries = assemble_entries(layout_id, &resolved, catalog);
        if entries.is_empty() {
            return Vec::new();
        }

        let cached = if always_randomize {
            None
        } else {
            self.cache
                .get(layout_id)
                .filter(|cached| cached.slots.len() == entries.len())
                .map(|cached| cached.slots.clone())
        };

        let slots = match cached {
            Some(slots) => slots,
            None => {
                let slots = generate_slots(entries.len(), rng);
                if !always_randomize {
                    debug!(layout = layout_id, wires = slots.len(), "caching new layout");
                    self.cache.insert(layout_id, CachedLayout { slots: slots.clone() });
                }
                slots
            }
        };

        build_wires(owner, &entries, &slots, catalog)
    }
}

fn assemble_entries(
    layout_id: &str,
    resolved: &ResolvedLayout,
    catalog: &ActionCatalog,
) -> Vec<(String, Arc<dyn WireAction>)> {
    let mut entries = Vec::with_capacity(resolved.total_wires());

    for action_id in &resolved.actions {
        match catalog.get(action_id) {
            Some(action) => entries.push((action_id.clone(), action)),
            None => {
                warn!(layout = layout_id, action = %action_id, "unknown wire action, using a dummy wire");
                entries.push((DUMMY_ACTION_ID.to_string(), catalog.dummy()));
            }
        }
    }
    for _ in 0..resolved.dummy_wires {
        entries.push((DUMMY_ACTION_ID.to_string(), catalog.dummy()));
    }

    entries
}

/// Draws colours and letters without replacement, then shuffles positions.
fn generate_slots<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<LayoutSlot> {
    let mut colors = WireColor::ALL.to_vec();
    let mut letters = WireLetter::ALL.to_vec();

    let mut slots: Vec<LayoutSlot> = (0..count)
        .map(|entry| LayoutSlot {
            entry,
            color: pick_and_take(&mut colors, rng).unwrap_or(WireColor::SENTINEL),
            letter: pick_and_take(&mut letters, rng).unwrap_or(WireLetter::SENTINEL),
        })
        .collect();

    slots.shuffle(rng);
    slots
}

fn pick_and_take<T, R: Rng + ?Sized>(pool: &mut Vec<T>, rng: &mut R) -> Option<T> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.random_range(0..pool.len());
    Some(pool.swap_remove(index))
}

fn build_wires(
    owner: EntityId,
    entries: &[(String, Arc<dyn WireAction>)],
    slots: &[LayoutSlot],
    catalog: &ActionCatalog,
) -> Vec<Wire> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut wires = Vec::with_capacity(slots.len());

    for (position, slot) in slots.iter().enumerate() {
        let (action_id, action) = &entries[slot.entry];
        let id = WireId(position as u32 + 1);
        let occurrence = occurrences.entry(action_id.as_str()).or_default();
        *occurrence += 1;

        let wire = Wire::new(owner, id, slot.color, slot.letter, action_id.as_str(), Arc::clone(action));
        if action.add_wire(&wire, *occurrence) {
            wires.push(wire);
        } else {
            debug!(entity = %owner, wire = %id, action = %action_id, occurrence = *occurrence, "placement vetoed");
            wires.push(Wire::new(owner, id, slot.color, slot.letter, DUMMY_ACTION_ID, catalog.dummy()));
        }
    }

    wires
}

#[cfg(test)]
#[path = "tests/layout_tests.rs"]
mod tests;
