//! Local entity store: insertion-ordered collections plus the catalog that
//! enforces cross-entity invariants on every apply.

use indexmap::IndexMap;

use crate::state::model::{Competition, Criterion, EntityId, Keyed, Prompt, PromptKind};

/// Insertion-ordered collection of one entity kind, keyed by server id.
///
/// Mutations are pure and infallible; all fallibility lives in the remote
/// adapter that produces the entities folded in here.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: IndexMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: Keyed> Collection<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity with the given id, if present.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.get(&id)
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Replace-by-id, or append when the id is unseen.
    pub fn upsert(&mut self, item: T) {
        self.items.insert(item.key(), item);
    }

    /// Remove the entity with the given id, returning it when present.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.items.shift_remove(&id)
    }

    /// Replace the whole collection with a server-provided list.
    pub fn set_all(&mut self, items: Vec<T>) {
        self.items = items.into_iter().map(|item| (item.key(), item)).collect();
    }

    /// Number of entities held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection holds no entities.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First entity in insertion order.
    pub fn first(&self) -> Option<&T> {
        self.items.values().next()
    }

    /// Whether an entity with the given id is present.
    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }
}

/// The three server-owned configuration collections.
///
/// Prompts are only mutable through [`Catalog::apply_prompt`] and friends so
/// the one-enabled-per-kind invariant cannot be bypassed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    competitions: Collection<Competition>,
    criteria: Collection<Criterion>,
    prompts: Collection<Prompt>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Competitions, read-only.
    pub fn competitions(&self) -> &Collection<Competition> {
        &self.competitions
    }

    /// Competitions, mutable. No cross-entity invariant applies.
    pub fn competitions_mut(&mut self) -> &mut Collection<Competition> {
        &mut self.competitions
    }

    /// Criteria, read-only.
    pub fn criteria(&self) -> &Collection<Criterion> {
        &self.criteria
    }

    /// Criteria, mutable. No cross-entity invariant applies.
    pub fn criteria_mut(&mut self) -> &mut Collection<Criterion> {
        &mut self.criteria
    }

    /// Prompts, read-only.
    pub fn prompts(&self) -> &Collection<Prompt> {
        &self.prompts
    }

    /// Upsert a prompt, predicting the server's sibling rule locally.
    ///
    /// When the incoming prompt is enabled, every other prompt of the same
    /// kind is disabled in the same synchronous mutation, so two enabled
    /// prompts of one kind are never observable, even transiently.
    pub fn apply_prompt(&mut self, prompt: Prompt) {
        if prompt.enabled {
            for other in self.prompts.items.values_mut() {
                if other.kind == prompt.kind && other.id != prompt.id {
                    other.enabled = false;
                }
            }
        }
        self.prompts.upsert(prompt);
    }

    /// Remove a prompt after the server confirmed its deletion.
    pub fn remove_prompt(&mut self, id: EntityId) -> Option<Prompt> {
        self.prompts.remove(id)
    }

    /// Replace the prompt list with a server-provided one verbatim.
    pub fn set_prompts(&mut self, prompts: Vec<Prompt>) {
        self.prompts.set_all(prompts);
    }

    /// Number of enabled prompts of the given kind.
    pub fn enabled_prompts_of(&self, kind: PromptKind) -> usize {
        self.prompts
            .iter()
            .filter(|p| p.kind == kind && p.enabled)
            .count()
    }

    /// Whether at least one criterion is enabled.
    pub fn has_enabled_criterion(&self) -> bool {
        self.criteria.iter().any(|c| c.enabled)
    }
}
