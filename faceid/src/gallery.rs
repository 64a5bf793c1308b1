use std::fmt;

/// One enrolled person.
#[derive(Clone)]
pub struct Identity {
    /// Stable identifier, also the storage directory name (`"{name}_{surname}"`).
    pub id: String,

    /// Display name as persisted in `info.json`.
    pub name: String,

    /// Opaque metadata; 0 when absent from the record.
    pub age: u32,

    /// Opaque metadata; `"Unknown"` when absent from the record.
    pub gender: String,

    /// One embedding per stored image with a detectable face,
    /// in image sequence order. Never empty for a loaded identity.
    pub embeddings: Vec<Vec<f32>>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("age", &self.age)
            .field("gender", &self.gender)
            .field("embeddings", &self.embeddings.len())
            .finish()
    }
}

/// Immutable snapshot of every enrolled identity, in stable load order.
///
/// A gallery is a value: enrollment never mutates an existing gallery,
/// it produces a new one that the orchestrator swaps in wholesale. Matching
/// against an old snapshot while a new one is being built is always safe.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    identities: Vec<Identity>,
}

impl Gallery {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }

    /// Identities in stable order (sorted by directory name at load time).
    /// This order is the tie-break order for matching.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.identities.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Identity> {
        self.identities.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
