use crate::state::storage::KeyValueStore;
use log::{debug, warn};
use torikumi_api::{Predictions, Side, TorikumiData};

const STORAGE_PREFIX: &str = "predictions";

/// Scope of one stored prediction mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionKey {
    pub basho_id: String,
    pub day: u8,
    pub division: String,
}

impl PredictionKey {
    pub fn new(basho_id: impl Into<String>, day: u8, division: impl Into<String>) -> Self {
        Self { basho_id: basho_id.into(), day, division: division.into() }
    }

    pub fn for_day(data: &TorikumiData) -> Self {
        Self::new(data.basho.id.clone(), data.day, data.division.clone())
    }

    /// `predictions:{basho}:{day}:{division}` with `%` and `:` escaped in the
    /// free-form parts so distinct keys never collide.
    pub fn storage_key(&self) -> String {
        format!(
            "{STORAGE_PREFIX}:{}:{}:{}",
            escape_component(&self.basho_id),
            self.day,
            escape_component(&self.division)
        )
    }
}

fn escape_component(part: &str) -> String {
    part.replace('%', "%25").replace(':', "%3A")
}

/// Persists prediction mappings into a key-value backend.
#[derive(Debug)]
pub struct PredictionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PredictionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Stored mapping for `key`; empty when nothing usable is stored.
    pub fn load(&self, key: &PredictionKey) -> Predictions {
        if key.basho_id.is_empty() {
            return Predictions::new();
        }
        let storage_key = key.storage_key();
        let Some(raw) = self.backend.get(&storage_key) else {
            return Predictions::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("discarding unreadable predictions at {storage_key}: {e}");
            Predictions::new()
        })
    }

    /// Overwrite the stored mapping. Skipped until a real basho is selected.
    pub fn save(&mut self, key: &PredictionKey, predictions: &Predictions) {
        if key.basho_id.is_empty() {
            return;
        }
        match serde_json::to_string(predictions) {
            Ok(payload) => self.backend.set(&key.storage_key(), &payload),
            Err(e) => warn!("failed to serialize predictions: {e}"),
        }
    }

    pub fn clear(&mut self, key: &PredictionKey) {
        self.backend.remove(&key.storage_key());
    }
}

/// The mapping for the day currently on screen, backed by a store.
#[derive(Debug)]
pub struct PredictionSession<S> {
    store: PredictionStore<S>,
    key: PredictionKey,
    predictions: Predictions,
}

impl<S: KeyValueStore> PredictionSession<S> {
    pub fn new(backend: S) -> Self {
        Self {
            store: PredictionStore::new(backend),
            key: PredictionKey::default(),
            predictions: Predictions::new(),
        }
    }

    pub fn key(&self) -> &PredictionKey {
        &self.key
    }

    pub fn predictions(&self) -> &Predictions {
        &self.predictions
    }

    #[cfg(test)]
    pub fn store(&self) -> &PredictionStore<S> {
        &self.store
    }

    /// Switch to `key`, replacing the whole mapping with what is stored for it.
    /// Re-selecting the active key keeps the in-memory mapping.
    pub fn select(&mut self, key: PredictionKey) {
        if key == self.key {
            return;
        }
        self.predictions = self.store.load(&key);
        debug!(
            "loaded {} predictions for {}",
            self.predictions.len(),
            key.storage_key()
        );
        self.key = key;
    }

    /// Record a pick; persisted whenever the mapping actually changes.
    pub fn set_prediction(&mut self, index: usize, value: Option<Side>) -> bool {
        let next = self.predictions.with(index, value);
        if next == self.predictions {
            return false;
        }
        self.predictions = next;
        self.store.save(&self.key, &self.predictions);
        true
    }

    /// Flip the predicted winner of one bout, starting from the displayed default.
    pub fn toggle(&mut self, index: usize) -> bool {
        let side = self.predictions.winner_or_default(index).opposite();
        self.set_prediction(index, Some(side))
    }

    /// Forget every pick for the active key, in memory and in storage.
    pub fn clear_all(&mut self) {
        self.predictions = Predictions::new();
        self.store.clear(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::MemoryStore;

    fn key(basho: &str, day: u8, division: &str) -> PredictionKey {
        PredictionKey::new(basho, day, division)
    }

    fn picks(entries: &[(usize, Option<Side>)]) -> Predictions {
        entries.iter().copied().collect()
    }

    #[test]
    fn storage_key_layout() {
        assert_eq!(key("202501", 1, "makuuchi").storage_key(), "predictions:202501:1:makuuchi");
    }

    #[test]
    fn separators_inside_components_are_escaped() {
        let a = key("a:1", 2, "b");
        let b = key("a", 1, "2:b");
        assert_ne!(a.storage_key(), b.storage_key());
        assert_eq!(a.storage_key(), "predictions:a%3A1:2:b");
        assert_eq!(key("50%", 1, "x").storage_key(), "predictions:50%25:1:x");
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = PredictionStore::new(MemoryStore::new());
        let k = key("202501", 1, "makuuchi");
        let m = picks(&[(0, Some(Side::East)), (1, Some(Side::West)), (2, None)]);
        store.save(&k, &m);
        assert_eq!(store.load(&k), m);
        assert_eq!(
            store.backend().get("predictions:202501:1:makuuchi").as_deref(),
            Some(r#"{"0":"E","1":"W","2":null}"#)
        );
    }

    #[test]
    fn empty_basho_id_never_writes() {
        let mut store = PredictionStore::new(MemoryStore::new());
        store.save(&key("", 1, "makuuchi"), &picks(&[(0, Some(Side::East))]));
        assert_eq!(store.backend().get("predictions::1:makuuchi"), None);
        assert_eq!(store.backend().len(), 0);
        assert!(store.load(&key("", 1, "makuuchi")).is_empty());
    }

    #[test]
    fn missing_and_corrupt_values_load_empty() {
        let mut backend = MemoryStore::new();
        backend.set("predictions:202501:2:makuuchi", "{invalid json}");
        backend.set("predictions:202501:3:makuuchi", r#"["E","W"]"#);
        let store = PredictionStore::new(backend);
        assert!(store.load(&key("202501", 1, "makuuchi")).is_empty());
        assert!(store.load(&key("202501", 2, "makuuchi")).is_empty());
        assert!(store.load(&key("202501", 3, "makuuchi")).is_empty());
    }

    #[test]
    fn clear_removes_the_value() {
        let mut store = PredictionStore::new(MemoryStore::new());
        let k = key("202501", 1, "makuuchi");
        store.save(&k, &picks(&[(0, Some(Side::East))]));
        assert!(store.backend().get(&k.storage_key()).is_some());
        store.clear(&k);
        assert_eq!(store.backend().get(&k.storage_key()), None);
        store.clear(&key("", 1, "makuuchi"));
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let mut store = PredictionStore::new(MemoryStore::new());
        store.save(&key("202501", 1, "makuuchi"), &picks(&[(0, Some(Side::East))]));
        store.save(&key("202501", 2, "makuuchi"), &picks(&[(0, Some(Side::West))]));
        store.save(&key("202503", 1, "juryo"), &picks(&[(0, None)]));

        assert_eq!(store.load(&key("202501", 1, "makuuchi")), picks(&[(0, Some(Side::East))]));
        assert_eq!(store.load(&key("202501", 2, "makuuchi")), picks(&[(0, Some(Side::West))]));
        assert_eq!(store.load(&key("202503", 1, "juryo")), picks(&[(0, None)]));
        assert!(store.load(&key("202503", 1, "makuuchi")).is_empty());
        assert!(store.load(&key("202501", 1, "juryo")).is_empty());
    }

    #[test]
    fn session_persists_every_change() {
        let mut session = PredictionSession::new(MemoryStore::new());
        session.select(key("202601", 12, "makuuchi"));
        assert!(session.set_prediction(3, Some(Side::West)));
        assert!(!session.set_prediction(3, Some(Side::West)));

        let stored = session.store().load(session.key());
        assert_eq!(stored.get(3), Some(Side::West));
    }

    #[test]
    fn session_reseeds_on_key_change() {
        let mut backend = MemoryStore::new();
        backend.set("predictions:202601:2:makuuchi", r#"{"1":"W"}"#);
        let mut session = PredictionSession::new(backend);

        session.select(key("202601", 1, "makuuchi"));
        session.set_prediction(0, Some(Side::West));

        session.select(key("202601", 2, "makuuchi"));
        assert_eq!(session.predictions(), &picks(&[(1, Some(Side::West))]));

        session.select(key("202601", 1, "makuuchi"));
        assert_eq!(session.predictions(), &picks(&[(0, Some(Side::West))]));
    }

    #[test]
    fn toggle_flips_from_default_east() {
        let mut session = PredictionSession::new(MemoryStore::new());
        session.select(key("202601", 1, "makuuchi"));
        session.toggle(0);
        assert_eq!(session.predictions().get(0), Some(Side::West));
        session.toggle(0);
        assert_eq!(session.predictions().get(0), Some(Side::East));
    }

    #[test]
    fn clear_all_empties_memory_and_storage() {
        let mut session = PredictionSession::new(MemoryStore::new());
        session.select(key("202601", 1, "makuuchi"));
        session.set_prediction(0, Some(Side::West));
        session.clear_all();
        assert!(session.predictions().is_empty());
        assert_eq!(session.store().backend().len(), 0);
    }
}
