//! Keyed enter/update/exit reconciliation of rendered elements.
//!
//! Redrawing a layer with a new data set must not rebuild it from scratch:
//! elements whose key disappears are destroyed, elements whose key survives
//! are updated in place and keep their drawing order, and new keys are
//! created after the existing elements.

use fnv::{FnvHashMap, FnvHashSet};
use log::debug;

/// Receives the side effects of a reconciliation.
pub trait LayerSink<T> {
    fn create(&mut self, key: &str, item: &T);
    fn update(&mut self, key: &str, item: &T);
    fn destroy(&mut self, key: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub retained: Vec<String>,
}

impl KeyDiff {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Applies the difference between `previous` keys and the keys of `next` to
/// `sink`. When `next` holds duplicate keys only the first item is used.
pub fn reconcile<'a, T, S>(
    previous: impl IntoIterator<Item = &'a str>,
    next: &[T],
    key: impl Fn(&T) -> String,
    sink: &mut S,
) -> KeyDiff
where
    S: LayerSink<T>,
{
    let previous: FnvHashSet<&str> = previous.into_iter().collect();
    let mut next_by_key: FnvHashMap<String, &T> = FnvHashMap::default();
    let mut next_keys: Vec<String> = Vec::with_capacity(next.len());
    for item in next {
        let k = key(item);
        if next_by_key.contains_key(&k) {
            debug!("Ignoring duplicate element key {}", k);
            continue;
        }
        next_by_key.insert(k.clone(), item);
        next_keys.push(k);
    }

    let mut diff = KeyDiff::default();
    let mut removed: Vec<&str> = previous
        .iter()
        .filter(|k| !next_by_key.contains_key(**k))
        .copied()
        .collect();
    removed.sort_unstable();
    for k in removed {
        sink.destroy(k);
        diff.removed.push(k.to_string());
    }
    for k in next_keys {
        let item = next_by_key[&k];
        if previous.contains(k.as_str()) {
            sink.update(&k, item);
            diff.retained.push(k);
        } else {
            sink.create(&k, item);
            diff.added.push(k);
        }
    }
    diff
}

/// An ordered set of keyed elements that renders through [`reconcile`].
#[derive(Debug, Clone)]
pub struct KeyedLayer<E> {
    order: Vec<String>,
    elements: FnvHashMap<String, E>,
}

impl<E> Default for KeyedLayer<E> {
    fn default() -> Self {
        KeyedLayer {
            order: Vec::new(),
            elements: FnvHashMap::default(),
        }
    }
}

impl<E> KeyedLayer<E> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&E> {
        self.elements.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Elements in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> + '_ {
        self.order
            .iter()
            .filter_map(move |k| self.elements.get(k).map(|e| (k.as_str(), e)))
    }

    /// Reconciles the layer against `next`, building elements with `build`.
    pub fn update_from<T>(
        &mut self,
        next: &[T],
        key: impl Fn(&T) -> String,
        build: impl Fn(&T) -> E,
    ) -> KeyDiff {
        let previous: Vec<String> = self.order.clone();
        let mut sink = LayerUpdate {
            layer: self,
            build: &build,
        };
        let diff = reconcile(previous.iter().map(String::as_str), next, key, &mut sink);
        debug!(
            "Layer reconciled: {} added, {} updated, {} removed",
            diff.added.len(),
            diff.retained.len(),
            diff.removed.len()
        );
        diff
    }
}

struct LayerUpdate<'a, E, F> {
    layer: &'a mut KeyedLayer<E>,
    build: &'a F,
}

impl<'a, T, E, F> LayerSink<T> for LayerUpdate<'a, E, F>
where
    F: Fn(&T) -> E,
{
    fn create(&mut self, key: &str, item: &T) {
        self.layer.order.push(key.to_string());
        self.layer.elements.insert(key.to_string(), (self.build)(item));
    }

    fn update(&mut self, key: &str, item: &T) {
        if let Some(element) = self.layer.elements.get_mut(key) {
            *element = (self.build)(item);
        }
    }

    fn destroy(&mut self, key: &str) {
        self.layer.elements.remove(key);
        self.layer.order.retain(|k| k != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl LayerSink<(u32, u32)> for Recorder {
        fn create(&mut self, key: &str, item: &(u32, u32)) {
            self.log.push(format!("create {} {}", key, item.1));
        }
        fn update(&mut self, key: &str, item: &(u32, u32)) {
            self.log.push(format!("update {} {}", key, item.1));
        }
        fn destroy(&mut self, key: &str) {
            self.log.push(format!("destroy {}", key));
        }
    }

    fn key(item: &(u32, u32)) -> String {
        item.0.to_string()
    }

    #[rstest]
    fn test_reconcile_side_effects() {
        let mut sink = Recorder::default();
        let diff = reconcile(vec!["1", "2", "3"], &[(2, 20), (4, 40)], key, &mut sink);
        assert_eq!(diff.added, vec!["4"]);
        assert_eq!(diff.removed, vec!["1", "3"]);
        assert_eq!(diff.retained, vec!["2"]);
        assert_eq!(
            sink.log,
            vec!["destroy 1", "destroy 3", "update 2 20", "create 4 40"]
        );
    }

    #[rstest]
    fn test_duplicate_keys_use_first_item() {
        let mut sink = Recorder::default();
        let diff = reconcile(Vec::<&str>::new(), &[(1, 10), (1, 11)], key, &mut sink);
        assert_eq!(diff.added, vec!["1"]);
        assert_eq!(sink.log, vec!["create 1 10"]);
    }

    #[rstest]
    fn test_keyed_layer_keeps_retained_order() {
        let mut layer: KeyedLayer<u32> = KeyedLayer::default();
        layer.update_from(&[(1, 10), (2, 20), (3, 30)], key, |i| i.1);
        let diff = layer.update_from(&[(4, 40), (3, 31), (1, 11)], key, |i| i.1);
        assert_eq!(diff.removed, vec!["2"]);
        let drawn: Vec<(&str, u32)> = layer.iter().map(|(k, e)| (k, *e)).collect();
        assert_eq!(drawn, vec![("1", 11), ("3", 31), ("4", 40)]);
    }

    #[rstest]
    fn test_same_data_is_noop() {
        let mut layer: KeyedLayer<u32> = KeyedLayer::default();
        let data = [(1, 10), (2, 20)];
        layer.update_from(&data, key, |i| i.1);
        let diff = layer.update_from(&data, key, |i| i.1);
        assert!(diff.is_noop());
        assert_eq!(diff.retained.len(), 2);
        assert_eq!(layer.len(), 2);
    }

    #[rstest]
    fn test_empty_next_clears_layer() {
        let mut layer: KeyedLayer<u32> = KeyedLayer::default();
        layer.update_from(&[(1, 10)], key, |i| i.1);
        layer.update_from(&[], key, |i: &(u32, u32)| i.1);
        assert!(layer.is_empty());
        assert_eq!(layer.get("1"), None);
    }
}
