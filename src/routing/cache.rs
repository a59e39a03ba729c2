//! Memoization of visibility graphs keyed by obstacle geometry

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::types::Obstacle;
use super::visibility::OrthogonalVisibilityGraph;

/// Fingerprint of an obstacle set: `id:x,y,w,h` per obstacle, sorted by id, joined by `|`.
///
/// Independent of input order, sensitive to any geometry change.
pub fn cache_key(obstacles: &[Obstacle]) -> String {
    let mut sorted: Vec<&Obstacle> = obstacles.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    sorted
        .iter()
        .map(|o| format!("{}:{},{},{},{}", o.id, o.x, o.y, o.width, o.height))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    graph: OrthogonalVisibilityGraph,
    inserted_at: Instant,
}

/// Time- and size-bounded store of built graphs
#[derive(Debug, Clone)]
pub struct GraphCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 10)
    }
}

impl GraphCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
        }
    }

    /// A copy of the cached graph for `key`, if present and fresh
    pub fn get(&mut self, key: &str) -> Option<OrthogonalVisibilityGraph> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<OrthogonalVisibilityGraph> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) > self.ttl {
            tracing::debug!(key, "visibility graph cache entry expired");
            self.entries.remove(key);
            return None;
        }
        Some(entry.graph.clone())
    }

    /// Store a graph, evicting the oldest entry when full
    pub fn insert(&mut self, key: String, graph: OrthogonalVisibilityGraph) {
        self.insert_at(key, graph, Instant::now());
    }

    pub(crate) fn insert_at(
        &mut self,
        key: String,
        graph: OrthogonalVisibilityGraph,
        now: Instant,
    ) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = %oldest, "evicting visibility graph cache entry");
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                graph,
                inserted_at: now,
            },
        );
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::types::Point;

    fn graph_with_nodes(n: usize) -> OrthogonalVisibilityGraph {
        let mut graph = OrthogonalVisibilityGraph::new();
        for i in 0..n {
            graph.add_node(Point::new(i as f64, 0.0));
        }
        graph
    }

    #[test]
    fn test_key_ignores_input_order() {
        let a = Obstacle::new("a", 0.0, 0.0, 10.0, 10.0);
        let b = Obstacle::new("b", 20.0, 0.0, 10.0, 5.0);
        let key = cache_key(&[a.clone(), b.clone()]);
        assert_eq!(key, cache_key(&[b, a]));
        assert_eq!(key, "a:0,0,10,10|b:20,0,10,5");
    }

    #[test]
    fn test_key_tracks_geometry() {
        let a = Obstacle::new("a", 0.0, 0.0, 10.0, 10.0);
        let moved = Obstacle::new("a", 1.0, 0.0, 10.0, 10.0);
        assert_ne!(cache_key(&[a]), cache_key(&[moved]));
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = GraphCache::new(Duration::from_secs(5), 10);
        let now = Instant::now();
        cache.insert_at("k".to_string(), graph_with_nodes(3), now);
        let hit = cache.get_at("k", now + Duration::from_secs(4)).unwrap();
        assert_eq!(hit.node_count(), 3);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let mut cache = GraphCache::new(Duration::from_secs(5), 10);
        let now = Instant::now();
        cache.insert_at("k".to_string(), graph_with_nodes(3), now);
        assert!(cache.get_at("k", now + Duration::from_secs(6)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_entry_evicted() {
        let mut cache = GraphCache::new(Duration::from_secs(5), 2);
        let now = Instant::now();
        cache.insert_at("first".to_string(), graph_with_nodes(1), now);
        cache.insert_at("second".to_string(), graph_with_nodes(2), now + Duration::from_millis(1));
        cache.insert_at("third".to_string(), graph_with_nodes(3), now + Duration::from_millis(2));
        assert_eq!(cache.len(), 2);
        assert!(cache.get_at("first", now).is_none());
        assert!(cache.get_at("third", now).is_some());
    }

    #[test]
    fn test_returned_graph_is_a_copy() {
        let mut cache = GraphCache::default();
        cache.insert("k".to_string(), graph_with_nodes(2));
        let mut copy = cache.get("k").unwrap();
        copy.add_node(Point::new(100.0, 100.0));
        assert_eq!(cache.get("k").unwrap().node_count(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cache = GraphCache::default();
        cache.insert("k".to_string(), graph_with_nodes(1));
        cache.clear();
        assert!(cache.get("k").is_none());
    }
}
