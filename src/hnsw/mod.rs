//! # HNSW Vector Index
//!
//! Hierarchical Navigable Small World graph for approximate
//! nearest-neighbor search. The index is in-memory only: `CREATE INDEX`
//! builds it from the table's current rows, and a restart discards it.
//!
//! ## Structure
//!
//! Nodes are indices into flat arrays — a vector array and a parallel
//! row-id array — never pointers. Each layer is a map from node id to its
//! neighbor list, so the bidirectional edges of the graph are plain index
//! arrays:
//!
//! ```text
//! layer 2:   [E]--------------[B]            few nodes, long hops
//! layer 1:   [E]----[C]-------[B]----[D]
//! layer 0:   [E]-[A]-[C]-[F]--[B]-[G]-[D]    every node
//! ```
//!
//! ## Algorithms
//!
//! - **Insert**: draw a node layer geometrically (`mL = 1 / ln(M)`,
//!   capped at 16 layers), descend greedily from the entry point down to
//!   the insertion layer, then connect bidirectionally to the closest
//!   nodes found by a budgeted layer search (`ef_construction`
//!   candidates). Layer 0 allows `2M` neighbors, higher layers `M`.
//! - **Query**: greedy descent through layers > 0, then a layer search at
//!   layer 0 with budget `ef`, returning the top k by ascending distance.
//!
//! When a neighbor list overflows its cap it is truncated in first-seen
//! order. A quality-preserving implementation would heuristically
//! reselect the closest neighbors instead; expect some recall degradation
//! on dense data.

pub mod distance;

pub use distance::DistanceMetric;

use crate::config::{HNSW_MAX_LAYERS, HNSW_MIN_EF_SEARCH};
use crate::error::Result;
use crate::types::Vector;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type NeighborList = SmallVec<[u32; 16]>;

/// A node with its distance to the current query. Ordering is reversed on
/// distance so `BinaryHeap` pops the closest candidate first.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: u32,
    distance: f64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// One hit from a k-NN query: the row id the vector was inserted under,
/// and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub row_id: usize,
    pub distance: f64,
}

pub struct HnswIndex {
    vectors: Vec<Vector>,
    row_ids: Vec<usize>,
    layers: Vec<HashMap<u32, NeighborList>>,
    entry_point: Option<u32>,
    m: usize,
    ef_construction: usize,
    metric: DistanceMetric,
}

impl HnswIndex {
    pub fn new(m: usize, ef_construction: usize, metric: DistanceMetric) -> Self {
        Self {
            vectors: Vec::new(),
            row_ids: Vec::new(),
            layers: Vec::new(),
            entry_point: None,
            m: m.max(2),
            ef_construction: ef_construction.max(1),
            metric,
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn ef_construction(&self) -> usize {
        self.ef_construction
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Inserts a vector under `row_id`.
    pub fn insert(&mut self, vector: Vector, row_id: usize) -> Result<()> {
        let id = self.vectors.len() as u32;
        let query = vector.clone();
        self.vectors.push(vector);
        self.row_ids.push(row_id);

        let node_layer = self.random_layer();
        while self.layers.len() <= node_layer {
            self.layers.push(HashMap::new());
        }
        for layer in 0..=node_layer {
            self.layers[layer].entry(id).or_default();
        }

        let Some(mut ep) = self.entry_point else {
            self.entry_point = Some(id);
            return Ok(());
        };

        for layer in (node_layer + 1..self.layers.len()).rev() {
            ep = self.closest_in_layer(&query, ep, layer);
        }

        for layer in (0..=node_layer).rev() {
            let candidates = self.search_layer(&query, ep, self.ef_construction, layer);
            self.connect_neighbors(id, &candidates, layer);
            if let Some(first) = candidates.first() {
                ep = first.id;
            }
        }

        Ok(())
    }

    /// k-NN query. `ef` bounds the layer-0 candidate budget; callers
    /// default it to [`default_ef`](Self::default_ef).
    pub fn search(&self, query: &Vector, k: usize, ef: usize) -> Vec<SearchHit> {
        let Some(mut ep) = self.entry_point else {
            return Vec::new();
        };

        for layer in (1..self.layers.len()).rev() {
            ep = self.closest_in_layer(query, ep, layer);
        }

        self.search_layer(query, ep, ef, 0)
            .into_iter()
            .take(k)
            .map(|c| SearchHit {
                row_id: self.row_ids[c.id as usize],
                distance: c.distance,
            })
            .collect()
    }

    /// The default query budget: `max(50, 2k)`.
    pub fn default_ef(k: usize) -> usize {
        HNSW_MIN_EF_SEARCH.max(2 * k)
    }

    /// Geometric layer draw: keep climbing while `rand() < exp(-l / mL)`.
    fn random_layer(&self) -> usize {
        let ml = 1.0 / (self.m as f64).ln();
        let mut layer = 0;
        while layer < HNSW_MAX_LAYERS && rand::random::<f64>() < (-(layer as f64) / ml).exp() {
            layer += 1;
        }
        layer
    }

    /// Greedy hill descent: move to a neighbor only while one is strictly
    /// closer, stop at the local minimum.
    fn closest_in_layer(&self, query: &Vector, ep: u32, layer: usize) -> u32 {
        let Some(graph) = self.layers.get(layer) else {
            return ep;
        };

        let mut closest = ep;
        let mut closest_dist = self.distance_to(query, closest);

        let mut changed = true;
        while changed {
            changed = false;
            let Some(neighbors) = graph.get(&closest) else {
                break;
            };
            for &neighbor in neighbors {
                let Ok(dist) = self.metric.distance(query, &self.vectors[neighbor as usize])
                else {
                    continue;
                };
                if dist < closest_dist {
                    closest = neighbor;
                    closest_dist = dist;
                    changed = true;
                }
            }
        }

        closest
    }

    /// Budgeted best-first search within one layer: pop the closest
    /// unexplored candidate, record it, push its unvisited neighbors.
    /// Terminates after `ef` results or when the frontier drains.
    fn search_layer(&self, query: &Vector, ep: u32, ef: usize, layer: usize) -> Vec<Candidate> {
        let Some(graph) = self.layers.get(layer) else {
            return Vec::new();
        };

        let mut visited: HashSet<u32> = HashSet::new();
        let mut frontier: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut results = Vec::with_capacity(ef);

        frontier.push(Candidate {
            id: ep,
            distance: self.distance_to(query, ep),
        });
        visited.insert(ep);

        while let Some(current) = frontier.pop() {
            if results.len() >= ef {
                break;
            }
            results.push(current);

            let Some(neighbors) = graph.get(&current.id) else {
                continue;
            };
            for &neighbor in neighbors {
                if !visited.insert(neighbor) {
                    continue;
                }
                if let Ok(dist) = self.metric.distance(query, &self.vectors[neighbor as usize]) {
                    frontier.push(Candidate {
                        id: neighbor,
                        distance: dist,
                    });
                }
            }
        }

        results
    }

    /// Connects `id` bidirectionally to up to `m` (or `2m` at layer 0) of
    /// the closest candidates. Overflowing neighbor lists are truncated in
    /// first-seen order.
    fn connect_neighbors(&mut self, id: u32, candidates: &[Candidate], layer: usize) {
        let cap = if layer == 0 { self.m * 2 } else { self.m };
        let graph = &mut self.layers[layer];

        for candidate in candidates.iter().take(cap) {
            graph.entry(id).or_default().push(candidate.id);

            let neighbors = graph.entry(candidate.id).or_default();
            neighbors.push(id);
            if neighbors.len() > cap {
                neighbors.truncate(cap);
            }
        }
    }

    fn distance_to(&self, query: &Vector, id: u32) -> f64 {
        self.metric
            .distance(query, &self.vectors[id as usize])
            .unwrap_or(0.0)
    }
}
