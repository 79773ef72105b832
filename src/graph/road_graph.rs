//! Immutable road network stored as a dense arena of nodes and edges.

use fxhash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{GraphBuildError, Result, RoutingError};

/// External node identifier (e.g. an OpenStreetMap node id).
pub type NodeId = u64;

/// Identifies one edge of a [`RoadGraph`].
///
/// Parallel edges between the same pair of nodes have distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// A road network node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl Node {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            lat,
            lon,
            elevation: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// Edge record as supplied by the road-network loader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeSpec {
    pub source: NodeId,
    pub target: NodeId,
    /// Length in metres.
    pub length: f64,
    /// Travel time in seconds.
    pub travel_time: f64,
    /// Free-flow speed in km/h.
    pub speed_kph: f64,
}

impl EdgeSpec {
    /// Creates an edge whose travel time is derived from length and speed.
    pub fn new(source: NodeId, target: NodeId, length: f64, speed_kph: f64) -> Self {
        let travel_time = if speed_kph > 0.0 {
            length / (speed_kph / 3.6)
        } else {
            f64::INFINITY
        };
        Self {
            source,
            target,
            length,
            travel_time,
            speed_kph,
        }
    }

    pub fn with_travel_time(mut self, seconds: f64) -> Self {
        self.travel_time = seconds;
        self
    }
}

/// A directed edge inside a built [`RoadGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    key: usize,
    length: f64,
    travel_time: f64,
    speed_kph: f64,
    grade: f64,
}

impl Edge {
    /// Dense index of the source node.
    pub fn source_index(&self) -> usize {
        self.source
    }

    /// Dense index of the target node.
    pub fn target_index(&self) -> usize {
        self.target
    }

    /// Position of this edge among the parallel edges sharing its endpoints.
    pub fn key(&self) -> usize {
        self.key
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn travel_time(&self) -> f64 {
        self.travel_time
    }

    pub fn speed_kph(&self) -> f64 {
        self.speed_kph
    }

    /// Uphill grade in percent. Downhill and flat edges have grade 0.
    pub fn grade(&self) -> f64 {
        self.grade
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Node and edge lists as produced by a road-network source.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSource {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeSpec>,
}

/// A weighted directed multigraph of the road network.
///
/// The graph is read-only once built, so any number of searches may share it
/// across threads.
///
/// # Examples
///
/// ```
/// use eco_routing::graph::{EdgeSpec, Node, RoadGraph};
///
/// let graph = RoadGraph::build(
///     vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.001)],
///     vec![EdgeSpec::new(1, 2, 110.0, 36.0)],
/// )
/// .unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.neighbors(1).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RoadGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<EdgeId>>,
    index: FxHashMap<NodeId, usize>,
}

impl RoadGraph {
    /// Builds a graph, validating ids, endpoints, and edge attributes.
    #[instrument(skip_all, fields(nodes = nodes.len(), edges = edges.len()))]
    pub fn build(
        nodes: Vec<Node>,
        edges: Vec<EdgeSpec>,
    ) -> std::result::Result<Self, GraphBuildError> {
        let mut index = FxHashMap::default();
        index.reserve(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id, i).is_some() {
                return Err(GraphBuildError::DuplicateNode(node.id));
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut built = Vec::with_capacity(edges.len());
        let mut parallel: FxHashMap<(usize, usize), usize> = FxHashMap::default();

        for spec in edges {
            let (source, target) = match (index.get(&spec.source), index.get(&spec.target)) {
                (Some(&s), Some(&t)) => (s, t),
                _ => {
                    return Err(GraphBuildError::DanglingEdge {
                        from: spec.source,
                        to: spec.target,
                    })
                }
            };

            if !(spec.length > 0.0) || !spec.length.is_finite() {
                return Err(GraphBuildError::NonPositiveLength {
                    from: spec.source,
                    to: spec.target,
                    length: spec.length,
                });
            }
            check_attribute(&spec, "travel_time", spec.travel_time)?;
            check_attribute(&spec, "speed_kph", spec.speed_kph)?;

            let grade = match (nodes[source].elevation, nodes[target].elevation) {
                (Some(from), Some(to)) => ((to - from) / spec.length * 100.0).max(0.0),
                _ => 0.0,
            };

            let key = parallel.entry((source, target)).or_insert(0);
            let edge_id = EdgeId(built.len());
            built.push(Edge {
                source,
                target,
                key: *key,
                length: spec.length,
                travel_time: spec.travel_time,
                speed_kph: spec.speed_kph,
                grade,
            });
            *key += 1;
            adjacency[source].push(edge_id);
        }

        debug!(
            nodes = nodes.len(),
            edges = built.len(),
            "road graph built"
        );

        Ok(Self {
            nodes,
            edges: built,
            adjacency,
            index,
        })
    }

    /// Parses a `{ "nodes": [...], "edges": [...] }` JSON document and builds the graph.
    pub fn from_json(json: &str) -> Result<Self> {
        let source: GraphSource = serde_json::from_str(json)?;
        Ok(Self::build(source.nodes, source.edges)?)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Looks up a node by its external id.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Outgoing edges of `id` as `(edge id, target node id)` pairs.
    pub fn neighbors(&self, id: NodeId) -> Result<Vec<(EdgeId, NodeId)>> {
        let i = self.index_of(id)?;
        Ok(self.adjacency[i]
            .iter()
            .map(|&e| (e, self.nodes[self.edges[e.0].target].id))
            .collect())
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(RoutingError::UnknownNode(id))
    }

    pub(crate) fn node_id_at(&self, index: usize) -> NodeId {
        self.nodes[index].id
    }

    pub(crate) fn out_edges(&self, index: usize) -> &[EdgeId] {
        &self.adjacency[index]
    }
}

fn check_attribute(
    spec: &EdgeSpec,
    attribute: &'static str,
    value: f64,
) -> std::result::Result<(), GraphBuildError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GraphBuildError::InvalidAttribute {
            from: spec.source,
            to: spec.target,
            attribute,
            value,
        })
    }
}
