use std::collections::{BTreeMap, HashMap};

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::board::{Corner, CornerId, Edge, EdgeId, Port, PortKind, Tile, TileId};
use crate::coords::{CornerCoord, EdgeCoord, HexCoord};

type CornerIndex = HashMap<CornerCoord, SmallVec<[CornerId; 1]>>;

/// Adjacency derived purely from coordinates.
///
/// Non-authoritative: rebuilt from scratch whenever new primitives arrive.
/// Anything that cannot be resolved simply has no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    pub corner_tiles: HashMap<CornerId, SmallVec<[TileId; 3]>>,
    pub tile_corners: HashMap<TileId, SmallVec<[CornerId; 6]>>,
    pub corner_edges: HashMap<CornerId, SmallVec<[EdgeId; 3]>>,
    pub edge_corners: HashMap<EdgeId, [CornerId; 2]>,
    pub corner_neighbors: HashMap<CornerId, SmallVec<[CornerId; 3]>>,
    pub corner_ports: HashMap<CornerId, PortKind>,
    pub issues: Vec<TopologyIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyIssue {
    #[error("edge {edge} matched {} corners, kept the first two", matches.len())]
    AmbiguousEdge { edge: EdgeId, matches: Vec<CornerId> },
    #[error("edge {edge} matched only {} corners", matches.len())]
    UnresolvedEdge { edge: EdgeId, matches: Vec<CornerId> },
    #[error("port on edge {edge} touches no known corner")]
    UnresolvedPort { edge: EdgeId },
}

impl Topology {
    pub fn build(
        tiles: &BTreeMap<TileId, Tile>,
        corners: &BTreeMap<CornerId, Corner>,
        edges: &BTreeMap<EdgeId, Edge>,
        ports: &BTreeMap<EdgeId, Port>,
    ) -> Self {
        let mut topology = Topology::default();

        let tile_by_coord: HashMap<HexCoord, TileId> = tiles
            .values()
            .filter_map(|tile| tile.coord.map(|coord| (coord, tile.id)))
            .collect();

        let mut corner_index: CornerIndex = HashMap::new();
        for corner in corners.values() {
            let Some(coord) = corner.coord else {
                continue;
            };
            corner_index.entry(coord).or_default().push(corner.id);

            let adjacent: SmallVec<[TileId; 3]> = coord
                .touching_hexes()
                .iter()
                .filter_map(|hex| tile_by_coord.get(hex).copied())
                .collect();
            for tile_id in &adjacent {
                topology
                    .tile_corners
                    .entry(*tile_id)
                    .or_default()
                    .push(corner.id);
            }
            if !adjacent.is_empty() {
                topology.corner_tiles.insert(corner.id, adjacent);
            }
        }

        for edge in edges.values() {
            let Some(coord) = edge.coord else {
                continue;
            };
            let matches = matching_corners(&corner_index, coord);
            if matches.len() < 2 {
                let issue = TopologyIssue::UnresolvedEdge {
                    edge: edge.id,
                    matches,
                };
                debug!(%coord, "{issue}");
                topology.issues.push(issue);
                continue;
            }
            let ends = [matches[0], matches[1]];
            if matches.len() > 2 {
                let issue = TopologyIssue::AmbiguousEdge {
                    edge: edge.id,
                    matches,
                };
                warn!(%coord, "{issue}");
                topology.issues.push(issue);
            }
            topology.edge_corners.insert(edge.id, ends);
        }

        let mut resolved: Vec<(EdgeId, [CornerId; 2])> = topology
            .edge_corners
            .iter()
            .map(|(edge, ends)| (*edge, *ends))
            .collect();
        resolved.sort_unstable();
        for (edge, [a, b]) in resolved {
            topology.corner_edges.entry(a).or_default().push(edge);
            topology.corner_edges.entry(b).or_default().push(edge);
            link(&mut topology.corner_neighbors, a, b);
            link(&mut topology.corner_neighbors, b, a);
        }

        for port in ports.values() {
            let Some(coord) = port.coord else {
                continue;
            };
            let matches = matching_corners(&corner_index, coord);
            if matches.is_empty() {
                let issue = TopologyIssue::UnresolvedPort { edge: port.edge_id };
                debug!(%coord, "{issue}");
                topology.issues.push(issue);
                continue;
            }
            for corner_id in matches.into_iter().take(2) {
                topology.corner_ports.insert(corner_id, port.kind);
            }
        }

        debug!(
            corners = corners.len(),
            tiles = tiles.len(),
            edges = topology.edge_corners.len(),
            issues = topology.issues.len(),
            "topology rebuilt"
        );
        topology
    }

    pub fn tiles_of(&self, corner: CornerId) -> &[TileId] {
        self.corner_tiles.get(&corner).map_or(&[], |v| v.as_slice())
    }

    pub fn corners_of(&self, tile: TileId) -> &[CornerId] {
        self.tile_corners.get(&tile).map_or(&[], |v| v.as_slice())
    }

    pub fn edges_of(&self, corner: CornerId) -> &[EdgeId] {
        self.corner_edges.get(&corner).map_or(&[], |v| v.as_slice())
    }

    pub fn neighbors_of(&self, corner: CornerId) -> &[CornerId] {
        self.corner_neighbors.get(&corner).map_or(&[], |v| v.as_slice())
    }

    pub fn ends_of(&self, edge: EdgeId) -> Option<[CornerId; 2]> {
        self.edge_corners.get(&edge).copied()
    }

    pub fn port_of(&self, corner: CornerId) -> Option<PortKind> {
        self.corner_ports.get(&corner).copied()
    }

    /// The endpoint of `edge` that is not `corner`.
    pub fn other_end(&self, edge: EdgeId, corner: CornerId) -> Option<CornerId> {
        let [a, b] = self.ends_of(edge)?;
        if a == corner {
            Some(b)
        } else if b == corner {
            Some(a)
        } else {
            None
        }
    }
}

/// Corner ids sitting on either endpoint of an edge coordinate, in id order.
fn matching_corners(index: &CornerIndex, coord: EdgeCoord) -> Vec<CornerId> {
    let mut matches: Vec<CornerId> = coord
        .endpoints()
        .iter()
        .filter_map(|end| index.get(end))
        .flatten()
        .copied()
        .collect();
    matches.sort_unstable();
    matches.dedup();
    matches
}

fn link(
    neighbors: &mut HashMap<CornerId, SmallVec<[CornerId; 3]>>,
    from: CornerId,
    to: CornerId,
) {
    let entry = neighbors.entry(from).or_default();
    if from != to && !entry.contains(&to) {
        entry.push(to);
    }
}
