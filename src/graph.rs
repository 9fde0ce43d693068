use crate::room::{Room, RoomId};

use petgraph::{
    algo::connected_components,
    graph::{Graph, NodeIndex},
    visit::EdgeRef,
};

/// Directed graph over main rooms. Each node holds its room's ID and each edge holds the
/// squared center distance between its endpoints. An edge runs from the room that comes first
/// in sampler order to the later one, and no reverse edge is stored.
pub type RoomGraph = Graph<RoomId, f32>;

/// Builds the relative neighborhood graph of `main_rooms`.
///
/// Rooms `a` and `b` are joined unless some third room `c` is strictly closer to both of them
/// than they are to each other. Distances are squared center distances. This is O(n^3), which
/// is fine for the handful of main rooms a dungeon has.
pub fn relative_neighborhood_graph(main_rooms: &[&Room]) -> RoomGraph {
    let mut graph = RoomGraph::new();
    let nodes: Vec<NodeIndex> = main_rooms.iter().map(|r| graph.add_node(r.id)).collect();

    let dist = |i: usize, j: usize| main_rooms[i].rect.center_distance_sq(&main_rooms[j].rect);

    let num_rooms = main_rooms.len();
    for i in 0..num_rooms {
        for j in i + 1..num_rooms {
            let ab_dist = dist(i, j);
            let shadowed = (0..num_rooms)
                .filter(|k| *k != i && *k != j)
                .any(|k| dist(i, k) < ab_dist && dist(j, k) < ab_dist);

            if !shadowed {
                graph.add_edge(nodes[i], nodes[j], ab_dist);
            }
        }
    }

    graph
}

/// Edges as `(from, to)` room pairs, in the order they were added.
pub fn room_edges(graph: &RoomGraph) -> Vec<(RoomId, RoomId)> {
    graph
        .edge_references()
        .map(|e| (graph[e.source()], graph[e.target()]))
        .collect()
}

/// True iff every node is reachable from every other, ignoring edge direction.
pub fn is_connected(graph: &RoomGraph) -> bool {
    graph.node_count() == 0 || connected_components(graph) == 1
}
