//! Reachability validation and additive repair.
//!
//! With both special spaces active, every listed room must be reachable from
//! `entrance` over `connection` edges, with `path` acting as a circulation
//! hub. The repair is a single pass: every room outside the entrance
//! component gets a direct `path`–room connection. It never removes a
//! constraint and never looks for a "natural" attachment point.

use plancraft_core::{
    GroupedConstraints, RelationEntry, RepairPolicy, RoomId, RoomPair, SpecialSpace,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info};

const PATH: &str = SpecialSpace::Path.as_str();
const ENTRANCE: &str = SpecialSpace::Entrance.as_str();

/// Undirected connection graph over `room_list ∪ {path, entrance}`.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityGraph {
    adjacency: BTreeMap<RoomId, BTreeSet<RoomId>>,
}

impl ReachabilityGraph {
    /// Build the graph for a constraint set. Edges touching rooms outside the
    /// node set are ignored; the `path`–`entrance` edge is always present.
    pub fn from_constraints(constraints: &GroupedConstraints) -> Self {
        let mut graph = Self::default();
        for room in constraints.room_list() {
            graph.add_node(room);
        }
        graph.add_node(PATH);
        graph.add_node(ENTRANCE);
        graph.add_edge(PATH, ENTRANCE);

        for entry in &constraints.soft_constraints.connection.constraints {
            let (a, b) = (entry.room_pair.first(), entry.room_pair.second());
            if graph.contains(a) && graph.contains(b) {
                graph.add_edge(a, b);
            }
        }
        graph
    }

    pub fn add_node(&mut self, node: &str) {
        self.adjacency.entry(node.to_string()).or_default();
    }

    pub fn add_edge(&mut self, a: &str, b: &str) {
        self.adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Every node in the connected component containing `start`.
    pub fn component(&self, start: &str) -> BTreeSet<RoomId> {
        let mut seen = BTreeSet::new();
        if !self.contains(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start.to_string()]);
        seen.insert(start.to_string());

        while let Some(node) = queue.pop_front() {
            if let Some(neighbors) = self.adjacency.get(&node) {
                for next in neighbors {
                    if seen.insert(next.clone()) {
                        queue.push_back(next.clone());
                    }
                }
            }
        }
        seen
    }
}

/// Listed rooms outside the entrance component, in room-list order.
pub fn unreachable_rooms(constraints: &GroupedConstraints) -> Vec<RoomId> {
    let reachable = ReachabilityGraph::from_constraints(constraints).component(ENTRANCE);
    constraints
        .room_list()
        .iter()
        .filter(|room| !reachable.contains(*room))
        .cloned()
        .collect()
}

/// Applies the repair passes under a [`RepairPolicy`].
#[derive(Debug, Clone, Default)]
pub struct ConstraintValidator {
    policy: RepairPolicy,
}

impl ConstraintValidator {
    pub fn new(policy: RepairPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RepairPolicy {
        &self.policy
    }

    /// Activate both special spaces and make sure the `path`–`entrance`
    /// connection exists. Returns whether anything changed.
    pub fn validate_and_add_path_entrance(
        &self,
        mut constraints: GroupedConstraints,
    ) -> (GroupedConstraints, bool) {
        let mut modified = activate_special_spaces(&mut constraints);

        let hub = RoomPair::new(PATH, ENTRANCE);
        let connections = &mut constraints.soft_constraints.connection.constraints;
        if !connections.iter().any(|c| c.room_pair == hub) {
            debug!("Adding path-entrance connection");
            connections.push(RelationEntry {
                room_pair: hub,
                weight: self.policy.path_entrance_weight,
            });
            modified = true;
        }

        (constraints, modified)
    }

    /// Attach every room unreachable from `entrance` directly to `path`, and
    /// raise the connection category weight when needed.
    pub fn validate_connectivity(
        &self,
        mut constraints: GroupedConstraints,
    ) -> (GroupedConstraints, bool) {
        let mut modified = activate_special_spaces(&mut constraints);

        let unreachable = unreachable_rooms(&constraints);
        let repaired = !unreachable.is_empty();
        for room in unreachable {
            info!(room = %room, "Attaching unreachable room to path");
            constraints
                .soft_constraints
                .connection
                .constraints
                .push(RelationEntry {
                    room_pair: RoomPair::new(PATH, room),
                    weight: self.policy.hub_weight,
                });
        }
        modified |= repaired;

        let connection = &mut constraints.soft_constraints.connection;
        let below_threshold = connection.weight < self.policy.min_connection_weight;
        let raise_after_repair = repaired && connection.weight < self.policy.raised_connection_weight;
        if below_threshold || raise_after_repair {
            debug!(
                from = connection.weight,
                to = self.policy.raised_connection_weight,
                "Raising connection category weight"
            );
            connection.weight = self.policy.raised_connection_weight;
            modified = true;
        }

        (constraints, modified)
    }

    /// Both passes: special spaces and hub edge, then reachability.
    pub fn repair(&self, constraints: GroupedConstraints) -> (GroupedConstraints, bool) {
        let (constraints, hub_modified) = self.validate_and_add_path_entrance(constraints);
        let (constraints, reach_modified) = self.validate_connectivity(constraints);
        (constraints, hub_modified || reach_modified)
    }
}

fn activate_special_spaces(constraints: &mut GroupedConstraints) -> bool {
    if constraints.special_spaces.both_active() {
        return false;
    }
    constraints.special_spaces.path = true;
    constraints.special_spaces.entrance = true;
    true
}

/// [`ConstraintValidator::validate_and_add_path_entrance`] with the default policy.
pub fn validate_and_add_path_entrance(
    constraints: GroupedConstraints,
) -> (GroupedConstraints, bool) {
    ConstraintValidator::default().validate_and_add_path_entrance(constraints)
}

/// [`ConstraintValidator::validate_connectivity`] with the default policy.
pub fn validate_connectivity(constraints: GroupedConstraints) -> (GroupedConstraints, bool) {
    ConstraintValidator::default().validate_connectivity(constraints)
}

/// [`ConstraintValidator::repair`] with the default policy.
pub fn repair(constraints: GroupedConstraints) -> (GroupedConstraints, bool) {
    ConstraintValidator::default().repair(constraints)
}
