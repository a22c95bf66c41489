//! Movement graph and path-legality rules.
//!
//! `MapGraph` holds the static adjacency data; `check_move` applies the
//! legality rules in their fixed order:
//! 1. the target must be a declared neighbor of the current node;
//! 2. re-entering the home base after leaving it requires the base key on
//!    the keyring (distinguishable "locked" rejection);
//! 3. a player committed to one branch may never enter the sibling branch;
//! 4. moving back to the node just departed is rejected, unless the current
//!    node is a declared dead end or the checkpoint has been reached (which
//!    permanently allows backtracking).
//!
//! The graph and rule data are deserialized from `data/world_layout.json`;
//! the same bytes feed the server seeding path and the headless harness.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::constants::branches;
use crate::error::ActionError;

/// Static adjacency data plus declared dead ends.
#[derive(Debug, Clone, Default)]
pub struct MapGraph {
    adj: HashMap<u32, Vec<u32>>,
    dead_ends: HashSet<u32>,
}

impl MapGraph {
    /// Build a graph from undirected edges and the declared dead-end set.
    pub fn from_edges(edges: &[(u32, u32)], dead_ends: &[u32]) -> Self {
        let mut adj: HashMap<u32, Vec<u32>> = HashMap::new();
        for &(a, b) in edges {
            adj.entry(a).or_default().push(b);
            adj.entry(b).or_default().push(a);
        }
        Self {
            adj,
            dead_ends: dead_ends.iter().copied().collect(),
        }
    }

    pub fn neighbors(&self, node: u32) -> &[u32] {
        self.adj.get(&node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, node: u32) -> bool {
        self.adj.contains_key(&node)
    }

    pub fn is_dead_end(&self, node: u32) -> bool {
        self.dead_ends.contains(&node)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }
}

/// The designated special nodes and branch memberships.
#[derive(Debug, Clone)]
pub struct MapRules {
    pub home_base: u32,
    pub fork_node: u32,
    pub checkpoint: u32,
    branch_a: HashSet<u32>,
    branch_b: HashSet<u32>,
}

impl MapRules {
    pub fn new(
        home_base: u32,
        fork_node: u32,
        checkpoint: u32,
        branch_a: &[u32],
        branch_b: &[u32],
    ) -> Self {
        Self {
            home_base,
            fork_node,
            checkpoint,
            branch_a: branch_a.iter().copied().collect(),
            branch_b: branch_b.iter().copied().collect(),
        }
    }

    /// Which branch a node belongs to, if any.
    pub fn branch_of(&self, node: u32) -> u8 {
        if self.branch_a.contains(&node) {
            branches::A
        } else if self.branch_b.contains(&node) {
            branches::B
        } else {
            branches::NONE
        }
    }
}

/// The mover's flags, as read from their record.
#[derive(Debug, Clone, Copy)]
pub struct MoveContext {
    pub current_node: u32,
    /// Node most recently departed, if any.
    pub previous_node: Option<u32>,
    pub chosen_branch: u8,
    pub reached_checkpoint: bool,
    pub left_home_base: bool,
    /// Base key present in the keyring slot.
    pub holds_base_key: bool,
}

/// Flag updates to apply alongside an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// Branch newly committed to by this move (`branches::NONE` if none).
    pub chooses_branch: u8,
    pub reaches_checkpoint: bool,
    pub leaves_home_base: bool,
}

/// Validate a move against the legality rules, in order. Returns the flag
/// updates to apply on acceptance; mutates nothing.
pub fn check_move(
    graph: &MapGraph,
    rules: &MapRules,
    ctx: &MoveContext,
    target: u32,
) -> Result<MoveOutcome, ActionError> {
    // 1. Direct path.
    if !graph.neighbors(ctx.current_node).contains(&target) {
        return Err(ActionError::NoDirectPath);
    }

    // 2. Home-base re-entry gate.
    if target == rules.home_base && ctx.left_home_base && !ctx.holds_base_key {
        return Err(ActionError::HomeBaseLocked);
    }

    // 3. Mutually exclusive branches, sticky for the rest of the run.
    let target_branch = rules.branch_of(target);
    if target_branch != branches::NONE
        && ctx.chosen_branch != branches::NONE
        && ctx.chosen_branch != target_branch
    {
        return Err(ActionError::BranchCommitted);
    }

    // 4. No backtracking to the node just departed.
    if ctx.previous_node == Some(target)
        && !graph.is_dead_end(ctx.current_node)
        && !ctx.reached_checkpoint
    {
        return Err(ActionError::NoBacktrack);
    }

    Ok(MoveOutcome {
        chooses_branch: if ctx.chosen_branch == branches::NONE {
            target_branch
        } else {
            branches::NONE
        },
        reaches_checkpoint: !ctx.reached_checkpoint && target == rules.checkpoint,
        leaves_home_base: !ctx.left_home_base && ctx.current_node == rules.home_base,
    })
}

// ── World layout data ───────────────────────────────────────────────────

/// A node entry in the layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub dead_end: bool,
}

/// An animatronic roster entry in the layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimatronicSpec {
    pub kind: u8,
    pub name: String,
    pub start_node: u32,
    pub zone: Vec<u32>,
}

/// The full world layout: topology, rule nodes, and the animatronic roster.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldLayout {
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<(u32, u32)>,
    pub home_base: u32,
    pub fork_node: u32,
    pub checkpoint: u32,
    pub branch_a: Vec<u32>,
    pub branch_b: Vec<u32>,
    pub animatronics: Vec<AnimatronicSpec>,
}

impl WorldLayout {
    pub fn graph(&self) -> MapGraph {
        let dead_ends: Vec<u32> = self
            .nodes
            .iter()
            .filter(|n| n.dead_end)
            .map(|n| n.id)
            .collect();
        MapGraph::from_edges(&self.edges, &dead_ends)
    }

    pub fn rules(&self) -> MapRules {
        MapRules::new(
            self.home_base,
            self.fork_node,
            self.checkpoint,
            &self.branch_a,
            &self.branch_b,
        )
    }

    /// Structural sanity checks on authored content. Returns the first
    /// problem found, as text for the seeding path to refuse on.
    pub fn validate(&self) -> Result<(), String> {
        let ids: HashSet<u32> = self.nodes.iter().map(|n| n.id).collect();
        if ids.len() != self.nodes.len() {
            return Err("duplicate node ids".into());
        }
        for &(a, b) in &self.edges {
            if !ids.contains(&a) || !ids.contains(&b) {
                return Err(format!("edge ({a}, {b}) references an unknown node"));
            }
        }
        for special in [self.home_base, self.fork_node, self.checkpoint] {
            if !ids.contains(&special) {
                return Err(format!("special node {special} is not in the node list"));
            }
        }
        for node in self.branch_a.iter().chain(&self.branch_b) {
            if !ids.contains(node) {
                return Err(format!("branch node {node} is not in the node list"));
            }
        }
        if self.branch_a.iter().any(|n| self.branch_b.contains(n)) {
            return Err("branch node sets overlap".into());
        }
        for spec in &self.animatronics {
            if !spec.zone.contains(&spec.start_node) {
                return Err(format!("{} starts outside its zone", spec.name));
            }
            if spec.zone.iter().any(|n| !ids.contains(n)) {
                return Err(format!("{} has an unknown zone node", spec.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 (home) - 2 - 3 (fork) - 4 - 6 (branch A)
    //                         \ 5 - 7 (branch B)
    //            2 - 11 (dead end)
    //            6 - 10 (checkpoint), 7 - 10
    fn graph() -> MapGraph {
        MapGraph::from_edges(
            &[
                (1, 2),
                (2, 3),
                (2, 11),
                (3, 4),
                (3, 5),
                (4, 6),
                (5, 7),
                (6, 10),
                (7, 10),
            ],
            &[11],
        )
    }

    fn rules() -> MapRules {
        MapRules::new(1, 3, 10, &[4, 6], &[5, 7])
    }

    fn ctx(current: u32, previous: Option<u32>) -> MoveContext {
        MoveContext {
            current_node: current,
            previous_node: previous,
            chosen_branch: branches::NONE,
            reached_checkpoint: false,
            left_home_base: false,
            holds_base_key: false,
        }
    }

    #[test]
    fn test_non_neighbor_rejected() {
        let res = check_move(&graph(), &rules(), &ctx(1, None), 3);
        assert_eq!(res, Err(ActionError::NoDirectPath));
    }

    #[test]
    fn test_neighbor_accepted() {
        let res = check_move(&graph(), &rules(), &ctx(1, None), 2).unwrap();
        assert!(res.leaves_home_base);
        assert_eq!(res.chooses_branch, branches::NONE);
    }

    #[test]
    fn test_home_base_locked_without_key() {
        let mut c = ctx(2, Some(3));
        c.left_home_base = true;
        assert_eq!(
            check_move(&graph(), &rules(), &c, 1),
            Err(ActionError::HomeBaseLocked)
        );
    }

    #[test]
    fn test_home_base_opens_with_key() {
        let mut c = ctx(2, Some(1));
        c.left_home_base = true;
        c.holds_base_key = true;
        c.reached_checkpoint = true; // avoid the backtrack rule interfering
        assert!(check_move(&graph(), &rules(), &c, 1).is_ok());
    }

    #[test]
    fn test_first_home_exit_not_gated() {
        // Never left before: entering home base is not the gate's concern.
        let res = check_move(&graph(), &rules(), &ctx(2, None), 1).unwrap();
        assert!(!res.leaves_home_base);
    }

    #[test]
    fn test_branch_choice_recorded_at_fork() {
        let res = check_move(&graph(), &rules(), &ctx(3, Some(2)), 4).unwrap();
        assert_eq!(res.chooses_branch, branches::A);
    }

    #[test]
    fn test_sibling_branch_rejected_forever() {
        let mut c = ctx(3, Some(4));
        c.chosen_branch = branches::A;
        c.reached_checkpoint = true;
        assert_eq!(
            check_move(&graph(), &rules(), &c, 5),
            Err(ActionError::BranchCommitted)
        );
    }

    #[test]
    fn test_own_branch_still_allowed() {
        let mut c = ctx(3, Some(2));
        c.chosen_branch = branches::A;
        let res = check_move(&graph(), &rules(), &c, 4).unwrap();
        // Already committed; nothing new to record.
        assert_eq!(res.chooses_branch, branches::NONE);
    }

    #[test]
    fn test_backtrack_rejected() {
        assert_eq!(
            check_move(&graph(), &rules(), &ctx(3, Some(2)), 2),
            Err(ActionError::NoBacktrack)
        );
    }

    #[test]
    fn test_backtrack_allowed_from_dead_end() {
        // Node 11 is a declared dead end; bouncing back out is legal.
        assert!(check_move(&graph(), &rules(), &ctx(11, Some(2)), 2).is_ok());
    }

    #[test]
    fn test_backtrack_allowed_after_checkpoint() {
        let mut c = ctx(3, Some(2));
        c.reached_checkpoint = true;
        assert!(check_move(&graph(), &rules(), &c, 2).is_ok());
    }

    #[test]
    fn test_checkpoint_flag_set_on_arrival() {
        let mut c = ctx(6, Some(4));
        c.chosen_branch = branches::A;
        let res = check_move(&graph(), &rules(), &c, 10).unwrap();
        assert!(res.reaches_checkpoint);
    }

    #[test]
    fn test_rule_order_gate_before_backtrack() {
        // Returning straight to a locked home base reports the lock, not
        // the backtrack, so the UI can special-case it.
        let mut c = ctx(2, Some(1));
        c.left_home_base = true;
        assert_eq!(
            check_move(&graph(), &rules(), &c, 1),
            Err(ActionError::HomeBaseLocked)
        );
    }

    #[test]
    fn test_layout_roundtrip() {
        let layout = WorldLayout {
            nodes: vec![
                NodeSpec {
                    id: 1,
                    name: "A".into(),
                    dead_end: false,
                },
                NodeSpec {
                    id: 2,
                    name: "B".into(),
                    dead_end: true,
                },
            ],
            edges: vec![(1, 2)],
            home_base: 1,
            fork_node: 1,
            checkpoint: 2,
            branch_a: vec![],
            branch_b: vec![],
            animatronics: vec![AnimatronicSpec {
                kind: 0,
                name: "P".into(),
                start_node: 2,
                zone: vec![2],
            }],
        };
        assert!(layout.validate().is_ok());
        let g = layout.graph();
        assert!(g.is_dead_end(2));
        assert_eq!(g.neighbors(1), &[2]);
    }

    #[test]
    fn test_layout_validation_catches_bad_zone() {
        let layout = WorldLayout {
            nodes: vec![NodeSpec {
                id: 1,
                name: "A".into(),
                dead_end: false,
            }],
            edges: vec![],
            home_base: 1,
            fork_node: 1,
            checkpoint: 1,
            branch_a: vec![],
            branch_b: vec![],
            animatronics: vec![AnimatronicSpec {
                kind: 0,
                name: "P".into(),
                start_node: 5,
                zone: vec![5],
            }],
        };
        assert!(layout.validate().is_err());
    }
}
