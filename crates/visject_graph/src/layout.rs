// SPDX-License-Identifier: MIT OR Apache-2.0
//! Automatic node arrangement.
//!
//! [`format_graph`] is a longest-path layered layout: every weakly connected
//! cluster is laid out right-to-left from its sinks, one column per layer.
//! The alignment helpers work on the bounding box of a selection.
//!
//! All functions compute [`NodeMove`]s without touching the graph; apply
//! them with [`apply_moves`] so a caller can record them as one edit.

use crate::context::SurfaceContext;
use crate::node::NodeId;
use crate::traversal::TraversalDirection;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub location: [f32; 2],
    /// Width and height
    pub size: [f32; 2],
}

impl Rect {
    /// Create a rectangle
    pub fn new(location: [f32; 2], size: [f32; 2]) -> Self {
        Self { location, size }
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.location[0]
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.location[1]
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.location[0] + self.size[0]
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.location[1] + self.size[1]
    }

    /// Center point
    pub fn center(&self) -> [f32; 2] {
        [
            self.location[0] + self.size[0] * 0.5,
            self.location[1] + self.size[1] * 0.5,
        ]
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new([left, top], [right - left, bottom - top])
    }

    /// Whether the interiors overlap
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// A node position change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeMove {
    /// Moved node
    pub node: NodeId,
    /// Position before
    pub from: [f32; 2],
    /// Position after
    pub to: [f32; 2],
}

/// Layout tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Gap between layout columns and rows
    pub gap: f32,
    /// Gap used by [`distribute_nodes`] when the nodes do not fit
    pub distribute_gap: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            gap: 30.0,
            distribute_gap: 10.0,
        }
    }
}

/// Edge used by [`align_nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeAlignment {
    /// Top edges
    Top,
    /// Vertical centers
    Middle,
    /// Bottom edges
    Bottom,
    /// Left edges
    Left,
    /// Horizontal centers
    Center,
    /// Right edges
    Right,
}

/// Axis used by [`distribute_nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributeAxis {
    /// Along x
    Horizontal,
    /// Along y
    Vertical,
}

/// Apply computed moves
pub fn apply_moves(ctx: &mut SurfaceContext, moves: &[NodeMove]) {
    for m in moves {
        ctx.move_node(m.node, m.to);
    }
}

fn collect_moves(ctx: &SurfaceContext, positions: &[(NodeId, [f32; 2])]) -> Vec<NodeMove> {
    positions
        .iter()
        .filter_map(|&(node, to)| {
            let from = ctx.find_node(node)?.position;
            (from != to).then_some(NodeMove { node, from, to })
        })
        .collect()
}

/// Neighbors of `id` in `direction` restricted to `set`
fn linked(ctx: &SurfaceContext, id: NodeId, direction: TraversalDirection, set: &HashSet<NodeId>) -> Vec<NodeId> {
    ctx.neighbors(id, direction)
        .into_iter()
        .filter(|n| set.contains(n))
        .collect()
}

/// Weakly connected components, in input order
fn components(ctx: &SurfaceContext, nodes: &[NodeId], set: &HashSet<NodeId>) -> Vec<Vec<NodeId>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &start in nodes {
        if !seen.insert(start) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            component.push(id);
            let forward = linked(ctx, id, TraversalDirection::Forward, set);
            let backward = linked(ctx, id, TraversalDirection::Backward, set);
            for next in forward.into_iter().chain(backward) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out.push(component);
    }
    out
}

/// Layer and vertical slot of each node of one component
#[derive(Debug, Default)]
struct Slots {
    layer: HashMap<NodeId, usize>,
    offset: HashMap<NodeId, usize>,
}

/// Edges `(node, input)` that close a feedback loop, found by a depth-first
/// walk against the flow starting at `roots`
fn back_edges(ctx: &SurfaceContext, roots: &[NodeId], set: &HashSet<NodeId>) -> HashSet<(NodeId, NodeId)> {
    let mut back = HashSet::new();
    let mut done = HashSet::new();
    let mut on_path = HashSet::new();
    for &root in roots {
        if done.contains(&root) {
            continue;
        }
        on_path.insert(root);
        let mut stack = vec![(root, linked(ctx, root, TraversalDirection::Backward, set), 0usize)];
        while let Some((id, preds, next)) = stack.last_mut() {
            let id = *id;
            if let Some(&pred) = preds.get(*next) {
                *next += 1;
                if on_path.contains(&pred) {
                    back.insert((id, pred));
                } else if !done.contains(&pred) {
                    on_path.insert(pred);
                    stack.push((pred, linked(ctx, pred, TraversalDirection::Backward, set), 0));
                }
            } else {
                on_path.remove(&id);
                done.insert(id);
                stack.pop();
            }
        }
    }
    back
}

/// Longest-path layering on an explicit stack.
///
/// A node is re-pushed only when its layer strictly grows. Back edges are
/// skipped and layers are capped at the component size.
fn assign_layers(
    ctx: &SurfaceContext,
    roots: &[NodeId],
    set: &HashSet<NodeId>,
    back: &HashSet<(NodeId, NodeId)>,
    max_layer: usize,
    layers: &mut HashMap<NodeId, usize>,
) {
    let mut stack = Vec::new();
    for &root in roots {
        if !layers.contains_key(&root) {
            layers.insert(root, 0);
            stack.push(root);
        }
    }
    while let Some(id) = stack.pop() {
        let layer = layers.get(&id).copied().unwrap_or(0);
        let next = (layer + 1).min(max_layer);
        for pred in linked(ctx, id, TraversalDirection::Backward, set) {
            if back.contains(&(id, pred)) {
                continue;
            }
            let grows = layers.get(&pred).map_or(true, |&current| next > current);
            if grows {
                layers.insert(pred, next);
                stack.push(pred);
            }
        }
    }
}

struct OffsetPass<'a> {
    ctx: &'a SurfaceContext,
    set: &'a HashSet<NodeId>,
    layers: &'a HashMap<NodeId, usize>,
    offsets: HashMap<NodeId, usize>,
    next_free: HashMap<usize, usize>,
    chains: HashMap<NodeId, Vec<NodeId>>,
}

impl OffsetPass<'_> {
    fn layer(&self, id: NodeId) -> usize {
        self.layers.get(&id).copied().unwrap_or(0)
    }

    /// Place `id` at `desired` or below. `chain_root` is the nearest ancestor
    /// whose straight line this node continues.
    fn visit(&mut self, id: NodeId, desired: usize, chain_root: NodeId) {
        let mut stack = vec![(id, desired, chain_root)];
        while let Some((id, mut desired, root)) = stack.pop() {
            if self.offsets.contains_key(&id) {
                continue;
            }
            let layer = self.layer(id);
            let free = self.next_free.get(&layer).copied().unwrap_or(0);
            if desired < free {
                let overlap = free - desired;
                self.shift_chain(root, overlap);
                desired = free;
            }
            self.offsets.insert(id, desired);
            self.next_free.insert(layer, desired + 1);
            self.chains.entry(root).or_default().push(id);

            // First input continues the straight line, the rest start new ones
            let preds: Vec<NodeId> = linked(self.ctx, id, TraversalDirection::Backward, self.set)
                .into_iter()
                .filter(|p| !self.offsets.contains_key(p))
                .collect();
            for (i, pred) in preds.into_iter().enumerate().rev() {
                if i == 0 {
                    stack.push((pred, desired, root));
                } else {
                    stack.push((pred, desired + i, pred));
                }
            }
        }
    }

    fn shift_chain(&mut self, root: NodeId, overlap: usize) {
        let Some(chain) = self.chains.get(&root) else {
            return;
        };
        for id in chain {
            if let Some(offset) = self.offsets.get_mut(id) {
                *offset += overlap;
                let layer = self.layers.get(id).copied().unwrap_or(0);
                let free = self.next_free.entry(layer).or_insert(0);
                *free = (*free).max(*offset + 1);
            }
        }
    }
}

fn layout_component(ctx: &SurfaceContext, component: &[NodeId], gap: f32) -> Vec<(NodeId, [f32; 2])> {
    let set: HashSet<NodeId> = component.iter().copied().collect();
    let position = |id: NodeId| ctx.find_node(id).map_or([0.0, 0.0], |n| n.position);
    let size = |id: NodeId| ctx.find_node(id).map_or([0.0, 0.0], |n| n.size());

    let mut sinks: Vec<NodeId> = component
        .iter()
        .copied()
        .filter(|&id| linked(ctx, id, TraversalDirection::Forward, &set).is_empty())
        .collect();
    sinks.sort_by(|a, b| position(*a)[1].total_cmp(&position(*b)[1]));
    if sinks.is_empty() {
        // Closed loop: start from the right-most node
        if let Some(&rightmost) = component
            .iter()
            .max_by(|a, b| position(**a)[0].total_cmp(&position(**b)[0]))
        {
            sinks.push(rightmost);
        }
    }
    let Some(&anchor_node) = sinks.first() else {
        return Vec::new();
    };

    let max_layer = component.len().saturating_sub(1);
    let mut slots = Slots::default();
    let mut roots = sinks.clone();
    let mut back = back_edges(ctx, &roots, &set);
    assign_layers(ctx, &roots, &set, &back, max_layer, &mut slots.layer);
    // Nodes that only feed a loop without an exit
    for &id in component {
        if !slots.layer.contains_key(&id) {
            back.extend(back_edges(ctx, &[id], &set));
            assign_layers(ctx, &[id], &set, &back, max_layer, &mut slots.layer);
            roots.push(id);
        }
    }

    let mut pass = OffsetPass {
        ctx,
        set: &set,
        layers: &slots.layer,
        offsets: HashMap::new(),
        next_free: HashMap::new(),
        chains: HashMap::new(),
    };
    for &root in &roots {
        let start = pass.next_free.get(&pass.layer(root)).copied().unwrap_or(0);
        pass.visit(root, start, root);
    }
    slots.offset = pass.offsets;

    let slot = |id: NodeId| {
        (
            slots.layer.get(&id).copied().unwrap_or(0),
            slots.offset.get(&id).copied().unwrap_or(0),
        )
    };
    let layer_count = slots.layer.values().max().map_or(0, |m| m + 1).max(1);
    let row_count = slots.offset.values().max().map_or(0, |m| m + 1).max(1);
    let mut widths = vec![0.0f32; layer_count];
    let mut heights = vec![0.0f32; row_count];
    for &id in component {
        let (layer, row) = slot(id);
        let [w, h] = size(id);
        widths[layer] = widths[layer].max(w);
        heights[row] = heights[row].max(h);
    }

    // Column i sits left of column i-1 with its right edge one gap away
    let mut xs = vec![0.0f32; layer_count];
    for i in 1..layer_count {
        xs[i] = xs[i - 1] + widths[i] + gap;
    }
    let mut ys = vec![0.0f32; row_count];
    for i in 1..row_count {
        ys[i] = ys[i - 1] + heights[i - 1] + gap;
    }

    let origin = position(anchor_node);
    let (anchor_layer, anchor_row) = slot(anchor_node);
    let anchor_rel = [-xs[anchor_layer], ys[anchor_row]];
    component
        .iter()
        .map(|&id| {
            let (layer, row) = slot(id);
            let x = origin[0] + (-xs[layer] - anchor_rel[0]);
            let y = origin[1] + (ys[row] - anchor_rel[1]);
            (id, [x, y])
        })
        .collect()
}

/// Arrange `nodes` into layered clusters.
///
/// Each weakly connected cluster is laid out independently and anchored so
/// that its topmost sink keeps its position. Nodes outside the set never
/// move and connections leaving the set are ignored.
pub fn format_graph(ctx: &SurfaceContext, nodes: &[NodeId], settings: &LayoutSettings) -> Vec<NodeMove> {
    let mut ordered = Vec::new();
    for &id in nodes {
        if ctx.contains_node(id) && !ordered.contains(&id) {
            ordered.push(id);
        }
    }
    let set: HashSet<NodeId> = ordered.iter().copied().collect();
    let mut positions = Vec::new();
    for component in components(ctx, &ordered, &set) {
        tracing::debug!("Formatting cluster of {} nodes", component.len());
        positions.extend(layout_component(ctx, &component, settings.gap));
    }
    collect_moves(ctx, &positions)
}

/// Shift downstream nodes so connected boxes line up horizontally.
///
/// Pairs are processed left to right; a node moved by one pair may move
/// again for a later pair.
pub fn straighten_connections(ctx: &SurfaceContext, nodes: &[NodeId]) -> Vec<NodeMove> {
    let set: HashSet<NodeId> = nodes.iter().copied().filter(|id| ctx.contains_node(*id)).collect();
    let mut order: Vec<NodeId> = Vec::new();
    for &id in nodes {
        if set.contains(&id) && !order.contains(&id) {
            order.push(id);
        }
    }
    order.sort_by(|a, b| {
        let ax = ctx.find_node(*a).map_or(0.0, |n| n.position[0]);
        let bx = ctx.find_node(*b).map_or(0.0, |n| n.position[0]);
        ax.total_cmp(&bx)
    });

    let mut positions: HashMap<NodeId, [f32; 2]> = order
        .iter()
        .filter_map(|id| Some((*id, ctx.find_node(*id)?.position)))
        .collect();

    for &upstream in &order {
        let Some(node) = ctx.find_node(upstream) else {
            continue;
        };
        for b in node.boxes().filter(|b| b.is_output()) {
            let Some(out_center) = node.box_center(b.id) else {
                continue;
            };
            for peer in &b.connections {
                if !set.contains(&peer.node) || peer.node == upstream {
                    continue;
                }
                let Some(downstream) = ctx.find_node(peer.node) else {
                    continue;
                };
                let Some(in_center) = downstream.box_center(peer.box_id) else {
                    continue;
                };
                let Some(upstream_y) = positions.get(&upstream).map(|p| p[1]) else {
                    continue;
                };
                let out_y = out_center[1] - node.position[1] + upstream_y;
                let in_offset = in_center[1] - downstream.position[1];
                if let Some(pos) = positions.get_mut(&peer.node) {
                    pos[1] = out_y - in_offset;
                }
            }
        }
    }

    let targets: Vec<(NodeId, [f32; 2])> = order
        .iter()
        .filter_map(|id| Some((*id, *positions.get(id)?)))
        .collect();
    collect_moves(ctx, &targets)
}

fn selection_bounds(ctx: &SurfaceContext, nodes: &[NodeId]) -> Option<Rect> {
    nodes
        .iter()
        .filter_map(|id| ctx.find_node(*id).map(|n| n.bounds()))
        .reduce(|a, b| a.union(&b))
}

/// Align nodes against the bounding box of the selection
pub fn align_nodes(ctx: &SurfaceContext, nodes: &[NodeId], alignment: NodeAlignment) -> Vec<NodeMove> {
    let Some(bounds) = selection_bounds(ctx, nodes) else {
        return Vec::new();
    };
    let center = bounds.center();
    let targets: Vec<(NodeId, [f32; 2])> = nodes
        .iter()
        .filter_map(|&id| {
            let node = ctx.find_node(id)?;
            let [x, y] = node.position;
            let [w, h] = node.size();
            let to = match alignment {
                NodeAlignment::Top => [x, bounds.top()],
                NodeAlignment::Middle => [x, center[1] - h * 0.5],
                NodeAlignment::Bottom => [x, bounds.bottom() - h],
                NodeAlignment::Left => [bounds.left(), y],
                NodeAlignment::Center => [center[0] - w * 0.5, y],
                NodeAlignment::Right => [bounds.right() - w, y],
            };
            Some((id, to))
        })
        .collect();
    collect_moves(ctx, &targets)
}

/// Space nodes evenly along one axis within their bounding box
pub fn distribute_nodes(
    ctx: &SurfaceContext,
    nodes: &[NodeId],
    axis: DistributeAxis,
    settings: &LayoutSettings,
) -> Vec<NodeMove> {
    let Some(bounds) = selection_bounds(ctx, nodes) else {
        return Vec::new();
    };
    let i = match axis {
        DistributeAxis::Horizontal => 0,
        DistributeAxis::Vertical => 1,
    };
    let mut items: Vec<(NodeId, [f32; 2], [f32; 2])> = nodes
        .iter()
        .filter_map(|&id| ctx.find_node(id).map(|n| (id, n.position, n.size())))
        .collect();
    if items.len() < 2 {
        return Vec::new();
    }
    items.sort_by(|a, b| a.1[i].total_cmp(&b.1[i]));

    let used: f32 = items.iter().map(|item| item.2[i]).sum();
    let mut gap = (bounds.size[i] - used) / (items.len() - 1) as f32;
    if gap < 0.0 {
        gap = settings.distribute_gap;
    }

    let mut cursor = bounds.location[i];
    let targets: Vec<(NodeId, [f32; 2])> = items
        .into_iter()
        .map(|(id, mut pos, size)| {
            pos[i] = cursor;
            cursor += size[i] + gap;
            (id, pos)
        })
        .collect();
    collect_moves(ctx, &targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetypes::{constants, math, tools, CONSTANTS_GROUP_ID, MATH_GROUP_ID, TOOLS_GROUP_ID};
    use crate::element::BoxRef;
    use crate::factory::NodeFactory;

    fn apply(ctx: &mut SurfaceContext, moves: Vec<NodeMove>) {
        apply_moves(ctx, &moves);
    }

    fn pos(ctx: &SurfaceContext, id: NodeId) -> [f32; 2] {
        ctx.find_node(id).unwrap().position
    }

    #[test]
    fn test_diamond() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let a = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [500.0, 300.0]).unwrap();
        let b = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [20.0, 10.0]).unwrap();
        let c = ctx.spawn_node(&factory, MATH_GROUP_ID, math::MULTIPLY, [20.0, 15.0]).unwrap();
        let d = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [-300.0, 40.0]).unwrap();
        ctx.connect(BoxRef::new(a, 1), BoxRef::new(b, 0)).unwrap();
        ctx.connect(BoxRef::new(a, 1), BoxRef::new(c, 0)).unwrap();
        ctx.connect(BoxRef::new(b, 2), BoxRef::new(d, 0)).unwrap();
        ctx.connect(BoxRef::new(c, 2), BoxRef::new(d, 1)).unwrap();

        let moves = format_graph(&ctx, &[a, b, c, d], &LayoutSettings::default());
        apply(&mut ctx, moves);

        // D is the only sink and keeps its place
        assert_eq!(pos(&ctx, d), [-300.0, 40.0]);
        let bounds = |id| ctx.find_node(id).unwrap().bounds();
        assert!(bounds(b).right() < bounds(d).left());
        assert!(bounds(c).right() < bounds(d).left());
        assert!(bounds(a).right() < bounds(b).left().min(bounds(c).left()));
        assert!(!bounds(b).intersects(&bounds(c)));
        assert_eq!(pos(&ctx, b)[0], pos(&ctx, c)[0]);
        assert!(pos(&ctx, b)[1] < pos(&ctx, c)[1]);
        // A continues B's straight line
        assert_eq!(pos(&ctx, a)[1], pos(&ctx, b)[1]);
    }

    #[test]
    fn test_columns_do_not_overlap_with_uneven_widths() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let c = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::COLOR, [0.0, 0.0]).unwrap();
        let r = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();
        let m = ctx.spawn_node(&factory, MATH_GROUP_ID, math::MULTIPLY, [0.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(r, 0)).unwrap();
        ctx.connect(BoxRef::new(r, 1), BoxRef::new(m, 0)).unwrap();
        let moves = format_graph(&ctx, &[c, r, m], &LayoutSettings::default());
        apply(&mut ctx, moves);

        let b = |id| ctx.find_node(id).unwrap().bounds();
        assert!((b(m).left() - b(r).right() - 30.0).abs() < 1e-3);
        assert!((b(r).left() - b(c).right() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_separate_clusters_and_outside_nodes() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let a1 = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 0.0]).unwrap();
        let a2 = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [10.0, 0.0]).unwrap();
        let b1 = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 500.0]).unwrap();
        let b2 = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [10.0, 500.0]).unwrap();
        let outside = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [5.0, 5.0]).unwrap();
        ctx.connect(BoxRef::new(a1, 0), BoxRef::new(a2, 0)).unwrap();
        ctx.connect(BoxRef::new(b1, 0), BoxRef::new(b2, 0)).unwrap();
        ctx.connect(BoxRef::new(outside, 0), BoxRef::new(a2, 1)).unwrap();

        let moves = format_graph(&ctx, &[a1, a2, b1, b2], &LayoutSettings::default());
        assert!(moves.iter().all(|m| m.node != outside));
        apply(&mut ctx, moves);
        assert_eq!(pos(&ctx, a2), [10.0, 0.0]);
        assert_eq!(pos(&ctx, b2), [10.0, 500.0]);
        assert_eq!(pos(&ctx, a1)[1], 0.0);
        assert_eq!(pos(&ctx, b1)[1], 500.0);
        assert!(ctx.find_node(a1).unwrap().bounds().right() < 10.0);
    }

    #[test]
    fn test_feedback_loop_terminates() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let r1 = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [0.0, 0.0]).unwrap();
        let r2 = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [50.0, 0.0]).unwrap();
        let r3 = ctx.spawn_node(&factory, TOOLS_GROUP_ID, tools::REROUTE, [100.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(r1, 1), BoxRef::new(r2, 0)).unwrap();
        ctx.connect(BoxRef::new(r2, 1), BoxRef::new(r3, 0)).unwrap();
        ctx.connect(BoxRef::new(r3, 1), BoxRef::new(r1, 0)).unwrap();

        let moves = format_graph(&ctx, &[r1, r2, r3], &LayoutSettings::default());
        apply(&mut ctx, moves);
        assert_eq!(pos(&ctx, r3), [100.0, 0.0]);
        assert!(pos(&ctx, r2)[0] < pos(&ctx, r3)[0]);
        assert!(pos(&ctx, r1)[0] < pos(&ctx, r2)[0]);
    }

    #[test]
    fn test_straighten_connections() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let c = ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, [0.0, 100.0]).unwrap();
        let add = ctx.spawn_node(&factory, MATH_GROUP_ID, math::ADD, [200.0, 0.0]).unwrap();
        ctx.connect(BoxRef::new(c, 0), BoxRef::new(add, 1)).unwrap();

        let moves = straighten_connections(&ctx, &[add, c]);
        assert_eq!(moves.len(), 1);
        apply(&mut ctx, moves);
        let out = ctx.find_node(c).unwrap().box_center(crate::element::BoxId(0)).unwrap();
        let input = ctx.find_node(add).unwrap().box_center(crate::element::BoxId(1)).unwrap();
        assert_eq!(out[1], input[1]);
        assert_eq!(pos(&ctx, c), [0.0, 100.0]);
    }

    #[test]
    fn test_align_and_distribute() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let ids: Vec<NodeId> = [[0.0, 0.0], [30.0, 80.0], [400.0, 20.0]]
            .into_iter()
            .map(|p| ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, p).unwrap())
            .collect();

        let moves = align_nodes(&ctx, &ids, NodeAlignment::Top);
        apply(&mut ctx, moves);
        assert!(ids.iter().all(|id| pos(&ctx, *id)[1] == 0.0));

        let moves = align_nodes(&ctx, &ids, NodeAlignment::Right);
        apply(&mut ctx, moves);
        let right = ctx.find_node(ids[2]).unwrap().bounds().right();
        assert!(ids.iter().all(|id| ctx.find_node(*id).unwrap().bounds().right() == right));

        // Nodes now overlap completely: fall back to the fixed gap
        let moves = distribute_nodes(&ctx, &ids, DistributeAxis::Horizontal, &LayoutSettings::default());
        apply(&mut ctx, moves);
        let b: Vec<Rect> = ids.iter().map(|id| ctx.find_node(*id).unwrap().bounds()).collect();
        let mut lefts: Vec<f32> = b.iter().map(Rect::left).collect();
        lefts.sort_by(f32::total_cmp);
        let width = b[0].size[0];
        assert!((lefts[1] - lefts[0] - (width + 10.0)).abs() < 1e-3);
        assert!((lefts[2] - lefts[1] - (width + 10.0)).abs() < 1e-3);
    }

    #[test]
    fn test_distribute_even_gap() {
        let factory = NodeFactory::with_builtin();
        let mut ctx = SurfaceContext::new();
        let ids: Vec<NodeId> = [[0.0, 0.0], [0.0, 100.0], [0.0, 1000.0]]
            .into_iter()
            .map(|p| ctx.spawn_node(&factory, CONSTANTS_GROUP_ID, constants::FLOAT, p).unwrap())
            .collect();
        let moves = distribute_nodes(&ctx, &ids, DistributeAxis::Vertical, &LayoutSettings::default());
        apply(&mut ctx, moves);
        let h = ctx.find_node(ids[0]).unwrap().height();
        let ys: Vec<f32> = ids.iter().map(|id| pos(&ctx, *id)[1]).collect();
        assert_eq!(ys[0], 0.0);
        assert_eq!(ys[2], 1000.0);
        assert!(((ys[1] - ys[0] - h) - (ys[2] - ys[1] - h)).abs() < 1e-3);
    }
}
