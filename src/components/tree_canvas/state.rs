use std::collections::{HashMap, HashSet};
use std::fmt;

use super::types::{NodeId, RemoteNode, TreeNode};

pub const NODE_SIZE: f64 = 50.0;
pub const NODE_RADIUS: f64 = NODE_SIZE / 2.0;
pub const CHILD_OFFSET_Y: f64 = 150.0;
pub const CHILD_JITTER_X: f64 = 75.0;
pub const DEFAULT_POSITION: (f64, f64) = (400.0, 100.0);

/// A fix applied while turning untrusted input into a forest.
#[derive(Clone, Debug, PartialEq)]
pub enum Repair {
	InvalidId { raw: String },
	DuplicateId(NodeId),
	DanglingParent { node: NodeId, parent: String },
	SelfParent(NodeId),
	CycleBroken(NodeId),
}

impl fmt::Display for Repair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Repair::InvalidId { raw } => write!(f, "dropped node with invalid id {raw:?}"),
			Repair::DuplicateId(id) => write!(f, "dropped duplicate of node {id}"),
			Repair::DanglingParent { node, parent } => {
				write!(f, "node {node} referenced missing parent {parent:?}, made it a root")
			}
			Repair::SelfParent(id) => write!(f, "node {id} was its own parent, made it a root"),
			Repair::CycleBroken(id) => write!(f, "node {id} closed a parent cycle, made it a root"),
		}
	}
}

/// What `delete_node` removed, kept around so the delete can be undone.
#[derive(Clone, Debug, PartialEq)]
pub struct DeletedNode {
	pub node: TreeNode,
	pub index: usize,
	pub reparented: Vec<NodeId>,
}

/// The ordered node set of one project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeState {
	nodes: Vec<TreeNode>,
}

impl TreeState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a forest out of arbitrary nodes, repairing whatever would break it.
	pub fn from_nodes(nodes: Vec<TreeNode>) -> (Self, Vec<Repair>) {
		let mut repairs = Vec::new();
		let mut seen = HashSet::new();
		let mut kept = Vec::with_capacity(nodes.len());
		for node in nodes {
			if node.id == NodeId::MAX {
				repairs.push(Repair::InvalidId {
					raw: node.id.to_string(),
				});
			} else if seen.insert(node.id) {
				kept.push(node);
			} else {
				repairs.push(Repair::DuplicateId(node.id));
			}
		}

		for node in &mut kept {
			match node.parent {
				Some(parent) if parent == node.id => {
					node.parent = None;
					repairs.push(Repair::SelfParent(node.id));
				}
				Some(parent) if !seen.contains(&parent) => {
					node.parent = None;
					repairs.push(Repair::DanglingParent {
						node: node.id,
						parent: parent.to_string(),
					});
				}
				_ => {}
			}
		}

		let mut parents: HashMap<NodeId, Option<NodeId>> =
			kept.iter().map(|n| (n.id, n.parent)).collect();
		for node in &mut kept {
			if lies_on_cycle(&parents, node.id) {
				node.parent = None;
				parents.insert(node.id, None);
				repairs.push(Repair::CycleBroken(node.id));
			}
		}

		(Self { nodes: kept }, repairs)
	}

	/// Maps `GET /nodes` output to local nodes. Missing coordinates are drawn from
	/// `random` scaled to the canvas.
	pub fn from_remote(
		remote: Vec<RemoteNode>,
		width: f64,
		height: f64,
		mut random: impl FnMut() -> f64,
	) -> (Self, Vec<Repair>) {
		let mut repairs = Vec::new();
		let mut nodes = Vec::with_capacity(remote.len());
		for entry in remote {
			let Ok(id) = entry.id.parse::<NodeId>() else {
				repairs.push(Repair::InvalidId { raw: entry.id });
				continue;
			};
			let parent = match entry.parent_id {
				None => None,
				Some(raw) => match raw.parse::<NodeId>() {
					Ok(parent) => Some(parent),
					Err(_) => {
						repairs.push(Repair::DanglingParent {
							node: id,
							parent: raw,
						});
						None
					}
				},
			};
			let x = entry.x.unwrap_or_else(|| random() * width);
			let y = entry.y.unwrap_or_else(|| random() * height);
			nodes.push(TreeNode::new(id, entry.label, x, y, parent));
		}
		let (tree, more) = Self::from_nodes(nodes);
		repairs.extend(more);
		(tree, repairs)
	}

	pub fn nodes(&self) -> &[TreeNode] {
		&self.nodes
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.get(id).is_some()
	}

	pub fn next_id(&self) -> NodeId {
		self.nodes
			.iter()
			.map(|n| n.id.0)
			.max()
			.map_or(Some(NodeId(1)), |max| max.checked_add(1).map(NodeId))
			.unwrap_or_else(|| self.lowest_free_id())
	}

	fn lowest_free_id(&self) -> NodeId {
		let taken: HashSet<u64> = self.nodes.iter().map(|n| n.id.0).collect();
		(1..)
			.find(|id| !taken.contains(id))
			.map_or(NodeId(1), NodeId)
	}

	/// Appends a child of `selected` (or of the first node) and returns a copy of it.
	///
	/// `random` must yield values in `[0, 1)`; it only drives the horizontal jitter.
	pub fn add_node(
		&mut self,
		selected: Option<NodeId>,
		mut random: impl FnMut() -> f64,
	) -> TreeNode {
		let id = self.next_id();
		let parent = selected
			.and_then(|sel| self.get(sel))
			.or_else(|| self.nodes.first());
		let (x, y, parent) = match parent {
			Some(p) => (
				p.x + random() * 2.0 * CHILD_JITTER_X - CHILD_JITTER_X,
				p.y + CHILD_OFFSET_Y,
				Some(p.id),
			),
			None => (DEFAULT_POSITION.0, DEFAULT_POSITION.1, None),
		};
		let node = TreeNode::new(id, id.to_string(), x, y, parent);
		self.nodes.push(node.clone());
		node
	}

	/// Removes `id` and promotes its direct children to its parent.
	pub fn delete_node(&mut self, id: NodeId) -> Option<DeletedNode> {
		let index = self.nodes.iter().position(|n| n.id == id)?;
		let node = self.nodes.remove(index);
		let mut reparented = Vec::new();
		for child in self.nodes.iter_mut().filter(|n| n.parent == Some(id)) {
			child.parent = node.parent;
			reparented.push(child.id);
		}
		Some(DeletedNode {
			node,
			index,
			reparented,
		})
	}

	/// Undoes a `delete_node`. Returns false when the id has been taken again.
	pub fn restore(&mut self, deleted: &DeletedNode) -> bool {
		let id = deleted.node.id;
		if self.contains(id) {
			return false;
		}
		let mut node = deleted.node.clone();
		if let Some(parent) = node.parent {
			if !self.contains(parent) {
				node.parent = None;
			}
		}
		let promoted_to = deleted.node.parent;
		for child in self
			.nodes
			.iter_mut()
			.filter(|n| n.parent == promoted_to && deleted.reparented.contains(&n.id))
		{
			child.parent = Some(id);
		}
		let index = deleted.index.min(self.nodes.len());
		self.nodes.insert(index, node);
		true
	}

	pub fn rename_node(&mut self, id: NodeId, label: impl Into<String>) -> bool {
		match self.get_mut(id) {
			Some(node) => {
				node.label = label.into();
				true
			}
			None => false,
		}
	}

	pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) -> bool {
		match self.get_mut(id) {
			Some(node) => {
				node.x = x;
				node.y = y;
				true
			}
			None => false,
		}
	}

	/// `(parent, child)` pairs for every resolved parent reference.
	pub fn edges(&self) -> impl Iterator<Item = (&TreeNode, &TreeNode)> {
		self.nodes
			.iter()
			.filter_map(|child| Some((self.get(child.parent?)?, child)))
	}

	/// Topmost node under a canvas position. Later nodes are drawn above earlier ones.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<NodeId> {
		self.nodes
			.iter()
			.rev()
			.find(|n| {
				let (dx, dy) = (n.x - x, n.y - y);
				(dx * dx + dy * dy).sqrt() <= NODE_RADIUS
			})
			.map(|n| n.id)
	}
}

fn lies_on_cycle(parents: &HashMap<NodeId, Option<NodeId>>, start: NodeId) -> bool {
	let mut current = parents.get(&start).copied().flatten();
	for _ in 0..parents.len() {
		match current {
			Some(id) if id == start => return true,
			Some(id) => current = parents.get(&id).copied().flatten(),
			None => return false,
		}
	}
	false
}

/// Selection, drag and label-edit slots. Each holds at most one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
	pub selected: Option<NodeId>,
	pub dragging: Option<NodeId>,
	pub editing: Option<NodeId>,
}

impl ViewState {
	pub fn pointer_down(&mut self, hit: Option<NodeId>) {
		if let Some(id) = hit {
			self.selected = Some(id);
			self.dragging = Some(id);
		}
	}

	pub fn pointer_move(&self, tree: &mut TreeState, x: f64, y: f64) -> bool {
		match self.dragging {
			Some(id) => tree.move_node(id, x, y),
			None => false,
		}
	}

	pub fn pointer_up(&mut self) {
		self.dragging = None;
	}

	pub fn double_click(&mut self, hit: Option<NodeId>) {
		if let Some(id) = hit {
			self.editing = Some(id);
		}
	}

	/// Applies the edited label and leaves edit mode. Returns the renamed node.
	pub fn commit_edit(&mut self, tree: &mut TreeState, label: &str) -> Option<NodeId> {
		let id = self.editing.take()?;
		tree.rename_node(id, label).then_some(id)
	}

	pub fn cancel_edit(&mut self) {
		self.editing = None;
	}

	/// Clears every slot that still points at a removed node.
	pub fn forget(&mut self, id: NodeId) {
		for slot in [&mut self.selected, &mut self.dragging, &mut self.editing] {
			if *slot == Some(id) {
				*slot = None;
			}
		}
	}
}

/// Everything the canvas component mutates from its event handlers.
#[derive(Clone, Debug)]
pub struct TreeCanvasState {
	pub tree: TreeState,
	pub view: ViewState,
	pub project: Option<String>,
	pub width: f64,
	pub height: f64,
}

impl TreeCanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			tree: TreeState::new(),
			view: ViewState::default(),
			project: None,
			width,
			height,
		}
	}

	/// Switches to another project with the given starting nodes.
	pub fn open_project(&mut self, project: impl Into<String>, tree: TreeState) {
		self.project = Some(project.into());
		self.tree = tree;
		self.view = ViewState::default();
	}

	pub fn is_active(&self, project: &str) -> bool {
		self.project.as_deref() == Some(project)
	}

	/// Replaces the node set wholesale with a remote listing.
	pub fn replace_from_remote(
		&mut self,
		remote: Vec<RemoteNode>,
		random: impl FnMut() -> f64,
	) -> Vec<Repair> {
		let (tree, repairs) = TreeState::from_remote(remote, self.width, self.height, random);
		self.tree = tree;
		self.view = ViewState::default();
		repairs
	}

	pub fn add_node(&mut self, random: impl FnMut() -> f64) -> TreeNode {
		self.tree.add_node(self.view.selected, random)
	}

	pub fn delete_selected(&mut self) -> Option<DeletedNode> {
		let id = self.view.selected.take()?;
		let deleted = self.tree.delete_node(id)?;
		self.view.forget(id);
		Some(deleted)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
