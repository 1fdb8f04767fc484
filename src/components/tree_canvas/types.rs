use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
	/// Reserved so `max + 1` id allocation can never wrap.
	pub const MAX: NodeId = NodeId(u64::MAX);
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl FromStr for NodeId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim().parse().map(NodeId)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
	pub id: NodeId,
	pub label: String,
	pub x: f64,
	pub y: f64,
	pub parent: Option<NodeId>,
}

impl TreeNode {
	pub fn new(
		id: NodeId,
		label: impl Into<String>,
		x: f64,
		y: f64,
		parent: Option<NodeId>,
	) -> Self {
		Self {
			id,
			label: label.into(),
			x,
			y,
			parent,
		}
	}
}

/// A node as returned by `GET /nodes`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RemoteNode {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub parent_id: Option<String>,
	#[serde(default)]
	pub x: Option<f64>,
	#[serde(default)]
	pub y: Option<f64>,
}

/// Body of `POST /nodes`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateNodeBody {
	pub id: String,
	pub label: String,
	pub parent_id: Option<String>,
}

impl From<&TreeNode> for CreateNodeBody {
	fn from(node: &TreeNode) -> Self {
		Self {
			id: node.id.to_string(),
			label: node.label.clone(),
			parent_id: node.parent.map(|p| p.to_string()),
		}
	}
}
