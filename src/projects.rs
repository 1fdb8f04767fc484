//! The in-memory project list behind the sidebar.

use uuid::Uuid;

use crate::components::tree_canvas::{NodeId, TreeNode, TreeState};

/// One tree diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
	/// UUID v4 string, also sent to the node store as `project_id`.
	pub id: String,
	/// Display name in the sidebar.
	pub name: String,
}

impl Project {
	/// The node set a freshly created project starts with.
	pub fn starter_tree() -> TreeState {
		let (tree, _) = TreeState::from_nodes(vec![TreeNode::new(
			NodeId(1),
			"1",
			400.0,
			100.0,
			None,
		)]);
		tree
	}
}

/// How the active project was reached, which decides how the canvas fills itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
	/// Just created: seed the starter tree and push its root.
	Created(Project),
	/// Picked from the list: load nodes from the store.
	Selected(Project),
}

impl Activation {
	/// The project being activated.
	pub fn project(&self) -> &Project {
		match self {
			Activation::Created(p) | Activation::Selected(p) => p,
		}
	}
}

/// Projects in creation order plus the active one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectList {
	projects: Vec<Project>,
	active: Option<String>,
}

impl ProjectList {
	/// All projects in creation order.
	pub fn projects(&self) -> &[Project] {
		&self.projects
	}

	/// Id of the active project.
	pub fn active(&self) -> Option<&str> {
		self.active.as_deref()
	}

	/// Adds a project named after its position and makes it active.
	pub fn create(&mut self) -> Activation {
		let project = Project {
			id: Uuid::new_v4().to_string(),
			name: format!("Project {}", self.projects.len() + 1),
		};
		self.projects.push(project.clone());
		self.active = Some(project.id.clone());
		Activation::Created(project)
	}

	/// Makes `id` active. Unknown ids leave the list untouched.
	pub fn select(&mut self, id: &str) -> Option<Activation> {
		let project = self.projects.iter().find(|p| p.id == id)?.clone();
		self.active = Some(project.id.clone());
		Some(Activation::Selected(project))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn create_names_sequentially_and_activates() {
		let mut list = ProjectList::default();
		let first = list.create();
		let second = list.create();
		assert!(matches!(first, Activation::Created(_)));
		assert_eq!(first.project().name, "Project 1");
		assert_eq!(second.project().name, "Project 2");
		assert_ne!(first.project().id, second.project().id);
		assert_eq!(list.active(), Some(second.project().id.as_str()));
		assert_eq!(list.projects().len(), 2);
	}

	#[test]
	fn select_switches_active_project() {
		let mut list = ProjectList::default();
		let first = list.create().project().clone();
		list.create();
		let activation = list.select(&first.id).unwrap();
		assert_eq!(activation, Activation::Selected(first.clone()));
		assert_eq!(list.active(), Some(first.id.as_str()));
		assert!(list.select("missing").is_none());
		assert_eq!(list.active(), Some(first.id.as_str()));
	}

	#[test]
	fn starter_tree_is_a_single_root() {
		let tree = Project::starter_tree();
		assert_eq!(tree.len(), 1);
		assert_eq!(tree.nodes()[0].id, NodeId(1));
		assert_eq!(tree.nodes()[0].parent, None);
	}
}
