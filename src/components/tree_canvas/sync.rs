//! Delivery of local tree mutations to the remote node store.
//!
//! Mutations are applied to the canvas first and then pushed to the store. A push
//! that keeps failing after [`RetryPolicy::max_attempts`] tries is rolled back
//! locally. Renames and moves never leave the browser.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use log::{debug, error, info, warn};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::state::{DeletedNode, TreeCanvasState, TreeState};
use super::types::{CreateNodeBody, NodeId, RemoteNode, TreeNode};
use crate::projects::{Activation, Project};

#[derive(Debug, Error)]
pub enum SyncError {
	#[error("network error: {0}")]
	Network(String),

	#[error("{url} responded with status {status}")]
	Status { status: u16, url: String },

	#[error("failed to decode response: {0}")]
	Decode(String),

	#[error("failed to encode request: {0}")]
	Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// The node store behind `GET/POST/DELETE /nodes`.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
	async fn list_nodes(&self, project: &str) -> Result<Vec<RemoteNode>>;
	async fn create_node(&self, body: &CreateNodeBody) -> Result<()>;
	async fn delete_node(&self, id: NodeId) -> Result<()>;
}

/// A local change that has to reach the remote store.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
	Create(TreeNode),
	Delete(DeletedNode),
}

impl fmt::Display for Mutation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Mutation::Create(node) => write!(f, "create node {}", node.id),
			Mutation::Delete(deleted) => write!(f, "delete node {}", deleted.node.id),
		}
	}
}

impl Mutation {
	pub async fn send<S: RemoteStore>(&self, store: &S) -> Result<()> {
		match self {
			Mutation::Create(node) => store.create_node(&CreateNodeBody::from(node)).await,
			Mutation::Delete(deleted) => store.delete_node(deleted.node.id).await,
		}
	}

	/// Reverts the optimistic local change. Returns false if there was nothing to revert.
	pub fn rollback(&self, state: &mut TreeCanvasState) -> bool {
		match self {
			Mutation::Create(node) => match state.tree.delete_node(node.id) {
				Some(_) => {
					state.view.forget(node.id);
					true
				}
				None => false,
			},
			Mutation::Delete(deleted) => state.tree.restore(deleted),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub base_delay_ms: u32,
	pub max_delay_ms: u32,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay_ms: 250,
			max_delay_ms: 4000,
		}
	}
}

impl RetryPolicy {
	/// Delay after the failed attempt `attempt` (0-based).
	pub fn delay_for(&self, attempt: u32) -> u32 {
		let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
		self.base_delay_ms
			.saturating_mul(factor)
			.min(self.max_delay_ms)
	}
}

/// Sends `mutation` until it succeeds or the policy runs out of attempts.
///
/// Returns the number of attempts used on success, the last error otherwise.
pub async fn deliver<S, F, Fut>(
	store: &S,
	mutation: &Mutation,
	policy: &RetryPolicy,
	mut sleep: F,
) -> Result<u32>
where
	S: RemoteStore,
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = ()>,
{
	let max_attempts = policy.max_attempts.max(1);
	let mut attempt = 0;
	loop {
		match mutation.send(store).await {
			Ok(()) => return Ok(attempt + 1),
			Err(err) => {
				attempt += 1;
				if attempt >= max_attempts {
					return Err(err);
				}
				let delay = policy.delay_for(attempt - 1);
				warn!(
					"{mutation} failed (attempt {attempt}/{max_attempts}), retrying in {delay}ms: {err}"
				);
				sleep(delay).await;
			}
		}
	}
}

/// Outstanding pushes and the most recent failure, shown in the canvas overlay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncStatus {
	pub pending: usize,
	pub last_error: Option<String>,
}

impl SyncStatus {
	pub fn begin(&mut self) {
		self.pending += 1;
	}

	pub fn succeeded(&mut self) {
		self.pending = self.pending.saturating_sub(1);
	}

	pub fn failed(&mut self, message: impl Into<String>) {
		self.pending = self.pending.saturating_sub(1);
		self.last_error = Some(message.into());
	}
}

/// A background job handed to the spawner.
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Owns the canvas state and pushes its mutations to the node store.
///
/// Loads and pushes run as spawned tasks; by default they go to the browser's
/// microtask queue and wait out retries on `setTimeout`.
pub struct Synchronizer<S> {
	state: Rc<RefCell<TreeCanvasState>>,
	store: Rc<S>,
	retry: RetryPolicy,
	status: Rc<RefCell<SyncStatus>>,
	on_status: Rc<dyn Fn(&SyncStatus)>,
	spawn: Rc<dyn Fn(LocalTask)>,
	sleep: Rc<dyn Fn(u32) -> LocalTask>,
	random: fn() -> f64,
}

impl<S> Clone for Synchronizer<S> {
	fn clone(&self) -> Self {
		Self {
			state: self.state.clone(),
			store: self.store.clone(),
			retry: self.retry,
			status: self.status.clone(),
			on_status: self.on_status.clone(),
			spawn: self.spawn.clone(),
			sleep: self.sleep.clone(),
			random: self.random,
		}
	}
}

impl<S: RemoteStore + 'static> Synchronizer<S> {
	pub fn new(state: Rc<RefCell<TreeCanvasState>>, store: Rc<S>, retry: RetryPolicy) -> Self {
		Self {
			state,
			store,
			retry,
			status: Rc::new(RefCell::new(SyncStatus::default())),
			on_status: Rc::new(|_: &SyncStatus| {}),
			spawn: Rc::new(|task: LocalTask| wasm_bindgen_futures::spawn_local(task)),
			sleep: Rc::new(|ms| -> LocalTask { Box::pin(sleep_ms(ms)) }),
			random: js_sys::Math::random,
		}
	}

	/// Called with a snapshot every time the pending count or last error changes.
	pub fn on_status(mut self, callback: impl Fn(&SyncStatus) + 'static) -> Self {
		self.on_status = Rc::new(callback);
		self
	}

	pub fn with_spawner(mut self, spawn: impl Fn(LocalTask) + 'static) -> Self {
		self.spawn = Rc::new(spawn);
		self
	}

	pub fn with_sleep(mut self, sleep: impl Fn(u32) -> LocalTask + 'static) -> Self {
		self.sleep = Rc::new(sleep);
		self
	}

	pub fn with_random(mut self, random: fn() -> f64) -> Self {
		self.random = random;
		self
	}

	pub fn status(&self) -> SyncStatus {
		self.status.borrow().clone()
	}

	fn update_status(&self, apply: impl FnOnce(&mut SyncStatus)) {
		let snapshot = {
			let mut status = self.status.borrow_mut();
			apply(&mut status);
			status.clone()
		};
		(self.on_status)(&snapshot);
	}

	pub fn activate(&self, activation: Activation) {
		match activation {
			Activation::Created(project) => self.start(project),
			Activation::Selected(project) => self.load(project),
		}
	}

	/// Opens a fresh project on its starter tree and pushes the seeded nodes.
	pub fn start(&self, project: Project) {
		info!("created project {} ({})", project.name, project.id);
		let tree = Project::starter_tree();
		let seeded = tree.nodes().to_vec();
		self.state.borrow_mut().open_project(project.id, tree);
		for node in seeded {
			self.push(Mutation::Create(node));
		}
	}

	/// Opens `project` empty and fills it from the store once the listing arrives.
	pub fn load(&self, project: Project) {
		self.state
			.borrow_mut()
			.open_project(project.id.clone(), TreeState::new());
		let this = self.clone();
		(self.spawn)(Box::pin(async move {
			match this.store.list_nodes(&project.id).await {
				Ok(remote) => {
					let mut s = this.state.borrow_mut();
					if !s.is_active(&project.id) {
						debug!("discarding nodes for inactive project {}", project.id);
						return;
					}
					let received = remote.len();
					for repair in s.replace_from_remote(remote, this.random) {
						warn!("project {}: {repair}", project.name);
					}
					if s.tree.is_empty() {
						info!("project {} has no nodes yet", project.name);
					} else {
						info!(
							"loaded {} of {received} nodes for project {}",
							s.tree.len(),
							project.name
						);
					}
				}
				Err(err) => error!("failed to load nodes for project {}: {err}", project.id),
			}
		}));
	}

	/// Sends `mutation` in the background, rolling it back if every attempt fails.
	pub fn push(&self, mutation: Mutation) {
		let Some(project) = self.state.borrow().project.clone() else {
			debug!("no active project, keeping {mutation} local");
			return;
		};
		self.update_status(SyncStatus::begin);
		let this = self.clone();
		(self.spawn)(Box::pin(async move {
			let sleep = this.sleep.clone();
			match deliver(&*this.store, &mutation, &this.retry, |ms| sleep(ms)).await {
				Ok(attempts) => {
					debug!("{mutation} delivered after {attempts} attempt(s)");
					this.update_status(SyncStatus::succeeded);
				}
				Err(err) => {
					error!("giving up on {mutation}: {err}");
					let rolled_back = {
						let mut s = this.state.borrow_mut();
						s.is_active(&project).then(|| mutation.rollback(&mut s))
					};
					match rolled_back {
						Some(true) => warn!("rolled back {mutation}"),
						Some(false) => {
							warn!("could not roll back {mutation}, the tree has moved on")
						}
						None => debug!("project {project} is no longer open, keeping {mutation}"),
					}
					this.update_status(|st| st.failed(format!("{mutation}: {err}")));
				}
			}
		}));
	}
}

/// [`RemoteStore`] over the browser's `fetch`.
#[derive(Clone, Debug)]
pub struct HttpNodeStore {
	base_url: String,
}

impl HttpNodeStore {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	pub fn nodes_url(&self) -> String {
		format!("{}/nodes", self.base_url)
	}

	async fn fetch(&self, method: &str, url: &str, body: Option<String>) -> Result<Response> {
		let opts = RequestInit::new();
		opts.set_method(method);
		opts.set_mode(RequestMode::Cors);
		let has_body = body.is_some();
		if let Some(body) = body {
			opts.set_body(&JsValue::from_str(&body));
		}
		let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
		if has_body {
			request
				.headers()
				.set("Content-Type", "application/json")
				.map_err(js_error)?;
		}

		let window =
			web_sys::window().ok_or_else(|| SyncError::Network("no window available".into()))?;
		let value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(js_error)?;
		let response: Response = value.dyn_into().map_err(js_error)?;
		if !response.ok() {
			return Err(SyncError::Status {
				status: response.status(),
				url: url.to_string(),
			});
		}
		Ok(response)
	}
}

impl RemoteStore for HttpNodeStore {
	async fn list_nodes(&self, project: &str) -> Result<Vec<RemoteNode>> {
		let project: String = js_sys::encode_uri_component(project).into();
		let url = format!("{}?project_id={project}", self.nodes_url());
		let response = self.fetch("GET", &url, None).await?;
		let text = JsFuture::from(response.text().map_err(js_error)?)
			.await
			.map_err(js_error)?
			.as_string()
			.ok_or_else(|| SyncError::Decode("response body is not text".into()))?;
		serde_json::from_str(&text).map_err(|e| SyncError::Decode(e.to_string()))
	}

	async fn create_node(&self, body: &CreateNodeBody) -> Result<()> {
		let json = serde_json::to_string(body)?;
		self.fetch("POST", &self.nodes_url(), Some(json)).await?;
		Ok(())
	}

	async fn delete_node(&self, id: NodeId) -> Result<()> {
		let url = format!("{}/{id}", self.nodes_url());
		self.fetch("DELETE", &url, None).await?;
		Ok(())
	}
}

fn js_error(value: JsValue) -> SyncError {
	SyncError::Network(
		value
			.as_string()
			.unwrap_or_else(|| format!("{value:?}")),
	)
}

/// Resolves after `ms` milliseconds on the browser timer queue.
pub async fn sleep_ms(ms: u32) {
	let promise = js_sys::Promise::new(&mut |resolve, _reject| {
		let scheduled = web_sys::window().and_then(|window| {
			window
				.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
				.ok()
		});
		if scheduled.is_none() {
			let _ = resolve.call0(&JsValue::NULL);
		}
	});
	let _ = JsFuture::from(promise).await;
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};

	use futures::executor::block_on;

	use super::*;

	/// In-memory store failing the first `failures` calls.
	#[derive(Default)]
	struct FlakyStore {
		failures: Cell<u32>,
		calls: Cell<u32>,
		created: RefCell<Vec<CreateNodeBody>>,
		deleted: RefCell<Vec<NodeId>>,
		listing: RefCell<Vec<RemoteNode>>,
	}

	impl FlakyStore {
		fn failing(times: u32) -> Self {
			let store = Self::default();
			store.failures.set(times);
			store
		}

		fn attempt(&self) -> Result<()> {
			self.calls.set(self.calls.get() + 1);
			if self.failures.get() > 0 {
				self.failures.set(self.failures.get() - 1);
				return Err(SyncError::Status {
					status: 503,
					url: "/nodes".into(),
				});
			}
			Ok(())
		}
	}

	impl RemoteStore for FlakyStore {
		async fn list_nodes(&self, _project: &str) -> Result<Vec<RemoteNode>> {
			self.attempt()?;
			Ok(self.listing.borrow().clone())
		}

		async fn create_node(&self, body: &CreateNodeBody) -> Result<()> {
			self.attempt()?;
			self.created.borrow_mut().push(body.clone());
			Ok(())
		}

		async fn delete_node(&self, id: NodeId) -> Result<()> {
			self.attempt()?;
			self.deleted.borrow_mut().push(id);
			Ok(())
		}
	}

	fn canvas_with(nodes: Vec<TreeNode>) -> TreeCanvasState {
		let mut state = TreeCanvasState::new(800.0, 600.0);
		let (tree, _) = TreeState::from_nodes(nodes);
		state.open_project("p", tree);
		state
	}

	fn node(id: u64, parent: Option<u64>) -> TreeNode {
		TreeNode::new(NodeId(id), id.to_string(), 0.0, 0.0, parent.map(NodeId))
	}

	fn remote(id: &str, parent: Option<&str>) -> RemoteNode {
		RemoteNode {
			id: id.into(),
			label: format!("n{id}"),
			parent_id: parent.map(str::to_string),
			x: None,
			y: None,
		}
	}

	fn project(id: &str) -> Project {
		Project {
			id: id.into(),
			name: id.to_uppercase(),
		}
	}

	/// Spawner that parks tasks until `run` drains them in order.
	#[derive(Clone, Default)]
	struct TaskQueue(Rc<RefCell<Vec<LocalTask>>>);

	impl TaskQueue {
		fn spawner(&self) -> impl Fn(LocalTask) + 'static {
			let queue = self.0.clone();
			move |task| queue.borrow_mut().push(task)
		}

		fn len(&self) -> usize {
			self.0.borrow().len()
		}

		fn run(&self) {
			loop {
				let next = {
					let mut queue = self.0.borrow_mut();
					(!queue.is_empty()).then(|| queue.remove(0))
				};
				match next {
					Some(task) => block_on(task),
					None => break,
				}
			}
		}
	}

	fn synchronizer(
		store: Rc<FlakyStore>,
		queue: &TaskQueue,
	) -> (Synchronizer<FlakyStore>, Rc<RefCell<TreeCanvasState>>) {
		let state = Rc::new(RefCell::new(TreeCanvasState::new(800.0, 600.0)));
		let sync = Synchronizer::new(state.clone(), store, RetryPolicy::default())
			.with_spawner(queue.spawner())
			.with_sleep(|_| -> LocalTask { Box::pin(async {}) })
			.with_random(|| 0.5);
		(sync, state)
	}

	fn ids(state: &RefCell<TreeCanvasState>) -> Vec<(u64, Option<u64>)> {
		state
			.borrow()
			.tree
			.nodes()
			.iter()
			.map(|n| (n.id.0, n.parent.map(|p| p.0)))
			.collect()
	}

	#[test]
	fn backoff_doubles_and_caps() {
		let policy = RetryPolicy::default();
		let delays: Vec<u32> = (0..6).map(|a| policy.delay_for(a)).collect();
		assert_eq!(delays, vec![250, 500, 1000, 2000, 4000, 4000]);
		assert_eq!(policy.delay_for(40), 4000);
	}

	#[test]
	fn deliver_retries_until_success() {
		let store = FlakyStore::failing(2);
		let slept = RefCell::new(Vec::new());
		let mutation = Mutation::Create(node(1, None));
		let attempts = block_on(deliver(&store, &mutation, &RetryPolicy::default(), |ms| {
			slept.borrow_mut().push(ms);
			async {}
		}))
		.unwrap();
		assert_eq!(attempts, 3);
		assert_eq!(*slept.borrow(), vec![250, 500]);
		assert_eq!(store.created.borrow().len(), 1);
		assert_eq!(store.created.borrow()[0].id, "1");
	}

	#[test]
	fn deliver_gives_up_after_max_attempts() {
		let store = FlakyStore::failing(10);
		let mutation = Mutation::Create(node(1, None));
		let result = block_on(deliver(&store, &mutation, &RetryPolicy::default(), |_| async {}));
		assert!(matches!(result, Err(SyncError::Status { status: 503, .. })));
		assert_eq!(store.calls.get(), 3);
	}

	#[test]
	fn zero_attempt_policy_still_tries_once() {
		let store = FlakyStore::default();
		let policy = RetryPolicy {
			max_attempts: 0,
			..RetryPolicy::default()
		};
		let mut state = canvas_with(vec![node(1, None), node(2, Some(1))]);
		let deleted = state.tree.delete_node(NodeId(2)).unwrap();
		let attempts =
			block_on(deliver(&store, &Mutation::Delete(deleted), &policy, |_| async {})).unwrap();
		assert_eq!(attempts, 1);
		assert_eq!(*store.deleted.borrow(), vec![NodeId(2)]);
	}

	#[test]
	fn rollback_create_promotes_children_of_the_phantom_node() {
		let mut state = canvas_with(vec![node(1, None)]);
		let added = state.add_node(|| 0.5);
		state.view.pointer_down(Some(added.id));
		let child = state.add_node(|| 0.5);
		assert_eq!(child.parent, Some(added.id));

		assert!(Mutation::Create(added.clone()).rollback(&mut state));
		assert!(!state.tree.contains(added.id));
		assert_eq!(state.tree.get(child.id).unwrap().parent, Some(NodeId(1)));
		assert_eq!(state.view.selected, None);
		assert!(!Mutation::Create(added).rollback(&mut state));
	}

	#[test]
	fn rollback_delete_restores_node_and_children() {
		let mut state = canvas_with(vec![node(1, None), node(2, Some(1)), node(3, Some(2))]);
		let before = state.tree.clone();
		state.view.pointer_down(Some(NodeId(2)));
		let deleted = state.delete_selected().unwrap();
		assert_eq!(state.tree.get(NodeId(3)).unwrap().parent, Some(NodeId(1)));

		assert!(Mutation::Delete(deleted).rollback(&mut state));
		assert_eq!(state.tree, before);
	}

	#[test]
	fn status_tracks_pending_and_failures() {
		let mut status = SyncStatus::default();
		status.begin();
		status.begin();
		status.succeeded();
		status.failed("boom");
		assert_eq!(status.pending, 0);
		assert_eq!(status.last_error.as_deref(), Some("boom"));
		status.succeeded();
		assert_eq!(status.pending, 0);
	}

	#[test]
	fn load_replaces_tree_with_repaired_listing() {
		let store = Rc::new(FlakyStore::default());
		store.listing.borrow_mut().extend([
			remote("1", None),
			remote("2", Some("1")),
			remote("3", Some("9")),
		]);
		let queue = TaskQueue::default();
		let (sync, state) = synchronizer(store, &queue);

		sync.load(project("a"));
		assert!(state.borrow().is_active("a"));
		assert!(state.borrow().tree.is_empty());
		queue.run();

		assert_eq!(ids(&state), vec![(1, None), (2, Some(1)), (3, None)]);
		let root = state.borrow().tree.nodes()[0].clone();
		assert_eq!((root.x, root.y), (400.0, 300.0));
		assert_eq!(root.label, "n1");
	}

	#[test]
	fn failed_load_leaves_project_empty() {
		let store = Rc::new(FlakyStore::failing(1));
		let queue = TaskQueue::default();
		let (sync, state) = synchronizer(store, &queue);
		state
			.borrow_mut()
			.open_project("old", TreeState::from_nodes(vec![node(1, None)]).0);

		sync.load(project("a"));
		queue.run();

		assert!(state.borrow().is_active("a"));
		assert!(state.borrow().tree.is_empty());
		assert_eq!(sync.status(), SyncStatus::default());
	}

	#[test]
	fn load_for_a_project_left_behind_is_discarded() {
		let store = Rc::new(FlakyStore::default());
		store.listing.borrow_mut().push(remote("5", None));
		let queue = TaskQueue::default();
		let (sync, state) = synchronizer(store.clone(), &queue);

		sync.load(project("a"));
		sync.start(project("b"));
		queue.run();

		assert!(state.borrow().is_active("b"));
		assert_eq!(ids(&state), vec![(1, None)]);
		assert_eq!(store.created.borrow().len(), 1);
		assert_eq!(sync.status(), SyncStatus::default());
	}

	#[test]
	fn failed_push_rolls_back_in_the_same_project() {
		let store = Rc::new(FlakyStore::failing(u32::MAX));
		let queue = TaskQueue::default();
		let (sync, state) = synchronizer(store.clone(), &queue);

		sync.start(project("a"));
		let added = state.borrow_mut().add_node(|| 0.5);
		sync.push(Mutation::Create(added));
		queue.run();

		assert!(state.borrow().tree.is_empty());
		assert_eq!(store.calls.get(), 6);
	}

	#[test]
	fn failed_push_does_not_roll_back_after_a_project_switch() {
		let store = Rc::new(FlakyStore::failing(u32::MAX));
		let queue = TaskQueue::default();
		let (sync, state) = synchronizer(store.clone(), &queue);

		sync.start(project("a"));
		let added = state.borrow_mut().add_node(|| 0.5);
		sync.push(Mutation::Create(added));
		let other = TreeState::from_nodes(vec![node(1, None), node(2, Some(1))]).0;
		state.borrow_mut().open_project("b", other);
		queue.run();

		assert!(state.borrow().is_active("b"));
		assert_eq!(ids(&state), vec![(1, None), (2, Some(1))]);
		assert_eq!(store.calls.get(), 6);
		let status = sync.status();
		assert_eq!(status.pending, 0);
		assert_eq!(
			status.last_error.as_deref(),
			Some("create node 2: /nodes responded with status 503")
		);
	}

	#[test]
	fn failed_push_of_a_node_deleted_meanwhile_keeps_the_tree() {
		let store = Rc::new(FlakyStore::failing(3));
		let queue = TaskQueue::default();
		let (sync, state) = synchronizer(store, &queue);

		sync.start(project("a"));
		state.borrow_mut().add_node(|| 0.5);
		state.borrow_mut().view.pointer_down(Some(NodeId(1)));
		assert!(state.borrow_mut().delete_selected().is_some());
		queue.run();

		assert_eq!(ids(&state), vec![(2, None)]);
		let status = sync.status();
		assert_eq!(status.pending, 0);
		assert!(status.last_error.is_some());
	}

	#[test]
	fn status_counts_one_failure_and_one_success() {
		let store = Rc::new(FlakyStore::failing(3));
		let queue = TaskQueue::default();
		let snapshots = Rc::new(RefCell::new(Vec::new()));
		let sink = snapshots.clone();
		let (sync, state) = synchronizer(store.clone(), &queue);
		let sync = sync.on_status(move |status| sink.borrow_mut().push(status.clone()));

		sync.start(project("a"));
		let added = state.borrow_mut().add_node(|| 0.5);
		sync.push(Mutation::Create(added));
		assert_eq!(sync.status().pending, 2);
		queue.run();

		let status = sync.status();
		assert_eq!(status.pending, 0);
		assert_eq!(
			status.last_error.as_deref(),
			Some("create node 1: /nodes responded with status 503")
		);
		let pending: Vec<usize> = snapshots.borrow().iter().map(|s| s.pending).collect();
		assert_eq!(pending, vec![1, 2, 1, 0]);
		assert_eq!(ids(&state), vec![(2, None)]);
		assert_eq!(store.created.borrow().len(), 1);
		assert_eq!(store.created.borrow()[0].id, "2");
	}

	#[test]
	fn push_without_a_project_stays_local() {
		let store = Rc::new(FlakyStore::default());
		let queue = TaskQueue::default();
		let (sync, _state) = synchronizer(store.clone(), &queue);

		sync.push(Mutation::Create(node(1, None)));

		assert_eq!(queue.len(), 0);
		assert_eq!(sync.status(), SyncStatus::default());
		assert_eq!(store.calls.get(), 0);
	}

	#[test]
	fn store_urls_drop_trailing_slash() {
		assert_eq!(
			HttpNodeStore::new("http://localhost:8000/").nodes_url(),
			"http://localhost:8000/nodes"
		);
	}
}
