use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, FocusEvent, HtmlCanvasElement, KeyboardEvent, MouseEvent,
};

use super::render;
use super::state::{NODE_SIZE, TreeCanvasState};
use super::sync::{HttpNodeStore, Mutation, SyncStatus, Synchronizer};
use super::types::NodeId;
use crate::config::EditorConfig;
use crate::projects::Activation;

const LABEL_INPUT_WIDTH: f64 = NODE_SIZE * 0.8;

#[derive(Clone, Debug, PartialEq)]
struct LabelEdit {
	id: NodeId,
	text: String,
	x: f64,
	y: f64,
}

fn status_line(status: &SyncStatus) -> String {
	match (status.pending, &status.last_error) {
		(0, None) => String::new(),
		(0, Some(err)) => format!("Last sync failed: {err}"),
		(n, _) => format!("Saving {n} change{}", if n == 1 { "" } else { "s" }),
	}
}

fn container_size(canvas: &HtmlCanvasElement, config: &EditorConfig) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((config.canvas_width, config.canvas_height))
}

#[component]
pub fn TreeCanvas(#[prop(into)] activation: Signal<Option<Activation>>) -> impl IntoView {
	let config = use_context::<EditorConfig>().unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let input_ref = NodeRef::<leptos::html::Input>::new();
	let state = Rc::new(RefCell::new(TreeCanvasState::new(
		config.canvas_width,
		config.canvas_height,
	)));
	let status = RwSignal::new(SyncStatus::default());
	let edit = RwSignal::new(None::<LabelEdit>);
	let synchronizer = Synchronizer::new(
		state.clone(),
		Rc::new(HttpNodeStore::new(config.api_url.clone())),
		config.retry,
	)
	.on_status(move |snapshot: &SyncStatus| status.set(snapshot.clone()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = container_size(&canvas, &config);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		state_init.borrow_mut().resize(w, h);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let (state_resize, canvas_resize, config_resize) =
			(state_init.clone(), canvas.clone(), config.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize, &config_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			render::render(&state_anim.borrow(), &ctx);
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let synchronizer_activate = synchronizer.clone();
	Effect::new(move |_| {
		if let Some(next) = activation.get() {
			edit.set(None);
			synchronizer_activate.activate(next);
		}
	});

	Effect::new(move |_| {
		if edit.with(Option::is_some) {
			if let Some(input) = input_ref.get() {
				let _ = input.focus();
				input.select();
			}
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut s = state_md.borrow_mut();
		let hit = s.tree.node_at_position(x, y);
		s.view.pointer_down(hit);
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut guard = state_mm.borrow_mut();
		let s = &mut *guard;
		s.view.pointer_move(&mut s.tree, x, y);
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| state_mu.borrow_mut().view.pointer_up();

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| state_ml.borrow_mut().view.pointer_up();

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut s = state_dc.borrow_mut();
		let hit = s.tree.node_at_position(x, y);
		s.view.double_click(hit);
		if let Some(node) = hit.and_then(|id| s.tree.get(id)) {
			edit.set(Some(LabelEdit {
				id: node.id,
				text: node.label.clone(),
				x: node.x,
				y: node.y,
			}));
		}
	};

	let state_commit = state.clone();
	let commit = Rc::new(move |text: String| {
		let mut guard = state_commit.borrow_mut();
		let s = &mut *guard;
		if let Some(id) = s.view.commit_edit(&mut s.tree, &text) {
			debug!("renamed node {id} to {text:?}");
		}
		edit.set(None);
	});
	let commit_blur = commit.clone();
	let on_blur = move |ev: FocusEvent| commit_blur(event_target_value(&ev));

	let state_cancel = state.clone();
	let on_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
		"Enter" => commit(event_target_value(&ev)),
		"Escape" => {
			state_cancel.borrow_mut().view.cancel_edit();
			edit.set(None);
		}
		_ => {}
	};

	let (state_add, synchronizer_add) = (state.clone(), synchronizer.clone());
	let on_add = move |_: MouseEvent| {
		let node = state_add.borrow_mut().add_node(js_sys::Math::random);
		debug!("added node {} under {:?}", node.id, node.parent);
		synchronizer_add.push(Mutation::Create(node));
	};

	let (state_del, synchronizer_del) = (state.clone(), synchronizer.clone());
	let on_delete = move |_: MouseEvent| {
		let deleted = state_del.borrow_mut().delete_selected();
		let Some(deleted) = deleted else {
			return;
		};
		debug!(
			"deleted node {}, reparented {:?} to {:?}",
			deleted.node.id, deleted.reparented, deleted.node.parent
		);
		if edit.with_untracked(|e| e.as_ref().map(|e| e.id)) == Some(deleted.node.id) {
			edit.set(None);
		}
		synchronizer_del.push(Mutation::Delete(deleted));
	};

	let no_project = move || activation.with(Option::is_none);

	view! {
		<div class="tree-canvas" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="tree-canvas-surface"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				style="display: block; cursor: grab; border-radius: 16px;"
			/>
			<input
				node_ref=input_ref
				type="text"
				class="tree-canvas-label-input"
				prop:value=move || edit.get().map(|e| e.text).unwrap_or_default()
				on:blur=on_blur
				on:keydown=on_keydown
				style=move || match edit.get() {
					Some(e) => format!(
						"position: absolute; left: {}px; top: {}px; width: {}px; text-align: center; border: none; border-radius: 8px; outline: none; font-size: 14px;",
						e.x - LABEL_INPUT_WIDTH / 2.0,
						e.y - 10.0,
						LABEL_INPUT_WIDTH,
					),
					None => "display: none;".to_string(),
				}
			/>
			<div
				class="tree-canvas-actions"
				style="position: absolute; bottom: 30px; right: 30px; display: flex; gap: 12px; z-index: 10;"
			>
				<button class="tree-canvas-button" title="Add node" prop:disabled=no_project on:click=on_add>
					"+"
				</button>
				<button class="tree-canvas-button" title="Delete selected node" prop:disabled=no_project on:click=on_delete>
					"-"
				</button>
			</div>
			<p class="tree-canvas-status">{move || status_line(&status.get())}</p>
		</div>
	}
}
