use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{NODE_RADIUS, TreeCanvasState};
use super::types::TreeNode;

const BACKGROUND: (&str, &str) = ("#f8f9fa", "#f1f3f6");
const EDGE_COLORS: (&str, &str) = ("#74b9ff", "#a29bfe");
const NODE_COLORS: (&str, &str) = ("#dfe6e9", "#b2bec3");
const SELECTED_COLORS: (&str, &str) = ("#a29bfe", "#81ecec");

pub fn render(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	let background = ctx.create_linear_gradient(0.0, 0.0, state.width, state.height);
	let _ = background.add_color_stop(0.0, BACKGROUND.0);
	let _ = background.add_color_stop(1.0, BACKGROUND.1);
	#[allow(deprecated)]
	ctx.set_fill_style(&background);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_edges(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(3.0);
	ctx.set_global_alpha(0.9);
	for (parent, child) in state.tree.edges() {
		let gradient = ctx.create_linear_gradient(parent.x, parent.y, child.x, child.y);
		let _ = gradient.add_color_stop(0.0, EDGE_COLORS.0);
		let _ = gradient.add_color_stop(1.0, EDGE_COLORS.1);
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.begin_path();
		ctx.move_to(parent.x, parent.y);
		ctx.line_to(child.x, child.y);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &TreeCanvasState, ctx: &CanvasRenderingContext2d) {
	for node in state.tree.nodes() {
		let selected = state.view.selected == Some(node.id);
		draw_node(node, selected, ctx);
		// The edit input sits on top of the node while its label is being changed.
		if state.view.editing != Some(node.id) {
			ctx.set_fill_style_str("#2d3436");
			ctx.set_font("600 14px sans-serif");
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let _ = ctx.fill_text(&node.label, node.x, node.y);
		}
	}
}

fn draw_node(node: &TreeNode, selected: bool, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (node.x, node.y);
	let colors = if selected { SELECTED_COLORS } else { NODE_COLORS };

	if selected {
		let glow = ctx.create_radial_gradient(x, y, NODE_RADIUS * 0.8, x, y, NODE_RADIUS * 1.6);
		if let Ok(glow) = glow {
			let _ = glow.add_color_stop(0.0, "rgba(162, 155, 254, 0.8)");
			let _ = glow.add_color_stop(1.0, "rgba(162, 155, 254, 0)");
			ctx.begin_path();
			let _ = ctx.arc(x, y, NODE_RADIUS * 1.6, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&glow);
			ctx.fill();
		}
	}

	let fill = ctx.create_linear_gradient(
		x - NODE_RADIUS,
		y - NODE_RADIUS,
		x + NODE_RADIUS,
		y + NODE_RADIUS,
	);
	let _ = fill.add_color_stop(0.0, colors.0);
	let _ = fill.add_color_stop(1.0, colors.1);
	ctx.begin_path();
	let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&fill);
	ctx.fill();

	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
	ctx.set_line_width(2.0);
	ctx.stroke();
}
