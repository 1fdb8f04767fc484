pub mod sidebar;
pub mod tree_canvas;
