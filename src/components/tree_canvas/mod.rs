mod component;
mod render;
mod state;
mod sync;
mod types;

pub use component::TreeCanvas;
pub use state::TreeState;
pub use sync::RetryPolicy;
pub use types::{NodeId, TreeNode};
