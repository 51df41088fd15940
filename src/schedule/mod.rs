pub mod change;
pub mod confirm;
pub mod drag;
pub mod engine;
pub mod lanes;
pub mod layout;
pub mod pending;
pub mod time;

pub use change::{Edit, Mutation};
pub use confirm::{ChangeRequest, ConfirmationWorkflow, REASONS};
pub use drag::{DragGesture, DragSession, GestureState, Release};
pub use engine::{GanttEngine, PointerOutcome};
pub use layout::{CellIndex, CellKey, GanttLayout, LayoutOptions};
pub use pending::{PendingUpdate, UpdateCoordinator};
