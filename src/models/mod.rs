//! 数据模型层

pub mod coords;
pub mod cursor;
pub mod document;
pub mod line;
pub mod snapshot;

pub use coords::{
    abs_char_index, coordinate_after_node_childrens, coordinate_after_offset,
    coordinate_at_abs, coordinate_at_line_end, coordinate_at_line_start,
    coordinate_at_node_end, coordinate_at_node_start, offset_between, Coordinate,
};
pub use cursor::{ScriptCursor, SelectionScope, SelectionState};
pub use document::{Document, DocumentError, NodeId, NodeSuppression};
pub use line::LineRef;
pub use snapshot::NodeSnapshot;
