use super::*;
use crate::models::document::Document;

const PAGE: i32 = 1;
const PANEL: i32 = 2;
const CAPTION: i32 = 3;

/// root → page{ panel{ cap1, cap2 }, panel2{ cap3 } }
/// 行序：page(0) panel(1) cap1(2) cap2(3) panel2(4) cap3(5)
fn sample_doc() -> (Document, [crate::models::NodeId; 6]) {
    let mut doc = Document::new();
    let root = doc.root();
    let page = doc.insert_node_below(root, PAGE, -1).unwrap();
    let panel = doc.insert_node_below(page, PANEL, -1).unwrap();
    let cap1 = doc.insert_node_below(panel, CAPTION, -1).unwrap();
    let cap2 = doc.insert_node_below(panel, CAPTION, -1).unwrap();
    let panel2 = doc.insert_node_below(page, PANEL, -1).unwrap();
    let cap3 = doc.insert_node_below(panel2, CAPTION, -1).unwrap();
    let texts = ["page", "panel", "first caption", "second", "panel2", "third"];
    for (line_no, text) in texts.iter().enumerate() {
        let lr = doc.line_at(line_no).unwrap();
        doc.set_line_text(lr, text);
    }
    (doc, [page, panel, cap1, cap2, panel2, cap3])
}

#[test]
fn test_move_clears_selection_and_crosses_lines() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    assert!(cur.set_coordinate(&doc, Coordinate { line: 0, pos: 2 }));
    cur.set_extent(&doc, 3);
    assert_eq!(cur.extent(), 3);

    // "page" 行长 4：+3 越过行尾进入下一行
    cur.move_by(&doc, 3);
    assert_eq!(cur.extent(), 0);
    assert_eq!(cur.coordinate(), Coordinate { line: 1, pos: 0 });
}

#[test]
fn test_move_clamps_at_document_ends() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.move_by(&doc, -10);
    assert_eq!(cur.coordinate(), Coordinate { line: 0, pos: 0 });
    cur.move_by(&doc, 9999);
    // 末行 "third" 行尾
    assert_eq!(cur.coordinate(), Coordinate { line: 5, pos: 5 });
}

#[test]
fn test_set_extent_clamped_to_document() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_coordinate(&doc, Coordinate { line: 0, pos: 2 });
    cur.set_extent(&doc, -100);
    assert_eq!(cur.extent(), -2);
    cur.set_extent(&doc, 100_000);
    let total = doc.n_chars_total() as isize;
    assert_eq!(cur.extent(), total - 2);
}

#[test]
fn test_single_line_scope_clamps_extent() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_scope(SelectionScope::SingleLine);
    cur.set_coordinate(&doc, Coordinate { line: 2, pos: 6 });
    // "first caption" 长 13
    cur.set_extent(&doc, 100);
    assert_eq!(cur.extent(), 7);
    cur.set_extent(&doc, -100);
    assert_eq!(cur.extent(), -6);
}

#[test]
fn test_single_node_scope_clamps_extent() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_scope(SelectionScope::SingleNode);
    // cap1 只有一行，等价于行内钳制
    cur.set_coordinate(&doc, Coordinate { line: 2, pos: 3 });
    cur.set_extent(&doc, 100);
    assert_eq!(cur.extent(), 10);
    cur.set_extent(&doc, -100);
    assert_eq!(cur.extent(), -3);
}

#[test]
fn test_negative_extent_normalizes_forward() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_coordinate(&doc, Coordinate { line: 2, pos: 5 });
    cur.set_extent(&doc, -3);
    let state = cur.selection_state(&doc).unwrap();
    assert_eq!(state.start, Coordinate { line: 2, pos: 2 });
    assert_eq!(state.extent, 3);
}

#[test]
fn test_full_multi_nodes_extends_to_node_bounds() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_scope(SelectionScope::FullMultiNodes);
    // 从 cap1 行中部选到 cap2 行中部
    cur.set_coordinate(&doc, Coordinate { line: 2, pos: 4 });
    let off = offset_between(&doc, cur.coordinate(), Coordinate { line: 3, pos: 2 }).unwrap();
    cur.set_extent(&doc, off);
    let state = cur.selection_state(&doc).unwrap();
    assert_eq!(state.start, Coordinate { line: 2, pos: 0 });
    // 终点扩展到 cap2 行尾 ("second" 长 6)
    let end = coordinate_after_offset(&doc, state.start, state.extent as isize).unwrap();
    assert_eq!(end, Coordinate { line: 3, pos: 6 });
}

#[test]
fn test_full_multi_nodes_with_child_spans_subtree() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_scope(SelectionScope::FullMultiNodesWithChild);
    // 起点在 panel 行内，终点也在 panel 行内：扩展到 panel 整个子树
    cur.set_coordinate(&doc, Coordinate { line: 1, pos: 1 });
    cur.set_extent(&doc, 2);
    let state = cur.selection_state(&doc).unwrap();
    assert_eq!(state.start, Coordinate { line: 1, pos: 0 });
    let end = coordinate_after_offset(&doc, state.start, state.extent as isize).unwrap();
    // panel 子树末行是 cap2 ("second")
    assert_eq!(end, Coordinate { line: 3, pos: 6 });
}

#[test]
fn test_full_leveled_scope_flattens_depths() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_scope(SelectionScope::FullLeveledMultiNodes);
    // 从 cap1（panel 之下）拖到 cap3（panel2 之下）
    cur.set_coordinate(&doc, Coordinate { line: 2, pos: 1 });
    let off = offset_between(&doc, cur.coordinate(), Coordinate { line: 5, pos: 2 }).unwrap();
    cur.set_extent(&doc, off);
    let state = cur.selection_state(&doc).unwrap();
    // 拉平到 panel 层：从 panel 首行到 panel2 子树末行
    assert_eq!(state.start, Coordinate { line: 1, pos: 0 });
    let end = coordinate_after_offset(&doc, state.start, state.extent as isize).unwrap();
    assert_eq!(end, Coordinate { line: 5, pos: 5 });
}

#[test]
fn test_delete_selection_collapses_to_start() {
    let (mut doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_coordinate(&doc, Coordinate { line: 2, pos: 5 });
    cur.set_extent(&doc, -3);
    assert!(cur.delete_selection(&mut doc, NodeSuppression::MergeContent));
    assert_eq!(cur.coordinate(), Coordinate { line: 2, pos: 2 });
    assert_eq!(cur.extent(), 0);
    let lr = doc.line_at(2).unwrap();
    assert_eq!(doc.line_text(lr), Some("fi caption"));
}

#[test]
fn test_backspace_merges_blocks() {
    let (mut doc, [_, _, _, cap2, ..]) = sample_doc();
    let mut cur = ScriptCursor::new();
    // cap2 行首退格：并回 cap1 行尾
    cur.set_coordinate(&doc, Coordinate { line: 3, pos: 0 });
    assert!(cur.backspace(&mut doc, NodeSuppression::MergeContent));
    assert_eq!(cur.coordinate(), Coordinate { line: 2, pos: 13 });
    let lr = doc.line_at(2).unwrap();
    assert_eq!(doc.line_text(lr), Some("first captionsecond"));
    assert!(!doc.contains(cap2));
}

#[test]
fn test_backspace_at_document_start_is_noop() {
    let (mut doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_coordinate(&doc, Coordinate { line: 0, pos: 0 });
    assert!(!cur.backspace(&mut doc, NodeSuppression::MergeContent));
}

#[test]
fn test_reset_on_document_switch() {
    let (doc, _) = sample_doc();
    let mut cur = ScriptCursor::new();
    cur.set_coordinate(&doc, Coordinate { line: 4, pos: 2 });
    cur.set_extent(&doc, 2);
    cur.reset();
    assert_eq!(cur.coordinate(), Coordinate::default());
    assert_eq!(cur.extent(), 0);
}
