//! 坐标与偏移运算
//!
//! 统一基元：坐标 ↔ 文档绝对字符下标。
//! `abs(line, pos) = Σ_{i<line}(len_i + 1) + pos`，行边界占一个隐式换行。
//! 其余所有偏移/距离/吸附运算都由这一个映射推导，避免平行实现各自为政。

use super::document::Document;

/// 文档绝对坐标：(行号, 行内字符位置)
///
/// 合法范围：line ∈ [0, max_line)，pos ∈ [0, 行长]。
/// 越界一律返回 None，不设哨兵值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Coordinate {
    pub line: usize,
    pub pos: usize,
}

impl Coordinate {
    pub fn new(line: usize, pos: usize) -> Self {
        Self { line, pos }
    }
}

/// 坐标 → 绝对字符下标；坐标非法时 None
pub fn abs_char_index(doc: &Document, coord: Coordinate) -> Option<usize> {
    let len = doc.line_len(doc.line_at(coord.line)?)?;
    if coord.pos > len {
        return None;
    }
    Some(doc.chars_in_line_range(0, coord.line) + coord.pos)
}

/// 绝对字符下标 → 坐标；abs 超过文档末尾时 None
///
/// 行边界唯一归属：行 L 的 [start, start+len] 都属于 L，
/// start+len+1 已是下一行的起点。
pub fn coordinate_at_abs(doc: &Document, abs: usize) -> Option<Coordinate> {
    let mut start = 0;
    let mut line_no = 0;
    let max = doc.max_line();
    while line_no < max {
        let len = doc.line_len(doc.line_at(line_no)?)?;
        if abs <= start + len {
            return Some(Coordinate {
                line: line_no,
                pos: abs - start,
            });
        }
        start += len + 1;
        line_no += 1;
    }
    None
}

/// 坐标偏移 offset 个字符（可负；每跨一个行边界消耗一个换行）
///
/// 会走出文档两端时返回 None。
pub fn coordinate_after_offset(
    doc: &Document,
    coord: Coordinate,
    offset: isize,
) -> Option<Coordinate> {
    let abs = abs_char_index(doc, coord)? as isize + offset;
    if abs < 0 {
        return None;
    }
    coordinate_at_abs(doc, abs as usize)
}

/// 两坐标间的带符号字符距离（含隐式换行）
///
/// 满足回程律：`coordinate_after_offset(a, offset_between(a, b)) == b`。
pub fn offset_between(doc: &Document, a: Coordinate, b: Coordinate) -> Option<isize> {
    let from = abs_char_index(doc, a)? as isize;
    let to = abs_char_index(doc, b)? as isize;
    Some(to - from)
}

// ==================== 吸附辅助（供选区扩展策略使用） ====================

pub fn coordinate_at_line_start(doc: &Document, coord: Coordinate) -> Option<Coordinate> {
    doc.line_at(coord.line)?;
    Some(Coordinate {
        line: coord.line,
        pos: 0,
    })
}

pub fn coordinate_at_line_end(doc: &Document, coord: Coordinate) -> Option<Coordinate> {
    let len = doc.line_len(doc.line_at(coord.line)?)?;
    Some(Coordinate {
        line: coord.line,
        pos: len,
    })
}

/// 所属节点自身首行行首
pub fn coordinate_at_node_start(doc: &Document, coord: Coordinate) -> Option<Coordinate> {
    let (_, node_start) = doc.node_at_line(coord.line)?;
    Some(Coordinate {
        line: node_start,
        pos: 0,
    })
}

/// 所属节点自身末行行尾（不含子树）
pub fn coordinate_at_node_end(doc: &Document, coord: Coordinate) -> Option<Coordinate> {
    let (node, node_start) = doc.node_at_line(coord.line)?;
    let last = node_start + doc.nb_text_lines(node) - 1;
    coordinate_at_line_end(doc, Coordinate { line: last, pos: 0 })
}

/// 所属节点整个子树的末行行尾
pub fn coordinate_after_node_childrens(doc: &Document, coord: Coordinate) -> Option<Coordinate> {
    let (node, _) = doc.node_at_line(coord.line)?;
    let last_node = doc.last_node(node);
    let last_line = doc.node_line(last_node)? + doc.nb_text_lines(last_node) - 1;
    coordinate_at_line_end(
        doc,
        Coordinate {
            line: last_line,
            pos: 0,
        },
    )
}
