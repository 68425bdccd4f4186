//! 光标与选区模型
//!
//! 光标始终落在合法坐标上，选区以带符号的字符延伸量叠加其上。
//! 读取选区时才按作用域策略向外扩展（整行/整节点/同层整块）。

use super::coords::{
    abs_char_index, coordinate_after_node_childrens, coordinate_after_offset,
    coordinate_at_line_end, coordinate_at_node_start, offset_between, Coordinate,
};
use super::document::{Document, NodeSuppression};

/// 选区作用域策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionScope {
    /// 自由文本：不加额外限制
    #[default]
    Text,
    /// 钳在当前行内
    SingleLine,
    /// 钳在当前节点自身各行内
    SingleNode,
    /// 读取时扩展到整节点（不含子树）
    FullMultiNodes,
    /// 读取时扩展到整节点连同子树
    FullMultiNodesWithChild,
    /// 读取时扩展到同层同父的整块区间
    FullLeveledMultiNodes,
}

/// 归一化后的前向选区：起点 + 非负长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    pub start: Coordinate,
    pub extent: usize,
}

/// 编辑面持有的光标；不随文档持久化
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptCursor {
    coord: Coordinate,
    extent: isize,
    scope: SelectionScope,
}

impl ScriptCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }

    pub fn extent(&self) -> isize {
        self.extent
    }

    pub fn scope(&self) -> SelectionScope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: SelectionScope) {
        self.scope = scope;
    }

    /// 文档切换时复位
    pub fn reset(&mut self) {
        self.coord = Coordinate::default();
        self.extent = 0;
    }

    /// 直接定位；坐标非法时拒绝
    pub fn set_coordinate(&mut self, doc: &Document, coord: Coordinate) -> bool {
        if abs_char_index(doc, coord).is_none() {
            return false;
        }
        self.coord = coord;
        self.extent = 0;
        true
    }

    /// 平移 offset 个字符，清除选区；越过文档两端时钳到端点
    pub fn move_by(&mut self, doc: &Document, offset: isize) {
        self.extent = 0;
        if let Some(next) = coordinate_after_offset(doc, self.coord, offset) {
            self.coord = next;
            return;
        }
        if offset < 0 {
            self.coord = Coordinate::default();
        } else if let Some(last) = doc.max_line().checked_sub(1) {
            if let Some(end) =
                coordinate_at_line_end(doc, Coordinate { line: last, pos: 0 })
            {
                self.coord = end;
            }
        }
    }

    /// 设置选区延伸量，按文档边界与作用域钳制
    pub fn set_extent(&mut self, doc: &Document, offset: isize) {
        let Some(abs) = abs_char_index(doc, self.coord) else {
            self.extent = 0;
            return;
        };
        let total = doc.n_chars_total() as isize;
        let mut extent = offset.clamp(-(abs as isize), total - abs as isize);

        match self.scope {
            SelectionScope::SingleLine => {
                let len = doc
                    .line_at(self.coord.line)
                    .map_or(0, |l| doc.line_n_chars(l)) as isize;
                let pos = self.coord.pos as isize;
                extent = extent.clamp(-pos, len - pos);
            }
            SelectionScope::SingleNode => {
                if let Some((node, node_start)) = doc.node_at_line(self.coord.line) {
                    let start = Coordinate {
                        line: node_start,
                        pos: 0,
                    };
                    let last = node_start + doc.nb_text_lines(node) - 1;
                    if let (Some(lo), Some(hi)) = (
                        offset_between(doc, self.coord, start),
                        coordinate_at_line_end(doc, Coordinate { line: last, pos: 0 })
                            .and_then(|end| offset_between(doc, self.coord, end)),
                    ) {
                        extent = extent.clamp(lo, hi);
                    }
                }
            }
            _ => {}
        }
        self.extent = extent;
    }

    /// 归一化选区并按作用域做读取时扩展
    ///
    /// 负延伸量先翻转为前向区间，再视策略扩展到块边界。
    pub fn selection_state(&self, doc: &Document) -> Option<SelectionState> {
        let (mut start, mut end) = if self.extent >= 0 {
            (
                self.coord,
                coordinate_after_offset(doc, self.coord, self.extent)?,
            )
        } else {
            (
                coordinate_after_offset(doc, self.coord, self.extent)?,
                self.coord,
            )
        };

        if start != end {
            match self.scope {
                SelectionScope::FullMultiNodes => {
                    start = coordinate_at_node_start(doc, start)?;
                    end = super::coords::coordinate_at_node_end(doc, end)?;
                }
                SelectionScope::FullMultiNodesWithChild => {
                    start = coordinate_at_node_start(doc, start)?;
                    end = coordinate_after_node_childrens(doc, end)?;
                }
                SelectionScope::FullLeveledMultiNodes => {
                    let (a, _) = doc.node_at_line(start.line)?;
                    let (b, _) = doc.node_at_line(end.line)?;
                    let (lo, hi) = doc.interval_with_flat_parents_level(a, b)?;
                    start = Coordinate {
                        line: doc.node_line(lo)?,
                        pos: 0,
                    };
                    let hi_coord = Coordinate {
                        line: doc.node_line(hi)?,
                        pos: 0,
                    };
                    end = coordinate_after_node_childrens(doc, hi_coord)?;
                }
                _ => {}
            }
        }

        let extent = offset_between(doc, start, end)?.max(0) as usize;
        Some(SelectionState { start, extent })
    }

    /// 删除选区内容；光标落在选区起点
    pub fn delete_selection(&mut self, doc: &mut Document, policy: NodeSuppression) -> bool {
        let Some(state) = self.selection_state(doc) else {
            return false;
        };
        if state.extent == 0 {
            return false;
        }
        let removed = doc.remove_span(state.start, state.extent, policy);
        if removed {
            self.coord = state.start;
            self.extent = 0;
        }
        removed
    }

    /// 退格：有选区则删选区，否则向前吃掉一个字符或一个块间跳变
    pub fn backspace(&mut self, doc: &mut Document, policy: NodeSuppression) -> bool {
        if self.extent != 0 {
            return self.delete_selection(doc, policy);
        }
        let Some(prev) = coordinate_after_offset(doc, self.coord, -1) else {
            return false;
        };
        let removed = doc.remove_span(prev, 1, policy);
        if removed {
            self.coord = prev;
        }
        removed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/cursor.rs"]
mod tests;
