//! 行级访问接口
//!
//! `LineRef` 是行的稳定身份：(所属节点, 节点内行号)。
//! 行与行之间的步进跨节点透明，行边界按一个隐式换行计。

use super::coords::{abs_char_index, coordinate_at_abs, Coordinate};
use super::document::{Document, NodeId};

/// 行引用：节点 + 节点内下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRef {
    pub node: NodeId,
    pub index: usize,
}

impl Document {
    /// 文档第一行
    pub fn first_line(&self) -> Option<LineRef> {
        self.line_at(0)
    }

    /// 行的文档行号
    pub fn line_number(&self, line: LineRef) -> Option<usize> {
        if line.index >= self.nb_text_lines(line.node) {
            return None;
        }
        Some(self.node_line(line.node)? + line.index)
    }

    /// 文档序下一行（跨节点）
    pub fn next_line(&self, line: LineRef) -> Option<LineRef> {
        let no = self.line_number(line)?;
        self.line_at(no + 1)
    }

    /// 文档序上一行（跨节点）
    pub fn previous_line(&self, line: LineRef) -> Option<LineRef> {
        let no = self.line_number(line)?;
        self.line_at(no.checked_sub(1)?)
    }

    /// 行长（字符数）
    pub fn line_n_chars(&self, line: LineRef) -> usize {
        self.line_len(line).unwrap_or(0)
    }

    /// 从本行 start_pos 起偏移 offset 个字符，返回落点行与行内位置
    ///
    /// offset 正负皆可，每跨一个行边界消耗一个隐式换行；
    /// 走出文档两端时返回 None。offset 为 0 时原地返回。
    pub fn line_after_offset(
        &self,
        line: LineRef,
        start_pos: usize,
        offset: isize,
    ) -> Option<(LineRef, usize)> {
        let line_no = self.line_number(line)?;
        let coord = Coordinate {
            line: line_no,
            pos: start_pos,
        };
        let abs = abs_char_index(self, coord)? as isize + offset;
        if abs < 0 {
            return None;
        }
        let landed = coordinate_at_abs(self, abs as usize)?;
        Some((self.line_at(landed.line)?, landed.pos))
    }

    /// 本行之前的文档字符数（每个在前的行贡献 len + 1）
    pub fn line_n_chars_before(&self, line: LineRef) -> usize {
        match self.line_number(line) {
            Some(no) => self.chars_in_line_range(0, no),
            None => 0,
        }
    }

    /// 本行之后的文档字符数
    pub fn line_n_chars_after(&self, line: LineRef) -> usize {
        match self.line_number(line) {
            Some(no) => self.chars_in_line_range(no + 1, self.max_line()),
            None => 0,
        }
    }

    /// 本行之前、同节点内的字符数（到节点边界为止）
    pub fn line_n_chars_before_in_node(&self, line: LineRef) -> usize {
        if line.index >= self.nb_text_lines(line.node) {
            return 0;
        }
        (0..line.index)
            .map(|i| {
                self.line_n_chars(LineRef {
                    node: line.node,
                    index: i,
                }) + 1
            })
            .sum()
    }

    /// 本行之后、同节点内的字符数（到节点边界为止）
    pub fn line_n_chars_after_in_node(&self, line: LineRef) -> usize {
        let nb = self.nb_text_lines(line.node);
        if line.index >= nb {
            return 0;
        }
        (line.index + 1..nb)
            .map(|i| {
                self.line_n_chars(LineRef {
                    node: line.node,
                    index: i,
                }) + 1
            })
            .sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/line.rs"]
mod tests;
