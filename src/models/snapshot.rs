//! 文档快照：持久化层使用的嵌套结构
//!
//! 形如 `{style_id, lines: [..], children: [..]}`，由外部存储管理器
//! 序列化；重建时逐层 `insert_node_below` 回放。

use serde::{Deserialize, Serialize};

use super::document::{Document, DocumentError, NodeId};
use super::line::LineRef;

/// 一个节点连同子树的纯数据形态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub style_id: i32,
    pub lines: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
}

impl Document {
    /// 导出 id 的子树快照；id 非法时 None
    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        if !self.contains(id) {
            return None;
        }
        let lines = (0..self.nb_text_lines(id))
            .map(|index| {
                self.line_text(LineRef { node: id, index })
                    .unwrap_or("")
                    .to_string()
            })
            .collect();
        let children = self
            .children(id)
            .to_vec()
            .into_iter()
            .filter_map(|c| self.snapshot(c))
            .collect();
        Some(NodeSnapshot {
            style_id: self.style_code(id)?,
            lines,
            children,
        })
    }

    /// 把快照重建为 parent 末尾的新子树，返回新子树的根
    pub fn restore(
        &mut self,
        parent: NodeId,
        snapshot: &NodeSnapshot,
    ) -> Result<NodeId, DocumentError> {
        let id = self.insert_node_below(parent, snapshot.style_id, -1)?;
        if !snapshot.lines.is_empty() {
            self.set_nb_text_lines(id, snapshot.lines.len());
            for (index, text) in snapshot.lines.iter().enumerate() {
                self.set_line_text(LineRef { node: id, index }, text);
            }
        }
        for child in &snapshot.children {
            self.restore(id, child)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/snapshot.rs"]
mod tests;
