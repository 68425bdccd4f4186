//! 文档树模型
//!
//! 职责：
//! - 节点树存储（SlotMap arena，父引用为弱引用，子列表为所有权）
//! - 结构编辑（insert/move/detach）
//! - 文档序遍历（前序：先自身行，再子树）
//! - 字符计数（隐式换行符：每个行边界 +1，空区间不计）

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use tracing::debug;

use super::coords::{coordinate_at_abs, Coordinate};
use super::line::LineRef;

new_key_type! { pub struct NodeId; }

#[derive(Debug)]
pub enum DocumentError {
    InvalidNodeId,
    NoParent,
    MoveIntoDescendant,
    RootDetach,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::InvalidNodeId => write!(f, "invalid node id"),
            DocumentError::NoParent => write!(f, "node has no parent"),
            DocumentError::MoveIntoDescendant => {
                write!(f, "cannot move node into its own subtree")
            }
            DocumentError::RootDetach => write!(f, "cannot detach the document root"),
        }
    }
}

impl std::error::Error for DocumentError {}

/// 单行文本：节点独占所有权
#[derive(Debug, Clone, Default)]
pub(crate) struct TextLine {
    pub(crate) text: CompactString,
}

/// 删除选区时的节点收缩策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSuppression {
    /// 跨块删除：尾部内容并入前一行，整块吃空且无子节点时摘除
    MergeContent,
    /// 只删文本，不跨节点合并；仍有内容或子节点的块不摘除
    KeepNonEmptyBlocks,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) style: i32,
    pub(crate) lines: Vec<TextLine>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn new(style: i32, parent: Option<NodeId>) -> Self {
        Self {
            style,
            lines: vec![TextLine::default()],
            parent,
            children: Vec::new(),
        }
    }
}

/// 文档：一棵有序节点树
///
/// 根节点是纯容器，不持有文本行；其余节点至少一行。
/// 所有结构/文本修改都会递增 `revision`，供宿主做脏检测。
pub struct Document {
    pub(crate) arena: SlotMap<NodeId, Node>,
    root: NodeId,
    revision: u64,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node {
            style: 0,
            lines: Vec::new(),
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    // ==================== 节点属性 ====================

    pub fn style_code(&self, id: NodeId) -> Option<i32> {
        self.arena.get(id).map(|n| n.style)
    }

    pub fn set_style_code(&mut self, id: NodeId, code: i32) {
        if let Some(node) = self.arena.get_mut(id) {
            if node.style != code {
                node.style = code;
                self.bump();
            }
        }
    }

    pub fn nb_text_lines(&self, id: NodeId) -> usize {
        self.arena.get(id).map_or(0, |n| n.lines.len())
    }

    /// 调整节点行数到恰好 n（最少 1）
    ///
    /// 新增行为空行，多余行销毁。n < 1、n 不变、根节点均为 no-op。
    pub fn set_nb_text_lines(&mut self, id: NodeId, n: usize) -> bool {
        if id == self.root || n < 1 {
            return false;
        }
        let Some(node) = self.arena.get_mut(id) else {
            return false;
        };
        if node.lines.len() == n {
            return false;
        }
        node.lines.resize_with(n, TextLine::default);
        self.bump();
        true
    }

    pub fn line_text(&self, line: LineRef) -> Option<&str> {
        self.arena
            .get(line.node)
            .and_then(|n| n.lines.get(line.index))
            .map(|l| l.text.as_str())
    }

    /// 设置行文本；内容不变时为 no-op
    pub fn set_line_text(&mut self, line: LineRef, text: &str) -> bool {
        let Some(slot) = self
            .arena
            .get_mut(line.node)
            .and_then(|n| n.lines.get_mut(line.index))
        else {
            return false;
        };
        if slot.text == text {
            return false;
        }
        slot.text = CompactString::from(text);
        self.bump();
        true
    }

    pub(crate) fn insert_line(&mut self, id: NodeId, index: usize, text: &str) -> bool {
        let Some(node) = self.arena.get_mut(id) else {
            return false;
        };
        let index = index.min(node.lines.len());
        node.lines.insert(
            index,
            TextLine {
                text: CompactString::from(text),
            },
        );
        self.bump();
        true
    }

    // ==================== 结构编辑 ====================

    /// 在 parent 的子列表 pos 处插入新节点
    ///
    /// 负的 pos 从尾部计（`len + 1 + pos`，即 -1 为追加）。
    pub fn insert_node_below(
        &mut self,
        parent: NodeId,
        style: i32,
        pos: isize,
    ) -> Result<NodeId, DocumentError> {
        let len = self
            .arena
            .get(parent)
            .ok_or(DocumentError::InvalidNodeId)?
            .children
            .len();
        let index = clamp_insert_pos(len, pos);

        let id = self.arena.insert(Node::new(style, Some(parent)));
        self.arena[parent].children.insert(index, id);
        self.bump();
        debug!(?parent, ?id, style, index, "insert_node_below");
        Ok(id)
    }

    /// 在 anchor 之后插入同级节点；anchor 为根时失败
    pub fn insert_node_after(
        &mut self,
        anchor: NodeId,
        style: i32,
    ) -> Result<NodeId, DocumentError> {
        let parent = self.parent_of(anchor)?;
        let index = self.node_index(anchor).ok_or(DocumentError::InvalidNodeId)?;
        self.insert_node_below(parent, style, index as isize + 1)
    }

    /// 在 anchor 之前插入同级节点；anchor 为根时失败
    pub fn insert_node_before(
        &mut self,
        anchor: NodeId,
        style: i32,
    ) -> Result<NodeId, DocumentError> {
        let parent = self.parent_of(anchor)?;
        let index = self.node_index(anchor).ok_or(DocumentError::InvalidNodeId)?;
        self.insert_node_below(parent, style, index as isize)
    }

    /// 上跳一级：在父节点之后插入父节点的同级
    pub fn insert_node_above(
        &mut self,
        anchor: NodeId,
        style: i32,
    ) -> Result<NodeId, DocumentError> {
        let parent = self.parent_of(anchor)?;
        self.insert_node_after(parent, style)
    }

    /// 在 anchor 所属次根（根的直接子节点）的子树之后、根之下插入
    pub fn insert_node_sub_root(
        &mut self,
        anchor: NodeId,
        style: i32,
    ) -> Result<NodeId, DocumentError> {
        let sub_root = self
            .sub_root_node(anchor)
            .ok_or(DocumentError::NoParent)?;
        self.insert_node_after(sub_root, style)
    }

    /// 将 id 连同子树移到 new_parent 的 new_pos 处
    ///
    /// 禁止成环：new_parent 落在 `[id, last_node(id)]` 文档序区间内时失败。
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        new_pos: isize,
    ) -> Result<(), DocumentError> {
        if !self.contains(new_parent) {
            return Err(DocumentError::InvalidNodeId);
        }
        let old_parent = self.parent_of(id)?;
        if self.is_between_node(new_parent, id, self.last_node(id)) {
            return Err(DocumentError::MoveIntoDescendant);
        }

        let old_index = self.node_index(id).ok_or(DocumentError::InvalidNodeId)?;
        self.arena[old_parent].children.remove(old_index);

        let len = self.arena[new_parent].children.len();
        let index = clamp_insert_pos(len, new_pos);
        self.arena[new_parent].children.insert(index, id);
        self.arena[id].parent = Some(new_parent);
        self.bump();
        debug!(?id, ?new_parent, index, "move_node");
        Ok(())
    }

    /// 从文档摘除 id 及其子树并销毁；根节点不可摘除
    pub fn clear_from_doc(&mut self, id: NodeId) -> Result<(), DocumentError> {
        let parent = self.parent_of(id)?;
        let index = self.node_index(id).ok_or(DocumentError::InvalidNodeId)?;
        self.arena[parent].children.remove(index);

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.arena.remove(cur) {
                stack.extend(node.children);
            }
        }
        self.bump();
        debug!(?id, "clear_from_doc");
        Ok(())
    }

    fn parent_of(&self, id: NodeId) -> Result<NodeId, DocumentError> {
        let node = self.arena.get(id).ok_or(DocumentError::InvalidNodeId)?;
        if id == self.root {
            return Err(DocumentError::RootDetach);
        }
        node.parent.ok_or(DocumentError::NoParent)
    }

    // ==================== 遍历 ====================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// id 在父节点子列表中的下标
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.arena[parent].children.iter().position(|&c| c == id)
    }

    /// 深度：根为 0
    pub fn node_depth(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        let mut depth = 0;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            depth += 1;
            cur = p;
        }
        Some(depth)
    }

    /// 前序后继：先第一个子节点，否则向上找下一个同级
    pub fn next_node(&self, id: NodeId) -> Option<NodeId> {
        let node = self.arena.get(id)?;
        if let Some(&first) = node.children.first() {
            return Some(first);
        }
        let mut cur = id;
        loop {
            let parent = self.parent(cur)?;
            let index = self.node_index(cur)?;
            if let Some(&sibling) = self.arena[parent].children.get(index + 1) {
                return Some(sibling);
            }
            cur = parent;
        }
    }

    /// 前序前驱：前一个同级的最深末裔，否则父节点
    pub fn previous_node(&self, id: NodeId) -> Option<NodeId> {
        let index = self.node_index(id)?;
        let parent = self.parent(id)?;
        if index == 0 {
            if parent == self.root {
                return None;
            }
            return Some(parent);
        }
        let prev = self.arena[parent].children[index - 1];
        Some(self.last_node(prev))
    }

    /// 子树内最深的最后末裔（无子节点时为自身）
    pub fn last_node(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(&last) = self.arena.get(cur).and_then(|n| n.children.last()) {
            cur = last;
        }
        cur
    }

    /// 次根：根之下一级的祖先；id 为根时为 None
    pub fn sub_root_node(&self, id: NodeId) -> Option<NodeId> {
        if !self.contains(id) || id == self.root {
            return None;
        }
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            if p == self.root {
                return Some(cur);
            }
            cur = p;
        }
        None
    }

    /// 上溯 k 级祖先；超出树高为 None
    pub fn node_above(&self, id: NodeId, k: usize) -> Option<NodeId> {
        let mut cur = id;
        if !self.contains(cur) {
            return None;
        }
        for _ in 0..k {
            cur = self.parent(cur)?;
        }
        Some(cur)
    }

    /// id 是否落在 start..=end 的文档序区间上
    pub fn is_between_node(&self, id: NodeId, start: NodeId, end: NodeId) -> bool {
        let ranks = self.preorder_ranks();
        let (Some(&r), Some(&a), Some(&b)) = (ranks.get(&id), ranks.get(&start), ranks.get(&end))
        else {
            return false;
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        lo <= r && r <= hi
    }

    /// 把两个节点拉平到同层同父，返回包住两者的祖先对（文档序）
    ///
    /// 先把较深一侧提到同深度，再同步上提直到同父。
    /// 任一节点不在本文档树中时返回 None。
    pub fn interval_with_flat_parents_level(
        &self,
        a: NodeId,
        b: NodeId,
    ) -> Option<(NodeId, NodeId)> {
        let (mut x, mut y) = (a, b);
        let (mut dx, mut dy) = (self.node_depth(x)?, self.node_depth(y)?);
        while dx > dy {
            x = self.parent(x)?;
            dx -= 1;
        }
        while dy > dx {
            y = self.parent(y)?;
            dy -= 1;
        }
        while self.parent(x) != self.parent(y) {
            x = self.parent(x)?;
            y = self.parent(y)?;
        }
        if x == y {
            return Some((x, y));
        }
        let ix = self.node_index(x)?;
        let iy = self.node_index(y)?;
        Some(if ix <= iy { (x, y) } else { (y, x) })
    }

    /// 前序访问全树（含根）
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.arena.len());
        let mut cur = Some(self.root);
        while let Some(id) = cur {
            out.push(id);
            cur = self.next_node(id);
        }
        out
    }

    fn preorder_ranks(&self) -> FxHashMap<NodeId, usize> {
        self.preorder()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect()
    }

    // ==================== 行寻址 ====================

    /// 文档总行数
    pub fn max_line(&self) -> usize {
        self.preorder()
            .into_iter()
            .map(|id| self.arena[id].lines.len())
            .sum()
    }

    /// 节点首行的文档行号（= 文档序中位于其之前的所有行数）
    pub fn node_line(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        let mut count = 0;
        for cur in self.preorder() {
            if cur == id {
                return Some(count);
            }
            count += self.arena[cur].lines.len();
        }
        None
    }

    /// 文档行号 → (所属节点, 节点首行行号)；越界为 None
    pub fn node_at_line(&self, line_no: usize) -> Option<(NodeId, usize)> {
        let mut count = 0;
        for id in self.preorder() {
            let nb = self.arena[id].lines.len();
            if line_no < count + nb {
                return Some((id, count));
            }
            count += nb;
        }
        None
    }

    /// 文档行号 → 行引用
    pub fn line_at(&self, line_no: usize) -> Option<LineRef> {
        let (node, start) = self.node_at_line(line_no)?;
        Some(LineRef {
            node,
            index: line_no - start,
        })
    }

    pub(crate) fn line_len(&self, line: LineRef) -> Option<usize> {
        self.line_text(line).map(|t| t.chars().count())
    }

    // ==================== 字符计数 ====================
    //
    // 统一基元：前缀/后缀区间里的每一行都贡献 len + 1（各带一个毗邻的
    // 隐式换行），k 行的封闭区间含 Σlen + (k-1) 个字符。
    // 空区间自然得 0，不会数出多余的换行。

    /// 整篇文档的字符数（含隐式换行）
    pub fn n_chars_total(&self) -> usize {
        let mut sum = 0;
        let mut count = 0;
        for id in self.preorder() {
            for line in &self.arena[id].lines {
                sum += line.text.chars().count();
                count += 1;
            }
        }
        span_chars(sum, count)
    }

    /// 节点自身各行的字符数（不含子树）
    pub fn n_chars_in_node(&self, id: NodeId) -> usize {
        let Some(node) = self.arena.get(id) else {
            return 0;
        };
        let sum = node.lines.iter().map(|l| l.text.chars().count()).sum();
        span_chars(sum, node.lines.len())
    }

    /// 整个子树的字符数
    pub fn n_chars(&self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let mut sum = 0;
        let mut count = 0;
        let stop = self.next_node(self.last_node(id));
        let mut cur = Some(id);
        while let Some(node) = cur {
            if Some(node) == stop {
                break;
            }
            for line in &self.arena[node].lines {
                sum += line.text.chars().count();
                count += 1;
            }
            cur = self.next_node(node);
        }
        span_chars(sum, count)
    }

    /// 子树首行之前的文档字符数
    pub fn n_chars_before(&self, id: NodeId) -> usize {
        let Some(first) = self.node_line(id) else {
            return 0;
        };
        self.chars_in_line_range(0, first)
    }

    /// 子树末行之后的文档字符数
    pub fn n_chars_after(&self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let last = self.last_node(id);
        let end = match self.node_line(last) {
            Some(line) => line + self.arena[last].lines.len(),
            None => return 0,
        };
        self.chars_in_line_range(end, self.max_line())
    }

    /// 半开行区间 [from, to) 作为前/后缀的字符数：每行贡献 len + 1
    pub(crate) fn chars_in_line_range(&self, from: usize, to: usize) -> usize {
        let mut total = 0;
        let mut line_no = 0;
        for id in self.preorder() {
            for line in &self.arena[id].lines {
                if line_no >= to {
                    return total;
                }
                if line_no >= from {
                    total += line.text.chars().count() + 1;
                }
                line_no += 1;
            }
        }
        total
    }

    // ==================== 文本编辑 ====================

    /// 在坐标处插入文本；'\n' 在同一节点内拆出新行
    ///
    /// 返回插入结束处的坐标；坐标非法时为 None。
    pub fn insert_text(&mut self, at: Coordinate, text: &str) -> Option<Coordinate> {
        let line = self.line_at(at.line)?;
        let old = self.line_text(line)?;
        if at.pos > old.chars().count() {
            return None;
        }
        let split = char_to_byte(old, at.pos);
        let head = &old[..split];
        let tail = old[split..].to_string();

        let mut segments = text.split('\n');
        let first = segments.next().unwrap_or("");
        let mut cur_text = format!("{head}{first}");
        let mut cur_line = at.line;
        let mut cur_pos = at.pos + first.chars().count();

        let mut extra = Vec::new();
        for seg in segments {
            extra.push(seg.to_string());
        }
        if extra.is_empty() {
            cur_text.push_str(&tail);
            self.set_line_text(line, &cur_text);
        } else {
            self.set_line_text(line, &cur_text);
            let last_idx = extra.len() - 1;
            for (i, seg) in extra.into_iter().enumerate() {
                let mut seg_text = seg;
                if i == last_idx {
                    cur_pos = seg_text.chars().count();
                    seg_text.push_str(&tail);
                }
                self.insert_line(line.node, line.index + 1 + i, &seg_text);
                cur_line += 1;
            }
        }
        Some(Coordinate {
            line: cur_line,
            pos: cur_pos,
        })
    }

    /// 从 start 起删除 len 个字符（含隐式换行），按 policy 收缩节点
    pub fn remove_span(
        &mut self,
        start: Coordinate,
        len: usize,
        policy: NodeSuppression,
    ) -> bool {
        if len == 0 {
            return false;
        }
        let total = self.n_chars_total();
        let Some(start_line) = self.line_at(start.line) else {
            return false;
        };
        let abs_start = match super::coords::abs_char_index(self, start) {
            Some(a) => a,
            None => return false,
        };
        let abs_end = (abs_start + len).min(total);
        let Some(end) = coordinate_at_abs(self, abs_end) else {
            return false;
        };

        if end.line == start.line {
            let text = self.line_text(start_line).unwrap_or_default().to_string();
            let from = char_to_byte(&text, start.pos);
            let to = char_to_byte(&text, end.pos);
            let mut new_text = String::with_capacity(text.len());
            new_text.push_str(&text[..from]);
            new_text.push_str(&text[to..]);
            return self.set_line_text(start_line, &new_text);
        }

        let end_line = match self.line_at(end.line) {
            Some(l) => l,
            None => return false,
        };
        let head = {
            let text = self.line_text(start_line).unwrap_or_default();
            text[..char_to_byte(text, start.pos)].to_string()
        };
        let tail = {
            let text = self.line_text(end_line).unwrap_or_default();
            text[char_to_byte(text, end.pos)..].to_string()
        };

        // 收集被整行覆盖的行（start 行之后到 end 行为止），按节点分组
        let mut covered: Vec<LineRef> = Vec::new();
        for line_no in (start.line + 1)..=end.line {
            if let Some(lr) = self.line_at(line_no) {
                covered.push(lr);
            }
        }

        match policy {
            NodeSuppression::MergeContent => {
                self.set_line_text(start_line, &format!("{head}{tail}"));
                self.drop_covered_lines(&covered, start_line.node);
            }
            NodeSuppression::KeepNonEmptyBlocks => {
                self.set_line_text(start_line, &head);
                self.set_line_text(end_line, &tail);
                let interior: Vec<LineRef> = covered
                    .into_iter()
                    .filter(|lr| *lr != end_line)
                    .collect();
                self.drop_covered_lines(&interior, start_line.node);
                self.suppress_if_hollow(end_line.node, start_line.node);
            }
        }
        self.bump();
        true
    }

    /// 删掉整行覆盖集；吃空的无子节点摘除，有子节点的保底一空行
    fn drop_covered_lines(&mut self, covered: &[LineRef], keep_node: NodeId) {
        let mut by_node: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
        for lr in covered {
            by_node.entry(lr.node).or_default().push(lr.index);
        }
        let mut emptied = Vec::new();
        for (node, mut indexes) in by_node {
            indexes.sort_unstable_by(|a, b| b.cmp(a));
            if let Some(n) = self.arena.get_mut(node) {
                for idx in indexes {
                    if idx < n.lines.len() {
                        n.lines.remove(idx);
                    }
                }
                if n.lines.is_empty() && node != keep_node {
                    if n.children.is_empty() {
                        emptied.push(node);
                    } else {
                        n.lines.push(TextLine::default());
                    }
                }
            }
        }
        for node in emptied {
            let _ = self.clear_from_doc(node);
        }
    }

    /// KeepNonEmptyBlocks 收尾：只有在节点完全无内容且无子节点时才摘除
    fn suppress_if_hollow(&mut self, node: NodeId, keep_node: NodeId) {
        if node == keep_node || node == self.root {
            return;
        }
        let Some(n) = self.arena.get(node) else {
            return;
        };
        let hollow = n.children.is_empty() && n.lines.iter().all(|l| l.text.is_empty());
        if hollow {
            let _ = self.clear_from_doc(node);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Python 切片风格的插入下标：负数从尾部计，再钳入 [0, len]
fn clamp_insert_pos(len: usize, pos: isize) -> usize {
    let raw = if pos < 0 {
        len as isize + 1 + pos
    } else {
        pos
    };
    raw.clamp(0, len as isize) as usize
}

/// k 行封闭区间的字符数：Σlen + (k-1)，空区间为 0
fn span_chars(sum: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        sum + count - 1
    }
}

/// 字符下标 → 字节下标（pos 超长时取串尾）
pub(crate) fn char_to_byte(s: &str, pos: usize) -> usize {
    s.char_indices().nth(pos).map_or(s.len(), |(b, _)| b)
}

#[cfg(test)]
#[path = "../../tests/unit/models/document.rs"]
mod tests;
