//! 逐行布局与缓存
//!
//! 职责：
//! - 装饰文本（前缀 + 内容 + 后缀）的成形与贪心折行
//! - 字形簇 → 水平坐标映射（cell_x，长度 = 簇数 + 1）
//! - 按 (可用宽度, 装饰文本) 作键的缓存，键变即失效
//! - 节点高度计算与经 `Painter` 的绘制

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::manager::StyleManager;
use super::style::{FontSpec, TextStyle};
use crate::models::{Document, LineRef, NodeId};

/// 绘制端：由宿主编辑面/导出器注入
pub trait Painter {
    fn draw_text(&mut self, x: u32, y: u32, text: &str, font: &FontSpec);
    fn draw_cursor(&mut self, x: u32, y: u32, height: u32);
}

/// 折行后的一个视觉行
#[derive(Debug, Clone)]
pub struct ShapedRow {
    pub text: CompactString,
    /// 每个字形簇的起始 x（像素），最后一项是行尾位置
    pub cell_x: Vec<u32>,
    /// 每个字形簇的累计字符数，与 cell_x 等长
    pub char_x: Vec<usize>,
    /// 本视觉行第一个字符在装饰文本内的字符偏移
    pub char_start: usize,
    /// 相对成形行顶部的 y
    pub y: u32,
}

/// 一条文本行的成形结果（可能折成多个视觉行）
#[derive(Debug, Clone)]
pub struct ShapedLine {
    pub rows: Vec<ShapedRow>,
    pub height: u32,
}

struct CachedLine {
    width: u32,
    content: CompactString,
    shaped: ShapedLine,
}

/// 节点布局结果：各行顶部 y 与总高（含下边距）
#[derive(Debug, Clone)]
pub struct NodeMetrics {
    pub line_tops: Vec<u32>,
    pub height: u32,
}

/// 布局上下文：持有成形缓存
///
/// 缓存键是行身份 (节点, 行号)，条目带 (宽度, 装饰文本) 校验，
/// 任一变化即重算；无需显式失效。
pub struct LayoutContext {
    cache: FxHashMap<(NodeId, usize), CachedLine>,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self {
            cache: FxHashMap::default(),
        }
    }

    /// 丢弃已不在文档中的节点的缓存条目
    pub fn prune(&mut self, doc: &Document) {
        self.cache.retain(|(node, _), _| doc.contains(*node));
    }

    /// 布局一个节点：对齐期望行数后逐行成形
    ///
    /// 样式码与默认码都未注册时静默跳过（None）。
    pub fn lay_node_out(
        &mut self,
        doc: &mut Document,
        mgr: &StyleManager,
        node: NodeId,
        available_width: u32,
    ) -> Option<NodeMetrics> {
        let code = doc.style_code(node)?;
        let style = mgr.style_or_default(code)?.clone();
        if style.expected_nb_text_lines >= 1 {
            doc.set_nb_text_lines(node, style.expected_nb_text_lines);
        }

        let ordinal = style_ordinal(doc, node);
        let nb = doc.nb_text_lines(node);
        let mut line_tops = Vec::with_capacity(nb);
        let mut y = style.top_margin;
        for index in 0..nb {
            if index > 0 {
                y += style.line_margin;
            }
            line_tops.push(y);
            let shaped = self.ensure_shaped(doc, &style, node, index, ordinal, available_width);
            y += shaped.height;
        }
        Some(NodeMetrics {
            line_tops,
            height: y + style.bottom_margin,
        })
    }

    /// 节点总高：触发布局后取最大行底 + 下边距
    pub fn node_height(
        &mut self,
        doc: &mut Document,
        mgr: &StyleManager,
        node: NodeId,
        available_width: u32,
    ) -> u32 {
        self.lay_node_out(doc, mgr, node, available_width)
            .map_or(0, |m| m.height)
    }

    /// 在 (origin_x, origin_y) 处绘制节点各行的缓存布局
    ///
    /// cursor 为节点内 (行号, 原始文本字符位置)；前后缀不计入光标寻址。
    #[allow(clippy::too_many_arguments)]
    pub fn render_node(
        &mut self,
        doc: &mut Document,
        mgr: &StyleManager,
        node: NodeId,
        available_width: u32,
        origin_x: u32,
        origin_y: u32,
        painter: &mut dyn Painter,
        cursor: Option<(usize, usize)>,
    ) {
        let Some(metrics) = self.lay_node_out(doc, mgr, node, available_width) else {
            return;
        };
        let Some(code) = doc.style_code(node) else {
            return;
        };
        let Some(style) = mgr.style_or_default(code).cloned() else {
            return;
        };
        let ordinal = style_ordinal(doc, node);

        for (index, &top) in metrics.line_tops.iter().enumerate() {
            let shaped = self
                .ensure_shaped(doc, &style, node, index, ordinal, available_width)
                .clone();
            let base_x = origin_x + style.left_margin;
            let base_y = origin_y + top;
            for row in &shaped.rows {
                painter.draw_text(base_x, base_y + row.y, &row.text, &style.font);
            }
            if let Some((cursor_line, cursor_pos)) = cursor {
                if cursor_line == index {
                    let prefix_chars = style.line_prefix(index, ordinal).chars().count();
                    let target = cursor_pos + prefix_chars;
                    if let Some((x, row_y)) = cursor_x(&shaped, target) {
                        painter.draw_cursor(
                            base_x + x,
                            base_y + row_y,
                            style.font.line_height(),
                        );
                    }
                }
            }
        }
    }

    fn ensure_shaped(
        &mut self,
        doc: &Document,
        style: &TextStyle,
        node: NodeId,
        index: usize,
        ordinal: usize,
        available_width: u32,
    ) -> &ShapedLine {
        let text = doc
            .line_text(LineRef { node, index })
            .unwrap_or("");
        let mut content = style.line_prefix(index, ordinal);
        content.push_str(text);
        content.push_str(&style.line_suffix(index));

        let key = (node, index);
        let stale = self
            .cache
            .get(&key)
            .map_or(true, |c| c.width != available_width || c.content != content);
        if stale {
            let content_width = available_width
                .saturating_sub(style.left_margin + style.right_margin)
                .max(style.font.cell_advance());
            let shaped = shape_line(&content, &style.font, content_width, style.tab_indent);
            self.cache.insert(
                key,
                CachedLine {
                    width: available_width,
                    content,
                    shaped,
                },
            );
        }
        &self.cache[&key].shaped
    }
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 同样式兄弟间的序号（从 1 起），供编号前缀使用
fn style_ordinal(doc: &Document, node: NodeId) -> usize {
    let style = doc.style_code(node);
    let Some(parent) = doc.parent(node) else {
        return 1;
    };
    let mut ordinal = 0;
    for &sibling in doc.children(parent) {
        if doc.style_code(sibling) == style {
            ordinal += 1;
        }
        if sibling == node {
            return ordinal;
        }
    }
    1
}

/// 贪心折行成形：按显示格宽推进，行宽超限且行非空时换行
fn shape_line(text: &str, font: &FontSpec, content_width: u32, tab_indent: u32) -> ShapedLine {
    let advance = font.cell_advance();
    let row_height = font.line_height();

    let mut rows = Vec::new();
    let mut row_text = CompactString::default();
    let mut cell_x = vec![0u32];
    let mut char_x = vec![0usize];
    let mut row_chars = 0usize;
    let mut char_start = 0usize;
    let mut x = 0u32;

    let mut flush =
        |rows: &mut Vec<ShapedRow>,
         row_text: &mut CompactString,
         cell_x: &mut Vec<u32>,
         char_x: &mut Vec<usize>,
         char_start: &mut usize,
         row_chars: &mut usize,
         x: &mut u32| {
            let y = rows.len() as u32 * row_height;
            rows.push(ShapedRow {
                text: std::mem::take(row_text),
                cell_x: std::mem::replace(cell_x, vec![0]),
                char_x: std::mem::replace(char_x, vec![0]),
                char_start: *char_start,
                y,
            });
            *char_start += *row_chars;
            *row_chars = 0;
            *x = 0;
        };

    for g in text.graphemes(true) {
        let cells = if g == "\t" {
            tab_indent
        } else {
            UnicodeWidthStr::width(g) as u32
        };
        let adv = cells * advance;
        if x + adv > content_width && !row_text.is_empty() {
            flush(
                &mut rows,
                &mut row_text,
                &mut cell_x,
                &mut char_x,
                &mut char_start,
                &mut row_chars,
                &mut x,
            );
        }
        row_text.push_str(g);
        row_chars += g.chars().count();
        x += adv;
        cell_x.push(x);
        char_x.push(row_chars);
    }
    flush(
        &mut rows,
        &mut row_text,
        &mut cell_x,
        &mut char_x,
        &mut char_start,
        &mut row_chars,
        &mut x,
    );

    let height = rows.len() as u32 * row_height;
    ShapedLine { rows, height }
}

/// 装饰文本字符偏移 → (x, 行内 y)
fn cursor_x(shaped: &ShapedLine, target: usize) -> Option<(u32, u32)> {
    for row in &shaped.rows {
        let row_len = *row.char_x.last()?;
        if target < row.char_start || target > row.char_start + row_len {
            continue;
        }
        let rel = target - row.char_start;
        let i = row.char_x.iter().position(|&c| c >= rel)?;
        return Some((row.cell_x[i], row.y));
    }
    shaped
        .rows
        .last()
        .map(|row| (*row.cell_x.last().unwrap_or(&0), row.y))
}

#[cfg(test)]
#[path = "../../tests/unit/styles/layout.rs"]
mod tests;
