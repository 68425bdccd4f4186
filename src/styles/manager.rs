//! 样式注册表与结构插入驱动

use rustc_hash::FxHashMap;
use tracing::debug;

use super::style::{LevelJump, Modifiers, TextStyle};
use crate::models::{Document, NodeId};

/// 进程内样式注册表：样式码 → 规则
///
/// 查不到的码由调用方回退到默认码；默认码本身查不到时
/// 布局/渲染按静默跳过处理。
pub struct StyleManager {
    styles: FxHashMap<i32, TextStyle>,
    default_code: i32,
}

impl StyleManager {
    pub fn new(default_code: i32) -> Self {
        Self {
            styles: FxHashMap::default(),
            default_code,
        }
    }

    pub fn default_code(&self) -> i32 {
        self.default_code
    }

    /// 注册（同码覆盖）
    pub fn register_style(&mut self, style: TextStyle) {
        debug!(code = style.code, name = %style.name, "register_style");
        self.styles.insert(style.code, style);
    }

    pub fn remove_style(&mut self, code: i32) {
        self.styles.remove(&code);
    }

    pub fn style_by_code(&self, code: i32) -> Option<&TextStyle> {
        self.styles.get(&code)
    }

    /// 带默认回退的查取；默认码也未注册时为 None
    pub fn style_or_default(&self, code: i32) -> Option<&TextStyle> {
        self.styles
            .get(&code)
            .or_else(|| self.styles.get(&self.default_code))
    }
}

/// 执行一次"创建下一块"命令
///
/// 按 anchor 的样式决策表选出 (下一样式码, 层级跳转)，调用对应的
/// 插入原语，并把新节点行数对齐到其样式的期望行数。
/// 未映射的修饰键、或结构插入失败（如对根节点要求 After）时为 None。
pub fn insert_styled(
    doc: &mut Document,
    mgr: &StyleManager,
    anchor: NodeId,
    modifiers: Modifiers,
) -> Option<NodeId> {
    let code = doc.style_code(anchor)?;
    let style = mgr.style_or_default(code)?;
    let (next_code, jump) = style.next_style_for(modifiers)?;

    let id = match jump {
        LevelJump::Below => doc.insert_node_below(anchor, next_code, -1),
        LevelJump::After => doc.insert_node_after(anchor, next_code),
        LevelJump::Above => doc.insert_node_above(anchor, next_code),
        LevelJump::UnderRoot => doc.insert_node_sub_root(anchor, next_code),
    }
    .ok()?;

    if let Some(next_style) = mgr.style_or_default(next_code) {
        if next_style.expected_nb_text_lines >= 1 {
            doc.set_nb_text_lines(id, next_style.expected_nb_text_lines);
        }
    }
    Some(id)
}

#[cfg(test)]
#[path = "../../tests/unit/styles/manager.rs"]
mod tests;
