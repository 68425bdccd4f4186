//! scriptdoc - 脚本文档核心库
//!
//! 模块结构：
//! - models: 数据模型（Document 节点树、TextLine、坐标运算、光标/选区、快照）
//! - styles: 样式层（样式注册表、漫画脚本样式集、逐行布局与缓存）
//! - logging: 日志初始化（宿主应用可选）
//!
//! 本库只负责文档模型与布局计算，不含渲染/窗口代码；
//! 宿主编辑器通过 `Painter` trait 注入绘制端。

pub mod logging;
pub mod models;
pub mod styles;

pub use models::{
    coordinate_after_offset, offset_between, Coordinate, Document, DocumentError, LineRef,
    NodeId, NodeSnapshot, NodeSuppression, ScriptCursor, SelectionScope, SelectionState,
};
pub use styles::{
    insert_styled, FontSpec, LayoutContext, LevelJump, Modifiers, Painter, StyleManager,
    TextStyle,
};
