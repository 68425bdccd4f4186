//! 样式层
//!
//! - style: 样式规则数据（字体、边距、前后缀、决策表）
//! - manager: 注册表与结构插入驱动
//! - comic: 漫画脚本样式集
//! - layout: 逐行成形、缓存、节点高度与绘制

pub mod comic;
pub mod layout;
pub mod manager;
pub mod style;

pub use layout::{LayoutContext, NodeMetrics, Painter, ShapedLine, ShapedRow};
pub use manager::{insert_styled, StyleManager};
pub use style::{FontSpec, LevelJump, Modifiers, PrefixRule, SuffixRule, TextStyle};
