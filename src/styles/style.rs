//! 样式规则：以数据表代替虚函数继承
//!
//! 每个样式是一组纯数据规则（字体、边距、前后缀、期望行数、
//! 结构插入决策表），由注册表按样式码查取。

use compact_str::CompactString;
use compact_str::format_compact;

/// 字体描述与派生度量
///
/// 度量模型：行高 = size，ascent 占 4/5，descent 占余下 1/5；
/// 水平方向按显示单元格推进，每格 size/2。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn ascent(&self) -> u32 {
        self.size * 4 / 5
    }

    pub fn descent(&self) -> u32 {
        self.size - self.ascent()
    }

    /// 行高 = ascent + descent
    pub fn line_height(&self) -> u32 {
        self.ascent() + self.descent()
    }

    /// 单个显示格的水平推进量
    pub fn cell_advance(&self) -> u32 {
        (self.size / 2).max(1)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(16)
    }
}

/// 结构插入的层级关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelJump {
    /// 作为当前节点的子节点
    Below,
    /// 当前节点之后的同级
    After,
    /// 父节点之后的同级（上跳一级）
    Above,
    /// 次根子树之后、文档根之下
    UnderRoot,
}

/// 结构插入命令的修饰键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifiers {
    #[default]
    Plain,
    Shift,
    Ctrl,
    Alt,
}

/// 行前缀规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixRule {
    #[default]
    None,
    /// 首行编号前缀，如 "Page 2 "（序号取同样式兄弟间的下标）
    Numbered(&'static str),
    /// 第二行起固定前缀（对白续行的破折号）
    FromSecondLine(&'static str),
}

/// 行后缀规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuffixRule {
    #[default]
    None,
    /// 仅首行的固定后缀（说话人后的冒号）
    FirstLine(&'static str),
}

/// 一条样式规则
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub code: i32,
    pub name: CompactString,
    pub font: FontSpec,
    /// 节点期望行数（布局时自动对齐）；0 表示不约束
    pub expected_nb_text_lines: usize,
    pub top_margin: u32,
    pub bottom_margin: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    /// 相邻两行之间的纵向间距
    pub line_margin: u32,
    /// '\t' 展开的显示格数
    pub tab_indent: u32,
    pub prefix: PrefixRule,
    pub suffix: SuffixRule,
    /// 结构插入决策表：修饰键 → (下一样式码, 层级跳转)
    pub next_styles: Vec<(Modifiers, i32, LevelJump)>,
}

impl TextStyle {
    pub fn new(code: i32, name: &str) -> Self {
        Self {
            code,
            name: CompactString::from(name),
            font: FontSpec::default(),
            expected_nb_text_lines: 0,
            top_margin: 0,
            bottom_margin: 0,
            left_margin: 0,
            right_margin: 0,
            line_margin: 0,
            tab_indent: 4,
            prefix: PrefixRule::None,
            suffix: SuffixRule::None,
            next_styles: Vec::new(),
        }
    }

    /// 某行的前缀文本；ordinal 为同样式兄弟间的序号（从 1 起）
    pub fn line_prefix(&self, line_index: usize, ordinal: usize) -> CompactString {
        match self.prefix {
            PrefixRule::None => CompactString::default(),
            PrefixRule::Numbered(label) => {
                if line_index == 0 {
                    format_compact!("{label} {ordinal} ")
                } else {
                    CompactString::default()
                }
            }
            PrefixRule::FromSecondLine(text) => {
                if line_index >= 1 {
                    CompactString::from(text)
                } else {
                    CompactString::default()
                }
            }
        }
    }

    /// 某行的后缀文本
    pub fn line_suffix(&self, line_index: usize) -> CompactString {
        match self.suffix {
            SuffixRule::None => CompactString::default(),
            SuffixRule::FirstLine(text) => {
                if line_index == 0 {
                    CompactString::from(text)
                } else {
                    CompactString::default()
                }
            }
        }
    }

    /// 查决策表；未映射的修饰键组合为 None
    pub fn next_style_for(&self, modifiers: Modifiers) -> Option<(i32, LevelJump)> {
        self.next_styles
            .iter()
            .find(|(m, _, _)| *m == modifiers)
            .map(|&(_, code, jump)| (code, jump))
    }
}
