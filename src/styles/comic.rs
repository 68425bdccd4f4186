//! 漫画脚本样式集
//!
//! 层级：MAIN → PAGE → PANEL → CAPTION/DIALOG。
//! 决策表给出"创建下一块"在各修饰键下的去向；未列出的组合为 no-op。

use super::manager::StyleManager;
use super::style::{FontSpec, LevelJump, Modifiers, PrefixRule, SuffixRule, TextStyle};

pub const MAIN: i32 = 0;
pub const PAGE: i32 = 1;
pub const PANEL: i32 = 2;
pub const CAPTION: i32 = 3;
pub const DIALOG: i32 = 4;

/// 注册整套漫画脚本样式；默认样式为 CAPTION
pub fn comic_style_manager() -> StyleManager {
    let mut mgr = StyleManager::new(CAPTION);

    let mut main = TextStyle::new(MAIN, "main");
    main.font = FontSpec {
        size: 24,
        bold: true,
        italic: false,
    };
    main.bottom_margin = 12;
    main.expected_nb_text_lines = 1;
    main.next_styles = vec![(Modifiers::Plain, PAGE, LevelJump::Below)];
    mgr.register_style(main);

    let mut page = TextStyle::new(PAGE, "page");
    page.font = FontSpec {
        size: 20,
        bold: true,
        italic: false,
    };
    page.top_margin = 16;
    page.bottom_margin = 8;
    page.prefix = PrefixRule::Numbered("Page");
    page.expected_nb_text_lines = 1;
    page.next_styles = vec![
        (Modifiers::Plain, PANEL, LevelJump::Below),
        (Modifiers::Shift, PAGE, LevelJump::After),
    ];
    mgr.register_style(page);

    let mut panel = TextStyle::new(PANEL, "panel");
    panel.font = FontSpec {
        size: 16,
        bold: true,
        italic: false,
    };
    panel.top_margin = 8;
    panel.bottom_margin = 4;
    panel.left_margin = 16;
    panel.prefix = PrefixRule::Numbered("Panel");
    panel.expected_nb_text_lines = 1;
    panel.next_styles = vec![
        (Modifiers::Plain, CAPTION, LevelJump::Below),
        (Modifiers::Alt, PANEL, LevelJump::After),
        (Modifiers::Ctrl, PAGE, LevelJump::Above),
    ];
    mgr.register_style(panel);

    let mut caption = TextStyle::new(CAPTION, "caption");
    caption.font = FontSpec {
        size: 16,
        bold: false,
        italic: true,
    };
    caption.left_margin = 32;
    caption.line_margin = 2;
    caption.next_styles = vec![
        (Modifiers::Plain, DIALOG, LevelJump::After),
        (Modifiers::Alt, CAPTION, LevelJump::After),
        (Modifiers::Ctrl, PANEL, LevelJump::Above),
    ];
    mgr.register_style(caption);

    let mut dialog = TextStyle::new(DIALOG, "dialog");
    dialog.font = FontSpec {
        size: 16,
        bold: false,
        italic: false,
    };
    dialog.left_margin = 32;
    dialog.line_margin = 2;
    // 两行：说话人 + 台词
    dialog.expected_nb_text_lines = 2;
    dialog.prefix = PrefixRule::FromSecondLine("– ");
    dialog.suffix = SuffixRule::FirstLine(":");
    dialog.next_styles = vec![
        (Modifiers::Plain, DIALOG, LevelJump::After),
        (Modifiers::Alt, CAPTION, LevelJump::After),
        (Modifiers::Ctrl, PANEL, LevelJump::Above),
    ];
    mgr.register_style(dialog);

    mgr
}

#[cfg(test)]
#[path = "../../tests/unit/styles/comic.rs"]
mod tests;
