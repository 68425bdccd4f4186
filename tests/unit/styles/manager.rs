use super::*;
use crate::models::Document;
use crate::styles::style::{PrefixRule, SuffixRule};

fn two_style_manager() -> StyleManager {
    let mut mgr = StyleManager::new(3);
    let mut caption = TextStyle::new(3, "caption");
    caption.expected_nb_text_lines = 0;
    mgr.register_style(caption);

    let mut dialog = TextStyle::new(4, "dialog");
    dialog.expected_nb_text_lines = 2;
    dialog.prefix = PrefixRule::FromSecondLine("– ");
    dialog.suffix = SuffixRule::FirstLine(":");
    dialog.next_styles = vec![
        (Modifiers::Plain, 4, LevelJump::After),
        (Modifiers::Alt, 3, LevelJump::After),
    ];
    mgr.register_style(dialog);
    mgr
}

#[test]
fn test_register_then_lookup_returns_same_entry() {
    let mgr = two_style_manager();
    let style = mgr.style_by_code(4).unwrap();
    assert_eq!(style.code, 4);
    assert_eq!(style.name, "dialog");
}

#[test]
fn test_remove_falls_back_to_default() {
    let mut mgr = two_style_manager();
    mgr.remove_style(4);
    assert!(mgr.style_by_code(4).is_none());
    let fallback = mgr.style_or_default(4).unwrap();
    assert_eq!(fallback.code, mgr.default_code());
}

#[test]
fn test_unknown_default_means_silent_skip() {
    let mgr = StyleManager::new(99);
    assert!(mgr.style_or_default(1).is_none());
}

#[test]
fn test_insert_styled_follows_decision_table() {
    let mut doc = Document::new();
    let mgr = two_style_manager();
    let root = doc.root();
    let dialog = doc.insert_node_below(root, 4, -1).unwrap();

    let next = insert_styled(&mut doc, &mgr, dialog, Modifiers::Plain).unwrap();
    assert_eq!(doc.style_code(next), Some(4));
    assert_eq!(doc.parent(next), Some(root));
    assert_eq!(doc.node_index(next), Some(1));
    // 对白节点自动扩成 2 行（说话人 + 台词）
    assert_eq!(doc.nb_text_lines(next), 2);

    let caption = insert_styled(&mut doc, &mgr, next, Modifiers::Alt).unwrap();
    assert_eq!(doc.style_code(caption), Some(3));
    assert_eq!(doc.nb_text_lines(caption), 1);
}

#[test]
fn test_insert_styled_unmapped_modifier_is_noop() {
    let mut doc = Document::new();
    let mgr = two_style_manager();
    let root = doc.root();
    let dialog = doc.insert_node_below(root, 4, -1).unwrap();
    let before = doc.preorder().len();
    assert!(insert_styled(&mut doc, &mgr, dialog, Modifiers::Ctrl).is_none());
    assert_eq!(doc.preorder().len(), before);
}
