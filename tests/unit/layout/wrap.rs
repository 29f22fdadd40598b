use super::*;
use crate::{
    assets::fonts::FontProvider,
    foundation::{config::FontSearchConfig, core::FontWeight},
};

// Built-in face at 10pt: 6px advance per char, 5px glyphs, 7px lines.
fn setup() -> (FontProvider, TextLayoutEngine) {
    (
        FontProvider::new(FontSearchConfig::builtin_only()),
        TextLayoutEngine::new(),
    )
}

#[test]
fn greedy_wrap_respects_budget_without_splitting_words() {
    let words = ["Introduction", "to", "Data", "Science"];
    assert_eq!(
        greedy_wrap(&words, 19),
        vec!["Introduction to", "Data Science"]
    );
    assert_eq!(
        greedy_wrap(&words, 4),
        vec!["Introduction", "to", "Data", "Science"]
    );
    assert_eq!(greedy_wrap(&[], 10), Vec::<String>::new());
}

#[test]
fn normalize_collapses_whitespace() {
    assert_eq!(normalize_text("  Data \t  Science\n"), "Data Science");
    assert_eq!(normalize_text(" \n "), "");
}

#[test]
fn short_text_fits_on_one_line() {
    let (provider, mut engine) = setup();
    let font = provider.resolve(FontWeight::ExtraBold, 10);
    let block = wrap_to_fit(&mut engine, &font, "AI", 1000).unwrap();
    assert_eq!(block.lines, vec!["AI"]);
    assert_eq!(block.line_widths, vec![11]);
    assert_eq!(block.line_heights, vec![7]);
}

#[test]
fn fewest_lines_that_fit_are_chosen() {
    let (provider, mut engine) = setup();
    let font = provider.resolve(FontWeight::ExtraBold, 10);

    let wide = wrap_to_fit(&mut engine, &font, "Introduction to Data Science", 1000).unwrap();
    assert_eq!(wide.line_count(), 1);
    assert_eq!(wide.line_widths, vec![167]);

    let narrow = wrap_to_fit(&mut engine, &font, "Introduction to Data Science", 100).unwrap();
    assert_eq!(narrow.lines, vec!["Introduction to", "Data Science"]);
    assert_eq!(narrow.line_widths, vec![89, 71]);
    assert_eq!(narrow.block_height(8), 7 + 7 + 8);
}

#[test]
fn unbreakable_word_returns_single_overflowing_line() {
    let (provider, mut engine) = setup();
    let font = provider.resolve(FontWeight::ExtraBold, 10);
    let block = wrap_to_fit(&mut engine, &font, "Supercalifragilistic word", 50).unwrap();
    assert_eq!(block.lines, vec!["Supercalifragilistic word"]);
    assert_eq!(block.line_widths, vec![149]);
}

#[test]
fn blank_input_yields_one_empty_line_with_height() {
    let (provider, mut engine) = setup();
    let font = provider.resolve(FontWeight::Medium, 20);
    for text in ["", "   \t"] {
        let block = wrap_to_fit(&mut engine, &font, text, 100).unwrap();
        assert_eq!(block.lines, vec![String::new()]);
        assert_eq!(block.line_widths, vec![0]);
        assert_eq!(block.line_heights, vec![14]);
        assert_eq!(block.block_height(6), 14);
    }
}

#[test]
fn width_limit_holds_unless_single_line_overflow() {
    let (provider, mut engine) = setup();
    let font = provider.resolve(FontWeight::ExtraBold, 20);
    let text = "Foundations of Applied Machine Learning for Health Sciences";
    for max_px in [20, 60, 90, 150, 240, 400, 900] {
        let block = wrap_to_fit(&mut engine, &font, text, max_px).unwrap();
        assert_eq!(block.lines.len(), block.line_widths.len());
        assert_eq!(block.lines.len(), block.line_heights.len());
        if block.max_line_width() > max_px {
            assert_eq!(block.lines, vec![text.to_string()]);
        }
        assert_eq!(block.lines.join(" "), text);
    }
}

#[test]
fn hyphenated_words_stay_whole() {
    let words = ["Object-Oriented", "Design"];
    assert_eq!(greedy_wrap(&words, 8), vec!["Object-Oriented", "Design"]);
}
