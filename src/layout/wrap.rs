use crate::{
    assets::{fonts::FontHandle, text::TextLayoutEngine},
    foundation::error::BadgeResult,
};

/// Smallest per-line character budget tried before giving up on wrapping.
pub const MIN_CHARS_PER_LINE: usize = 4;

/// Text wrapped into lines with their measured pixel sizes.
///
/// `lines`, `line_widths` and `line_heights` are parallel and never empty.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct WrappedBlock {
    /// Line strings, top to bottom.
    pub lines: Vec<String>,
    /// Rendered width of each line.
    pub line_widths: Vec<u32>,
    /// Rendered height of each line.
    pub line_heights: Vec<u32>,
}

impl WrappedBlock {
    /// Total height with `line_gap` pixels between consecutive lines.
    pub fn block_height(&self, line_gap: u32) -> u32 {
        let gaps = line_gap * (self.lines.len().saturating_sub(1) as u32);
        self.line_heights.iter().sum::<u32>() + gaps
    }

    /// Widest line.
    pub fn max_line_width(&self) -> u32 {
        self.line_widths.iter().copied().max().unwrap_or(0)
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Trim and collapse whitespace runs to single spaces.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap at `budget` characters per line. Words are never split; a word longer than
/// the budget gets a line of its own. Breaks happen at spaces only, so hyphenated words stay whole.
pub fn greedy_wrap(words: &[&str], budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in words {
        let len = word.chars().count();
        if current_len > 0 && current_len + 1 + len > budget {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Wrap `text` so no line is wider than `max_px`, using as few lines as possible.
///
/// Character budgets are tried from the full text length down to [`MIN_CHARS_PER_LINE`]; the
/// first wrapping whose widest line fits wins. When none fits (a single word is too wide, or
/// `max_px` is tiny) the whole text is returned as one overflowing line.
pub fn wrap_to_fit(
    engine: &mut TextLayoutEngine,
    font: &FontHandle,
    text: &str,
    max_px: u32,
) -> BadgeResult<WrappedBlock> {
    let text = normalize_text(text);
    if text.is_empty() {
        let blank = engine.measure(font, "")?;
        return Ok(WrappedBlock {
            lines: vec![String::new()],
            line_widths: vec![0],
            line_heights: vec![blank.height],
        });
    }

    let words = text.split(' ').collect::<Vec<_>>();
    let mut last_lines: Option<Vec<String>> = None;
    for budget in (MIN_CHARS_PER_LINE..=text.chars().count()).rev() {
        let lines = greedy_wrap(&words, budget);
        if last_lines.as_ref() == Some(&lines) {
            continue;
        }
        let block = measure_lines(engine, font, lines.clone())?;
        if block.max_line_width() <= max_px {
            return Ok(block);
        }
        last_lines = Some(lines);
    }

    let block = measure_lines(engine, font, vec![text])?;
    if block.max_line_width() > max_px {
        tracing::warn!(
            width = block.max_line_width(),
            max_px,
            size_pt = font.size_pt(),
            "text cannot be wrapped to fit, accepting overflow"
        );
    }
    Ok(block)
}

fn measure_lines(
    engine: &mut TextLayoutEngine,
    font: &FontHandle,
    lines: Vec<String>,
) -> BadgeResult<WrappedBlock> {
    let mut line_widths = Vec::with_capacity(lines.len());
    let mut line_heights = Vec::with_capacity(lines.len());
    for line in &lines {
        let ext = engine.measure(font, line)?;
        line_widths.push(ext.width);
        line_heights.push(ext.height);
    }
    Ok(WrappedBlock {
        lines,
        line_widths,
        line_heights,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
