//! Text measurement and wrapping
//!
//! Scene text has no renderer to ask for glyph metrics, so sizes are
//! estimated from display columns.

use unicode_width::UnicodeWidthStr;

/// Average glyph advance as a fraction of the font size
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT: f64 = 1.25;

/// Estimated size of a block of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub lines: usize,
}

/// Measure text at a font size: widest line in display columns times
/// `font_size * 0.6`, line count times `font_size * 1.25`
pub fn measure(text: &str, font_size: f64) -> TextMetrics {
    let lines: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.lines().collect()
    };
    let columns = lines
        .iter()
        .map(|line| UnicodeWidthStr::width(*line))
        .max()
        .unwrap_or(0);

    // Empty text still occupies one glyph so its element keeps a size
    let width = (columns.max(1) as f64) * font_size * CHAR_WIDTH_FACTOR;
    let count = lines.len().max(1);
    TextMetrics {
        width,
        height: count as f64 * font_size * LINE_HEIGHT,
        lines: count,
    }
}

/// Wrap text to fit within a maximum width, breaking on word boundaries.
///
/// Returns a vector of lines, each fitting within `max_width` display columns
/// unless a single word is wider. If `max_width` is 0, or the label fits on
/// one line, returns a single-element vector.
///
/// # Example
/// ```
/// use chalkline::core::wrap_label;
///
/// let lines = wrap_label("Validate user credentials", 12);
/// assert_eq!(lines, vec!["Validate", "user", "credentials"]);
/// ```
pub fn wrap_label(label: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 || UnicodeWidthStr::width(label) <= max_width {
        return vec![label.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in label.split_whitespace() {
        let word_width = UnicodeWidthStr::width(word);

        if current_width == 0 {
            current = word.to_string();
            current_width = word_width;
        } else if current_width + 1 + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
            current_width = word_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Wrap a label for a box and join the lines with newlines
pub fn wrap_for_box(label: &str, max_columns: usize) -> String {
    wrap_label(label, max_columns).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_single_line() {
        let m = measure("hello", 20.0);
        assert_eq!(m.lines, 1);
        assert!((m.width - 60.0).abs() < 1e-9);
        assert!((m.height - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_measure_multi_line_uses_widest() {
        let m = measure("ab\nabcd\na", 10.0);
        assert_eq!(m.lines, 3);
        assert!((m.width - 24.0).abs() < 1e-9);
        assert!((m.height - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_measure_wide_glyphs() {
        // CJK glyphs take two columns each
        let m = measure("日本", 10.0);
        assert!((m.width - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_measure_empty_has_size() {
        let m = measure("", 16.0);
        assert!(m.width > 0.0);
        assert!(m.height > 0.0);
    }

    #[test]
    fn test_wrap_short_label() {
        assert_eq!(wrap_label("Hello", 20), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_long_label() {
        assert_eq!(
            wrap_label("Check the user session", 10),
            vec!["Check the", "user", "session"]
        );
    }

    #[test]
    fn test_wrap_zero_width() {
        assert_eq!(wrap_label("Hello World", 0), vec!["Hello World"]);
    }

    #[test]
    fn test_wrap_for_box_joins_lines() {
        assert_eq!(wrap_for_box("one two three", 7), "one two\nthree");
    }
}
