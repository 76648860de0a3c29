//! Phase 1: Scanner
//!
//! The scanner turns raw source lines into numbered, trimmed lines and drops
//! blank ones. It also provides the block scanner used at every nesting level
//! (entity, entityDef, array, object).
//!
//! Block extent is decided by the last character of each line only: a line
//! ending in `{` opens a level, a line ending in `}` closes one. Braces
//! anywhere else on a line, including inside quoted strings, are ignored.
//! Files produced for this format keep every brace at the end of its line.

/// A non-blank source line with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based physical line number.
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// The line ends with `{`.
    pub fn opens_block(&self) -> bool {
        self.text.ends_with('{')
    }

    /// The line ends with `}`.
    pub fn closes_block(&self) -> bool {
        self.text.ends_with('}')
    }
}

/// Trim one physical line. Returns `None` for blank lines.
///
/// A byte order mark at the start of line 1 is dropped; `trim` does not
/// treat it as whitespace.
pub fn scan_line(number: usize, raw: &str) -> Option<Line> {
    let raw = match number {
        1 => raw.strip_prefix('\u{feff}').unwrap_or(raw),
        _ => raw,
    };
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    Some(Line::new(number, text))
}

/// Scan a whole source text.
pub fn scan(source: &str) -> impl Iterator<Item = Line> + '_ {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| scan_line(i + 1, raw))
}

/// Extent of one balanced block inside a slice of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Index of the opening line.
    pub start: usize,
    /// Index one past the last line of the block.
    pub end: usize,
    /// Whether a matching closing line was found before the slice ran out.
    pub closed: bool,
}

impl BlockSpan {
    pub fn lines<'a>(&self, lines: &'a [Line]) -> &'a [Line] {
        &lines[self.start..self.end]
    }
}

/// Find the block opened by `lines[start]`.
///
/// The opening line counts as depth one whatever its last character is, so
/// callers check `opens_block` first when that matters. An unclosed block
/// extends to the end of the slice.
pub fn find_block(lines: &[Line], start: usize) -> BlockSpan {
    let mut depth = 1usize;
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        if line.opens_block() {
            depth += 1;
        } else if line.closes_block() {
            depth -= 1;
            if depth == 0 {
                return BlockSpan {
                    start,
                    end: start + offset + 2,
                    closed: true,
                };
            }
        }
    }
    BlockSpan {
        start,
        end: lines.len(),
        closed: false,
    }
}

/// Running brace count for a block whose lines arrive one at a time.
///
/// Used by the reader, which sees the file as a stream and cannot look
/// ahead the way [`find_block`] does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BraceCounter {
    pub opened: usize,
    pub closed: usize,
}

impl BraceCounter {
    /// Count one line.
    pub fn count(&mut self, line: &Line) {
        if line.opens_block() {
            self.opened += 1;
        }
        if line.closes_block() {
            self.closed += 1;
        }
    }

    /// Every opened level has been closed.
    pub fn is_balanced(&self) -> bool {
        self.opened == self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<Line> {
        scan(src).collect()
    }

    #[test]
    fn test_scan_trims_and_numbers() {
        let result = lines("entity {\n\n   entityDef a {\r\n\t}\n");
        assert_eq!(
            result,
            vec![
                Line::new(1, "entity {"),
                Line::new(3, "entityDef a {"),
                Line::new(4, "}"),
            ]
        );
    }

    #[test]
    fn test_scan_line_blank() {
        assert_eq!(scan_line(1, "   \t "), None);
        assert_eq!(scan_line(2, " x = 1; "), Some(Line::new(2, "x = 1;")));
    }

    #[test]
    fn test_scan_strips_leading_bom() {
        assert_eq!(
            lines("\u{feff}Version 7\n\u{feff}x"),
            vec![Line::new(1, "Version 7"), Line::new(2, "\u{feff}x")]
        );
        assert_eq!(scan_line(1, "\u{feff}  "), None);
    }

    #[test]
    fn test_find_block_nested() {
        let ls = lines("a = {\nb = {\nc = 1;\n}\n}\nd = 2;");
        let span = find_block(&ls, 0);
        assert_eq!(span, BlockSpan { start: 0, end: 5, closed: true });
        assert_eq!(span.lines(&ls).last().unwrap().number, 5);

        let inner = find_block(&ls, 1);
        assert_eq!(inner, BlockSpan { start: 1, end: 4, closed: true });
    }

    #[test]
    fn test_find_block_unclosed() {
        let ls = lines("a = {\nb = 1;\nc = {\n}");
        let span = find_block(&ls, 0);
        assert_eq!(span, BlockSpan { start: 0, end: 4, closed: false });
    }

    #[test]
    fn test_only_last_character_counts() {
        // The brace inside the string is not at the end of the line.
        let ls = lines("a = {\ns = \"{\";\n}");
        assert_eq!(find_block(&ls, 0).end, 3);

        // Inline braces are not a block of their own.
        let ls = lines("a = {\nb = {}\n}");
        let span = find_block(&ls, 0);
        assert_eq!(span, BlockSpan { start: 0, end: 2, closed: true });
    }

    #[test]
    fn test_brace_counter() {
        let mut counter = BraceCounter::default();
        for line in lines("entity {\nentityDef x {\n}\n}") {
            counter.count(&line);
        }
        assert_eq!(counter, BraceCounter { opened: 2, closed: 2 });
        assert!(counter.is_balanced());
    }
}
