use super::errors::ParseError;
use super::types::Symbol;

/// A parsed, not-yet-live board: dimensions plus the row-major symbol list.
/// Built from the textual board-layout format:
///
/// ```text
/// <R>x<C>
/// <cell-symbol-1>
/// <cell-symbol-2>
/// ...
/// <cell-symbol-(R*C)>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    pub rows: usize,
    pub cols: usize,
    pub symbols: Vec<Symbol>,
}

impl BoardLayout {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| ParseError::BadHeader { header: String::new() })?;
        let (rows, cols) = parse_header(header)?;

        let mut body: Vec<&str> = lines.collect();
        // A trailing newline in the source file leaves one or more blank
        // lines at the end of the iterator; those are an artifact of the
        // file, not a declared cell, so they're trimmed before counting.
        while body.last().map(|l| l.trim().is_empty()).unwrap_or(false) {
            body.pop();
        }

        let expected = rows * cols;
        if body.len() != expected {
            return Err(ParseError::WrongCellCount {
                expected,
                actual: body.len(),
            });
        }

        let mut symbols = Vec::with_capacity(expected);
        for (offset, line) in body.iter().enumerate() {
            if line.trim().is_empty() {
                return Err(ParseError::EmptyCellLine { line: offset + 2 });
            }
            symbols.push((*line).to_string());
        }

        Ok(BoardLayout {
            rows,
            cols,
            symbols,
        })
    }

    /// Build a layout directly from dimensions and a symbol list, skipping
    /// text parsing. Handy for tests and for the demo binary's scripted
    /// boards.
    pub fn from_symbols(rows: usize, cols: usize, symbols: Vec<Symbol>) -> Self {
        BoardLayout {
            rows,
            cols,
            symbols,
        }
    }
}

fn parse_header(header: &str) -> Result<(usize, usize), ParseError> {
    let bad_header = || ParseError::BadHeader {
        header: header.to_string(),
    };

    let (r, c) = header.trim().split_once('x').ok_or_else(bad_header)?;
    let rows: usize = r.trim().parse().map_err(|_| bad_header())?;
    let cols: usize = c.trim().parse().map_err(|_| bad_header())?;

    if rows == 0 || cols == 0 {
        return Err(ParseError::NonPositiveDimension { rows, cols });
    }

    Ok((rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_board() {
        let text = "2x2\n🦄\n🍭\n🍭\n🦄\n";
        let layout = BoardLayout::parse(text).unwrap();
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.cols, 2);
        assert_eq!(layout.symbols, vec!["🦄", "🍭", "🍭", "🦄"]);
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(matches!(
            BoardLayout::parse("not-a-header\na\n"),
            Err(ParseError::BadHeader { .. })
        ));
    }

    #[test]
    fn rejects_zero_dimension() {
        assert!(matches!(
            BoardLayout::parse("0x3\n"),
            Err(ParseError::NonPositiveDimension { rows: 0, cols: 3 })
        ));
    }

    #[test]
    fn rejects_wrong_cell_count() {
        let err = BoardLayout::parse("2x2\na\nb\nc\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::WrongCellCount {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn rejects_blank_body_line() {
        let err = BoardLayout::parse("2x2\na\n\nc\nd\n").unwrap_err();
        assert_eq!(err, ParseError::EmptyCellLine { line: 3 });
    }
}
