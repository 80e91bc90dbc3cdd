// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// A small VT100 subset, enough to check what the redraw engine leaves on screen.
///
/// - Printable text with auto wrap. Like a real terminal, printing into the last column
///   leaves the cursor there until the next printable character arrives.
/// - `CR`, `LF` (no implicit carriage return), `BS`, and `BEL` (counted).
/// - CSI `A` `B` `C` `D` `G` `H` `J` `K`.
///
/// Rows grow without limit, there is no scrolling, and [`TestTerminal::set_width`] does
/// not reflow.
#[derive(Debug, Clone)]
pub struct TestTerminal {
    width: usize,
    grid: Vec<Vec<char>>,
    row: usize,
    col: usize,
    pending_wrap: bool,
    bell_count: usize,
    parser: ParserState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    Ground,
    Escape,
    Csi(String),
}

impl TestTerminal {
    #[must_use]
    pub fn new(width: u16) -> Self {
        Self {
            width: usize::from(width).max(1),
            grid: vec![],
            row: 0,
            col: 0,
            pending_wrap: false,
            bell_count: 0,
            parser: ParserState::Ground,
        }
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = usize::from(width).max(1);
        for line in &mut self.grid {
            line.truncate(self.width);
        }
        self.col = self.col.min(self.width - 1);
        self.pending_wrap = false;
    }

    pub fn write_str(&mut self, text: &str) {
        for c in text.chars() {
            self.write_char(c);
        }
    }

    /// Rows with trailing blanks trimmed, trailing empty rows dropped.
    #[must_use]
    pub fn screen_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|line| line.iter().collect::<String>().trim_end().to_string())
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines
    }

    /// `(row, col)`.
    #[must_use]
    pub fn cursor(&self) -> (usize, usize) { (self.row, self.col) }

    #[must_use]
    pub fn bell_count(&self) -> usize { self.bell_count }

    fn write_char(&mut self, c: char) {
        match std::mem::replace(&mut self.parser, ParserState::Ground) {
            ParserState::Ground => self.ground(c),
            ParserState::Escape => {
                if c == '[' {
                    self.parser = ParserState::Csi(String::new());
                }
            }
            ParserState::Csi(mut params) => {
                if c.is_ascii_digit() || c == ';' || c == '?' {
                    params.push(c);
                    self.parser = ParserState::Csi(params);
                } else {
                    self.csi(&params, c);
                }
            }
        }
    }

    fn ground(&mut self, c: char) {
        match c {
            '\u{1b}' => self.parser = ParserState::Escape,
            '\r' => {
                self.col = 0;
                self.pending_wrap = false;
            }
            '\n' => {
                self.row += 1;
                self.pending_wrap = false;
            }
            '\u{8}' => {
                self.col = self.col.saturating_sub(1);
                self.pending_wrap = false;
            }
            '\u{7}' => self.bell_count += 1,
            c if c.is_control() => {}
            c => self.print(c),
        }
    }

    fn print(&mut self, c: char) {
        if self.pending_wrap {
            self.row += 1;
            self.col = 0;
            self.pending_wrap = false;
        }
        *self.cell(self.row, self.col) = c;
        if self.col + 1 == self.width {
            self.pending_wrap = true;
        } else {
            self.col += 1;
        }
    }

    fn csi(&mut self, params: &str, final_char: char) {
        let args: Vec<usize> = params
            .trim_start_matches('?')
            .split(';')
            .map(|it| it.parse().unwrap_or(0))
            .collect();
        let arg = |index: usize| args.get(index).copied().unwrap_or(0);
        let count = arg(0).max(1);
        self.pending_wrap = false;

        match final_char {
            'A' => self.row = self.row.saturating_sub(count),
            'B' => self.row += count,
            'C' => self.col = (self.col + count).min(self.width - 1),
            'D' => self.col = self.col.saturating_sub(count),
            'G' => self.col = (count - 1).min(self.width - 1),
            'H' => {
                self.row = arg(0).max(1) - 1;
                self.col = (arg(1).max(1) - 1).min(self.width - 1);
            }
            'K' => {
                let (row, col, width) = (self.row, self.col, self.width);
                let range = match arg(0) {
                    1 => 0..col + 1,
                    2 => 0..width,
                    _ => col..width,
                };
                for index in range {
                    *self.cell(row, index) = ' ';
                }
            }
            'J' => match arg(0) {
                2 | 3 => self.grid.clear(),
                _ => {
                    let (row, col, width) = (self.row, self.col, self.width);
                    for index in col..width {
                        *self.cell(row, index) = ' ';
                    }
                    self.grid.truncate(row + 1);
                }
            },
            _ => {}
        }
    }

    fn cell(&mut self, row: usize, col: usize) -> &mut char {
        while self.grid.len() <= row {
            self.grid.push(vec![]);
        }
        let line = &mut self.grid[row];
        while line.len() <= col {
            line.push(' ');
        }
        &mut line[col]
    }
}
