//! Plain-text line buffer with a cursor
//!
//! The cursor column counts `char`s, not bytes, matching the character spans
//! the calculator reports.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

impl Editor {
    /// Split `text` on `\n`, dropping a `\r` before each break.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self {
            lines,
            row: 0,
            col: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `(row, column)` of the cursor
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn current(&self) -> &str {
        &self.lines[self.row]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ===== Edits =====

    pub fn insert_char(&mut self, c: char) {
        let at = byte_index(self.current(), self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    /// Split the current line at the cursor
    pub fn insert_newline(&mut self) {
        let at = byte_index(self.current(), self.col);
        let rest = self.lines[self.row].split_off(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, rest);
    }

    /// Delete the character before the cursor, joining lines at column 0.
    /// Returns `false` if nothing changed.
    pub fn backspace(&mut self) -> bool {
        if self.col > 0 {
            self.col -= 1;
            let at = byte_index(self.current(), self.col);
            self.lines[self.row].remove(at);
            return true;
        }
        if self.row == 0 {
            return false;
        }

        let line = self.lines.remove(self.row);
        self.row -= 1;
        self.col = char_len(self.current());
        self.lines[self.row].push_str(&line);
        true
    }

    /// Delete the character under the cursor, joining the next line at the
    /// end of a line. Returns `false` if nothing changed.
    pub fn delete(&mut self) -> bool {
        if self.col < char_len(self.current()) {
            let at = byte_index(self.current(), self.col);
            self.lines[self.row].remove(at);
            return true;
        }
        if self.row + 1 >= self.lines.len() {
            return false;
        }

        let next = self.lines.remove(self.row + 1);
        self.lines[self.row].push_str(&next);
        true
    }

    // ===== Movement =====

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = char_len(self.current());
        }
    }

    pub fn move_right(&mut self) {
        if self.col < char_len(self.current()) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self, rows: usize) {
        self.row = self.row.saturating_sub(rows);
        self.clamp_col();
    }

    pub fn move_down(&mut self, rows: usize) {
        self.row = (self.row + rows).min(self.lines.len() - 1);
        self.clamp_col();
    }

    pub fn home(&mut self) {
        self.col = 0;
    }

    pub fn end(&mut self) {
        self.col = char_len(self.current());
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(char_len(self.current()));
    }
}
