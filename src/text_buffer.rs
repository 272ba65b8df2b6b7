use crate::error::{Error, Result};
use crate::row::Row;
use std::cmp;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::slice;
use tracing::{info, warn};

// Contain both actual path sequence and display string
pub struct FilePath {
    pub path: PathBuf,
    pub display: String,
}

impl FilePath {
    fn from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        FilePath {
            path: PathBuf::from(path),
            display: path.to_string_lossy().to_string(),
        }
    }

    fn from_string<S: Into<String>>(s: S) -> Self {
        let display = s.into();
        FilePath {
            path: PathBuf::from(&display),
            display,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CursorDir {
    Left,
    Right,
    Up,
    Down,
}

pub struct Lines<'a>(slice::Iter<'a, Row>);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|r| r.buffer())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.as_slice().len();
        (len, Some(len))
    }
}

pub struct TextBuffer {
    // (x, y) coordinate in internal text buffer of rows. `cy == row.len()` is the virtual empty
    // line after the last row, materialized on first edit
    cx: usize,
    cy: usize,
    // File editor is opening
    file: Option<FilePath>,
    // Lines of text buffer
    row: Vec<Row>,
    // Incremented on every change after loading or saving a file
    dirty: usize,
}

impl TextBuffer {
    pub fn empty() -> Self {
        Self {
            cx: 0,
            cy: 0,
            file: None,
            row: vec![],
            dirty: 0,
        }
    }

    pub fn with_lines<L, I>(lines: I) -> Self
    where
        L: Into<Vec<u8>>,
        I: IntoIterator<Item = L>,
    {
        Self {
            row: lines.into_iter().map(Row::new).collect(),
            ..Self::empty()
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source: io::Error| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        };

        let reader = io::BufReader::new(File::open(path).map_err(open_error)?);
        let mut row = vec![];
        for line in reader.split(b'\n') {
            let mut line = line.map_err(open_error)?;
            while line.last() == Some(&b'\r') {
                line.pop();
            }
            row.push(Row::new(line));
        }

        info!(path = %path.display(), lines = row.len(), "opened file");

        Ok(Self {
            file: Some(FilePath::from(path)),
            row,
            ..Self::empty()
        })
    }

    pub fn insert_row<B: Into<Vec<u8>>>(&mut self, at: usize, content: B) {
        if at > self.row.len() {
            return;
        }
        self.row.insert(at, Row::new(content));
        self.dirty += 1;
    }

    pub fn delete_row(&mut self, at: usize) -> Option<Row> {
        if at >= self.row.len() {
            return None;
        }
        self.dirty += 1;
        Some(self.row.remove(at))
    }

    pub fn insert_char_at(&mut self, y: usize, at: usize, b: u8) {
        if let Some(row) = self.row.get_mut(y) {
            row.insert_char(at, b);
            self.dirty += 1;
        }
    }

    pub fn delete_char_at(&mut self, y: usize, at: usize) {
        if let Some(row) = self.row.get_mut(y) {
            if at < row.len() {
                row.delete_char(at);
                self.dirty += 1;
            }
        }
    }

    pub fn append_content(&mut self, y: usize, content: &[u8]) {
        if let Some(row) = self.row.get_mut(y) {
            row.append(content);
            self.dirty += 1;
        }
    }

    // Moves the bytes after `x` on line `y` to a new line just below
    pub fn split_row_at(&mut self, y: usize, x: usize) {
        if y >= self.row.len() {
            return;
        }
        let rest = self.row[y].split_off(x);
        self.insert_row(y + 1, rest);
    }

    // Concatenates line `y` to the line above and removes it. Returns the join point in the
    // previous line
    pub fn join_with_previous(&mut self, y: usize) -> Option<usize> {
        if y == 0 || y >= self.row.len() {
            return None;
        }
        let removed = self.delete_row(y)?;
        let at = self.row[y - 1].len();
        self.append_content(y - 1, &removed.into_buffer());
        Some(at)
    }

    pub fn insert_char(&mut self, b: u8) {
        if self.cy == self.row.len() {
            self.insert_row(self.cy, vec![]);
        }
        self.insert_char_at(self.cy, self.cx, b);
        self.cx += 1;
    }

    pub fn insert_line(&mut self) {
        if self.cx == 0 {
            self.insert_row(self.cy, vec![]);
        } else {
            self.split_row_at(self.cy, self.cx);
        }
        self.cy += 1;
        self.cx = 0;
    }

    pub fn delete_char(&mut self) {
        if self.cy == self.row.len() || self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.delete_char_at(self.cy, self.cx - 1);
            self.cx -= 1;
        } else if let Some(at) = self.join_with_previous(self.cy) {
            // At top of line, backspace concats current line to previous line
            self.cy -= 1;
            self.cx = at;
        }
    }

    pub fn move_cursor_one(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Up => self.cy = self.cy.saturating_sub(1),
            CursorDir::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    // When moving to left at top of line, move cursor to end of previous line
                    self.cy -= 1;
                    self.cx = self.row[self.cy].len();
                }
            }
            CursorDir::Down => {
                // Allow to move cursor until next line to the last line of file to enable to add a
                // new line at the end.
                if self.cy < self.row.len() {
                    self.cy += 1;
                }
            }
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    if self.cx < self.row[self.cy].len() {
                        self.cx += 1;
                    } else {
                        // When moving to right at the end of line, move cursor to top of next line.
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
        };

        // Snap cursor to end of line when moving up/down from longer line
        let len = self.row.get(self.cy).map(Row::len).unwrap_or(0);
        if self.cx > len {
            self.cx = len;
        }
    }

    pub fn move_cursor_page(&mut self, dir: CursorDir, rowoff: usize, num_rows: usize) {
        self.cy = match dir {
            CursorDir::Up => rowoff, // Top of screen
            CursorDir::Down => {
                cmp::min(rowoff + num_rows.saturating_sub(1), self.row.len()) // Bottom of screen
            }
            _ => return,
        };
        for _ in 0..num_rows {
            self.move_cursor_one(dir);
        }
    }

    pub fn move_cursor_to_line_edge(&mut self, dir: CursorDir) {
        match dir {
            CursorDir::Left => self.cx = 0,
            CursorDir::Right => {
                if self.cy < self.row.len() {
                    self.cx = self.row[self.cy].len();
                }
            }
            _ => {}
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.row
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn filename(&self) -> &str {
        self.file
            .as_ref()
            .map(|f| f.display.as_str())
            .unwrap_or("[No Name]")
    }

    pub fn dirty(&self) -> usize {
        self.dirty
    }

    pub fn modified(&self) -> bool {
        self.dirty > 0
    }

    pub fn cx(&self) -> usize {
        self.cx
    }

    pub fn cy(&self) -> usize {
        self.cy
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    // X coordinate of the cursor in rendered text of the current line
    pub fn rx(&self) -> usize {
        self.row
            .get(self.cy)
            .map(|r| r.rx_from_cx(self.cx))
            .unwrap_or(0)
    }

    pub fn lines(&self) -> Lines<'_> {
        Lines(self.row.iter())
    }

    pub fn set_file<S: Into<String>>(&mut self, file_path: S) {
        self.file = Some(FilePath::from_string(file_path));
    }

    pub fn set_unnamed(&mut self) {
        self.file = None;
    }

    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cx = x;
        self.cy = y;
    }

    fn contents(&self) -> Vec<u8> {
        let cap = self.row.iter().fold(0, |acc, r| acc + r.len() + 1);
        let mut buf = Vec::with_capacity(cap);
        for row in self.row.iter() {
            buf.extend_from_slice(row.buffer());
            buf.push(b'\n');
        }
        buf
    }

    fn write_to(path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o644)
            .open(path)?;
        f.set_len(contents.len() as u64)?;
        f.write_all(contents)?;
        f.flush()
    }

    // Returns a message for the message bar. Dirty state is kept when writing failed
    pub fn save(&mut self) -> std::result::Result<String, String> {
        let file = if let Some(file) = &self.file {
            file
        } else {
            return Err("No file name to save".to_string());
        };

        let contents = self.contents();
        if let Err(err) = Self::write_to(&file.path, &contents) {
            warn!(path = %file.display, %err, "could not save");
            return Err(format!("Can't save! I/O error: {}", err));
        }

        info!(path = %file.display, bytes = contents.len(), "saved");
        self.dirty = 0;
        Ok(format!("{} bytes written to {}", contents.len(), file.display))
    }
}
