use crate::error::{Error, Result};
use crate::row::Row;
use crate::status_bar::StatusBar;
use crate::term_color::{Color, TermColor};
use crate::text_buffer::TextBuffer;
use std::cmp;
use std::io::Write;
use std::time::{Duration, Instant};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const HELP_TEXT: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum StatusMessageKind {
    Info,
    Error,
}

struct StatusMessage {
    text: String,
    timestamp: Instant,
    kind: StatusMessageKind,
}

impl StatusMessage {
    fn new<S: Into<String>>(message: S, kind: StatusMessageKind) -> StatusMessage {
        StatusMessage {
            text: message.into(),
            timestamp: Instant::now(),
            kind,
        }
    }

    fn is_fresh(&self) -> bool {
        self.timestamp.elapsed() < MESSAGE_TIMEOUT
    }
}

pub struct Screen<W: Write> {
    output: W,
    // X coordinate in `render` text of rows
    rx: usize,
    // Screen size
    num_cols: usize,
    num_rows: usize,
    message: Option<StatusMessage>,
    // Scroll position (row/col offset)
    pub rowoff: usize,
    pub coloff: usize,
    term_color: TermColor,
}

impl<W: Write> Screen<W> {
    pub fn new(window_size: (usize, usize), output: W) -> Result<Self> {
        let (w, h) = window_size;
        if w < 1 || h < 3 {
            return Err(Error::TooSmallWindow(w, h));
        }

        Ok(Self {
            output,
            rx: 0,
            num_cols: w,
            // Screen height is 2 lines less than window height due to status bar and message bar
            num_rows: h - 2,
            message: Some(StatusMessage::new(HELP_TEXT, StatusMessageKind::Info)),
            rowoff: 0,
            coloff: 0,
            term_color: TermColor::from_env(),
        })
    }

    pub fn set_term_color(&mut self, term_color: TermColor) {
        self.term_color = term_color;
    }

    fn color(&self, color: Color) -> &'static [u8] {
        self.term_color.sequence(color)
    }

    fn draw_welcome_message(&self, buf: &mut Vec<u8>) {
        let msg_buf = format!("Tedit TExt EDITor -- version {}", VERSION);
        let welcome = &msg_buf.as_bytes()[..cmp::min(msg_buf.len(), self.num_cols)];
        let padding = (self.num_cols - welcome.len()) / 2;
        if padding > 0 {
            buf.push(b'~');
            buf.resize(buf.len() + padding - 1, b' ');
        }
        buf.extend_from_slice(welcome);
    }

    fn draw_row(&self, buf: &mut Vec<u8>, row: &Row) {
        let render = row.render();
        let start = cmp::min(self.coloff, render.len());
        let end = cmp::min(self.coloff + self.num_cols, render.len());

        let mut prev_color = Color::Reset;
        for (b, hl) in render[start..end].iter().zip(&row.highlight()[start..end]) {
            let color = hl.color();
            if color != prev_color {
                buf.extend_from_slice(self.color(color));
                prev_color = color;
            }
            buf.push(*b);
        }

        if prev_color != Color::Reset {
            buf.extend_from_slice(self.color(Color::Reset));
        }
    }

    fn draw_rows(&self, buf: &mut Vec<u8>, rows: &[Row]) {
        for y in 0..self.num_rows {
            let file_row = y + self.rowoff;
            if file_row >= rows.len() {
                if rows.is_empty() && y == self.num_rows / 3 {
                    self.draw_welcome_message(buf);
                } else {
                    buf.push(b'~');
                }
            } else {
                self.draw_row(buf, &rows[file_row]);
            }

            // Erases the part of the line to the right of the cursor. http://vt100.net/docs/vt100-ug/chapter3.html#EL
            buf.extend_from_slice(b"\x1b[K\r\n");
        }
    }

    fn draw_status_bar(&self, buf: &mut Vec<u8>, status_bar: &StatusBar) {
        buf.extend_from_slice(self.color(Color::Invert));

        let left = status_bar.left();
        let left = &left.as_bytes()[..cmp::min(left.len(), self.num_cols)];
        buf.extend_from_slice(left); // Left of status bar

        let rest_len = self.num_cols - left.len();
        let right = status_bar.right();
        if right.len() <= rest_len {
            // Add spaces at center of status bar
            buf.resize(buf.len() + rest_len - right.len(), b' ');
            buf.extend_from_slice(right.as_bytes());
        } else {
            buf.resize(buf.len() + rest_len, b' ');
        }

        // Defualt argument of 'm' command is 0 so it resets attributes
        buf.extend_from_slice(self.color(Color::Reset));
        buf.extend_from_slice(b"\r\n");
    }

    fn draw_message_bar(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"\x1b[K");
        if let Some(m) = self.message.as_ref().filter(|m| m.is_fresh()) {
            let msg = &m.text.as_bytes()[..cmp::min(m.text.len(), self.num_cols)];
            if m.kind == StatusMessageKind::Error {
                buf.extend_from_slice(self.color(Color::RedBG));
                buf.extend_from_slice(msg);
                buf.extend_from_slice(self.color(Color::Reset));
            } else {
                buf.extend_from_slice(msg);
            }
        }
    }

    // Assembles the whole frame in one buffer and flushes it with a single write. `cursor` is
    // the 1-based (row, col) to leave the terminal cursor at
    fn redraw_screen(
        &mut self,
        rows: &[Row],
        status_bar: &StatusBar,
        cursor: (usize, usize),
    ) -> Result<()> {
        let mut buf = Vec::with_capacity((self.num_rows + 2) * (self.num_cols + 8));

        // \x1b[: Escape sequence header
        // Hide cursor while updating screen. 'l' is command to set mode http://vt100.net/docs/vt100-ug/chapter3.html#SM
        buf.extend_from_slice(b"\x1b[?25l");
        // H: Command to move cursor. Here \x1b[H is the same as \x1b[1;1H
        buf.extend_from_slice(b"\x1b[H");

        self.draw_rows(&mut buf, rows);
        self.draw_status_bar(&mut buf, status_bar);
        self.draw_message_bar(&mut buf);

        write!(buf, "\x1b[{};{}H", cursor.0, cursor.1)?;

        // Reveal cursor again. 'h' is command to reset mode https://vt100.net/docs/vt100-ug/chapter3.html#RM
        buf.extend_from_slice(b"\x1b[?25h");

        self.output.write_all(&buf)?;
        self.output.flush()?;
        Ok(())
    }

    // Keeps the cursor inside the window by adjusting row/column offsets
    pub fn do_scroll(&mut self, buf: &TextBuffer) {
        let cy = buf.cy();
        // Calculate X coordinate to render considering tab stop
        self.rx = buf.rx();

        // Adjust scroll position when cursor is outside screen
        if cy < self.rowoff {
            // Scroll up when cursor is above the top of window
            self.rowoff = cy;
        }
        if cy >= self.rowoff + self.num_rows {
            // Scroll down when cursor is below the bottom of screen
            self.rowoff = cy - self.num_rows + 1;
        }
        if self.rx < self.coloff {
            self.coloff = self.rx;
        }
        if self.rx >= self.coloff + self.num_cols {
            self.coloff = self.rx - self.num_cols + 1;
        }
    }

    pub fn render(&mut self, buf: &TextBuffer, status_bar: &StatusBar) -> Result<()> {
        self.do_scroll(buf);
        let cursor_row = buf.cy() - self.rowoff + 1;
        let cursor_col = self.rx - self.coloff + 1;
        self.redraw_screen(buf.rows(), status_bar, (cursor_row, cursor_col))
    }

    // Same as `render` but leaves the cursor on the message bar at column `col` (1-based)
    pub fn render_prompt(
        &mut self,
        buf: &TextBuffer,
        status_bar: &StatusBar,
        col: usize,
    ) -> Result<()> {
        self.do_scroll(buf);
        let col = cmp::min(col, self.num_cols);
        self.redraw_screen(buf.rows(), status_bar, (self.num_rows + 2, col))
    }

    pub fn clear(&mut self) -> Result<()> {
        // 2: Argument of 'J' command to reset entire screen
        // J: Command to erase screen http://vt100.net/docs/vt100-ug/chapter3.html#ED
        self.output.write_all(b"\x1b[2J")?;
        // Set cursor position to left-top corner
        self.output.write_all(b"\x1b[H")?;
        self.output.flush()?;
        Ok(())
    }

    pub fn set_info_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Info));
    }

    pub fn set_error_message<S: Into<String>>(&mut self, message: S) {
        self.message = Some(StatusMessage::new(message, StatusMessageKind::Error));
    }

    pub fn unset_message(&mut self) {
        self.message = None;
    }

    pub fn message_text(&self) -> &'_ str {
        self.message.as_ref().map(|m| m.text.as_str()).unwrap_or("")
    }

    pub fn message_kind(&self) -> Option<StatusMessageKind> {
        self.message.as_ref().map(|m| m.kind)
    }

    pub fn rows(&self) -> usize {
        self.num_rows
    }

    pub fn cols(&self) -> usize {
        self.num_cols
    }
}
