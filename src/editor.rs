use crate::error::Result;
use crate::input::{InputSeq, KeySeq};
use crate::prompt::{Action, NoAction, Prompt, PromptResult, TextSearch};
use crate::screen::Screen;
use crate::status_bar::StatusBar;
use crate::text_buffer::{CursorDir, Lines, TextBuffer};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

// Number of Ctrl-Q presses needed to quit with unsaved changes
const QUIT_TIMES: usize = 2;

pub struct Editor<I: Iterator<Item = Result<InputSeq>>, W: Write> {
    input: I,          // Escape sequences stream represented as Iterator
    quit_times: usize, // Remaining Ctrl-Q presses before quitting a modified buffer
    screen: Screen<W>,
    buf: TextBuffer,
    status_bar: StatusBar,
}

impl<I, W> Editor<I, W>
where
    I: Iterator<Item = Result<InputSeq>>,
    W: Write,
{
    fn with_buf(
        buf: TextBuffer,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>> {
        let screen = Screen::new(window_size, output)?;
        let status_bar = StatusBar::from_buffer(&buf);
        Ok(Editor {
            input,
            quit_times: QUIT_TIMES,
            screen,
            buf,
            status_bar,
        })
    }

    pub fn new(input: I, output: W, window_size: (usize, usize)) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::empty(), input, output, window_size)
    }

    pub fn with_lines<L, LS>(
        lines: LS,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>>
    where
        L: Into<Vec<u8>>,
        LS: IntoIterator<Item = L>,
    {
        Self::with_buf(TextBuffer::with_lines(lines), input, output, window_size)
    }

    pub fn open<P: AsRef<Path>>(
        path: P,
        input: I,
        output: W,
        window_size: (usize, usize),
    ) -> Result<Editor<I, W>> {
        Self::with_buf(TextBuffer::open(path)?, input, output, window_size)
    }

    pub fn buf(&self) -> &TextBuffer {
        &self.buf
    }

    fn render_screen(&mut self) -> Result<()> {
        self.status_bar.update_from_buf(&self.buf);
        self.screen.render(&self.buf, &self.status_bar)
    }

    fn prompt<A: Action>(&mut self, prompt: &str, action: &mut A) -> Result<PromptResult> {
        Prompt::new(&mut self.screen, &mut self.buf, &mut self.status_bar).run(
            prompt,
            action,
            &mut self.input,
        )
    }

    fn save(&mut self) -> Result<()> {
        let mut create = false;
        if !self.buf.has_file() {
            match self.prompt("Save as: {} (ESC to cancel)", &mut NoAction)? {
                PromptResult::Input(input) => {
                    self.buf.set_file(input);
                    create = true;
                }
                PromptResult::Canceled => {
                    self.screen.set_info_message("Save aborted");
                    return Ok(());
                }
            }
        }

        match self.buf.save() {
            Ok(msg) => self.screen.set_info_message(msg),
            Err(msg) => {
                self.screen.set_error_message(msg);
                if create {
                    self.buf.set_unnamed();
                }
            }
        }

        Ok(())
    }

    fn find(&mut self) -> Result<()> {
        let mut search = TextSearch::new(&self.buf, &self.screen);
        self.prompt("Search: {} (Use ESC/Arrows/Enter)", &mut search)?;
        Ok(())
    }

    fn handle_quit(&mut self) -> Result<bool> {
        if self.buf.modified() && self.quit_times > 1 {
            self.quit_times -= 1;
            warn!(dirty = self.buf.dirty(), "quit requested with unsaved changes");
            self.screen.set_error_message(format!(
                "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                self.quit_times
            ));
            Ok(false)
        } else {
            info!("quit");
            Ok(true)
        }
    }

    fn handle_not_mapped(&mut self, seq: InputSeq) {
        self.screen
            .set_info_message(format!("Key '{}' not mapped", seq));
    }

    fn process_keypress(&mut self, s: InputSeq) -> Result<bool> {
        use KeySeq::*;

        debug!(key = %s, "keypress");

        let rowoff = self.screen.rowoff;
        let rows = self.screen.rows();

        match (s.key, s.ctrl) {
            (Key(b'q'), true) => return self.handle_quit(),
            (Key(b's'), true) => self.save()?,
            (Key(b'f'), true) => self.find()?,
            (Key(b'm'), true) => self.buf.insert_line(), // Enter
            (Key(b'i'), true) => self.buf.insert_char(b'\t'), // Tab
            (Key(b'h'), true) => self.buf.delete_char(),
            (Key(b'l'), true) => {} // Redrawn on next iteration
            (Key(0x7f), false) | (DeleteKey, _) => self.buf.delete_char(), // Backspace
            (Key(0x1b), false) => {} // Lone ESC does nothing
            (UpKey, _) => self.buf.move_cursor_one(CursorDir::Up),
            (LeftKey, _) => self.buf.move_cursor_one(CursorDir::Left),
            (DownKey, _) => self.buf.move_cursor_one(CursorDir::Down),
            (RightKey, _) => self.buf.move_cursor_one(CursorDir::Right),
            (PageUpKey, _) => self.buf.move_cursor_page(CursorDir::Up, rowoff, rows),
            (PageDownKey, _) => self.buf.move_cursor_page(CursorDir::Down, rowoff, rows),
            (HomeKey, _) => self.buf.move_cursor_to_line_edge(CursorDir::Left),
            (EndKey, _) => self.buf.move_cursor_to_line_edge(CursorDir::Right),
            _ => match s.printable() {
                Some(b) => self.buf.insert_char(b),
                None => self.handle_not_mapped(s),
            },
        }

        self.quit_times = QUIT_TIMES;
        Ok(false)
    }

    // Returns when the user quits or the key source is exhausted
    pub fn edit(&mut self) -> Result<()> {
        loop {
            self.render_screen()?;

            let seq = match self.input.next() {
                Some(seq) => seq?,
                None => return Ok(()),
            };

            if self.process_keypress(seq)? {
                self.render_screen()?;
                return self.screen.clear(); // Finally clear screen on exit
            }
        }
    }

    pub fn lines(&self) -> Lines<'_> {
        self.buf.lines()
    }

    pub fn screen(&self) -> &'_ Screen<W> {
        &self.screen
    }
}
