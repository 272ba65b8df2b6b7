use crate::error::Result;
use crate::input::{InputSeq, KeySeq};
use crate::screen::Screen;
use crate::status_bar::StatusBar;
use crate::text_buffer::TextBuffer;
use std::io::Write;
use tracing::debug;

#[derive(PartialEq, Debug)]
pub enum PromptResult {
    Canceled,
    Input(String),
}

// Callback run by the prompt loop. `on_seq` sees every key with the input after that key was
// applied, including the committing Enter and the canceling ESC
pub trait Action {
    fn on_seq<W: Write>(
        &mut self,
        prompt: &mut Prompt<'_, W>,
        input: &str,
        seq: InputSeq,
    ) -> Result<()>;

    fn on_end<W: Write>(&mut self, _prompt: &mut Prompt<'_, W>, _result: &PromptResult) {}
}

pub struct NoAction;

impl Action for NoAction {
    fn on_seq<W: Write>(&mut self, _: &mut Prompt<'_, W>, _: &str, _: InputSeq) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum FindDir {
    Back,
    Forward,
}

pub struct TextSearch {
    saved: ((usize, usize), (usize, usize)),
    last_match: Option<usize>,
    dir: FindDir,
    matched: bool,
}

impl TextSearch {
    pub fn new<W: Write>(buf: &TextBuffer, screen: &Screen<W>) -> Self {
        Self {
            saved: (buf.cursor(), (screen.rowoff, screen.coloff)),
            last_match: None,
            dir: FindDir::Forward,
            matched: false,
        }
    }

    fn reset(&mut self) {
        self.last_match = None;
        self.dir = FindDir::Forward;
    }

    fn handle_seq(&mut self, seq: InputSeq) {
        use KeySeq::*;
        match (seq.key, seq.ctrl) {
            (RightKey, false) | (DownKey, false) => self.dir = FindDir::Forward,
            (LeftKey, false) | (UpKey, false) => self.dir = FindDir::Back,
            _ => self.reset(), // Input might have changed so start over from the top
        }
    }

    fn next_line(&self, current: Option<usize>, num_lines: usize) -> usize {
        match (current, self.dir) {
            (None, _) => 0,
            (Some(y), FindDir::Forward) if y + 1 >= num_lines => 0, // Wrapped
            (Some(y), FindDir::Forward) => y + 1,
            (Some(0), FindDir::Back) => num_lines - 1, // Wrapped
            (Some(y), FindDir::Back) => y - 1,
        }
    }

    fn find(&self, query: &str, rows: &[crate::row::Row]) -> Option<(usize, usize)> {
        let query = query.as_bytes();
        let mut current = self.last_match;
        for _ in 0..rows.len() {
            let y = self.next_line(current, rows.len());
            current = Some(y);
            let render = rows[y].render();
            if let Some(rx) = render.windows(query.len()).position(|w| w == query) {
                return Some((rows[y].cx_from_rx(rx), y));
            }
        }
        None
    }

    fn search<W: Write>(&mut self, query: &str, prompt: &mut Prompt<'_, W>) {
        self.matched = false;
        if let Some((x, y)) = self.find(query, prompt.buf.rows()) {
            debug!(query, line = y, col = x, "search matched");
            self.last_match = Some(y);
            self.matched = true;
            prompt.buf.set_cursor(x, y);
            // Scroll past the end so that the next scroll puts the matched line at top of screen
            prompt.screen.rowoff = prompt.buf.rows().len();
        }
    }
}

impl Action for TextSearch {
    fn on_seq<W: Write>(
        &mut self,
        prompt: &mut Prompt<'_, W>,
        input: &str,
        seq: InputSeq,
    ) -> Result<()> {
        if seq.is_enter() || seq.is_escape() {
            self.reset();
            return Ok(());
        }

        self.handle_seq(seq);
        if self.last_match.is_none() {
            self.dir = FindDir::Forward;
        }

        if input.is_empty() {
            self.matched = false;
            return Ok(());
        }

        self.search(input, prompt);
        Ok(())
    }

    fn on_end<W: Write>(&mut self, prompt: &mut Prompt<'_, W>, result: &PromptResult) {
        match result {
            PromptResult::Input(_) if self.matched => prompt.screen.set_info_message("Found"),
            PromptResult::Input(_) => prompt.screen.set_info_message("Not found"),
            PromptResult::Canceled => {
                let ((cx, cy), (rowoff, coloff)) = self.saved;
                prompt.buf.set_cursor(cx, cy);
                prompt.screen.rowoff = rowoff;
                prompt.screen.coloff = coloff;
            }
        }
    }
}

struct PromptTemplate<'a> {
    prefix: &'a str,
    suffix: &'a str,
}

impl<'a> PromptTemplate<'a> {
    fn new(prompt: &'a str) -> Self {
        let mut it = prompt.splitn(2, "{}");
        let prefix = it.next().unwrap_or("");
        let suffix = it.next().unwrap_or("");
        Self { prefix, suffix }
    }

    fn build(&self, input: &str) -> String {
        let cap = self.prefix.len() + self.suffix.len() + input.len();
        let mut buf = String::with_capacity(cap);
        buf.push_str(self.prefix);
        buf.push_str(input);
        buf.push_str(self.suffix);
        buf
    }

    fn cursor_col(&self, input: &str) -> usize {
        self.prefix.len() + input.len() + 1 // Just after the input
    }
}

pub struct Prompt<'a, W: Write> {
    screen: &'a mut Screen<W>,
    buf: &'a mut TextBuffer,
    sb: &'a mut StatusBar,
}

impl<'a, W: Write> Prompt<'a, W> {
    pub fn new(screen: &'a mut Screen<W>, buf: &'a mut TextBuffer, sb: &'a mut StatusBar) -> Self {
        Self { screen, buf, sb }
    }

    fn render_screen(&mut self, input: &str, template: &PromptTemplate<'_>) -> Result<()> {
        self.screen.set_info_message(template.build(input));
        self.sb.update_from_buf(self.buf);
        self.screen
            .render_prompt(self.buf, self.sb, template.cursor_col(input))
    }

    // `prompt` contains "{}" where the user's input is shown in the message bar
    pub fn run<A, I>(&mut self, prompt: &str, action: &mut A, mut input: I) -> Result<PromptResult>
    where
        A: Action,
        I: Iterator<Item = Result<InputSeq>>,
    {
        let template = PromptTemplate::new(prompt);
        let mut buf = String::new();

        let result = loop {
            self.render_screen(&buf, &template)?;

            let seq = match input.next() {
                Some(seq) => seq?,
                None => break PromptResult::Canceled,
            };

            if seq.is_delete() {
                buf.pop();
            } else if seq.is_escape() {
                action.on_seq(self, &buf, seq)?;
                break PromptResult::Canceled;
            } else if seq.is_enter() {
                if !buf.is_empty() {
                    action.on_seq(self, &buf, seq)?;
                    break PromptResult::Input(buf);
                }
            } else if let Some(b) = seq.printable() {
                buf.push(b as char);
            }

            action.on_seq(self, &buf, seq)?;
        };

        debug!(?result, "prompt finished");
        self.screen.unset_message();
        action.on_end(self, &result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeySeq::*;

    fn keys(seqs: Vec<InputSeq>) -> impl Iterator<Item = Result<InputSeq>> {
        seqs.into_iter().map(Ok)
    }

    fn run_search(
        buf: &mut TextBuffer,
        seqs: Vec<InputSeq>,
    ) -> (PromptResult, String, (usize, usize)) {
        let mut out = vec![];
        let mut screen = Screen::new((40, 10), &mut out).unwrap();
        let mut sb = StatusBar::from_buffer(buf);
        let mut search = TextSearch::new(buf, &screen);
        let result = Prompt::new(&mut screen, buf, &mut sb)
            .run("Search: {}", &mut search, keys(seqs))
            .unwrap();
        let msg = screen.message_text().to_string();
        screen.do_scroll(buf);
        (result, msg, (screen.rowoff, screen.coloff))
    }

    fn key(c: char) -> InputSeq {
        InputSeq::new(Key(c as u8))
    }

    fn enter() -> InputSeq {
        InputSeq::ctrl(Key(b'm'))
    }

    fn esc() -> InputSeq {
        InputSeq::new(Key(0x1b))
    }

    #[test]
    fn template_splits_at_placeholder() {
        let t = PromptTemplate::new("Save as: {} (ESC to cancel)");
        assert_eq!(t.build("foo"), "Save as: foo (ESC to cancel)");
        assert_eq!(t.cursor_col("foo"), 13);
    }

    #[test]
    fn input_is_edited_and_committed() {
        let mut buf = TextBuffer::empty();
        let mut out = vec![];
        let mut screen = Screen::new((40, 10), &mut out).unwrap();
        let mut sb = StatusBar::default();
        let seqs = vec![
            enter(), // Empty input does not commit
            key('a'),
            key('x'),
            InputSeq::new(Key(0x7f)),
            key('b'),
            InputSeq::ctrl(Key(b'l')), // Ignored
            enter(),
        ];
        let result = Prompt::new(&mut screen, &mut buf, &mut sb)
            .run("> {}", &mut NoAction, keys(seqs))
            .unwrap();
        assert_eq!(result, PromptResult::Input("ab".to_string()));
    }

    #[test]
    fn escape_cancels() {
        let mut buf = TextBuffer::empty();
        let mut out = vec![];
        let mut screen = Screen::new((40, 10), &mut out).unwrap();
        let mut sb = StatusBar::default();
        let result = Prompt::new(&mut screen, &mut buf, &mut sb)
            .run("> {}", &mut NoAction, keys(vec![key('a'), esc()]))
            .unwrap();
        assert_eq!(result, PromptResult::Canceled);
    }

    #[test]
    fn callback_sees_every_key() {
        struct Record(Vec<(String, InputSeq)>);
        impl Action for Record {
            fn on_seq<W: Write>(
                &mut self,
                _: &mut Prompt<'_, W>,
                input: &str,
                seq: InputSeq,
            ) -> Result<()> {
                self.0.push((input.to_string(), seq));
                Ok(())
            }
        }

        let mut buf = TextBuffer::empty();
        let mut out = vec![];
        let mut screen = Screen::new((40, 10), &mut out).unwrap();
        let mut sb = StatusBar::default();
        let mut record = Record(vec![]);
        Prompt::new(&mut screen, &mut buf, &mut sb)
            .run("> {}", &mut record, keys(vec![key('a'), key('b'), enter()]))
            .unwrap();
        assert_eq!(
            record.0,
            vec![
                ("a".to_string(), key('a')),
                ("ab".to_string(), key('b')),
                ("ab".to_string(), enter()),
            ]
        );
    }

    #[test]
    fn search_moves_to_match_and_cycles() {
        let mut buf = TextBuffer::with_lines(vec!["foo", "bar", "foo bar"]);
        let seqs = vec![
            key('b'),
            key('a'),
            key('r'),
            InputSeq::new(DownKey),
            InputSeq::new(DownKey), // Wraps to the first match
            InputSeq::new(UpKey),   // Wraps backward
            enter(),
        ];
        let (result, msg, _) = run_search(&mut buf, seqs);
        assert_eq!(result, PromptResult::Input("bar".to_string()));
        assert_eq!(msg, "Found");
        assert_eq!(buf.cursor(), (4, 2));
    }

    #[test]
    fn search_maps_render_column_back_to_raw() {
        let mut buf = TextBuffer::with_lines(vec!["\t\tneedle"]);
        let (_, _, _) = run_search(&mut buf, vec![key('n'), enter()]);
        assert_eq!(buf.cursor(), (2, 0));
    }

    #[test]
    fn search_wraps_to_match_before_cursor() {
        let mut buf = TextBuffer::with_lines(vec!["x1", "y", "x2"]);
        let seqs = vec![
            key('x'),
            InputSeq::new(RightKey),
            InputSeq::new(RightKey),
            enter(),
        ];
        run_search(&mut buf, seqs);
        assert_eq!(buf.cursor(), (0, 0));
    }

    #[test]
    fn search_not_found_keeps_cursor() {
        let mut buf = TextBuffer::with_lines(vec!["abc"]);
        buf.set_cursor(2, 0);
        let (result, msg, _) = run_search(&mut buf, vec![key('z'), enter()]);
        assert_eq!(result, PromptResult::Input("z".to_string()));
        assert_eq!(msg, "Not found");
        assert_eq!(buf.cursor(), (2, 0));
    }

    #[test]
    fn search_cancel_restores_position() {
        let lines: Vec<String> = (0..30).map(|i| format!("line{}", i)).collect();
        let mut buf = TextBuffer::with_lines(lines);
        buf.set_cursor(3, 1);
        let (result, _, offsets) = run_search(&mut buf, vec![key('2'), key('5'), esc()]);
        assert_eq!(result, PromptResult::Canceled);
        assert_eq!(buf.cursor(), (3, 1));
        assert_eq!(offsets, (0, 0));
    }

    #[test]
    fn search_scrolls_match_to_top() {
        let lines: Vec<String> = (0..30).map(|i| format!("line{}", i)).collect();
        let mut buf = TextBuffer::with_lines(lines);
        let (_, _, offsets) = run_search(&mut buf, vec![key('2'), key('5'), enter()]);
        assert_eq!(buf.cursor(), (4, 25));
        assert_eq!(offsets, (25, 0));
    }
}
