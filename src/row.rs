use crate::highlight::{highlight_line, Highlight};

pub const TAB_STOP: usize = 4;

#[derive(Default, Debug)]
pub struct Row {
    buf: Vec<u8>,
    // Derived from `buf`. Both are rebuilt on every mutation so they are never stale
    render: Vec<u8>,
    hl: Vec<Highlight>,
}

impl Row {
    pub fn new<B: Into<Vec<u8>>>(line: B) -> Row {
        let mut row = Row {
            buf: line.into(),
            render: vec![],
            hl: vec![],
        };
        row.update_render();
        row
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn render(&self) -> &[u8] {
        &self.render
    }

    pub fn highlight(&self) -> &[Highlight] {
        &self.hl
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn update_render(&mut self) {
        let tabs = self.buf.iter().filter(|b| **b == b'\t').count();
        self.render.clear();
        self.render.reserve(self.buf.len() + tabs * (TAB_STOP - 1));
        for &b in self.buf.iter() {
            if b == b'\t' {
                loop {
                    self.render.push(b' ');
                    if self.render.len() % TAB_STOP == 0 {
                        break;
                    }
                }
            } else {
                self.render.push(b);
            }
        }
        highlight_line(&self.render, &mut self.hl);
    }

    pub fn rx_from_cx(&self, cx: usize) -> usize {
        self.buf.iter().take(cx).fold(0, |rx, &b| {
            if b == b'\t' {
                // Proceed TAB_STOP spaces then subtract spaces by mod TAB_STOP
                rx + TAB_STOP - (rx % TAB_STOP)
            } else {
                rx + 1
            }
        })
    }

    pub fn cx_from_rx(&self, rx: usize) -> usize {
        let mut current_rx = 0;
        for (cx, &b) in self.buf.iter().enumerate() {
            if b == b'\t' {
                current_rx += TAB_STOP - (current_rx % TAB_STOP);
            } else {
                current_rx += 1;
            }
            if current_rx > rx {
                return cx; // Found
            }
        }
        self.buf.len() // Fall back to end of line
    }

    // Note: 'at' is an index of buffer, not render text
    pub fn insert_char(&mut self, at: usize, b: u8) {
        if self.buf.len() <= at {
            self.buf.push(b);
        } else {
            self.buf.insert(at, b);
        }
        self.update_render();
    }

    pub fn delete_char(&mut self, at: usize) {
        if at < self.buf.len() {
            self.buf.remove(at);
            self.update_render();
        }
    }

    pub fn append(&mut self, s: &[u8]) {
        if s.is_empty() {
            return;
        }
        self.buf.extend_from_slice(s);
        self.update_render();
    }

    // Cut the row at `at` and return the bytes after it
    pub fn split_off(&mut self, at: usize) -> Vec<u8> {
        if at >= self.buf.len() {
            return vec![];
        }
        let rest = self.buf.split_off(at);
        self.update_render();
        rest
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buf
    }
}
