#![no_main]
use libfuzzer_sys::fuzz_target;
extern crate tedit;

use std::io::{self, Write};
use tedit::{Editor, InputSeq, InputSequences, KeySeq, Result};

// Decoded keys from fuzz data with Ctrl-S filtered out so that no file is written. The stream
// ends with enough Ctrl-Q to quit a modified buffer
struct FuzzInputs<'a> {
    seqs: InputSequences<&'a [u8]>,
    quit: usize,
}

impl<'a> Iterator for FuzzInputs<'a> {
    type Item = Result<InputSeq>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.seqs.next() {
                Some(Ok(seq)) if seq == InputSeq::ctrl(KeySeq::Key(b's')) => continue,
                Some(item) => return Some(item),
                None if self.quit > 0 => {
                    self.quit -= 1;
                    return Some(Ok(InputSeq::ctrl(KeySeq::Key(b'q'))));
                }
                None => return None,
            }
        }
    }
}

struct Discard;

impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes are valid text, so the same data is both the document and the key stream
    let lines = data.split(|b| *b == b'\n').map(|l| l.to_vec());
    let input = FuzzInputs {
        seqs: InputSequences::new(data),
        quit: 2,
    };
    let mut editor = Editor::with_lines(lines, input, Discard, (80, 24)).unwrap();
    editor.edit().unwrap(); // Editor must quit successfully

    let buf = editor.buf();
    assert!(buf.cy() <= buf.rows().len());
});
