use crate::error::Result;
use std::fmt;
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;

pub struct StdinRawMode {
    stdin: io::Stdin,
    orig: termios::Termios,
}

impl StdinRawMode {
    pub fn new() -> Result<StdinRawMode> {
        use termios::*;

        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        let mut termios = Termios::from_fd(fd)?;
        let orig = termios;

        // Set terminal raw mode. Disable echo back, canonical mode, signals (SIGINT, SIGTSTP) and Ctrl+V.
        termios.c_lflag &= !(ECHO | ICANON | ISIG | IEXTEN);
        // Disable control flow mode (Ctrl+Q/Ctrl+S) and CR-to-NL translation
        termios.c_iflag &= !(IXON | ICRNL | BRKINT | INPCK | ISTRIP);
        // Disable output processing such as \n to \r\n translation
        termios.c_oflag &= !OPOST;
        // Ensure character size is 8bits
        termios.c_cflag |= CS8;
        // Do not wait for next byte with blocking since reading 0 byte is permitted
        termios.c_cc[VMIN] = 0;
        // Set read timeout to 1/10 second it enables 100ms timeout on read()
        termios.c_cc[VTIME] = 1;
        // Apply terminal configurations
        tcsetattr(fd, TCSAFLUSH, &termios)?;

        Ok(StdinRawMode { stdin, orig })
    }

    pub fn input_keys(self) -> InputSequences<StdinRawMode> {
        InputSequences {
            input: self,
            retry_on_timeout: true,
        }
    }
}

impl Drop for StdinRawMode {
    fn drop(&mut self) {
        // Restore original terminal mode. Nothing sensible is left to do when this fails
        let _ = termios::tcsetattr(self.stdin.as_raw_fd(), termios::TCSAFLUSH, &self.orig);
    }
}

impl Read for StdinRawMode {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdin.read(buf)
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum KeySeq {
    Key(u8),
    LeftKey,
    RightKey,
    UpKey,
    DownKey,
    PageUpKey,
    PageDownKey,
    HomeKey,
    EndKey,
    DeleteKey,
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeySeq::*;
        match self {
            Key(b' ') => write!(f, "SPACE"),
            Key(0x1b) => write!(f, "ESC"),
            Key(0x7f) => write!(f, "BACKSPACE"),
            Key(b) if b.is_ascii_control() || !b.is_ascii() => write!(f, "\\x{:x}", b),
            Key(b) => write!(f, "{}", *b as char),
            LeftKey => write!(f, "LEFT"),
            RightKey => write!(f, "RIGHT"),
            UpKey => write!(f, "UP"),
            DownKey => write!(f, "DOWN"),
            PageUpKey => write!(f, "PAGEUP"),
            PageDownKey => write!(f, "PAGEDOWN"),
            HomeKey => write!(f, "HOME"),
            EndKey => write!(f, "END"),
            DeleteKey => write!(f, "DELETE"),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct InputSeq {
    pub key: KeySeq,
    pub ctrl: bool,
}

impl InputSeq {
    pub fn new(key: KeySeq) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: KeySeq) -> Self {
        Self { key, ctrl: true }
    }

    pub fn is_escape(&self) -> bool {
        *self == InputSeq::new(KeySeq::Key(0x1b))
    }

    pub fn is_enter(&self) -> bool {
        *self == InputSeq::ctrl(KeySeq::Key(b'm'))
    }

    // Backspace, Ctrl-H and Delete all erase a character
    pub fn is_delete(&self) -> bool {
        match (self.key, self.ctrl) {
            (KeySeq::Key(0x7f), false) | (KeySeq::Key(b'h'), true) | (KeySeq::DeleteKey, _) => true,
            _ => false,
        }
    }

    // Printable ASCII byte this key inserts, if any
    pub fn printable(&self) -> Option<u8> {
        match (self.key, self.ctrl) {
            (KeySeq::Key(b), false) if b.is_ascii() && !b.is_ascii_control() => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for InputSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        write!(f, "{}", self.key)
    }
}

// Decodes a raw byte stream into key sequences. Under raw mode a read returning 0 bytes means
// nothing arrived within VTIME, so the terminal source retries until the first byte of a key
// arrives. Other sources treat 0 bytes as end of input.
pub struct InputSequences<R: Read> {
    input: R,
    retry_on_timeout: bool,
}

impl<R: Read> InputSequences<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            retry_on_timeout: false,
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut one_byte: [u8; 1] = [0];
        loop {
            match self.input.read(&mut one_byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(one_byte[0])),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn decode_escape_sequence(&mut self) -> Result<InputSeq> {
        use KeySeq::*;

        let escape = InputSeq::new(Key(0x1b));

        // Follow-up bytes must come in the same burst. If the next byte does not arrive within a
        // tick, the user pressed ESC alone
        let first = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(escape),
        };
        let second = match self.read_byte()? {
            Some(b) => b,
            None => return Ok(escape),
        };

        let key = match (first, second) {
            (b'[', b'0'..=b'9') => match self.read_byte()? {
                Some(b'~') => match second {
                    b'1' | b'7' => HomeKey,
                    b'3' => DeleteKey,
                    b'4' | b'8' => EndKey,
                    b'5' => PageUpKey,
                    b'6' => PageDownKey,
                    _ => return Ok(escape),
                },
                _ => return Ok(escape),
            },
            (b'[', b'A') => UpKey,
            (b'[', b'B') => DownKey,
            (b'[', b'C') => RightKey,
            (b'[', b'D') => LeftKey,
            (b'[', b'H') | (b'O', b'H') => HomeKey,
            (b'[', b'F') | (b'O', b'F') => EndKey,
            _ => return Ok(escape),
        };

        Ok(InputSeq::new(key))
    }

    fn decode(&mut self, b: u8) -> Result<InputSeq> {
        use KeySeq::*;
        match b {
            // (Maybe) Escape sequence. Ctrl-[ is not available due to this
            0x1b => self.decode_escape_sequence(),
            // 0x00~0x1f keys are ascii keys with ctrl. Ctrl mod masks key with 0b11111.
            // Here unmask it with 0b1100000. It only works with 0x61~0x7f.
            0x00..=0x1f => Ok(InputSeq::ctrl(Key(b | 0b0110_0000))),
            _ => Ok(InputSeq::new(Key(b))),
        }
    }

    // Blocks until one key arrives. Returns None at end of input
    pub fn read_seq(&mut self) -> Result<Option<InputSeq>> {
        loop {
            match self.read_byte()? {
                Some(b) => return self.decode(b).map(Some),
                None if self.retry_on_timeout => continue,
                None => return Ok(None),
            }
        }
    }
}

impl<R: Read> Iterator for InputSequences<R> {
    type Item = Result<InputSeq>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_seq().transpose()
    }
}
