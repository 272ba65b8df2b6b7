use std::env;
use term::terminfo::TermInfo;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Color {
    Reset,
    Purple,
    RedBG,
    Invert,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TermColor {
    TrueColor,
    Extended256,
    Only16,
}

impl TermColor {
    // COLORTERM=truecolor takes precedence over the terminfo `colors` capability
    pub fn from_env() -> TermColor {
        if env::var("COLORTERM").map(|v| v == "truecolor").unwrap_or(false) {
            return TermColor::TrueColor;
        }

        let colors = TermInfo::from_env()
            .ok()
            .and_then(|info| info.numbers.get("colors").copied());
        match colors {
            Some(256) => TermColor::Extended256,
            _ => TermColor::Only16,
        }
    }

    // SGR sequences. Reset and Invert are the same on every palette
    pub fn sequence(self, color: Color) -> &'static [u8] {
        match (self, color) {
            (_, Color::Reset) => b"\x1b[39;0m",
            (_, Color::Invert) => b"\x1b[7m",
            (TermColor::TrueColor, Color::Purple) => b"\x1b[38;2;211;134;155m",
            (TermColor::TrueColor, Color::RedBG) => b"\x1b[48;2;204;36;29m",
            (TermColor::Extended256, Color::Purple) => b"\x1b[38;5;175m",
            (TermColor::Extended256, Color::RedBG) => b"\x1b[48;5;124m",
            (TermColor::Only16, Color::Purple) => b"\x1b[95m",
            (TermColor::Only16, Color::RedBG) => b"\x1b[41m",
        }
    }
}
