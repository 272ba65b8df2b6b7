// Refs:
//   Build Your Own Text Editor: https://viewsourcecode.org/snaptoken/kilo/index.html
//   VT100 User Guide: https://vt100.net/docs/vt100-ug/chapter3.html

mod editor;
mod error;
mod highlight;
mod input;
mod prompt;
mod row;
mod screen;
mod status_bar;
mod term_color;
mod text_buffer;


pub use editor::Editor;
pub use error::{Error, Result};
pub use highlight::Highlight;
pub use input::{InputSeq, InputSequences, KeySeq, StdinRawMode};
pub use prompt::{Action, NoAction, Prompt, PromptResult, TextSearch};
pub use row::{Row, TAB_STOP};
pub use screen::{Screen, StatusMessageKind, HELP_TEXT, VERSION};
pub use status_bar::StatusBar;
pub use term_color::{Color, TermColor};
pub use text_buffer::{CursorDir, Lines, TextBuffer};
