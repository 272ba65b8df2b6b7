use crate::term_color::Color;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Highlight {
    Normal,
    Number,
}

impl Highlight {
    pub fn color(self) -> Color {
        match self {
            Highlight::Normal => Color::Reset,
            Highlight::Number => Color::Purple,
        }
    }

    fn of(b: u8) -> Highlight {
        if b.is_ascii_digit() {
            Highlight::Number
        } else {
            Highlight::Normal
        }
    }
}

// One tag per rendered byte. Digits are the only thing we color.
pub fn highlight_line(render: &[u8], hl: &mut Vec<Highlight>) {
    hl.clear();
    hl.extend(render.iter().copied().map(Highlight::of));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_numbers() {
        let mut hl = vec![];
        highlight_line(b"a1 23", &mut hl);
        use Highlight::*;
        assert_eq!(hl, vec![Normal, Number, Normal, Number, Number]);
    }

    #[test]
    fn previous_tags_are_discarded() {
        let mut hl = vec![Highlight::Number; 10];
        highlight_line(b"x", &mut hl);
        assert_eq!(hl, vec![Highlight::Normal]);
    }
}
