use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};
use crate::region::Region;

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    line: usize,
    /// The display column that the Pointer is pointing to.
    ///
    /// This number should be zero indexed.
    column: usize,
    /// The display width of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Visual over the given source text and Region.
    ///
    /// A [`Region`] spanning several lines is highlighted up to the end of
    /// its first line.
    pub fn new(source: &str, region: Region) -> Self {
        let begin = floor_boundary(source, region.begin);
        let line_start = source[..begin].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = source[begin..]
            .find('\n')
            .map(|i| begin + i)
            .unwrap_or(source.len());
        let end = floor_boundary(source, region.end.clamp(begin, line_end));

        Self {
            line: source[..begin].matches('\n').count(),
            column: get_width(&source[line_start..begin]),
            length: max(1, get_width(&source[begin..end])),
            text: source[line_start..line_end]
                .trim_end_matches('\r')
                .to_string(),
        }
    }
}

/// Move the offset back until it sits on a character boundary within source.
fn floor_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    offset
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = (self.line + 1).to_string();
        let col = self.column + 1;
        let pad = get_width(&num);
        let align = self.column + self.length;

        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            writeln!(formatter, "{BLANK:pad$} {EQUAL} help: {help}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Pointer;
    use crate::region::Region;

    #[test]
    fn test_pointer_second_line() {
        let pointer = Pointer::new("hello\n{% iff x %}", Region::new(9..12));

        assert_eq!(pointer.line, 1);
        assert_eq!(pointer.column, 3);
        assert_eq!(pointer.length, 3);
        assert_eq!(pointer.text, "{% iff x %}");
    }

    #[test]
    fn test_pointer_end_of_source() {
        let source = "{{ name";
        let pointer = Pointer::new(source, Region::at(source.len()));

        assert_eq!(pointer.line, 0);
        assert_eq!(pointer.column, 7);
        assert_eq!(pointer.length, 1);
    }

    #[test]
    fn test_pointer_wide_characters() {
        let pointer = Pointer::new("日本 {{ $ }}", Region::new(10..11));

        assert_eq!(pointer.column, 8);
    }
}
