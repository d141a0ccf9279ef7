//! ANSI styling for rendered diagnostics.
//!
//! Each helper produces one visual piece of the caret layout the
//! [`crate::diag::render`] function assembles: the severity label with its
//! stable code, the location arrow, the line-number gutter, and the
//! underline. Every piece resets its colour so the renderer can
//! concatenate them freely.

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";

/// Width of the line-number gutter column.
const GUTTER_WIDTH: usize = 4;

pub struct Style;

impl Style {
    /// `error[E0005]`, bold red.
    pub fn error_label(code: &str) -> String {
        format!("{BOLD}{RED}error[{code}]{RESET}")
    }

    /// `warning[W0001]`, bold yellow.
    pub fn warning_label(code: &str) -> String {
        format!("{BOLD}{YELLOW}warning[{code}]{RESET}")
    }

    /// The arrow introducing `file:line:column`.
    pub fn arrow() -> String {
        format!("{CYAN}-->{RESET}")
    }

    /// Gutter cell carrying the offending line's number.
    pub fn gutter(line: u32) -> String {
        format!("{BLUE}{:>width$} |{RESET}", line, width = GUTTER_WIDTH)
    }

    /// Blank gutter cell for the underline row.
    pub fn gutter_pad() -> String {
        format!("{BLUE}{:>width$} |{RESET}", "", width = GUTTER_WIDTH)
    }

    /// Carets under the offending columns, coloured by severity.
    pub fn underline(column: u32, len: usize, warning: bool) -> String {
        let colour = if warning { YELLOW } else { RED };
        format!(
            "{}{colour}{}{RESET}",
            " ".repeat(column.saturating_sub(1) as usize),
            "^".repeat(len.max(1))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_carry_code_and_severity_colour() {
        let error = Style::error_label("E0005");
        assert!(error.contains("error[E0005]"));
        assert!(error.starts_with("\x1b[1m\x1b[31m"));
        assert!(error.ends_with("\x1b[0m"));

        let warning = Style::warning_label("W0001");
        assert!(warning.contains("warning[W0001]"));
        assert!(warning.contains("\x1b[33m"));
    }

    #[test]
    fn underline_is_positioned_by_column() {
        let underline = Style::underline(3, 2, false);
        assert!(underline.starts_with("  \x1b[31m"));
        assert!(underline.contains("^^"));
        assert!(!underline.contains("^^^"));
    }

    #[test]
    fn underline_never_vanishes() {
        assert!(Style::underline(1, 0, true).contains('^'));
    }

    #[test]
    fn gutters_align() {
        // Both gutter cells occupy the same width before the pipe.
        let numbered = Style::gutter(7);
        let padded = Style::gutter_pad();
        assert!(numbered.contains("   7 |"));
        assert!(padded.contains("     |"));
    }
}
