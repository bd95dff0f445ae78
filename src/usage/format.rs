/*!
format.rs

Formatting primitives for the usage screen.

  - UsageOptions::detect()          -> options from the environment
  - color(role, text, &UsageOptions) -> String
  - wrap_text(s, max_width)         -> Vec<String>
  - two_column(left, right, column, &UsageOptions) -> Vec<String>
  - strip_ansi / display_width

Width detection is best-effort: env COLUMNS -> parse -> clamp (40..=220),
otherwise 100. NO_COLOR disables ANSI styling. Nothing here prints; every
helper returns strings.
*/

use std::borrow::Cow;

/* -------------------------------------------------------------------------- */
/* Options                                                                    */
/* -------------------------------------------------------------------------- */

pub const DEFAULT_WIDTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageOptions {
    pub program_name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Wrap column; 0 disables wrapping.
    pub max_width: usize,
    pub use_color: bool,
}

impl Default for UsageOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl UsageOptions {
    pub fn detect() -> Self {
        let use_color = std::env::var_os("NO_COLOR").is_none();

        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(DEFAULT_WIDTH);

        let program_name = std::env::args_os()
            .next()
            .as_deref()
            .map(std::path::Path::new)
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());

        UsageOptions {
            program_name,
            version: None,
            description: None,
            max_width: width,
            use_color,
        }
    }

    /// Colourless options with the default width, independent of the environment.
    pub fn plain(program_name: impl Into<String>) -> Self {
        UsageOptions {
            program_name: program_name.into(),
            version: None,
            description: None,
            max_width: DEFAULT_WIDTH,
            use_color: false,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Dim,
    Bold,
}

pub fn color(role: Role, text: impl AsRef<str>, options: &UsageOptions) -> String {
    if !options.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta/pink
        Role::Dim => "2",
        Role::Bold => "1",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Layout                                                                     */
/* -------------------------------------------------------------------------- */

/// Greedy word wrap; a single word longer than `max_width` gets its own line.
pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![s.split_whitespace().collect::<Vec<_>>().join(" ")];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        if !current.is_empty() && display_width(&current) + display_width(word) + 1 > max_width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Narrowest description column that still leaves room for text.
const MIN_RIGHT_WIDTH: usize = 20;

/// Lay out `left` and `right` as two columns, `right` starting at `column`.
///
/// `left` may carry ANSI codes; padding uses its display width. When `left`
/// reaches into the description column the description starts on the next
/// line. Continuation lines are indented to `column`.
pub fn two_column(left: &str, right: Option<&str>, column: usize, options: &UsageOptions) -> Vec<String> {
    let Some(right) = right.filter(|r| !r.trim().is_empty()) else {
        return vec![left.to_string()];
    };

    let right_width = if options.max_width == 0 {
        0
    } else {
        options.max_width.saturating_sub(column).max(MIN_RIGHT_WIDTH)
    };
    let wrapped = wrap_text(right, right_width);
    let indent = " ".repeat(column);

    let mut lines = Vec::with_capacity(wrapped.len() + 1);
    let left_width = display_width(left);
    let mut rest = wrapped.into_iter();
    if left_width < column {
        let first = rest.next().unwrap_or_default();
        lines.push(format!(
            "{left}{}{}",
            " ".repeat(column - left_width),
            color(Role::Secondary, first, options)
        ));
    } else {
        lines.push(left.to_string());
    }
    for line in rest {
        lines.push(format!("{indent}{}", color(Role::Secondary, line, options)));
    }
    lines
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    // scans for ESC '[' ... letter
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(ch);
    }
    Cow::Owned(buf)
}

pub fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("hello world from formatting", 10);
        assert_eq!(lines, vec!["hello", "world from", "formatting"]);
        assert_eq!(wrap_text("a  b", 0), vec!["a b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_strip_ansi() {
        let colored = "\x1b[31mRED\x1b[0m";
        assert_eq!(strip_ansi(colored), "RED");
        assert_eq!(display_width("\x1b[38;5;45mäb\x1b[0m"), 2);
    }

    #[test]
    fn test_color_respects_option() {
        let plain = UsageOptions::plain("x");
        assert_eq!(color(Role::Accent, "hi", &plain), "hi");
        let colored = plain.with_color(true);
        assert!(color(Role::Accent, "hi", &colored).starts_with("\x1b["));
    }

    #[test]
    fn test_two_column_alignment() {
        let opts = UsageOptions::plain("x").with_width(40);
        let lines = two_column("  add <a>", Some("Add two numbers together nicely"), 14, &opts);
        assert_eq!(lines[0], "  add <a>     Add two numbers together");
        assert_eq!(lines[1], format!("{}nicely", " ".repeat(14)));
    }

    #[test]
    fn test_two_column_long_left() {
        let opts = UsageOptions::plain("x").with_width(0);
        let lines = two_column("  a-very-long-left-side", Some("desc"), 6, &opts);
        assert_eq!(lines, vec!["  a-very-long-left-side".to_string(), "      desc".to_string()]);
        assert_eq!(two_column("left", None, 6, &opts), vec!["left"]);
    }
}
