/*!
echo command.

Overloads:
  echo <number>       an integer is echoed with its hex form (`42 (0x2a)`)
  echo <text>         any other single token
  echo <words>...     every token, joined by the separator

Options:
  --case=<TextCase>, -c   keep | upper | lower | title (custom converter)
  --separator=<String>, -s
  --repeat=<usize>, -r
*/

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

use dispatchkit::{CommandBuilder, DispatchError, Dispatcher};

/* ---- TextCase ---- */

/// Case transformation applied to echoed text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum TextCase {
    #[default]
    Keep,
    Upper,
    Lower,
    Title,
}

impl TextCase {
    pub const fn variants() -> &'static [TextCase] {
        &[TextCase::Keep, TextCase::Upper, TextCase::Lower, TextCase::Title]
    }

    pub fn from_str_ci(s: &str) -> Option<Self> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "keep" => Some(TextCase::Keep),
            "upper" | "up" => Some(TextCase::Upper),
            "lower" | "low" => Some(TextCase::Lower),
            "title" => Some(TextCase::Title),
            _ => None,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            TextCase::Keep => text.to_string(),
            TextCase::Upper => text.to_uppercase(),
            TextCase::Lower => text.to_lowercase(),
            TextCase::Title => text
                .split(' ')
                .map(title_word)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl FromStr for TextCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextCase::from_str_ci(s).ok_or_else(|| {
            let names: Vec<String> = TextCase::variants().iter().map(|v| v.to_string()).collect();
            format!("expected one of {}", names.join(", "))
        })
    }
}

impl fmt::Display for TextCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextCase::Keep => "keep",
            TextCase::Upper => "upper",
            TextCase::Lower => "lower",
            TextCase::Title => "title",
        };
        f.write_str(s)
    }
}

/* ---- Command ---- */

pub struct Echo {
    case: TextCase,
    separator: String,
    repeat: usize,
}

impl Default for Echo {
    fn default() -> Self {
        Self {
            case: TextCase::Keep,
            separator: " ".to_string(),
            repeat: 1,
        }
    }
}

impl Echo {
    /// Lines that will be printed for `text`, produced lazily.
    pub fn render(&self, text: &str) -> impl Iterator<Item = String> {
        std::iter::repeat_n(self.case.apply(text), self.repeat)
    }

    fn emit(&self, text: &str) -> Result<()> {
        for line in self.render(text) {
            println!("{line}");
        }
        Ok(())
    }

    pub fn number(&mut self, n: i64) -> Result<()> {
        self.emit(&format!("{n} ({})", hex(n)))
    }

    pub fn text(&mut self, text: String) -> Result<()> {
        self.emit(&text)
    }

    pub fn words(&mut self, words: Vec<String>) -> Result<()> {
        self.emit(&words.join(&self.separator))
    }
}

fn hex(n: i64) -> String {
    if n < 0 {
        format!("-{:#x}", n.unsigned_abs())
    } else {
        format!("{n:#x}")
    }
}

pub fn register(dispatcher: &mut Dispatcher) -> Result<(), DispatchError> {
    dispatcher.register_converter(TextCase::from_str);
    dispatcher.register(
        CommandBuilder::<Echo>::new("echo")
            .describe("Print the arguments back")
            .operation("number", Echo::number)
            .params(&["number"])
            .help("Echo an integer with its hex form")
            .operation("text", Echo::text)
            .params(&["text"])
            .sequence("words", Echo::words)
            .help("Join every word with the separator")
            .option("case", Some('c'), "keep, upper, lower or title", |e, c: TextCase| {
                e.case = c
            })
            .option("separator", Some('s'), "Separator between words", |e, s: String| {
                e.separator = s
            })
            .option("repeat", Some('r'), "Print the output this many times", |e, n: usize| {
                e.repeat = n
            }),
    )?;
    Ok(())
}
