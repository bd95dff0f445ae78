/*!
Interactive loop for `--repl`.

Each input line is tokenized with `shell-words` (quotes and escapes behave
like a POSIX shell) and handed to `Dispatcher::handle`, so resources such as
the ledger live across lines. `exit` / `quit` or end of input stops the loop;
`help` prints usage. Command errors are printed and the loop continues.
*/

use anyhow::Result;
use std::io::{BufRead, IsTerminal, Write};

use dispatchkit::Dispatcher;

/// What a single input line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Blank,
    Exit,
    Args(Vec<String>),
}

pub fn parse_line(line: &str) -> Result<Line, shell_words::ParseError> {
    let tokens = shell_words::split(line)?;
    let line = match tokens.first().map(String::as_str) {
        None => Line::Blank,
        Some("exit" | "quit") if tokens.len() == 1 => Line::Exit,
        Some("help") if tokens.len() == 1 => Line::Args(Vec::new()),
        Some(_) => Line::Args(tokens),
    };
    Ok(line)
}

/// Run the loop over `input`; returns how many lines were dispatched.
pub fn run<R: BufRead>(dispatcher: &Dispatcher, input: R, prompt: bool) -> Result<usize> {
    let mut dispatched = 0;
    let mut lines = input.lines();
    loop {
        if prompt {
            eprint!("> ");
            std::io::stderr().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        match parse_line(&line?) {
            Ok(Line::Blank) => continue,
            Ok(Line::Exit) => break,
            Ok(Line::Args(args)) => {
                dispatched += 1;
                if let Err(err) = dispatcher.handle(&args) {
                    eprintln!("error: {err:#}");
                }
            }
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(dispatched)
}

/// Run the loop on stdin, prompting only when stdin is a terminal.
pub fn run_stdin(dispatcher: &Dispatcher) -> Result<()> {
    let stdin = std::io::stdin();
    let prompt = stdin.is_terminal();
    let count = run(dispatcher, stdin.lock(), prompt)?;
    tracing::debug!(lines = count, "repl finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::ledger::Ledger;
    use crate::cmd::register_all;

    #[test]
    fn parses_lines() {
        assert_eq!(parse_line("   ").unwrap(), Line::Blank);
        assert_eq!(parse_line("quit").unwrap(), Line::Exit);
        assert_eq!(parse_line("help").unwrap(), Line::Args(vec![]));
        assert_eq!(
            parse_line(r#"echo "hello world" -s ','"#).unwrap(),
            Line::Args(vec![
                "echo".into(),
                "hello world".into(),
                "-s".into(),
                ",".into()
            ])
        );
        assert!(parse_line("echo \"unterminated").is_err());
    }

    #[test]
    fn resources_persist_across_lines() {
        let mut dispatcher = Dispatcher::new();
        register_all(&mut dispatcher).unwrap();
        let input = "add 1 2\n\nbogus\ndiv 1 0\nmul 2 3\nexit\nadd 5 5\n";
        let count = run(&dispatcher, input.as_bytes(), false).unwrap();
        assert_eq!(count, 4);
        let ledger = dispatcher.resources().get::<Ledger>().unwrap();
        assert_eq!(ledger.entries().len(), 2);
    }
}
