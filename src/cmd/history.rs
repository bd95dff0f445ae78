/*!
history command: lists what the arithmetic commands recorded in the ledger.

  history               every entry
  history <command>     entries of one command (case-insensitive)
  --last=<usize>, -l    only the most recent N entries
  --clear, -c           empty the ledger after printing
*/

use anyhow::Result;
use std::sync::Arc;

use dispatchkit::{CommandBuilder, DispatchError, Dispatcher};

use super::arith::format_number;
use super::ledger::{Entry, Ledger};

pub struct History {
    ledger: Arc<Ledger>,
    last: Option<usize>,
    clear: bool,
}

impl History {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            last: None,
            clear: false,
        }
    }

    /// Lines for the entries matching `filter`, numbered from 1.
    pub fn render(&self, filter: Option<&str>) -> Vec<String> {
        let entries: Vec<(usize, Entry)> = self
            .ledger
            .entries()
            .into_iter()
            .enumerate()
            .filter(|(_, e)| filter.is_none_or(|f| e.command.eq_ignore_ascii_case(f)))
            .collect();
        let skip = self
            .last
            .map_or(0, |n| entries.len().saturating_sub(n));
        entries
            .into_iter()
            .skip(skip)
            .map(|(i, e)| {
                format!(
                    "{:>3}  {:<4} {} = {}",
                    i + 1,
                    e.command,
                    e.expression,
                    format_number(e.result, None)
                )
            })
            .collect()
    }

    fn emit(&self, filter: Option<&str>) -> Result<()> {
        let lines = self.render(filter);
        if lines.is_empty() {
            if self.ledger.is_empty() {
                println!("history is empty");
            } else {
                println!("no matching entries");
            }
        }
        for line in lines {
            println!("{line}");
        }
        if self.clear {
            let removed = self.ledger.clear();
            tracing::info!(removed, "history cleared");
        }
        Ok(())
    }

    pub fn all(&mut self) -> Result<()> {
        self.emit(None)
    }

    pub fn of_command(&mut self, command: String) -> Result<()> {
        self.emit(Some(&command))
    }
}

pub fn register(dispatcher: &mut Dispatcher) -> Result<(), DispatchError> {
    dispatcher.register(
        CommandBuilder::<History>::with_constructor("history", History::new)
            .describe("Show recorded calculations")
            .operation("all", History::all)
            .operation("of_command", History::of_command)
            .params(&["command"])
            .help("Only entries of one command")
            .option("last", Some('l'), "Show only the most recent entries", |h, n: usize| {
                h.last = Some(n)
            })
            .flag("clear", Some('c'), "Empty the history after printing", |h, v| {
                h.clear = v
            }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Arc<Ledger> {
        let ledger = Arc::new(Ledger::new());
        ledger.record("add", "2 + 3", 5.0);
        ledger.record("mul", "2 * 3", 6.0);
        ledger.record("ADD", "1 + 1", 2.0);
        ledger
    }

    #[test]
    fn renders_all_entries() {
        let history = History::new(ledger());
        let lines = history.render(None);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "  1  add  2 + 3 = 5");
    }

    #[test]
    fn filters_by_command_and_last() {
        let mut history = History::new(ledger());
        let lines = history.render(Some("add"));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("  3  ADD"));

        history.last = Some(1);
        assert_eq!(history.render(None), vec!["  3  ADD  1 + 1 = 2"]);
    }

    #[test]
    fn clear_empties_ledger() {
        let ledger = ledger();
        let mut history = History::new(Arc::clone(&ledger));
        history.clear = true;
        history.all().unwrap();
        assert!(ledger.is_empty());
    }
}
