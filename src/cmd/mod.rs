/*!
Demo commands registered by the `dispatchkit` binary.

Layout:
  src/cmd/
    mod.rs       (this file: register_all)
    ledger.rs    Ledger resource shared by arith + history
    arith.rs     add / sub / mul / div
    echo.rs      echo (String vs i64 overloads, TextCase converter)
    history.rs   history (reads the injected Ledger)

Conventions:
  - Each command module exposes one `register(&mut Dispatcher)` function.
  - Operations return `anyhow::Result<()>` and print to stdout.
*/

pub mod arith;
pub mod echo;
pub mod history;
pub mod ledger;

use dispatchkit::{DispatchError, Dispatcher};

use ledger::Ledger;

/// Register the shared ledger and every demo command.
pub fn register_all(dispatcher: &mut Dispatcher) -> Result<(), DispatchError> {
    dispatcher.register_resource(Ledger::new());
    arith::register(dispatcher)?;
    echo::register(dispatcher)?;
    history::register(dispatcher)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatchkit::{DispatchConfig, Dispatched, UsageOptions};

    fn dispatcher() -> Dispatcher {
        let mut dispatcher = Dispatcher::with_config(DispatchConfig {
            ignore_case: true,
            usage: UsageOptions::plain("dispatchkit"),
        });
        register_all(&mut dispatcher).unwrap();
        dispatcher
    }

    fn ledger(d: &Dispatcher) -> std::sync::Arc<Ledger> {
        d.resources().get::<Ledger>().unwrap()
    }

    #[test]
    fn registers_every_command() {
        let d = dispatcher();
        let mut names: Vec<&str> = d.catalog().list_commands().iter().map(|c| c.name()).collect();
        names.sort();
        assert_eq!(names, vec!["add", "div", "echo", "history", "mul", "sub"]);
    }

    #[test]
    fn add_picks_pair_or_sum() {
        let d = dispatcher();
        let pair = d.dispatch(["add", "5", "7"]).unwrap();
        assert!(matches!(pair, Dispatched::Invoked { ref operation, .. } if operation == "pair"));
        let sum = d.dispatch(["ADD", "5", "7", "87.6"]).unwrap();
        assert!(matches!(sum, Dispatched::Invoked { ref operation, .. } if operation == "sum"));

        let results: Vec<f64> = ledger(&d).entries().iter().map(|e| e.result).collect();
        assert_eq!(results, vec![12.0, 99.6]);
    }

    #[test]
    fn negative_operands_and_options() {
        let d = dispatcher();
        d.handle(["sub", "-p", "2", "-5", "-.5"]).unwrap();
        d.handle(["mul", "--dry-run", "3", "3"]).unwrap();
        let entries = ledger(&d).entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].expression, "-5 - -0.5");
        assert_eq!(entries[0].result, -4.5);
    }

    #[test]
    fn divide_by_zero_reaches_the_host() {
        let d = dispatcher();
        let err = d.handle(["div", "1", "0"]).unwrap_err();
        assert_eq!(err.to_string(), "cannot divide 1 by zero");
    }

    #[test]
    fn history_sees_what_arith_recorded() {
        let d = dispatcher();
        d.handle(["add", "1", "2"]).unwrap();
        d.handle(["mul", "2", "3", "4"]).unwrap();
        assert_eq!(ledger(&d).entries().len(), 2);
        d.handle(["history", "-l", "1", "--clear"]).unwrap();
        assert!(ledger(&d).is_empty());
    }

    #[test]
    fn echo_overloads_and_custom_converter() {
        let d = dispatcher();
        let number = d.dispatch(["echo", "42"]).unwrap();
        assert!(matches!(number, Dispatched::Invoked { ref operation, .. } if operation == "number"));
        let text = d.dispatch(["echo", "--case=upper", "hello"]).unwrap();
        assert!(matches!(text, Dispatched::Invoked { ref operation, .. } if operation == "text"));
        let words = d.dispatch(["echo", "-s", ",", "a", "b"]).unwrap();
        assert!(matches!(words, Dispatched::Invoked { ref operation, .. } if operation == "words"));

        let err = d.dispatch(["echo", "-c", "shout", "x"]).unwrap_err();
        assert!(matches!(err, DispatchError::Conversion { ref ty, .. } if ty == "TextCase"));
    }

    #[test]
    fn usage_lists_demo_commands() {
        let usage = dispatcher().usage();
        assert!(usage.contains("add <num1> <num2> [options]"));
        assert!(usage.contains("--case=<TextCase>, -c"));
        assert!(usage.contains("history <command> [options]"));
    }
}
