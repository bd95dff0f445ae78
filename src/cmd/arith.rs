/*!
Arithmetic commands: add, sub, mul, div.

All four share one command type (`Arith`) and the same options:
  --precision=<usize>, -p   digits after the decimal point
  --dry-run, -n             print the result without recording it

`add` and `mul` also accept any number of operands through a sequence
overload; `add 5 7` picks the pair overload, `add 5 7 87.6` the sequence.
Results are printed on stdout and recorded in the injected `Ledger`.
*/

use anyhow::{Result, bail};
use std::sync::Arc;

use dispatchkit::{CommandBuilder, DispatchError, Dispatcher};

use super::ledger::Ledger;

pub struct Arith {
    ledger: Arc<Ledger>,
    precision: Option<usize>,
    dry_run: bool,
}

impl Arith {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            precision: None,
            dry_run: false,
        }
    }

    fn finish(&self, command: &str, expression: String, result: f64) -> Result<()> {
        if !result.is_finite() {
            bail!("{expression} has no finite result");
        }
        println!("{}", format_number(result, self.precision));
        if !self.dry_run {
            self.ledger.record(command, expression, result);
        }
        Ok(())
    }

    pub fn add(&mut self, a: f64, b: f64) -> Result<()> {
        self.finish("add", format!("{a} + {b}"), a + b)
    }

    pub fn sum(&mut self, items: Vec<f64>) -> Result<()> {
        self.finish("add", join(&items, " + "), items.iter().sum())
    }

    pub fn sub(&mut self, a: f64, b: f64) -> Result<()> {
        self.finish("sub", format!("{a} - {b}"), a - b)
    }

    pub fn mul(&mut self, a: f64, b: f64) -> Result<()> {
        self.finish("mul", format!("{a} * {b}"), a * b)
    }

    pub fn product(&mut self, items: Vec<f64>) -> Result<()> {
        self.finish("mul", join(&items, " * "), items.iter().product())
    }

    pub fn div(&mut self, a: f64, b: f64) -> Result<()> {
        if b == 0.0 {
            bail!("cannot divide {a} by zero");
        }
        self.finish("div", format!("{a} / {b}"), a / b)
    }
}

/// Render `value` with a fixed number of decimals, or the shortest form.
pub fn format_number(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{value:.p$}"),
        None => value.to_string(),
    }
}

fn join(items: &[f64], op: &str) -> String {
    items
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(op)
}

fn command(name: &str, description: &str) -> CommandBuilder<Arith> {
    CommandBuilder::<Arith>::with_constructor(name, Arith::new).describe(description)
}

fn with_common_options(builder: CommandBuilder<Arith>) -> CommandBuilder<Arith> {
    builder
        .option("precision", Some('p'), "Digits after the decimal point", |c, p: usize| {
            c.precision = Some(p)
        })
        .flag("dry-run", Some('n'), "Print the result without recording it", |c, v| {
            c.dry_run = v
        })
}

pub fn register(dispatcher: &mut Dispatcher) -> Result<(), DispatchError> {
    dispatcher
        .register(with_common_options(
            command("add", "Add numbers together")
                .operation("pair", Arith::add)
                .params(&["num1", "num2"])
                .help("Add two numbers")
                .sequence("sum", Arith::sum)
                .help("Sum any number of values"),
        ))?
        .register(with_common_options(
            command("sub", "Subtract one number from another")
                .operation("pair", Arith::sub)
                .params(&["minuend", "subtrahend"]),
        ))?
        .register(with_common_options(
            command("mul", "Multiply numbers")
                .operation("pair", Arith::mul)
                .params(&["num1", "num2"])
                .help("Multiply two numbers")
                .sequence("product", Arith::product)
                .help("Product of any number of values"),
        ))?
        .register(with_common_options(
            command("div", "Divide one number by another")
                .operation("pair", Arith::div)
                .params(&["dividend", "divisor"]),
        ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers() {
        assert_eq!(format_number(5.0, None), "5");
        assert_eq!(format_number(87.6, None), "87.6");
        assert_eq!(format_number(2.0 / 3.0, Some(2)), "0.67");
        assert_eq!(format_number(1.0, Some(0)), "1");
    }

    #[test]
    fn operations_record_in_ledger() {
        let ledger = Arc::new(Ledger::new());
        let mut arith = Arith::new(Arc::clone(&ledger));
        arith.add(2.0, 3.0).unwrap();
        arith.product(vec![2.0, 3.0, 4.0]).unwrap();
        let entries = ledger.entries();
        assert_eq!(entries[0].expression, "2 + 3");
        assert_eq!(entries[0].result, 5.0);
        assert_eq!(entries[1].command, "mul");
        assert_eq!(entries[1].result, 24.0);
    }

    #[test]
    fn dry_run_skips_ledger() {
        let ledger = Arc::new(Ledger::new());
        let mut arith = Arith::new(Arc::clone(&ledger));
        arith.dry_run = true;
        arith.sub(1.0, 2.0).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn division_by_zero_is_a_command_error() {
        let ledger = Arc::new(Ledger::new());
        let mut arith = Arith::new(Arc::clone(&ledger));
        let err = arith.div(1.0, 0.0).unwrap_err();
        assert_eq!(err.to_string(), "cannot divide 1 by zero");
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_sum_is_zero() {
        let ledger = Arc::new(Ledger::new());
        let mut arith = Arith::new(Arc::clone(&ledger));
        arith.sum(Vec::new()).unwrap();
        assert_eq!(ledger.entries()[0].result, 0.0);
    }
}
