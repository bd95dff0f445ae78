/*!
Overload resolution.

Picks the operation that accepts the positional tokens, in two passes:

  1. fixed arity: non-sequence operations with exactly `n` parameters,
     stable-ordered by (parameter count, number of `String` parameters)
     ascending, so overloads that need conversion are tried before the
     string catch-all
  2. sequence fallback: operations whose sole parameter is `Vec<T>`,
     non-`String` element types first; the sequence absorbs all tokens

Each candidate attempt is a `Result`: a conversion failure rejects the
candidate and the search moves on; the first fully converted candidate wins.
When nothing accepts the tokens, every rejection reason is returned inside
`NoMatchingHandler`.
*/

use std::any::Any;

use super::catalog::{CommandDescriptor, OperationDescriptor};
use super::convert::ConverterRegistry;
use super::error::DispatchError;
use super::types::Value;

/// The chosen operation and its converted arguments.
pub struct Selection<'a> {
    pub operation: &'a OperationDescriptor,
    pub values: Vec<Value>,
}

impl std::fmt::Debug for Selection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("operation", &self.operation.name())
            .field("values", &self.values.len())
            .finish()
    }
}

/// Fixed-arity candidates for `arity` tokens, in trial order.
pub fn fixed_candidates(command: &CommandDescriptor, arity: usize) -> Vec<&OperationDescriptor> {
    let mut candidates = command.operations_for_arity(Some(arity));
    candidates.sort_by_key(|op| (op.arity(), op.string_param_count()));
    candidates
}

/// Sequence candidates in trial order (string element types last).
pub fn sequence_candidates(command: &CommandDescriptor) -> Vec<&OperationDescriptor> {
    let mut candidates: Vec<&OperationDescriptor> = command
        .operations()
        .iter()
        .filter(|op| op.is_sequence())
        .collect();
    candidates.sort_by_key(|op| op.element_type().is_some_and(|t| t.is_string()));
    candidates
}

fn convert_fixed(
    op: &OperationDescriptor,
    tokens: &[String],
    converters: &ConverterRegistry,
) -> Result<Vec<Value>, DispatchError> {
    op.params()
        .iter()
        .zip(tokens)
        .map(|(param, token)| converters.convert(token, &param.ty))
        .collect()
}

fn convert_sequence(
    op: &OperationDescriptor,
    tokens: &[String],
    converters: &ConverterRegistry,
) -> Result<Vec<Value>, DispatchError> {
    let Some(element) = op.element_type() else {
        return Err(DispatchError::TypeMismatch {
            expected: "sequence operation".into(),
        });
    };
    tokens
        .iter()
        .map(|token| converters.convert(token, &element))
        .collect()
}

/// Choose the operation for `tokens` without invoking it.
pub fn select<'a>(
    command: &'a CommandDescriptor,
    tokens: &[String],
    converters: &ConverterRegistry,
) -> Result<Selection<'a>, DispatchError> {
    let mut rejections = Vec::new();

    let fixed = fixed_candidates(command, tokens.len())
        .into_iter()
        .map(|op| (op, convert_fixed(op, tokens, converters)));
    let sequences = sequence_candidates(command)
        .into_iter()
        .map(|op| (op, convert_sequence(op, tokens, converters)));

    // Lazy chain: later candidates are only converted if earlier ones failed.
    for (operation, attempt) in fixed.chain(sequences) {
        match attempt {
            Ok(values) => {
                tracing::debug!(
                    command = command.name(),
                    operation = operation.name(),
                    signature = %operation.signature(),
                    "selected operation"
                );
                return Ok(Selection { operation, values });
            }
            Err(err) if err.is_conversion_failure() => {
                tracing::trace!(
                    operation = operation.name(),
                    reason = %err,
                    "rejected candidate"
                );
                rejections.push(format!("{}({}): {}", operation.name(), operation.signature(), err));
            }
            Err(err) => return Err(err),
        }
    }

    Err(DispatchError::NoMatchingHandler {
        command: command.name().to_string(),
        arity: tokens.len(),
        rejections,
    })
}

/// Select and invoke; command-logic failures come back as `DispatchError::Command`.
pub fn resolve_and_invoke<'a>(
    command: &'a CommandDescriptor,
    instance: &mut dyn Any,
    tokens: &[String],
    converters: &ConverterRegistry,
) -> Result<&'a OperationDescriptor, DispatchError> {
    let Selection { operation, values } = select(command, tokens, converters)?;
    operation.call(instance, values)?;
    Ok(operation)
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::builder::CommandBuilder;
    use crate::engine::resource::ResourceRegistry;

    #[derive(Default)]
    struct Probe {
        calls: Vec<String>,
    }

    impl Probe {
        fn pair(&mut self, a: f64, b: f64) -> anyhow::Result<()> {
            self.calls.push(format!("pair {a} {b}"));
            Ok(())
        }

        fn all(&mut self, items: Vec<f64>) -> anyhow::Result<()> {
            self.calls.push(format!("all {}", items.len()));
            Ok(())
        }

        fn text(&mut self, s: String) -> anyhow::Result<()> {
            self.calls.push(format!("text {s}"));
            Ok(())
        }

        fn int(&mut self, n: i32) -> anyhow::Result<()> {
            self.calls.push(format!("int {n}"));
            Ok(())
        }

        fn words(&mut self, items: Vec<String>) -> anyhow::Result<()> {
            self.calls.push(format!("words {}", items.len()));
            Ok(())
        }

        fn empty(&mut self) -> anyhow::Result<()> {
            self.calls.push("empty".into());
            Ok(())
        }
    }

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn run(cmd: &CommandDescriptor, raw: &[&str]) -> Result<Vec<String>, DispatchError> {
        let converters = ConverterRegistry::with_defaults();
        let mut instance = cmd.instantiate(&ResourceRegistry::new()).unwrap();
        resolve_and_invoke(cmd, instance.as_mut(), &tokens(raw), &converters)?;
        Ok(instance.downcast::<Probe>().unwrap().calls)
    }

    fn numeric() -> CommandDescriptor {
        CommandBuilder::<Probe>::new("add")
            .sequence("all", Probe::all)
            .operation("pair", Probe::pair)
            .build()
            .unwrap()
    }

    #[test]
    fn fixed_arity_wins_over_sequence() {
        assert_eq!(run(&numeric(), &["5", "7"]).unwrap(), vec!["pair 5 7"]);
    }

    #[test]
    fn other_arity_falls_through_to_sequence() {
        assert_eq!(run(&numeric(), &["5", "7", "87.6"]).unwrap(), vec!["all 3"]);
        assert_eq!(run(&numeric(), &["1"]).unwrap(), vec!["all 1"]);
        assert_eq!(run(&numeric(), &[]).unwrap(), vec!["all 0"]);
    }

    #[test]
    fn conversion_preferring_overload_is_tried_first() {
        // Declared string-first on purpose: order must come from the policy.
        let cmd = CommandBuilder::<Probe>::new("echo")
            .operation("text", Probe::text)
            .operation("int", Probe::int)
            .build()
            .unwrap();
        assert_eq!(run(&cmd, &["hello"]).unwrap(), vec!["text hello"]);
        assert_eq!(run(&cmd, &["5"]).unwrap(), vec!["int 5"]);
    }

    #[test]
    fn string_sequence_is_the_catch_all() {
        let cmd = CommandBuilder::<Probe>::new("mixed")
            .sequence("words", Probe::words)
            .sequence("all", Probe::all)
            .build()
            .unwrap();
        assert_eq!(run(&cmd, &["1", "2"]).unwrap(), vec!["all 2"]);
        assert_eq!(run(&cmd, &["1", "two"]).unwrap(), vec!["words 2"]);
    }

    #[test]
    fn zero_arity_operation() {
        let cmd = CommandBuilder::<Probe>::new("noop")
            .operation("empty", Probe::empty)
            .sequence("all", Probe::all)
            .build()
            .unwrap();
        assert_eq!(run(&cmd, &[]).unwrap(), vec!["empty"]);
    }

    #[test]
    fn no_candidate_reports_every_rejection() {
        let err = run(&numeric(), &["5", "x"]).unwrap_err();
        match err {
            DispatchError::NoMatchingHandler {
                command,
                arity,
                rejections,
            } => {
                assert_eq!(command, "add");
                assert_eq!(arity, 2);
                assert_eq!(rejections.len(), 2);
                assert!(rejections[0].starts_with("pair(f64, f64)"));
                assert!(rejections[1].starts_with("all(Vec<f64>)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_converter_rejects_candidate() {
        struct Unknown;
        #[derive(Default)]
        struct Holder;
        let cmd = CommandBuilder::<Holder>::new("h")
            .operation("u", |_: &mut Holder, _u: Unknown| -> anyhow::Result<()> { Ok(()) })
            .build()
            .unwrap();
        let converters = ConverterRegistry::with_defaults();
        let err = select(&cmd, &tokens(&["x"]), &converters).unwrap_err();
        match err {
            DispatchError::NoMatchingHandler { rejections, .. } => {
                assert!(rejections[0].contains("no converter registered"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn candidate_order() {
        let cmd = CommandBuilder::<Probe>::new("echo")
            .operation("text", Probe::text)
            .operation("int", Probe::int)
            .sequence("words", Probe::words)
            .sequence("all", Probe::all)
            .build()
            .unwrap();
        let fixed: Vec<&str> = fixed_candidates(&cmd, 1).iter().map(|o| o.name()).collect();
        assert_eq!(fixed, vec!["int", "text"]);
        let seq: Vec<&str> = sequence_candidates(&cmd).iter().map(|o| o.name()).collect();
        assert_eq!(seq, vec!["all", "words"]);
    }
}
