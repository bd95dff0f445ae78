/*!
Option parser.

Walks the tokens after the command name, applies every option-shaped token
to the live command instance and returns the positional tokens in order.

Token forms:
  --name            flag -> true; value option claims the next positional token
  --name=value      value converted by the option's kind
  -x                abbreviation, same value rules as the long form
  -xyz              aggregate: each letter resolved on its own, at most one of
                    them may require a value (inline `=value` or next token)
  -x=value / -xyz=value
  --                end of options, everything after is positional

`-5`, `-.5` and a lone `-` are positional (negative numbers, stdin markers).
Name and abbreviation matching is case-insensitive. Repeating an option
overwrites the earlier value.
*/

use std::any::Any;
use std::iter::Peekable;
use std::slice::Iter;

use super::catalog::{CommandDescriptor, OptionDescriptor};
use super::convert::{ConverterRegistry, parse_bool};
use super::error::DispatchError;
use super::types::{OptionKind, Value};

/// Whether `token` should be handled as an option rather than a positional argument.
pub fn is_option_token(token: &str) -> bool {
    let mut chars = token.chars();
    if chars.next() != Some('-') {
        return false;
    }
    match chars.next() {
        None => false,
        Some(c) => !(c.is_ascii_digit() || c == '.'),
    }
}

/// Apply all option tokens in `tokens` to `instance`; returns the positional tokens.
pub fn apply_options(
    command: &CommandDescriptor,
    instance: &mut dyn Any,
    tokens: &[String],
    converters: &ConverterRegistry,
) -> Result<Vec<String>, DispatchError> {
    let mut positionals = Vec::new();
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        if token == "--" {
            positionals.extend(iter.by_ref().cloned());
            break;
        }
        if !is_option_token(token) {
            positionals.push(token.clone());
            continue;
        }
        match token.strip_prefix("--") {
            Some(long) => apply_long(command, instance, token, long, &mut iter, converters)?,
            None => apply_short(command, instance, token, &token[1..], &mut iter, converters)?,
        }
    }

    Ok(positionals)
}

/* ---- Long form ---- */

fn apply_long(
    command: &CommandDescriptor,
    instance: &mut dyn Any,
    token: &str,
    body: &str,
    rest: &mut Peekable<Iter<'_, String>>,
    converters: &ConverterRegistry,
) -> Result<(), DispatchError> {
    let (name, inline) = split_inline(body);
    let option = command
        .find_option(name)
        .ok_or_else(|| unknown(command, token))?;

    let raw = match (option.kind(), inline) {
        (OptionKind::Flag, value) => value,
        (_, Some(value)) => Some(value),
        (_, None) => Some(claim_next(rest, token)?),
    };
    set_option(option, instance, raw, converters)
}

/* ---- Short / aggregated form ---- */

fn apply_short(
    command: &CommandDescriptor,
    instance: &mut dyn Any,
    token: &str,
    body: &str,
    rest: &mut Peekable<Iter<'_, String>>,
    converters: &ConverterRegistry,
) -> Result<(), DispatchError> {
    let (letters, inline) = split_inline(body);
    if letters.is_empty() {
        return Err(unknown(command, token));
    }

    let mut resolved: Vec<&OptionDescriptor> = Vec::with_capacity(letters.len());
    for letter in letters.chars() {
        let option = command
            .find_abbreviation(letter)
            .ok_or_else(|| unknown(command, &format!("-{letter}")))?;
        resolved.push(option);
    }

    let value_options = resolved.iter().filter(|o| o.kind().requires_value()).count();
    if value_options > 1 {
        return Err(DispatchError::AmbiguousAggregateValue {
            token: token.to_string(),
        });
    }

    // The single value option (if any) owns the inline value; otherwise an
    // inline value is a bool shared by every flag in the token.
    let value_raw = if value_options == 1 {
        Some(match inline {
            Some(v) => v,
            None => claim_next(rest, token)?,
        })
    } else {
        None
    };

    let flag_raw = if value_options == 0 { inline } else { None };

    for option in resolved {
        let raw = if option.kind().requires_value() {
            value_raw
        } else {
            flag_raw
        };
        set_option(option, instance, raw, converters)?;
    }
    Ok(())
}

/* ---- Helpers ---- */

fn split_inline(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

fn claim_next<'a>(rest: &mut Peekable<Iter<'a, String>>, token: &str) -> Result<&'a str, DispatchError> {
    rest.next_if(|t| !is_option_token(t) && t.as_str() != "--")
        .map(|t| t.as_str())
        .ok_or_else(|| DispatchError::MissingOptionValue {
            option: token.to_string(),
        })
}

fn unknown(command: &CommandDescriptor, option: &str) -> DispatchError {
    DispatchError::UnknownOption {
        command: command.name().to_string(),
        option: option.to_string(),
    }
}

fn set_option(
    option: &OptionDescriptor,
    instance: &mut dyn Any,
    raw: Option<&str>,
    converters: &ConverterRegistry,
) -> Result<(), DispatchError> {
    let value: Value = match (option.kind(), raw) {
        (OptionKind::Flag, None) => Box::new(true),
        (OptionKind::Flag, Some(raw)) => {
            Box::new(parse_bool(raw).map_err(|reason| DispatchError::Conversion {
                token: raw.to_string(),
                ty: "bool".into(),
                reason,
            })?)
        }
        (_, None) => {
            return Err(DispatchError::MissingOptionValue {
                option: format!("--{}", option.name()),
            });
        }
        (OptionKind::Text, Some(raw)) => Box::new(raw.to_string()),
        (OptionKind::Converted, Some(raw)) => converters.convert(raw, &option.value_type())?,
    };
    tracing::debug!(option = option.name(), value = ?raw, "applied option");
    option.apply(instance, value)
}

/* ---- Tests ---- */
