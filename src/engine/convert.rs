/*!
Type converter registry.

Maps a target type to a function `&str -> value`. `String` is always the
identity conversion and `bool` falls back to `parse_bool`; neither needs an
entry. The default registry is seeded with every primitive integer, `f32`,
`f64` and `bool`; hosts add their own types with `register` (last write wins).
*/

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Display;

use super::error::DispatchError;
use super::types::{TypeKey, Value};

type ConvertFn = Box<dyn Fn(&str) -> Result<Value, String>>;

struct Entry {
    key: TypeKey,
    convert: ConvertFn,
}

pub struct ConverterRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.registered_types()).finish()
    }
}

macro_rules! seed_from_str {
    ($registry:ident, $($t:ty),* $(,)?) => {
        $( $registry.register(|s: &str| s.parse::<$t>()); )*
    };
}

impl ConverterRegistry {
    /// Registry without any converters (only `String` and `bool` convert).
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry seeded with numeric conversions and `bool`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        seed_from_str!(
            registry, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
        );
        registry.register(parse_bool);
        registry
    }

    /// Register (or replace) the converter for `T`.
    pub fn register<T, E, F>(&mut self, convert: F) -> &mut Self
    where
        T: Any,
        E: Display,
        F: Fn(&str) -> Result<T, E> + 'static,
    {
        let key = TypeKey::of::<T>();
        let boxed: ConvertFn = Box::new(move |token: &str| {
            convert(token)
                .map(|v| Box::new(v) as Value)
                .map_err(|e| e.to_string())
        });
        if self
            .entries
            .insert(key.id(), Entry { key, convert: boxed })
            .is_some()
        {
            tracing::debug!(ty = %key, "replaced converter");
        }
        self
    }

    /// Whether tokens can be converted to `key` at all.
    pub fn supports(&self, key: &TypeKey) -> bool {
        key.is_string() || key.is_bool() || self.entries.contains_key(&key.id())
    }

    /// Convert `token` into a value of type `key`.
    pub fn convert(&self, token: &str, key: &TypeKey) -> Result<Value, DispatchError> {
        if key.is_string() {
            return Ok(Box::new(token.to_string()));
        }
        let converted = match self.entries.get(&key.id()) {
            Some(entry) => (entry.convert)(token),
            None if key.is_bool() => parse_bool(token).map(|b| Box::new(b) as Value),
            None => return Err(DispatchError::UnregisteredConverter(key.short_name())),
        };
        converted.map_err(|reason| DispatchError::Conversion {
            token: token.to_string(),
            ty: key.short_name(),
            reason,
        })
    }

    /// Typed convenience over `convert`.
    pub fn convert_as<T: Any>(&self, token: &str) -> Result<T, DispatchError> {
        let key = TypeKey::of::<T>();
        let value = self.convert(token, &key)?;
        value
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| DispatchError::TypeMismatch {
                expected: key.short_name(),
            })
    }

    /// Registered target types, sorted by name (String is implicit).
    pub fn registered_types(&self) -> Vec<TypeKey> {
        let mut keys: Vec<TypeKey> = self.entries.values().map(|e| e.key).collect();
        keys.sort_by_key(|k| k.short_name());
        keys
    }
}

/// Parse a boolean token (`true/false`, `yes/no`, `y/n`, `1/0`, case-insensitive).
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    let l = raw.trim().to_ascii_lowercase();
    match l.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(format!("'{raw}' is not a boolean (expected true/false)")),
    }
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Celsius(f64);

    #[test]
    fn string_is_identity() {
        let reg = ConverterRegistry::empty();
        assert_eq!(reg.convert_as::<String>("hello").unwrap(), "hello");
        assert!(reg.supports(&TypeKey::of::<String>()));
    }

    #[test]
    fn defaults_convert_numbers() {
        let reg = ConverterRegistry::with_defaults();
        assert_eq!(reg.convert_as::<i32>("42").unwrap(), 42);
        assert_eq!(reg.convert_as::<f64>("87.6").unwrap(), 87.6);
        assert_eq!(reg.convert_as::<u8>("255").unwrap(), 255);
        assert!(reg.convert_as::<bool>("Yes").unwrap());
    }

    #[test]
    fn parse_failure_is_conversion_error() {
        let reg = ConverterRegistry::with_defaults();
        let err = reg.convert_as::<i32>("hello").unwrap_err();
        assert!(matches!(err, DispatchError::Conversion { ref ty, .. } if ty == "i32"));
        assert!(err.is_conversion_failure());
    }

    #[test]
    fn missing_converter_is_reported() {
        let reg = ConverterRegistry::empty();
        let err = reg.convert_as::<i32>("5").unwrap_err();
        assert!(matches!(err, DispatchError::UnregisteredConverter(ref t) if t == "i32"));
        assert!(!reg.supports(&TypeKey::of::<i32>()));
    }

    #[test]
    fn bool_converts_without_entry() {
        let reg = ConverterRegistry::empty();
        assert!(reg.convert_as::<bool>("no").is_ok_and(|b| !b));
        assert!(reg.supports(&TypeKey::of::<bool>()));
        assert!(reg.convert_as::<bool>("maybe").unwrap_err().is_conversion_failure());
    }

    #[test]
    fn custom_converter_last_write_wins() {
        let mut reg = ConverterRegistry::empty();
        reg.register(|s: &str| s.parse::<f64>().map(Celsius));
        reg.register(|s: &str| {
            s.trim_end_matches('C')
                .parse::<f64>()
                .map(|v| Celsius(v * 2.0))
        });
        assert_eq!(reg.convert_as::<Celsius>("10C").unwrap(), Celsius(20.0));
        assert_eq!(reg.registered_types().len(), 1);
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("TRUE"), Ok(true));
        assert_eq!(parse_bool("n"), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }
}
