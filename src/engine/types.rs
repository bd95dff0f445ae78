/*!
Core value/type vocabulary shared by the engine.

  TypeKey    - identity of a Rust type (TypeId) plus its name for diagnostics
  Value      - a converted, type-erased argument (`Box<dyn Any>`)
  ParamInfo  - one declared operation parameter (name, type, position)
  OptionKind - flag | text | converted, derived from an option's value type
*/

use serde::{Serialize, Serializer};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A converted argument on its way into an operation or option setter.
pub type Value = Box<dyn Any>;

/// Identity of a value type known to the engine.
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// messages and usage output.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name as reported by `std::any::type_name`.
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    /// Name with module paths removed (`alloc::vec::Vec<f64>` -> `Vec<f64>`).
    pub fn short_name(&self) -> String {
        strip_paths(self.name)
    }

    pub fn is_string(&self) -> bool {
        self.id == TypeId::of::<String>()
    }

    pub fn is_bool(&self) -> bool {
        self.id == TypeId::of::<bool>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.short_name())
    }
}

fn strip_paths(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        match ch {
            '<' | '>' | ',' | ' ' | '[' | ']' | ';' | '(' | ')' | '&' => {
                out.push_str(last_segment(&segment));
                segment.clear();
                out.push(ch);
            }
            _ => segment.push(ch),
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/* ---- Parameters ---- */

/// One declared parameter of an operation.
#[derive(Debug, Clone, Serialize)]
pub struct ParamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeKey,
    pub position: usize,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, ty: TypeKey, position: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            position,
        }
    }
}

/* ---- Options ---- */

/// How an option consumes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// `bool` slot: present means true, no value required.
    Flag,
    /// `String` slot: value passed through untouched.
    Text,
    /// Any other type: value goes through the converter registry.
    Converted,
}

impl OptionKind {
    pub fn of(key: &TypeKey) -> Self {
        if key.is_bool() {
            OptionKind::Flag
        } else if key.is_string() {
            OptionKind::Text
        } else {
            OptionKind::Converted
        }
    }

    pub fn requires_value(&self) -> bool {
        !matches!(self, OptionKind::Flag)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionKind::Flag => "flag",
            OptionKind::Text => "text",
            OptionKind::Converted => "converted",
        };
        f.write_str(s)
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_module_paths() {
        assert_eq!(TypeKey::of::<String>().short_name(), "String");
        assert_eq!(TypeKey::of::<Vec<String>>().short_name(), "Vec<String>");
        assert_eq!(TypeKey::of::<f64>().short_name(), "f64");
        assert_eq!(TypeKey::of::<String>().full_name(), "alloc::string::String");
        assert_eq!(
            TypeKey::of::<std::collections::HashMap<String, u8>>().short_name(),
            "HashMap<String, u8>"
        );
    }

    #[test]
    fn equality_ignores_name() {
        assert_eq!(TypeKey::of::<i32>(), TypeKey::of::<i32>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<i64>());
    }

    #[test]
    fn option_kind_from_type() {
        assert_eq!(OptionKind::of(&TypeKey::of::<bool>()), OptionKind::Flag);
        assert_eq!(OptionKind::of(&TypeKey::of::<String>()), OptionKind::Text);
        assert_eq!(OptionKind::of(&TypeKey::of::<u32>()), OptionKind::Converted);
        assert!(!OptionKind::Flag.requires_value());
        assert!(OptionKind::Text.requires_value());
    }

    #[test]
    fn serializes_as_short_name() {
        let v = serde_json::to_value(TypeKey::of::<Vec<f64>>()).unwrap();
        assert_eq!(v, serde_json::json!("Vec<f64>"));
    }
}
