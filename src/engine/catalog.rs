/*!
Command catalog: the read-only index of everything that can be dispatched.

  CommandDescriptor   name, description, constructor resources, operations, options
  OperationDescriptor one invocable overload (parameter list + invocation closure)
  OptionDescriptor    one named option (abbreviation, kind, setter closure)
  Catalog             ordered command list + name lookup

Descriptors are produced by `CommandBuilder::build` and never change after
registration. The closures they carry operate on the type-erased command
instance (`&mut dyn Any`); the builder guarantees the concrete type matches.
*/

use serde::Serialize;
use std::any::Any;
use std::fmt;

use super::error::DispatchError;
use super::resource::{ResourceRegistry, SharedResource};
use super::types::{OptionKind, ParamInfo, TypeKey, Value};

pub type Instance = Box<dyn Any>;
pub type ConstructFn = Box<dyn Fn(Vec<SharedResource>) -> Result<Instance, DispatchError>>;
pub type InvokeFn = Box<dyn Fn(&mut dyn Any, Vec<Value>) -> Result<(), DispatchError>>;
pub type SetterFn = Box<dyn Fn(&mut dyn Any, Value) -> Result<(), DispatchError>>;

/* ---- Operations ---- */

#[derive(Serialize)]
pub struct OperationDescriptor {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    pub(crate) params: Vec<ParamInfo>,
    /// Element type when the sole parameter is a variable-length sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) element: Option<TypeKey>,
    #[serde(skip)]
    pub(crate) invoke: InvokeFn,
}

impl OperationDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_sequence(&self) -> bool {
        self.element.is_some()
    }

    pub fn element_type(&self) -> Option<TypeKey> {
        self.element
    }

    /// Number of parameters that take the raw token unchanged.
    pub fn string_param_count(&self) -> usize {
        self.params.iter().filter(|p| p.ty.is_string()).count()
    }

    pub fn signature(&self) -> String {
        self.params
            .iter()
            .map(|p| p.ty.short_name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn call(&self, instance: &mut dyn Any, values: Vec<Value>) -> Result<(), DispatchError> {
        (self.invoke)(instance, values)
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("signature", &self.signature())
            .field("sequence", &self.is_sequence())
            .finish()
    }
}

/* ---- Options ---- */

#[derive(Serialize)]
pub struct OptionDescriptor {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) abbreviation: Option<char>,
    pub(crate) kind: OptionKind,
    #[serde(rename = "type")]
    pub(crate) value_type: TypeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip)]
    pub(crate) set: SetterFn,
}

impl OptionDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abbreviation(&self) -> Option<char> {
        self.abbreviation
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn value_type(&self) -> TypeKey {
        self.value_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn matches_abbreviation(&self, letter: char) -> bool {
        self.abbreviation
            .is_some_and(|a| a.eq_ignore_ascii_case(&letter))
    }

    pub(crate) fn apply(&self, instance: &mut dyn Any, value: Value) -> Result<(), DispatchError> {
        (self.set)(instance, value)
    }
}

impl fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("abbreviation", &self.abbreviation)
            .field("kind", &self.kind)
            .field("value_type", &self.value_type)
            .finish()
    }
}

/* ---- Commands ---- */

#[derive(Serialize)]
pub struct CommandDescriptor {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    pub(crate) resources: Vec<TypeKey>,
    pub(crate) operations: Vec<OperationDescriptor>,
    pub(crate) options: Vec<OptionDescriptor>,
    #[serde(skip)]
    pub(crate) construct: ConstructFn,
}

impl CommandDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Resource types the constructor needs, in positional order.
    pub fn resources(&self) -> &[TypeKey] {
        &self.resources
    }

    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Operations, optionally restricted to non-sequence overloads of one arity.
    pub fn operations_for_arity(&self, arity: Option<usize>) -> Vec<&OperationDescriptor> {
        self.operations
            .iter()
            .filter(|op| match arity {
                Some(n) => !op.is_sequence() && op.arity() == n,
                None => true,
            })
            .collect()
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    pub fn find_option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|o| o.matches_name(name))
    }

    pub fn find_abbreviation(&self, letter: char) -> Option<&OptionDescriptor> {
        self.options.iter().find(|o| o.matches_abbreviation(letter))
    }

    pub fn matches_name(&self, name: &str, ignore_case: bool) -> bool {
        if ignore_case {
            self.name.eq_ignore_ascii_case(name)
        } else {
            self.name == name
        }
    }

    /// Build a fresh instance, pulling every declared resource from `resources`.
    pub(crate) fn instantiate(&self, resources: &ResourceRegistry) -> Result<Instance, DispatchError> {
        let mut injected = Vec::with_capacity(self.resources.len());
        for key in &self.resources {
            let resource =
                resources
                    .get_raw(key)
                    .ok_or_else(|| DispatchError::MissingResource {
                        command: self.name.clone(),
                        resource: key.short_name(),
                    })?;
            injected.push(resource);
        }
        (self.construct)(injected)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("resources", &self.resources)
            .field("operations", &self.operations)
            .field("options", &self.options)
            .finish()
    }
}

/* ---- Catalog ---- */

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    commands: Vec<CommandDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. Duplicate names are accepted here and reported as
    /// `AmbiguousCommand` when looked up.
    pub fn insert(&mut self, command: CommandDescriptor) {
        tracing::debug!(
            command = %command.name,
            operations = command.operations.len(),
            options = command.options.len(),
            "registered command"
        );
        self.commands.push(command);
    }

    pub fn list_commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Exactly one command must match `name` under the case policy.
    pub fn find_command(&self, name: &str, ignore_case: bool) -> Result<&CommandDescriptor, DispatchError> {
        let mut matches = self
            .commands
            .iter()
            .filter(|c| c.matches_name(name, ignore_case));
        let first = matches
            .next()
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;
        let others = matches.count();
        if others > 0 {
            return Err(DispatchError::AmbiguousCommand {
                name: name.to_string(),
                count: others + 1,
            });
        }
        Ok(first)
    }
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::builder::CommandBuilder;

    #[derive(Default)]
    struct Noop;

    impl Noop {
        fn run(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        fn one(&mut self, _n: i32) -> anyhow::Result<()> {
            Ok(())
        }

        fn two(&mut self, _a: i32, _b: String) -> anyhow::Result<()> {
            Ok(())
        }

        fn many(&mut self, _items: Vec<i32>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn catalog_with(names: &[&str]) -> Catalog {
        let mut catalog = Catalog::new();
        for n in names {
            catalog.insert(
                CommandBuilder::<Noop>::new(*n)
                    .operation("run", Noop::run)
                    .build()
                    .unwrap(),
            );
        }
        catalog
    }

    #[test]
    fn find_exact_and_case_insensitive() {
        let catalog = catalog_with(&["test_command", "other"]);
        for name in ["test_command", "Test_Command", "TEst_ComManD"] {
            let found = catalog.find_command(name, true).unwrap();
            assert_eq!(found.name(), "test_command");
        }
        assert!(catalog.find_command("test_command", false).is_ok());
    }

    #[test]
    fn case_sensitive_mode_rejects_other_case() {
        let catalog = catalog_with(&["test_command"]);
        let err = catalog.find_command("Test_Command", false).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand(ref n) if n == "Test_Command"));
    }

    #[test]
    fn unknown_name_is_reported() {
        let catalog = catalog_with(&["add"]);
        for name in ["ad", "add ", "addd", ""] {
            assert!(matches!(
                catalog.find_command(name, true),
                Err(DispatchError::UnknownCommand(_))
            ));
        }
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let catalog = catalog_with(&["add", "ADD"]);
        let err = catalog.find_command("add", true).unwrap_err();
        assert!(matches!(err, DispatchError::AmbiguousCommand { count: 2, .. }));
        // Case-sensitive lookup tells them apart.
        assert_eq!(catalog.find_command("ADD", false).unwrap().name(), "ADD");
    }

    #[test]
    fn operations_for_arity_filters_fixed_overloads() {
        let cmd = CommandBuilder::<Noop>::new("calc")
            .operation("run", Noop::run)
            .operation("one", Noop::one)
            .operation("two", Noop::two)
            .sequence("many", Noop::many)
            .build()
            .unwrap();
        assert_eq!(cmd.operations_for_arity(None).len(), 4);
        let ones = cmd.operations_for_arity(Some(1));
        assert_eq!(ones.len(), 1);
        assert_eq!(ones[0].name(), "one");
        assert_eq!(cmd.operations_for_arity(Some(2))[0].string_param_count(), 1);
        assert_eq!(cmd.operations_for_arity(Some(2))[0].signature(), "i32, String");
    }

    #[test]
    fn serializes_metadata_only() {
        let catalog = catalog_with(&["add"]);
        let v = serde_json::to_value(&catalog).unwrap();
        assert_eq!(v[0]["name"], "add");
        assert_eq!(v[0]["operations"][0]["name"], "run");
        assert!(v[0]["operations"][0].get("invoke").is_none());
    }
}
