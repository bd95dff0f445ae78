/*!
builder.rs - typed command registration.

`CommandBuilder<C>` collects everything the engine needs to know about a
command type `C` and erases it into a `CommandDescriptor`:

  constructor   `C::default` (via `new`) or any `Fn(Arc<R1>, ..) -> C`
                (via `with_constructor`); the `Arc` parameter types become the
                command's resource requirements
  operation     any `Fn(&mut C, A1, .., An) -> anyhow::Result<()>` (n <= 6);
                method paths such as `Calc::add` work directly
  sequence      `Fn(&mut C, Vec<T>) -> anyhow::Result<()>`, the variadic
                fallback that absorbs every positional token
  flag/option   setter closures for `-x` / `--name[=value]`

Parameter names default to `arg1..argN` (`items` for sequences); `params`
and `help` decorate the most recently added operation for usage output.

Example:
  CommandBuilder::<Calc>::with_constructor("add", Calc::new)
      .describe("Add numbers together")
      .operation("pair", Calc::add)
      .params(&["num1", "num2"])
      .sequence("all", Calc::sum)
      .option("precision", Some('p'), "Digits after the point", |c, p: usize| c.precision = p)
      .build()?
*/

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use super::catalog::{
    CommandDescriptor, ConstructFn, Instance, InvokeFn, OperationDescriptor, OptionDescriptor,
};
use super::error::DispatchError;
use super::resource::SharedResource;
use super::types::{OptionKind, ParamInfo, TypeKey, Value};

/* -------------------------------------------------------------------------- */
/* Operation / Constructor traits                                             */
/* -------------------------------------------------------------------------- */

/// A typed handler for command `C` taking the argument tuple `Args`.
pub trait Operation<C, Args>: 'static {
    fn param_types() -> Vec<TypeKey>;
    fn into_invoke_fn(self) -> InvokeFn;
}

/// A constructor for command `C` fed with the shared resources in `Args`.
pub trait Constructor<C, Args>: 'static {
    fn resource_types() -> Vec<TypeKey>;
    fn into_construct_fn(self) -> ConstructFn;
}

fn mismatch<T: Any>() -> DispatchError {
    DispatchError::TypeMismatch {
        expected: TypeKey::of::<T>().short_name(),
    }
}

fn downcast_instance<C: Any>(instance: &mut dyn Any) -> Result<&mut C, DispatchError> {
    instance.downcast_mut::<C>().ok_or_else(mismatch::<C>)
}

fn take_value<T: Any>(values: &mut std::vec::IntoIter<Value>) -> Result<T, DispatchError> {
    values
        .next()
        .ok_or_else(mismatch::<T>)?
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| mismatch::<T>())
}

fn take_resource<R: Any + Send + Sync>(
    resources: &mut std::vec::IntoIter<SharedResource>,
) -> Result<Arc<R>, DispatchError> {
    resources
        .next()
        .ok_or_else(mismatch::<R>)?
        .downcast::<R>()
        .map_err(|_| mismatch::<R>())
}

macro_rules! impl_operation {
    ($($arg:ident),*) => {
        impl<C, F, $($arg,)*> Operation<C, ($($arg,)*)> for F
        where
            C: Any,
            F: Fn(&mut C, $($arg),*) -> anyhow::Result<()> + 'static,
            $($arg: Any,)*
        {
            fn param_types() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_invoke_fn(self) -> InvokeFn {
                Box::new(
                    move |instance: &mut dyn Any, values: Vec<Value>| -> Result<(), DispatchError> {
                        let command = downcast_instance::<C>(instance)?;
                        let mut values = values.into_iter();
                        $( let $arg = take_value::<$arg>(&mut values)?; )*
                        (self)(command, $($arg),*).map_err(DispatchError::Command)
                    },
                )
            }
        }
    };
}

impl_operation!();
impl_operation!(A1);
impl_operation!(A1, A2);
impl_operation!(A1, A2, A3);
impl_operation!(A1, A2, A3, A4);
impl_operation!(A1, A2, A3, A4, A5);
impl_operation!(A1, A2, A3, A4, A5, A6);

macro_rules! impl_constructor {
    ($($res:ident),*) => {
        impl<C, F, $($res,)*> Constructor<C, ($($res,)*)> for F
        where
            C: Any,
            F: Fn($(Arc<$res>),*) -> C + 'static,
            $($res: Any + Send + Sync,)*
        {
            fn resource_types() -> Vec<TypeKey> {
                vec![$(TypeKey::of::<$res>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_construct_fn(self) -> ConstructFn {
                Box::new(
                    move |resources: Vec<SharedResource>| -> Result<Instance, DispatchError> {
                        let mut resources = resources.into_iter();
                        $( let $res = take_resource::<$res>(&mut resources)?; )*
                        let instance: Instance = Box::new((self)($($res),*));
                        Ok(instance)
                    },
                )
            }
        }
    };
}

impl_constructor!();
impl_constructor!(R1);
impl_constructor!(R1, R2);
impl_constructor!(R1, R2, R3);
impl_constructor!(R1, R2, R3, R4);

/* -------------------------------------------------------------------------- */
/* CommandBuilder                                                             */
/* -------------------------------------------------------------------------- */

pub struct CommandBuilder<C> {
    name: String,
    description: Option<String>,
    resources: Vec<TypeKey>,
    construct: ConstructFn,
    operations: Vec<OperationDescriptor>,
    options: Vec<OptionDescriptor>,
    _command: PhantomData<fn() -> C>,
}

impl<C: Any + Default> CommandBuilder<C> {
    /// Command constructed with `C::default()` and no resources.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_constructor(name, C::default)
    }
}

impl<C: Any> CommandBuilder<C> {
    pub fn with_constructor<A, F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Constructor<C, A>,
    {
        Self {
            name: name.into(),
            description: None,
            resources: F::resource_types(),
            construct: constructor.into_construct_fn(),
            operations: Vec::new(),
            options: Vec::new(),
            _command: PhantomData,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    /// Add a fixed-arity overload.
    pub fn operation<A, H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: Operation<C, A>,
    {
        let params = H::param_types()
            .into_iter()
            .enumerate()
            .map(|(i, ty)| ParamInfo::new(format!("arg{}", i + 1), ty, i))
            .collect();
        self.operations.push(OperationDescriptor {
            name: name.into(),
            description: None,
            params,
            element: None,
            invoke: handler.into_invoke_fn(),
        });
        self
    }

    /// Add a sequence overload receiving every positional token as `Vec<T>`.
    pub fn sequence<T, F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        T: Any,
        F: Fn(&mut C, Vec<T>) -> anyhow::Result<()> + 'static,
    {
        let invoke: InvokeFn = Box::new(
            move |instance: &mut dyn Any, values: Vec<Value>| -> Result<(), DispatchError> {
                let command = downcast_instance::<C>(instance)?;
                let items = values
                    .into_iter()
                    .map(|v| v.downcast::<T>().map(|b| *b).map_err(|_| mismatch::<T>()))
                    .collect::<Result<Vec<T>, DispatchError>>()?;
                handler(command, items).map_err(DispatchError::Command)
            },
        );
        self.operations.push(OperationDescriptor {
            name: name.into(),
            description: None,
            params: vec![ParamInfo::new("items", TypeKey::of::<Vec<T>>(), 0)],
            element: Some(TypeKey::of::<T>()),
            invoke,
        });
        self
    }

    /// Name the parameters of the most recently added operation.
    pub fn params(mut self, names: &[&str]) -> Self {
        if let Some(op) = self.operations.last_mut() {
            for (param, name) in op.params.iter_mut().zip(names) {
                param.name = (*name).to_string();
            }
        }
        self
    }

    /// Short description of the most recently added operation.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        if let Some(op) = self.operations.last_mut() {
            op.description = non_empty(description.into());
        }
        self
    }

    /// Boolean option: `--name` / `-x` sets it to true.
    pub fn flag<F>(self, name: impl Into<String>, abbreviation: Option<char>, description: &str, setter: F) -> Self
    where
        F: Fn(&mut C, bool) + 'static,
    {
        self.option::<bool, F>(name, abbreviation, description, setter)
    }

    /// Option of any type: `String` is passed through, `bool` is a flag, every
    /// other type is converted through the converter registry.
    pub fn option<T, F>(
        mut self,
        name: impl Into<String>,
        abbreviation: Option<char>,
        description: &str,
        setter: F,
    ) -> Self
    where
        T: Any,
        F: Fn(&mut C, T) + 'static,
    {
        let value_type = TypeKey::of::<T>();
        let name = name.into();
        if abbreviation.is_some_and(|a| !a.is_alphabetic()) {
            tracing::warn!(option = %name, "abbreviation is not a letter and cannot be matched");
        }
        self.options.push(OptionDescriptor {
            name,
            abbreviation,
            kind: OptionKind::of(&value_type),
            value_type,
            description: non_empty(description.to_string()),
            set: Box::new(
                move |instance: &mut dyn Any, value: Value| -> Result<(), DispatchError> {
                    let command = downcast_instance::<C>(instance)?;
                    let value = value.downcast::<T>().map_err(|_| mismatch::<T>())?;
                    setter(command, *value);
                    Ok(())
                },
            ),
        });
        self
    }

    /// Validate and freeze into a descriptor.
    pub fn build(self) -> Result<CommandDescriptor, DispatchError> {
        self.check_signatures()?;
        self.check_options()?;
        Ok(CommandDescriptor {
            name: self.name,
            description: self.description,
            resources: self.resources,
            operations: self.operations,
            options: self.options,
            construct: self.construct,
        })
    }

    fn check_signatures(&self) -> Result<(), DispatchError> {
        for (i, op) in self.operations.iter().enumerate() {
            for other in &self.operations[..i] {
                let clash = match (op.element, other.element) {
                    (Some(a), Some(b)) => a == b,
                    (None, None) => op
                        .params
                        .iter()
                        .map(|p| p.ty)
                        .eq(other.params.iter().map(|p| p.ty)),
                    _ => false,
                };
                if clash {
                    return Err(DispatchError::DuplicateSignature {
                        command: self.name.clone(),
                        signature: op.signature(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_options(&self) -> Result<(), DispatchError> {
        for (i, opt) in self.options.iter().enumerate() {
            for other in &self.options[..i] {
                if other.matches_name(&opt.name) {
                    return Err(DispatchError::DuplicateOption {
                        command: self.name.clone(),
                        option: format!("--{}", opt.name),
                    });
                }
                if let Some(a) = opt.abbreviation
                    && other.matches_abbreviation(a)
                {
                    return Err(DispatchError::DuplicateOption {
                        command: self.name.clone(),
                        option: format!("-{a}"),
                    });
                }
            }
        }
        Ok(())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/* ---- Tests ---- */
