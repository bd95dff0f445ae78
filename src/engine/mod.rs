/*!
Dispatch engine.

Modules (leaf-first):
  types.rs       TypeKey / Value / ParamInfo / OptionKind
  error.rs       DispatchError taxonomy
  convert.rs     ConverterRegistry (token -> typed value)
  resource.rs    ResourceRegistry (constructor injection)
  catalog.rs     Command / Operation / Option descriptors + Catalog lookup
  builder.rs     CommandBuilder (typed registration -> descriptors)
  options.rs     option token parser
  resolve.rs     overload resolution
  dispatcher.rs  Dispatcher facade (handle / dispatch)

Conventions:
  - Registration takes `&mut`, dispatch takes `&`: all registries are
    populated before the first dispatch and read-only afterwards.
  - Engine failures are `DispatchError`; command bodies return
    `anyhow::Result<()>` and surface as `DispatchError::Command`.
*/

pub mod builder;
pub mod catalog;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod options;
pub mod resolve;
pub mod resource;
pub mod types;
