/*!
dispatchkit - declarative command dispatch for command-line programs.

A host program registers commands (name, constructor, overloaded operations,
options) with a [`Dispatcher`] and hands it the already-tokenized argument
vector. The dispatcher finds the command, builds a fresh instance (injecting
shared resources), applies `-x` / `--name[=value]` options, picks the
operation whose signature accepts the remaining tokens and invokes it.

Layout:
  engine/   catalog, registries, option parser, overload resolver, dispatcher
  usage/    help renderer (reads the catalog only)

Example:
  let mut dispatcher = Dispatcher::new();
  dispatcher.register(
      CommandBuilder::<Add>::new("add")
          .describe("Add numbers together")
          .operation("pair", Add::pair)
          .sequence("all", Add::all),
  )?;
  dispatcher.handle(std::env::args().skip(1))?;
*/

pub mod engine;
pub mod usage;

pub use engine::builder::{CommandBuilder, Constructor, Operation};
pub use engine::catalog::{Catalog, CommandDescriptor, OperationDescriptor, OptionDescriptor};
pub use engine::convert::ConverterRegistry;
pub use engine::dispatcher::{DispatchConfig, Dispatched, Dispatcher};
pub use engine::error::DispatchError;
pub use engine::resource::ResourceRegistry;
pub use engine::types::{OptionKind, ParamInfo, TypeKey, Value};
pub use usage::{UsageOptions, render_json, render_usage};
