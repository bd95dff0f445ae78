/*!
Dispatcher: the single entry point a host program calls.

Pipeline for `dispatch(args)`:
  args empty          -> Dispatched::Usage
  args[0]             -> catalog lookup (case policy from DispatchConfig)
  constructor         -> fresh instance, resources injected from the registry
  args[1..]           -> option parser (mutates instance, yields positionals)
  positionals         -> overload resolver -> invocation

`handle(args)` wraps `dispatch` with the reporting policy: usage goes to
stdout, engine failures are logged and printed as a one-line `error: ...` on
stderr (and swallowed), command-logic failures are returned to the caller.
*/

use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use super::builder::CommandBuilder;
use super::catalog::Catalog;
use super::convert::ConverterRegistry;
use super::error::DispatchError;
use super::options::apply_options;
use super::resolve::resolve_and_invoke;
use super::resource::ResourceRegistry;
use crate::usage::{UsageOptions, render_usage};

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Match command names ignoring ASCII case (default true).
    pub ignore_case: bool,
    /// Rendering options for the usage screen.
    pub usage: UsageOptions,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ignore_case: true,
            usage: UsageOptions::detect(),
        }
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// No arguments were given; the caller should show usage.
    Usage,
    /// `operation` of `command` ran to completion.
    Invoked { command: String, operation: String },
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    catalog: Catalog,
    converters: ConverterRegistry,
    resources: ResourceRegistry,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Dispatcher with default converters, no resources and the default config.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /* ---- Registration (&mut, before the first dispatch) ---- */

    /// Validate and add a command to the catalog.
    pub fn register<C: Any>(&mut self, builder: CommandBuilder<C>) -> Result<&mut Self, DispatchError> {
        let descriptor = builder.build()?;
        for resource in descriptor.resources() {
            if !self.resources.contains(resource) {
                tracing::debug!(
                    command = descriptor.name(),
                    resource = %resource,
                    "resource not registered yet"
                );
            }
        }
        self.catalog.insert(descriptor);
        Ok(self)
    }

    /// Add or replace the converter for `T`.
    pub fn register_converter<T, E, F>(&mut self, convert: F) -> &mut Self
    where
        T: Any,
        E: Display,
        F: Fn(&str) -> Result<T, E> + 'static,
    {
        self.converters.register(convert);
        self
    }

    /// Register the singleton for `R`; returns the shared handle.
    pub fn register_resource<R: Any + Send + Sync>(&mut self, resource: R) -> Arc<R> {
        self.resources.register(resource)
    }

    pub fn register_shared_resource<R: Any + Send + Sync>(&mut self, resource: Arc<R>) -> &mut Self {
        self.resources.register_shared(resource);
        self
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) -> &mut Self {
        self.config.ignore_case = ignore_case;
        self
    }

    pub fn set_usage_options(&mut self, usage: UsageOptions) -> &mut Self {
        self.config.usage = usage;
        self
    }

    /* ---- Accessors ---- */

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Rendered usage screen for the current catalog.
    pub fn usage(&self) -> String {
        render_usage(&self.catalog, &self.config.usage)
    }

    /* ---- Dispatch (&self) ---- */

    /// Run the dispatch pipeline and report what ran.
    pub fn dispatch<I, S>(&self, args: I) -> Result<Dispatched, DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let Some((name, rest)) = args.split_first() else {
            return Ok(Dispatched::Usage);
        };

        let command = self.catalog.find_command(name, self.config.ignore_case)?;
        tracing::debug!(command = command.name(), args = rest.len(), "dispatching");

        let mut instance = command.instantiate(&self.resources)?;
        let positionals = apply_options(command, instance.as_mut(), rest, &self.converters)?;
        let operation = resolve_and_invoke(command, instance.as_mut(), &positionals, &self.converters)?;

        Ok(Dispatched::Invoked {
            command: command.name().to_string(),
            operation: operation.name().to_string(),
        })
    }

    /// Dispatch with the reporting policy applied.
    ///
    /// Only errors raised by the invoked operation are returned; every engine
    /// failure is reported on stderr and yields `Ok(())`.
    pub fn handle<I, S>(&self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.dispatch(args) {
            Ok(Dispatched::Usage) => {
                println!("{}", self.usage());
                Ok(())
            }
            Ok(Dispatched::Invoked { .. }) => Ok(()),
            Err(DispatchError::Command(err)) => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "dispatch failed");
                eprintln!("error: {err}");
                Ok(())
            }
        }
    }
}

/* ---- Tests ---- */
