//! Construction pipeline: before hooks, instantiation, after hooks.

use tracing::{debug, trace};

use crate::autowire::{match_arguments, TypeResolver};
use crate::definition::{HookSpec, HookTarget, ServiceDefinition, Target};
use crate::error::{BoxError, DiError, DiResult};
use crate::instance::{Callable, Instance};
use crate::provider::ResolverContext;
use crate::registration::{Construction, TypeRegistry};
use crate::traits::ResolverCore;
use crate::value::Value;

/// Maps an error raised by user code into the pipeline's error space.
///
/// Container errors that travelled through a constructor (a nested lookup
/// failing, a cycle) keep their identity; anything else becomes
/// `Construction` with the original message.
pub(crate) fn user_error(err: BoxError) -> DiError {
    match err.downcast::<DiError>() {
        Ok(di) => *di,
        Err(other) => DiError::Construction(other.to_string()),
    }
}

/// Builds objects from normalized definitions.
///
/// Borrowed per construction from the container, which supplies the type
/// registry, the autowiring lookups and the context handed to user code.
pub(crate) struct Factory<'a> {
    types: &'a TypeRegistry,
    wiring: &'a dyn TypeResolver,
    ctx: ResolverContext<'a>,
}

impl<'a> Factory<'a> {
    pub(crate) fn new(types: &'a TypeRegistry, wiring: &'a dyn TypeResolver, resolver: &'a dyn ResolverCore) -> Self {
        Self { types, wiring, ctx: ResolverContext::new(resolver) }
    }

    /// Runs the full pipeline for `def`, then the `common` hooks.
    pub(crate) fn fabricate(&self, def: &ServiceDefinition, common: &[HookSpec]) -> DiResult<Instance> {
        for hook in &def.before {
            self.run_before(hook)?;
        }

        let object = match &def.target {
            Target::ByType(name) => self.construct(name, def.args.clone())?,
            Target::ByFactory(callable) => {
                let produced = self.execute(callable, def.args.clone())?;
                match produced {
                    Value::Object(obj) => obj,
                    other => {
                        return Err(DiError::Construction(format!(
                            "factory {} returned {}, not an object",
                            callable.name(),
                            other.kind()
                        )))
                    }
                }
            }
            Target::ByValue(obj) => obj.clone(),
        };

        for hook in &def.after {
            self.run_after(&object, hook, true)?;
        }
        for hook in common {
            self.run_after(&object, hook, false)?;
        }
        Ok(object)
    }

    /// Instantiates a registered type with autowired constructor arguments.
    pub(crate) fn construct(&self, type_name: &str, args: Vec<Value>) -> DiResult<Instance> {
        let descriptor = self
            .types
            .descriptor(type_name)
            .ok_or_else(|| DiError::Construction(format!("Class {type_name} does not exist")))?;

        match &descriptor.construction {
            Construction::Abstract => Err(DiError::Construction(format!(
                "Cannot instantiate {}",
                descriptor.name()
            ))),
            Construction::Default(make) => {
                trace!(type_name = descriptor.name(), "instantiating without constructor");
                Ok(make())
            }
            Construction::Constructor { params, ctor } => {
                let matched = match_arguments(params, args, self.wiring)?;
                debug!(type_name = descriptor.name(), args = matched.len(), "invoking constructor");
                ctor(&self.ctx, matched).map_err(user_error)
            }
        }
    }

    /// Autowires `args` against the callable's parameters and invokes it.
    pub(crate) fn execute(&self, callable: &Callable, args: Vec<Value>) -> DiResult<Value> {
        let matched = match_arguments(callable.params(), args, self.wiring)?;
        trace!(callable = callable.name(), args = matched.len(), "invoking callable");
        callable.invoke(&self.ctx, matched).map_err(user_error)
    }

    fn run_before(&self, hook: &HookSpec) -> DiResult<()> {
        match &hook.target {
            HookTarget::Method(name) => Err(DiError::Definition(format!(
                "before hook {name} names a method, but no object exists yet"
            ))),
            HookTarget::Callable(callable) => {
                self.execute(callable, hook.args.clone().unwrap_or_default())?;
                Ok(())
            }
        }
    }

    /// Runs one after hook against `object`. When `strict` is off, method
    /// hooks the object's type does not define are skipped.
    fn run_after(&self, object: &Instance, hook: &HookSpec, strict: bool) -> DiResult<()> {
        let args = hook
            .args
            .clone()
            .unwrap_or_else(|| vec![Value::Object(object.clone())]);

        match &hook.target {
            HookTarget::Callable(callable) => {
                self.execute(callable, args)?;
            }
            HookTarget::Method(name) => {
                let method = self
                    .types
                    .descriptor_of(object)
                    .and_then(|d| d.methods.get(name.as_str()));
                let Some(method) = method else {
                    if strict {
                        return Err(DiError::Definition(format!(
                            "Bad method definition: {} has no method {name}",
                            self.types.type_name_of(object)
                        )));
                    }
                    return Ok(());
                };
                let matched = match_arguments(&method.params, args, self.wiring)?;
                trace!(method = name.as_str(), "invoking after hook");
                (method.func)(&self.ctx, object, matched).map_err(user_error)?;
            }
        }
        Ok(())
    }
}
