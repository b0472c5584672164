//! Registry resolving behavior references to fresh behavior instances.

use crate::error::GraphError;
use super::{
  Capability, ExtensionFilter, FileSystemLoader, LoaderBehavior, NodeBehavior, PassthroughImporter,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

type LoaderFactory = Arc<dyn Fn() -> Box<dyn LoaderBehavior> + Send + Sync>;
type BehaviorFactory = Arc<dyn Fn() -> Box<dyn NodeBehavior> + Send + Sync>;

#[derive(Clone)]
enum Factory {
  Loader(LoaderFactory),
  Filter(BehaviorFactory),
  Importer(BehaviorFactory),
}

impl Factory {
  fn capability(&self) -> Capability {
    match self {
      Factory::Loader(_) => Capability::Loader,
      Factory::Filter(_) => Capability::Filter,
      Factory::Importer(_) => Capability::Importer,
    }
  }
}

/// Maps behavior references (the `className` of a node) to factories.
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
  factories: BTreeMap<String, Factory>,
}

impl BehaviorRegistry {
  /// An empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry holding the built-in behaviors.
  pub fn with_builtins() -> Self {
    let mut registry = Self::new();
    registry.register_loader(FileSystemLoader::NAME, FileSystemLoader::default);
    registry.register_filter(ExtensionFilter::NAME, || ExtensionFilter);
    registry.register_importer(PassthroughImporter::NAME, || PassthroughImporter);
    registry
  }

  /// Registers a loader. Replaces any behavior already registered under `name`.
  pub fn register_loader<B, F>(&mut self, name: impl Into<String>, factory: F)
  where
    B: LoaderBehavior + 'static,
    F: Fn() -> B + Send + Sync + 'static,
  {
    let factory: LoaderFactory = Arc::new(move || Box::new(factory()) as Box<dyn LoaderBehavior>);
    self.factories.insert(name.into(), Factory::Loader(factory));
  }

  /// Registers a filter. Replaces any behavior already registered under `name`.
  pub fn register_filter<B, F>(&mut self, name: impl Into<String>, factory: F)
  where
    B: NodeBehavior + 'static,
    F: Fn() -> B + Send + Sync + 'static,
  {
    let factory: BehaviorFactory = Arc::new(move || Box::new(factory()) as Box<dyn NodeBehavior>);
    self.factories.insert(name.into(), Factory::Filter(factory));
  }

  /// Registers an importer. Replaces any behavior already registered under `name`.
  pub fn register_importer<B, F>(&mut self, name: impl Into<String>, factory: F)
  where
    B: NodeBehavior + 'static,
    F: Fn() -> B + Send + Sync + 'static,
  {
    let factory: BehaviorFactory = Arc::new(move || Box::new(factory()) as Box<dyn NodeBehavior>);
    self.factories.insert(name.into(), Factory::Importer(factory));
  }

  /// Registered references, sorted.
  pub fn behavior_refs(&self) -> Vec<&str> {
    self.factories.keys().map(String::as_str).collect()
  }

  pub fn capability_of(&self, behavior_ref: &str) -> Option<Capability> {
    self.factories.get(behavior_ref).map(Factory::capability)
  }

  fn lookup(&self, behavior_ref: &str) -> Result<&Factory, GraphError> {
    let factory = self
      .factories
      .get(behavior_ref)
      .ok_or_else(|| GraphError::UnknownBehavior {
        behavior_ref: behavior_ref.to_string(),
      })?;
    debug!(behavior_ref, capability = %factory.capability(), "instantiating behavior");
    Ok(factory)
  }

  /// Creates the loader registered as `behavior_ref`.
  pub fn loader(&self, behavior_ref: &str) -> Result<Box<dyn LoaderBehavior>, GraphError> {
    match self.lookup(behavior_ref)? {
      Factory::Loader(f) => Ok(f()),
      other => Err(wrong_capability(behavior_ref, Capability::Loader, other)),
    }
  }

  /// Creates the filter registered as `behavior_ref`.
  pub fn filter(&self, behavior_ref: &str) -> Result<Box<dyn NodeBehavior>, GraphError> {
    match self.lookup(behavior_ref)? {
      Factory::Filter(f) => Ok(f()),
      other => Err(wrong_capability(behavior_ref, Capability::Filter, other)),
    }
  }

  /// Creates the importer registered as `behavior_ref`.
  pub fn importer(&self, behavior_ref: &str) -> Result<Box<dyn NodeBehavior>, GraphError> {
    match self.lookup(behavior_ref)? {
      Factory::Importer(f) => Ok(f()),
      other => Err(wrong_capability(behavior_ref, Capability::Importer, other)),
    }
  }
}

fn wrong_capability(behavior_ref: &str, expected: Capability, found: &Factory) -> GraphError {
  GraphError::WrongCapability {
    behavior_ref: behavior_ref.to_string(),
    expected,
    found: found.capability(),
  }
}
