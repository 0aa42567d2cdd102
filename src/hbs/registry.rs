//! Helper and partial registries
//!
//! Both registries are plain name-keyed tables filled before rendering. Registration replaces
//! any previous entry of the same name. The engine keeps them behind an `Arc` so that renders
//! share one read-only copy; mutation through the engine clones on write.

use crate::hbs::engine::Template;
use crate::hbs::error::{ParseError, RenderError};
use crate::hbs::logger::Logger;
use crate::hbs::render::HelperOptions;
use hbs_dom::dom::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A native helper
///
/// `args` holds the evaluated positional parameters. Hash arguments, render callbacks and the
/// current data frame are reached through `options`.
pub trait HelperDef: Send + Sync {
    fn call(&self, args: &[Value], options: &mut HelperOptions<'_>) -> Result<Value, RenderError>;
}

impl<F> HelperDef for F
where
    F: Fn(&[Value], &mut HelperOptions<'_>) -> Result<Value, RenderError> + Send + Sync,
{
    fn call(&self, args: &[Value], options: &mut HelperOptions<'_>) -> Result<Value, RenderError> {
        self(args, options)
    }
}

/// Registry of helpers by name
#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, Arc<dyn HelperDef>>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a helper, replacing any helper of the same name
    pub fn register(&mut self, name: impl Into<String>, helper: Arc<dyn HelperDef>) {
        self.helpers.insert(name.into(), helper);
    }

    /// Register a closure as a helper
    pub fn register_fn<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&[Value], &mut HelperOptions<'_>) -> Result<Value, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, Arc::new(helper));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn HelperDef>> {
        self.helpers.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Returns true if a helper was removed
    pub fn unregister(&mut self, name: &str) -> bool {
        self.helpers.remove(name).is_some()
    }

    /// Registered helper names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("helpers", &self.names())
            .finish()
    }
}

/// Registry of partial sources
///
/// Partials are compiled the first time they are rendered and the result is cached until the
/// partial is registered again.
#[derive(Default)]
pub struct PartialRegistry {
    sources: HashMap<String, Arc<str>>,
    compiled: RwLock<HashMap<(String, bool), Arc<Template>>>,
}

impl PartialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, source: impl Into<Arc<str>>) {
        let name = name.into();
        self.forget(&name);
        self.sources.insert(name, source.into());
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.forget(name);
        self.sources.remove(name).is_some()
    }

    pub fn has(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn source(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(|source| &**source)
    }

    /// The compiled partial, or `None` if no partial has this name
    pub fn get(&self, name: &str) -> Option<Result<Arc<Template>, ParseError>> {
        self.get_with(name, false)
    }

    /// The partial compiled with or without standalone line handling
    ///
    /// Both forms are cached separately.
    pub fn get_with(
        &self,
        name: &str,
        ignore_standalone: bool,
    ) -> Option<Result<Arc<Template>, ParseError>> {
        let source = self.sources.get(name)?;
        let key = (name.to_string(), ignore_standalone);
        if let Some(template) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Some(Ok(template.clone()));
        }
        let template = match Template::compile_with(source.clone(), ignore_standalone) {
            Ok(template) => Arc::new(template),
            Err(err) => return Some(Err(err)),
        };
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| template.clone());
        Some(Ok(template))
    }

    /// Registered partial names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_compiled(&self, name: &str) -> bool {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .any(|(compiled, _)| compiled == name)
    }

    fn forget(&mut self, name: &str) {
        self.compiled
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(compiled, _), _| compiled != name);
    }
}

impl Clone for PartialRegistry {
    fn clone(&self) -> Self {
        let compiled = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        PartialRegistry {
            sources: self.sources.clone(),
            compiled: RwLock::new(compiled),
        }
    }
}

impl fmt::Debug for PartialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialRegistry")
            .field("partials", &self.names())
            .finish()
    }
}

/// Everything a render reads from the engine
#[derive(Clone, Debug, Default)]
pub struct Registries {
    pub helpers: HelperRegistry,
    pub partials: PartialRegistry,
    pub logger: Logger,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(registry: &mut HelperRegistry, name: &str, value: &'static str) {
        registry.register_fn(name, move |_, _| Ok(Value::from(value)));
    }

    #[test]
    fn test_register_and_get_helper() {
        let mut registry = HelperRegistry::new();
        assert!(registry.is_empty());
        constant(&mut registry, "shout", "HI");
        assert!(registry.has("shout"));
        assert!(registry.get("shout").is_some());
        assert!(registry.get("whisper").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = HelperRegistry::new();
        constant(&mut registry, "x", "a");
        constant(&mut registry, "x", "b");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = HelperRegistry::new();
        constant(&mut registry, "zeta", "");
        constant(&mut registry, "alpha", "");
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert!(registry.unregister("zeta"));
        assert!(!registry.unregister("zeta"));
        assert_eq!(registry.names(), vec!["alpha"]);
    }

    #[test]
    fn test_partials_compile_lazily() {
        let mut registry = PartialRegistry::new();
        registry.register("card", "<b>{{name}}</b>");
        assert!(registry.has("card"));
        assert!(!registry.is_compiled("card"));
        let first = registry.get("card").unwrap().unwrap();
        assert!(registry.is_compiled("card"));
        let second = registry.get("card").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_standalone_forms_are_cached_apart() {
        let mut registry = PartialRegistry::new();
        registry.register("row", "{{#if a}}\nx\n{{/if}}\n");
        let stripped = registry.get_with("row", false).unwrap().unwrap();
        let kept = registry.get_with("row", true).unwrap().unwrap();
        assert!(!Arc::ptr_eq(&stripped, &kept));
        assert!(Arc::ptr_eq(&kept, &registry.get_with("row", true).unwrap().unwrap()));
        registry.register("row", "y");
        assert!(!registry.is_compiled("row"));
    }

    #[test]
    fn test_reregistration_drops_cached_template() {
        let mut registry = PartialRegistry::new();
        registry.register("p", "one");
        registry.get("p").unwrap().unwrap();
        registry.register("p", "two");
        assert!(!registry.is_compiled("p"));
        assert_eq!(registry.source("p"), Some("two"));
    }

    #[test]
    fn test_partial_parse_errors_surface_on_use() {
        let mut registry = PartialRegistry::new();
        registry.register("broken", "{{#if x}}");
        assert!(registry.get("broken").unwrap().is_err());
        assert!(registry.get("missing").is_none());
    }
}
