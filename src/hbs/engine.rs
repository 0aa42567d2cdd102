//! The public entry point: compiled templates and the engine that renders them

use crate::hbs::ast::Program;
use crate::hbs::error::{ParseResult, RenderError};
use crate::hbs::helpers::{self, builtin};
use crate::hbs::logger::Logger;
use crate::hbs::options::RenderOptions;
use crate::hbs::parsing;
use crate::hbs::registry::{HelperDef, HelperRegistry, Registries};
use crate::hbs::render::{self, HelperOptions, RenderState};
use hbs_dom::dom::{Array, Function, Object, Value};
use std::sync::Arc;

/// A parsed template, reusable across renders
#[derive(Debug, Clone)]
pub struct Template {
    program: Program,
    source: Arc<str>,
}

impl Template {
    pub fn compile(source: impl Into<Arc<str>>) -> ParseResult<Template> {
        Template::compile_with(source, false)
    }

    /// Compile, keeping the lines of standalone tags when `ignore_standalone` is set
    pub fn compile_with(
        source: impl Into<Arc<str>>,
        ignore_standalone: bool,
    ) -> ParseResult<Template> {
        let source = source.into();
        let program = parsing::parse_with(&source, ignore_standalone)?;
        Ok(Template { program, source })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A template engine with its helpers, partials and logger
///
/// Registration is a setup step. Cloning an engine is cheap and the clones share registries
/// until one of them registers something, so a configured engine can be handed to several
/// threads that render concurrently.
#[derive(Debug, Clone)]
pub struct Handlebars {
    env: Arc<Registries>,
}

impl Default for Handlebars {
    fn default() -> Self {
        Handlebars::new()
    }
}

impl Handlebars {
    /// An engine with the core helpers (`if`, `each`, `with`, ...) registered
    pub fn new() -> Self {
        let mut hbs = Handlebars::empty();
        helpers::register_builtins(hbs.helpers_mut());
        hbs
    }

    /// An engine without any helper
    pub fn empty() -> Self {
        Handlebars {
            env: Arc::new(Registries::default()),
        }
    }

    fn registries_mut(&mut self) -> &mut Registries {
        Arc::make_mut(&mut self.env)
    }

    /// The helper table, for installing whole helper libraries
    pub fn helpers_mut(&mut self) -> &mut HelperRegistry {
        &mut self.registries_mut().helpers
    }

    pub fn compile(&self, source: &str) -> ParseResult<Template> {
        Template::compile(source)
    }

    /// Compile and render `source` with default options
    pub fn render(&self, source: &str, context: &Value) -> Result<String, RenderError> {
        self.render_with(source, context, &RenderOptions::default())
    }

    pub fn render_with(
        &self,
        source: &str,
        context: &Value,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        let template = Template::compile_with(source, options.ignore_standalone)?;
        self.render_template(&template, context, options)
    }

    pub fn render_template(
        &self,
        template: &Template,
        context: &Value,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        let mut state = RenderState::new(
            self.env.clone(),
            Arc::new(options.clone()),
            context.clone(),
        );
        state.render_with(template.program(), None, None, Vec::new())
    }

    /// Register a helper receiving evaluated arguments and the invocation options
    pub fn register_helper<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&[Value], &mut HelperOptions<'_>) -> Result<Value, RenderError>
            + Send
            + Sync
            + 'static,
    {
        self.helpers_mut().register_fn(name, helper);
    }

    /// Register a [`HelperDef`] implementation
    pub fn register_helper_def(&mut self, name: &str, helper: Arc<dyn HelperDef>) {
        self.helpers_mut().register(name, helper);
    }

    /// Register a helper that only depends on its positional arguments
    pub fn register_simple_helper<F>(&mut self, name: &str, helper: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.helpers_mut()
            .register_fn(name, move |args, _| Ok(helper(args)));
    }

    /// Register a value-model function as a helper
    ///
    /// The function receives the positional arguments followed by the options object, whose
    /// members are `name`, `hash`, `data`, `fn`, `inverse`, `blockParams` and `log`.
    pub fn register_function_helper(&mut self, name: &str, function: Function) {
        self.helpers_mut().register_fn(name, move |args, options| {
            let mut all = args.to_vec();
            all.push(Value::from(options.to_object()));
            Ok(function.call(&Array::from_values(all))?)
        });
    }

    /// Remove a helper
    ///
    /// `helperMissing` and `blockHelperMissing` fall back to their built-in behavior rather
    /// than disappearing.
    pub fn unregister_helper(&mut self, name: &str) {
        let helpers = self.helpers_mut();
        helpers.unregister(name);
        match name {
            "helperMissing" => helpers.register_fn(name, builtin::helper_missing),
            "blockHelperMissing" => helpers.register_fn(name, builtin::block_helper_missing),
            _ => {}
        }
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.env.helpers.has(name)
    }

    /// Registered helper names, sorted
    pub fn helper_names(&self) -> Vec<&str> {
        self.env.helpers.names()
    }

    pub fn register_partial(&mut self, name: &str, source: &str) {
        self.registries_mut().partials.register(name, source);
    }

    pub fn unregister_partial(&mut self, name: &str) {
        self.registries_mut().partials.unregister(name);
    }

    pub fn has_partial(&self, name: &str) -> bool {
        self.env.partials.has(name)
    }

    /// Route `{{log}}` output to `callback` instead of the `log` facade
    pub fn register_logger<F>(&mut self, callback: F)
    where
        F: Fn(&Value, &Array) + Send + Sync + 'static,
    {
        self.registries_mut().logger.set(callback);
    }

    pub fn logger(&self) -> &Logger {
        &self.env.logger
    }

    /// A child data frame for helpers that render with extra `@` variables
    pub fn create_frame(&self, parent: &Object) -> Object {
        render::create_frame(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbs_dom::dom::DomString;
    use serde_json::json;
    use std::sync::Mutex;

    fn ctx(value: serde_json::Value) -> Value {
        Value::from(value)
    }

    #[test]
    fn test_template_is_reusable() {
        let hbs = Handlebars::new();
        let template = hbs.compile("Hello {{name}}!").unwrap();
        assert_eq!(template.source(), "Hello {{name}}!");
        let options = RenderOptions::default();
        for name in ["ada", "bob"] {
            let out = hbs
                .render_template(&template, &ctx(json!({ "name": name })), &options)
                .unwrap();
            assert_eq!(out, format!("Hello {}!", name));
        }
    }

    #[test]
    fn test_new_registers_core_helpers() {
        let hbs = Handlebars::new();
        for name in ["if", "unless", "with", "each", "lookup", "log", "helperMissing"] {
            assert!(hbs.has_helper(name), "{} missing", name);
        }
        assert!(!hbs.has_helper("upper"));
        assert!(Handlebars::empty().helper_names().is_empty());
    }

    #[test]
    fn test_simple_helper() {
        let mut hbs = Handlebars::new();
        hbs.register_simple_helper("shout", |args| {
            Value::from(format!("{}!", args[0].to_output_string().to_uppercase()))
        });
        let out = hbs.render("{{shout word}}", &ctx(json!({ "word": "hey" })));
        assert_eq!(out.unwrap(), "HEY!");
    }

    #[test]
    fn test_function_helper_receives_options_object() {
        let mut hbs = Handlebars::new();
        let function = Function::new(|args: &Array| {
            let options = args.last();
            let name = options.get("name").to_output_string();
            let sep = options.get("hash").get("sep").to_output_string();
            Ok(Value::from(format!("{}{}{}", name, sep, args.get(0))))
        });
        hbs.register_function_helper("tag", function);
        let out = hbs.render("{{tag 7 sep=\":\"}}", &Value::Null).unwrap();
        assert_eq!(out, "tag:7");
    }

    #[test]
    fn test_unregister_restores_missing_handlers() {
        let mut hbs = Handlebars::new();
        hbs.register_simple_helper("helperMissing", |_| Value::from("?"));
        assert_eq!(hbs.render("{{nope 1}}", &Value::Null).unwrap(), "?");

        hbs.unregister_helper("helperMissing");
        assert!(hbs.has_helper("helperMissing"));
        let err = hbs.render("{{nope 1}}", &Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "Missing helper: \"nope\"");

        hbs.unregister_helper("each");
        assert!(!hbs.has_helper("each"));
    }

    #[test]
    fn test_clones_share_until_registration() {
        let mut base = Handlebars::new();
        base.register_partial("p", "base");
        let mut fork = base.clone();
        fork.register_partial("p", "fork");
        assert_eq!(base.render("{{> p}}", &Value::Null).unwrap(), "base");
        assert_eq!(fork.render("{{> p}}", &Value::Null).unwrap(), "fork");
        fork.unregister_partial("p");
        assert!(!fork.has_partial("p"));
        assert!(base.has_partial("p"));
    }

    #[test]
    fn test_register_logger() {
        let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut hbs = Handlebars::new();
        hbs.register_logger(move |level, args| {
            let level = crate::hbs::logger::lookup_level(level);
            let text: Vec<String> = args.iter().map(|arg| arg.to_output_string()).collect();
            sink.lock().unwrap().push((level, text.join(" ")));
        });
        assert!(hbs.logger().is_set());
        let out = hbs
            .render("{{log \"a\" n level=\"warn\"}}done", &ctx(json!({ "n": 3 })))
            .unwrap();
        assert_eq!(out, "done");
        assert_eq!(*seen.lock().unwrap(), vec![(2, "a 3".to_string())]);
    }

    #[test]
    fn test_create_frame_links_parent() {
        let hbs = Handlebars::new();
        let parent = Object::from([("x", 1)]);
        let frame = hbs.create_frame(&parent);
        assert_eq!(frame.get("x"), Value::from(1));
        assert!(frame.get("_parent").as_object().is_some());
        assert!(frame.keys().contains(&DomString::from("_parent")));
    }
}
