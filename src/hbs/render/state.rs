//! Render state and path resolution

use crate::hbs::ast::{Node, PathExpr, Program};
use crate::hbs::error::RenderError;
use crate::hbs::options::RenderOptions;
use crate::hbs::registry::Registries;
use hbs_dom::dom::{Object, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Members refused unless `allow_proto_methods_by_default` is set, when they hold functions
const PROTO_METHODS: [&str; 5] = [
    "constructor",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

static UNDEFINED: Value = Value::Undefined;

/// A child data frame: a shallow copy of `parent` with `_parent` pointing back to it
pub fn create_frame(parent: &Object) -> Object {
    let frame = parent.clone_shallow();
    frame.set("_parent", parent.clone());
    frame
}

#[derive(Clone)]
pub struct RenderState {
    pub(crate) env: Arc<Registries>,
    pub(crate) options: Arc<RenderOptions>,
    contexts: Vec<Value>,
    data: Object,
    block_params: Vec<Vec<(String, Value)>>,
    pub(crate) partial_blocks: Vec<Program>,
    pub(crate) inlines: Arc<HashMap<String, Program>>,
    depth: usize,
}

impl RenderState {
    pub fn new(env: Arc<Registries>, options: Arc<RenderOptions>, root: Value) -> Self {
        let data = match &options.data {
            Some(custom) => custom.clone_shallow(),
            None => Object::new(),
        };
        data.set("root", root.clone());
        RenderState {
            env,
            options,
            contexts: vec![root],
            data,
            block_params: Vec::new(),
            partial_blocks: Vec::new(),
            inlines: Arc::new(HashMap::new()),
            depth: 0,
        }
    }

    /// The current `this`
    pub fn context(&self) -> &Value {
        self.contexts.last().unwrap_or(&UNDEFINED)
    }

    /// The current data frame
    pub fn data(&self) -> &Object {
        &self.data
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub(crate) fn env(&self) -> &Registries {
        &self.env
    }

    /// Render `program` in a nested scope
    ///
    /// `context` is pushed unless it is the current context, `data` replaces the data frame and
    /// `params` binds block parameters. Everything is restored before returning.
    pub fn render_with(
        &mut self,
        program: &Program,
        context: Option<Value>,
        data: Option<Object>,
        params: Vec<(String, Value)>,
    ) -> Result<String, RenderError> {
        if self.depth >= self.options.max_depth {
            return Err(RenderError::RecursionLimit {
                limit: self.options.max_depth,
            });
        }
        let saved_contexts = self.contexts.len();
        let saved_params = self.block_params.len();
        let saved_data = self.data.clone();

        if let Some(context) = context {
            if !context.same_as(self.context()) {
                self.contexts.push(context);
            }
        }
        if let Some(data) = data {
            self.data = data;
        }
        if !params.is_empty() {
            self.block_params.push(params);
        }
        self.depth += 1;

        let mut out = String::new();
        let result = self.render_program(program, &mut out);

        self.depth -= 1;
        self.block_params.truncate(saved_params);
        self.contexts.truncate(saved_contexts);
        self.data = saved_data;
        result.map(|()| out)
    }

    /// Run `f` with the block parameters hidden, as partials do not see their caller's
    pub(crate) fn without_block_params<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.block_params);
        let result = f(self);
        self.block_params = saved;
        result
    }

    /// Make the inline partials declared in `program` visible, returning the previous set
    pub(crate) fn declare_inlines(
        &mut self,
        program: &Program,
    ) -> Option<Arc<HashMap<String, Program>>> {
        let mut declared = program
            .iter()
            .filter_map(|node| match node {
                Node::Inline { name, program } => Some((name, program)),
                _ => None,
            })
            .peekable();
        declared.peek()?;
        let saved = self.inlines.clone();
        let inlines = Arc::make_mut(&mut self.inlines);
        for (name, program) in declared {
            inlines.insert(name.clone(), program.clone());
        }
        Some(saved)
    }

    pub(crate) fn block_param(&self, name: &str) -> Option<Value> {
        self.block_params
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.clone())
    }

    /// Resolve a path against block parameters, the context stack or the data frames
    ///
    /// Misses resolve to `Undefined`.
    pub fn resolve_path(&self, path: &PathExpr) -> Value {
        let (base, parts) = self.path_base(path);
        self.walk(base, parts)
    }

    // The value a path starts from and the segments left to walk
    fn path_base<'p>(&self, path: &'p PathExpr) -> (Value, &'p [String]) {
        if path.data {
            let mut frame = Value::from(self.data.clone());
            for _ in 0..path.depth {
                frame = frame.get("_parent");
            }
            return (frame, path.parts.as_slice());
        }
        if !path.scoped {
            if let Some(value) = path.parts.first().and_then(|first| self.block_param(first)) {
                return (value, &path.parts[1..]);
            }
        }
        match self.contexts.len().checked_sub(1 + path.depth) {
            Some(index) => (self.contexts[index].clone(), path.parts.as_slice()),
            None => (Value::Undefined, path.parts.as_slice()),
        }
    }

    /// Fail on a segment read from a parent that does not hold it
    ///
    /// Leading segments must name existing members. The final segment only needs a parent
    /// that is neither null nor undefined.
    pub(crate) fn assume_objects(&self, path: &PathExpr) -> Result<(), RenderError> {
        let (mut parent, parts) = self.path_base(path);
        let Some((last, leading)) = parts.split_last() else {
            return Ok(());
        };
        for part in leading {
            let value = self.lookup_property(&parent, part);
            if value.is_undefined() {
                return Err(RenderError::MissingField {
                    path: part.clone(),
                    context: parent.to_string(),
                });
            }
            parent = value;
        }
        if parent.is_null() || parent.is_undefined() {
            return Err(RenderError::MissingField {
                path: last.clone(),
                context: parent.to_string(),
            });
        }
        Ok(())
    }

    fn walk(&self, mut value: Value, parts: &[String]) -> Value {
        for part in parts {
            if value.is_undefined() {
                break;
            }
            value = self.lookup_property(&value, part);
        }
        value
    }

    /// Member access with the prototype guard applied
    pub fn lookup_property(&self, parent: &Value, name: &str) -> Value {
        if name == "__proto__" && !self.options.allow_proto_properties_by_default {
            log::debug!(target: "hbs", "refused access to property \"{}\"", name);
            return Value::Undefined;
        }
        let value = parent.get(name);
        if value.is_function()
            && PROTO_METHODS.contains(&name)
            && !self.options.allow_proto_methods_by_default
        {
            log::debug!(target: "hbs", "refused access to method \"{}\"", name);
            return Value::Undefined;
        }
        value
    }

    pub(crate) fn missing_field(&self, path: &str) -> RenderError {
        RenderError::MissingField {
            path: path.to_string(),
            context: self.context().to_string(),
        }
    }
}
