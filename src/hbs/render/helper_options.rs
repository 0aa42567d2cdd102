//! The view of a render that helpers receive

use super::state::{create_frame, RenderState};
use crate::hbs::ast::{Block, Program};
use crate::hbs::error::RenderError;
use crate::hbs::options::RenderOptions;
use hbs_dom::dom::{self, Array, Function, Object, Value};

/// Invocation details and render callbacks for a helper call
///
/// For block helpers `render_fn` renders the block body and `render_inverse` the `{{else}}`
/// section. Both return the rendered text, which the helper usually returns as its result.
pub struct HelperOptions<'a> {
    name: String,
    hash: Object,
    state: &'a mut RenderState,
    program: Option<Program>,
    inverse: Option<Program>,
    block_params: Vec<String>,
}

impl<'a> HelperOptions<'a> {
    pub(crate) fn new(
        name: &str,
        hash: Object,
        state: &'a mut RenderState,
        block: Option<&Block>,
    ) -> Self {
        HelperOptions {
            name: name.to_string(),
            hash,
            state,
            program: block.map(|block| block.program.clone()),
            inverse: block.and_then(|block| block.inverse.clone()),
            block_params: block
                .map(|block| block.block_params.clone())
                .unwrap_or_default(),
        }
    }

    /// The name the helper was invoked under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> &Object {
        &self.hash
    }

    /// A hash argument, `Undefined` when absent
    pub fn hash_get(&self, key: &str) -> Value {
        self.hash.get(key)
    }

    /// The current `this`
    pub fn context(&self) -> Value {
        self.state.context().clone()
    }

    pub fn data(&self) -> &Object {
        self.state.data()
    }

    /// True when invoked as `{{#name}}...{{/name}}`
    pub fn is_block(&self) -> bool {
        self.program.is_some()
    }

    /// Number of names declared with `as |...|`
    pub fn block_param_count(&self) -> usize {
        self.block_params.len()
    }

    pub fn render_options(&self) -> &RenderOptions {
        self.state.options()
    }

    pub fn render_fn(&mut self, context: &Value) -> Result<String, RenderError> {
        self.render_fn_with(context, None, &[])
    }

    /// Render the block body with a new context, optional data frame and block parameter
    /// values, bound to the declared names in order
    pub fn render_fn_with(
        &mut self,
        context: &Value,
        data: Option<Object>,
        block_params: &[Value],
    ) -> Result<String, RenderError> {
        let Some(program) = &self.program else {
            return Ok(String::new());
        };
        let params = self
            .block_params
            .iter()
            .cloned()
            .zip(block_params.iter().cloned())
            .collect();
        self.state
            .render_with(program, Some(context.clone()), data, params)
    }

    pub fn render_inverse(&mut self, context: &Value) -> Result<String, RenderError> {
        self.render_inverse_with(context, None)
    }

    pub fn render_inverse_with(
        &mut self,
        context: &Value,
        data: Option<Object>,
    ) -> Result<String, RenderError> {
        let Some(inverse) = &self.inverse else {
            return Ok(String::new());
        };
        self.state
            .render_with(inverse, Some(context.clone()), data, Vec::new())
    }

    /// A child of the current data frame
    pub fn create_frame(&self) -> Object {
        create_frame(self.state.data())
    }

    /// Send a message to the registered logger
    pub fn log(&self, level: &Value, args: &Array) {
        self.state.env().logger.log(level, args);
    }

    /// Member access honoring the prototype access options
    pub fn lookup_property(&self, parent: &Value, name: &str) -> Value {
        self.state.lookup_property(parent, name)
    }

    /// The options as a dom object, for helpers registered as [`Function`] values
    ///
    /// Members: `name`, `hash`, `data`, `context`, `blockParams`, and the callables `fn`,
    /// `inverse`, `log` and `lookupProperty`. `fn` and `inverse` take an optional context and
    /// an optional `{ data, blockParams }` object.
    pub fn to_object(&self) -> Object {
        let object = Object::new();
        object.set("name", self.name.as_str());
        object.set("hash", self.hash.clone());
        object.set("data", self.state.data().clone());
        object.set("context", self.context());
        object.set("blockParams", self.block_params.len());
        object.set(
            "fn",
            detached_callback(
                self.state.clone(),
                self.program.clone(),
                self.block_params.clone(),
            ),
        );
        object.set(
            "inverse",
            detached_callback(self.state.clone(), self.inverse.clone(), Vec::new()),
        );

        let state = self.state.clone();
        object.set(
            "log",
            Function::new(move |args| {
                let rest: Array = args.iter().skip(1).collect();
                state.env().logger.log(&args.get(0), &rest);
                Ok(Value::Undefined)
            }),
        );
        let state = self.state.clone();
        object.set(
            "lookupProperty",
            Function::new(move |args| {
                let name = args.get(1).to_output_string();
                Ok(state.lookup_property(&args.get(0), &name))
            }),
        );
        object
    }
}

/// A render callback that owns a snapshot of the render state
fn detached_callback(state: RenderState, program: Option<Program>, names: Vec<String>) -> Function {
    Function::new(move |args| {
        let Some(program) = &program else {
            return Ok(Value::from(""));
        };
        let mut state = state.clone();
        let context = match args.get(0) {
            Value::Undefined => state.context().clone(),
            context => context,
        };
        let extra = args.get(1);
        let data = extra.get("data").as_object().cloned();
        let params = match extra.get("blockParams") {
            Value::Array(values) => names.iter().cloned().zip(values.iter()).collect(),
            _ => Vec::new(),
        };
        state
            .render_with(program, Some(context), data, params)
            .map(Value::from)
            .map_err(|err| dom::Error::message(err.to_string()))
    })
}
