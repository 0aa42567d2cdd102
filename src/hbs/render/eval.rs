//! Node evaluation
//!
//! Dispatch order for the head of a mustache or block:
//!
//! 1. a block parameter of that name
//! 2. a registered helper, for single-segment names
//! 3. the path in the current context; function values are invoked
//! 4. `helperMissing`, or for argument-less blocks `blockHelperMissing`

use super::helper_options::HelperOptions;
use super::state::{create_frame, RenderState};
use crate::hbs::ast::{Block, Call, Expr, Node, Partial, PartialName, PathExpr, Program};
use crate::hbs::error::RenderError;
use crate::hbs::escape::escape_value_into;
use crate::hbs::helpers::builtin;
use crate::hbs::registry::HelperDef;
use hbs_dom::dom::{Array, Function, Object, Value};
use std::sync::Arc;

/// Outcome of resolving a call head
pub(crate) enum Dispatch {
    /// A helper or function ran; its result is final output
    Invoked(Value),
    /// A plain value to interpolate or to hand to `blockHelperMissing`
    Value(Value),
}

impl Dispatch {
    fn into_value(self) -> Value {
        match self {
            Dispatch::Invoked(value) | Dispatch::Value(value) => value,
        }
    }
}

impl RenderState {
    pub(crate) fn render_program(
        &mut self,
        program: &Program,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let saved = self.declare_inlines(program);
        let result = program
            .iter()
            .try_for_each(|node| self.render_node(node, out));
        if let Some(saved) = saved {
            self.inlines = saved;
        }
        result
    }

    fn render_node(&mut self, node: &Node, out: &mut String) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) | Node::Inline { .. } => {}
            Node::Mustache { call, escaped } => {
                let value = self.dispatch(call, None)?.into_value();
                let escape = *escaped && !self.options.no_escape && !value.is_safe_string();
                if escape {
                    escape_value_into(out, &value);
                } else {
                    out.push_str(&value.to_output_string());
                }
            }
            Node::Block(block) => self.render_block(block, out)?,
            Node::Partial(partial) => self.render_partial(partial, out)?,
        }
        Ok(())
    }

    fn render_block(&mut self, block: &Block, out: &mut String) -> Result<(), RenderError> {
        let result = match self.dispatch(&block.call, Some(block))? {
            Dispatch::Invoked(value) => value,
            Dispatch::Value(value) => {
                let name = block.call.name();
                let fallback = self.env.helpers.get("blockHelperMissing");
                let mut options = HelperOptions::new(&name, Object::new(), self, Some(block));
                match fallback {
                    Some(helper) => helper.call(&[value], &mut options)?,
                    None => builtin::block_helper_missing(&[value], &mut options)?,
                }
            }
        };
        out.push_str(&result.to_output_string());
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        call: &Call,
        block: Option<&Block>,
    ) -> Result<Dispatch, RenderError> {
        match &call.head {
            Expr::Path(path) => self.dispatch_path(path, call, block),
            Expr::Literal(Value::String(name)) => {
                let path = PathExpr {
                    data: false,
                    depth: 0,
                    scoped: false,
                    parts: vec![name.to_string()],
                    original: name.to_string(),
                };
                self.dispatch_path(&path, call, block)
            }
            Expr::Literal(value) if !call.has_arguments() => Ok(Dispatch::Value(value.clone())),
            Expr::Literal(_) => self.helper_missing(&call.name(), call, block),
            Expr::SubExpr(inner) => match self.eval_call(inner)? {
                Value::Function(function) => self.call_function(&function, &call.name(), call, block),
                value if !call.has_arguments() => Ok(Dispatch::Value(value)),
                _ => self.helper_missing(&call.name(), call, block),
            },
        }
    }

    fn dispatch_path(
        &mut self,
        path: &PathExpr,
        call: &Call,
        block: Option<&Block>,
    ) -> Result<Dispatch, RenderError> {
        let name = path.original.as_str();
        if path.is_simple() {
            let first = path.parts[0].as_str();
            if let Some(value) = self.block_param(first) {
                return match value {
                    Value::Function(function) => self.call_function(&function, name, call, block),
                    value => Ok(Dispatch::Value(value)),
                };
            }
            if let Some(helper) = self.env.helpers.get(first) {
                return self.call_helper(name, helper, call, block);
            }
        }

        if self.options.assume_objects && !path.data {
            self.assume_objects(path)?;
        }
        let value = self.resolve_path(path);
        if let Value::Function(function) = &value {
            return self.call_function(function, name, call, block);
        }
        if !value.is_undefined() && !call.has_arguments() {
            return Ok(Dispatch::Value(value));
        }
        if value.is_undefined() && self.options.strict && !path.data {
            return Err(self.missing_field(name));
        }
        if block.is_some() && !call.has_arguments() {
            return Ok(Dispatch::Value(value));
        }
        self.helper_missing(name, call, block)
    }

    fn helper_missing(
        &mut self,
        name: &str,
        call: &Call,
        block: Option<&Block>,
    ) -> Result<Dispatch, RenderError> {
        match self.env.helpers.get("helperMissing") {
            Some(helper) => self.call_helper(name, helper, call, block),
            None if !call.has_arguments() => Ok(Dispatch::Value(Value::Undefined)),
            None => Err(RenderError::helper(
                name,
                format!("Missing helper: \"{}\"", name),
            )),
        }
    }

    fn call_helper(
        &mut self,
        name: &str,
        helper: Arc<dyn HelperDef>,
        call: &Call,
        block: Option<&Block>,
    ) -> Result<Dispatch, RenderError> {
        let args = self.eval_params(&call.params)?;
        let hash = self.eval_hash(&call.hash)?;
        let mut options = HelperOptions::new(name, hash, self, block);
        helper.call(&args, &mut options).map(Dispatch::Invoked)
    }

    /// Invoke a function value with the parameters followed by the options object
    fn call_function(
        &mut self,
        function: &Function,
        name: &str,
        call: &Call,
        block: Option<&Block>,
    ) -> Result<Dispatch, RenderError> {
        let mut args = self.eval_params(&call.params)?;
        let hash = self.eval_hash(&call.hash)?;
        let options = HelperOptions::new(name, hash, self, block).to_object();
        args.push(Value::from(options));
        let result = function.call(&Array::from_values(args))?;
        Ok(Dispatch::Invoked(result))
    }

    fn eval_params(&mut self, params: &[Expr]) -> Result<Vec<Value>, RenderError> {
        params.iter().map(|expr| self.eval_expr(expr)).collect()
    }

    fn eval_hash(&mut self, hash: &[(String, Expr)]) -> Result<Object, RenderError> {
        let object = Object::new();
        for (key, expr) in hash {
            object.set(key.as_str(), self.eval_expr(expr)?);
        }
        Ok(object)
    }

    /// Evaluate an argument. Paths are plain lookups here: helpers are only called through
    /// subexpressions.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RenderError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Path(path) => {
                if self.options.assume_objects && !path.data {
                    self.assume_objects(path)?;
                }
                Ok(self.resolve_path(path))
            }
            Expr::SubExpr(call) => self.eval_call(call),
        }
    }

    fn eval_call(&mut self, call: &Call) -> Result<Value, RenderError> {
        self.dispatch(call, None).map(Dispatch::into_value)
    }

    fn find_partial(&self, name: &str) -> Result<Option<Program>, RenderError> {
        if let Some(program) = self.inlines.get(name) {
            return Ok(Some(program.clone()));
        }
        match self
            .env
            .partials
            .get_with(name, self.options.ignore_standalone)
        {
            Some(Ok(template)) => Ok(Some(template.program().clone())),
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }

    fn render_partial(&mut self, partial: &Partial, out: &mut String) -> Result<(), RenderError> {
        let name = match &partial.name {
            PartialName::Static(name) => name.clone(),
            PartialName::Dynamic(call) => self.eval_call(call)?.to_output_string(),
        };

        let mut context = match &partial.context {
            Some(expr) => self.eval_expr(expr)?,
            None if self.options.explicit_partial_context => Value::from(Object::new()),
            None => self.context().clone(),
        };
        if !partial.hash.is_empty() {
            let fresh = match &context {
                Value::Object(object) => object.clone_shallow(),
                _ => Object::new(),
            };
            for (key, expr) in &partial.hash {
                fresh.set(key.as_str(), self.eval_expr(expr)?);
            }
            context = Value::from(fresh);
        }

        let rendered = if name == "@partial-block" {
            let Some(body) = self.partial_blocks.pop() else {
                log::warn!(target: "hbs", "partial \"@partial-block\" could not be found");
                return Ok(());
            };
            let result = self.render_with(&body, Some(context), None, Vec::new());
            self.partial_blocks.push(body);
            result?
        } else {
            match (self.find_partial(&name)?, &partial.block) {
                (Some(program), Some(body)) => {
                    let saved_inlines = self.declare_inlines(body);
                    let frame = create_frame(self.data());
                    frame.set("partial-block", true);
                    self.partial_blocks.push(body.clone());
                    let result = self.without_block_params(|state| {
                        state.render_with(&program, Some(context), Some(frame), Vec::new())
                    });
                    self.partial_blocks.pop();
                    if let Some(saved) = saved_inlines {
                        self.inlines = saved;
                    }
                    result?
                }
                (Some(program), None) => self.without_block_params(|state| {
                    state.render_with(&program, Some(context), None, Vec::new())
                })?,
                (None, Some(fallback)) => {
                    self.render_with(fallback, Some(context), None, Vec::new())?
                }
                (None, None) => {
                    log::warn!(target: "hbs", "partial \"{}\" could not be found", name);
                    return Ok(());
                }
            }
        };

        if partial.indent.is_empty() || self.options.prevent_indent {
            out.push_str(&rendered);
        } else {
            for line in rendered.split_inclusive('\n') {
                out.push_str(&partial.indent);
                out.push_str(line);
            }
        }
        Ok(())
    }
}
