//! Native callables stored as values

use crate::dom::array::Array;
use crate::dom::error::Result;
use crate::dom::value::Value;
use std::fmt;
use std::sync::Arc;

/// Implementation behind a [`Function`]
pub trait FunctionImpl: Send + Sync {
    fn type_key(&self) -> &'static str {
        "Function"
    }

    fn call(&self, args: &Array) -> Result<Value>;
}

struct NativeFunction<F>(F);

impl<F> FunctionImpl for NativeFunction<F>
where
    F: Fn(&Array) -> Result<Value> + Send + Sync,
{
    fn call(&self, args: &Array) -> Result<Value> {
        (self.0)(args)
    }
}

/// Shared handle to a callable
#[derive(Clone)]
pub struct Function {
    imp: Arc<dyn FunctionImpl>,
}

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Array) -> Result<Value> + Send + Sync + 'static,
    {
        Function::from_impl(NativeFunction(f))
    }

    pub fn from_impl<I: FunctionImpl + 'static>(imp: I) -> Self {
        Function { imp: Arc::new(imp) }
    }

    pub fn type_key(&self) -> &'static str {
        self.imp.type_key()
    }

    pub fn call(&self, args: &Array) -> Result<Value> {
        self.imp.call(args)
    }

    /// Call with arguments collected into a fresh array
    pub fn call_values<I>(&self, args: I) -> Result<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        self.call(&args.into_iter().collect())
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn addr(&self) -> *const () {
        Arc::as_ptr(&self.imp) as *const ()
    }
}

/// Functions compare by identity
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:p})", self.type_key(), self.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::error::Error;

    #[test]
    fn test_call_receives_arguments() {
        let sum = Function::new(|args| {
            let mut total = 0;
            for arg in args {
                total += arg.as_integer().ok_or_else(|| Error::message("not a number"))?;
            }
            Ok(Value::from(total))
        });
        let result = sum.call_values([Value::from(2), Value::from(3)]).unwrap();
        assert_eq!(result, Value::from(5));
        assert!(sum.call_values([Value::from("x")]).is_err());
    }

    #[test]
    fn test_identity_equality() {
        let f = Function::new(|_| Ok(Value::Null));
        let g = Function::new(|_| Ok(Value::Null));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }
}
