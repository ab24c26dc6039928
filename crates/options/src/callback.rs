use std::fmt;
use std::sync::Arc;

use crate::value::Value;

type CallbackFn = dyn Fn(&Value, &Value) -> Value + Send + Sync;

/// Shared option hook invoked as `(datum, context)`.
///
/// Cloning a callback shares the underlying function; two callbacks compare
/// equal only when they are the same function.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, datum: &Value, context: &Value) -> Value {
        (self.0)(datum, context)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::Callback;
    use crate::value::Value;

    #[test]
    fn clones_share_identity() {
        let cb = Callback::new(|d, _| d.clone());
        let other = Callback::new(|d, _| d.clone());
        assert_eq!(cb, cb.clone());
        assert_ne!(cb, other);
    }

    #[test]
    fn call_passes_datum_and_context() {
        let cb = Callback::new(|d, c| {
            Value::from(d.as_f64().unwrap_or(0.0) + c.as_f64().unwrap_or(0.0))
        });
        assert_eq!(cb.call(&Value::from(2.0), &Value::from(3.0)), Value::from(5.0));
    }
}
