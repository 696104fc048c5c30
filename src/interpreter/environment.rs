use crate::interpreter::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One scope frame: name -> value bindings plus an optional link to the
/// enclosing frame. Frames form a chain, never a cycle; a frame is dropped
/// when the block or call that created it finishes.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<Rc<Environment>>,
    values: RefCell<HashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_enclosing(enclosing: Rc<Environment>) -> Self {
        Self {
            enclosing: Some(enclosing),
            values: RefCell::new(HashMap::new()),
        }
    }

    /// Bind or overwrite in this frame, without looking outward.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(name.into(), value);
    }

    /// Mutate the innermost frame that already owns `name`. When no frame on
    /// the chain owns it, the binding is created here, in the current frame --
    /// never silently in the root.
    pub fn assign(&self, name: &str, value: Value) {
        let mut env = self;
        loop {
            if env.values.borrow().contains_key(name) {
                env.values.borrow_mut().insert(name.to_string(), value);
                return;
            }
            match &env.enclosing {
                Some(parent) => env = parent,
                None => break,
            }
        }

        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Walk outward to the root; `None` when the chain is exhausted.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = self;
        loop {
            if let Some(value) = env.values.borrow().get(name) {
                return Some(value.clone());
            }
            match &env.enclosing {
                Some(parent) => env = parent,
                None => return None,
            }
        }
    }
}
