use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// A Scope maintains the set of named entities declared in it and a link to
/// the immediately surrounding (outer) scope.
///
/// Scopes are shared by reference: function values retain the scope they
/// were defined in, so a scope lives as long as its creator or any closure
/// that captured it.
pub struct Scope {
    store: HashMap<String, Object>,
    outer: Option<Rc<RefCell<Scope>>>,
}

impl Scope {
    /// Creates a new scope nested in the outer scope.
    pub fn new(outer: Option<Rc<RefCell<Scope>>>) -> Self {
        Scope {
            store: HashMap::new(),
            outer,
        }
    }

    /// Wraps the scope into the shared handle the interpreter works with.
    pub fn shared(self) -> Rc<RefCell<Scope>> {
        Rc::new(RefCell::new(self))
    }

    /// Returns a named entity from this or an outer scope.
    pub fn lookup(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(obj) => Some(obj.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer| outer.borrow().lookup(name)),
        }
    }

    /// Adds or replaces a named entity in this scope only.
    pub fn set(&mut self, name: &str, value: Object) {
        self.store.insert(name.to_string(), value);
    }
}
