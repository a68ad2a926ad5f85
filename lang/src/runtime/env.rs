//! Lexical environments.
//!
//! An `Environment` is a stack of scopes, innermost first. Both levels are
//! persistent `im` vectors: every operation hands back a new environment
//! and leaves the receiver untouched, so a closure can keep the snapshot it
//! was created in while evaluation carries on with newer ones. Clones share
//! structure and are O(1).

use crate::{
    runtime::{Value, Value::UndefinedValue},
    syntax::tree::Ident,
};
use im::Vector;
use std::iter::FromIterator;

/// Insertion-ordered bindings of a single scope.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    vars: Vector<(Ident, Value)>,
}

#[derive(Clone, Debug)]
pub struct Environment {
    stack: Vector<Scope>,
}

impl Scope {
    pub fn new() -> Scope {
        Scope {
            vars: Vector::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.iter().find(|(id, _)| id == name).map(|(_, v)| v)
    }

    /// Binds `name`, keeping its original position when it is rebound.
    pub fn put(&mut self, name: Ident, value: Value) -> Option<Value> {
        match self.vars.iter().position(|(id, _)| *id == name) {
            Some(idx) => Some(self.vars.set(idx, (name, value)).1),
            None => {
                self.vars.push_back((name, value));
                None
            }
        }
    }

    pub fn vars(&self) -> impl Iterator<Item = &(Ident, Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl FromIterator<(Ident, Value)> for Scope {
    fn from_iter<T: IntoIterator<Item = (Ident, Value)>>(iter: T) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.put(name, value);
        }
        scope
    }
}

impl Environment {
    /// An environment with a single empty scope.
    pub fn new() -> Environment {
        Environment {
            stack: Vector::unit(Scope::new()),
        }
    }

    /// Innermost binding of `name`, or `Undefined` when nothing binds it.
    pub fn lookup(&self, name: &str) -> Value {
        self.stack
            .iter()
            .find_map(|scope| scope.get(name))
            .cloned()
            .unwrap_or(UndefinedValue)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.stack.iter().any(|scope| scope.get(name).is_some())
    }

    /// Binds `name` in the innermost scope only.
    pub fn define(&self, name: Ident, value: Value) -> Environment {
        let mut stack = self.stack.clone();
        match stack.front_mut() {
            Some(scope) => {
                scope.put(name, value);
            }
            None => stack.push_front(Scope::from_iter(vec![(name, value)])),
        }
        Environment { stack }
    }

    pub fn push_scope(&self, scope: Scope) -> Environment {
        let mut stack = self.stack.clone();
        stack.push_front(scope);
        Environment { stack }
    }

    /// `self`'s scopes followed by `other`'s.
    pub fn concat(&self, other: &Environment) -> Environment {
        let mut stack = self.stack.clone();
        stack.append(other.stack.clone());
        Environment { stack }
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.stack.iter()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Every visible name once, in lookup order.
    pub fn names(&self) -> Vec<&Ident> {
        let mut names: Vec<&Ident> = Vec::new();
        for (name, _) in self.stack.iter().flat_map(Scope::vars) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
