//! List literal desugaring.
//!
//! `[e1, ..., en]` becomes `cons e1 (cons e2 ... (cons en nil))` and
//! `[h | T]` becomes `cons h T`. The fold runs after the brackets have been
//! parsed, so the grammar only ever collects elements.

use super::{Atom, Term};

const CONS: &str = "cons";
const NIL: &str = "nil";

/// Elements of a bracketed list as written, before desugaring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLiteral {
    elements: Vec<Term>,
    tail: Option<String>,
}

impl ListLiteral {
    /// `[]`
    pub fn empty() -> Self {
        ListLiteral {
            elements: Vec::new(),
            tail: None,
        }
    }

    /// `[e1, ..., en]`
    pub fn proper(elements: Vec<Term>) -> Self {
        ListLiteral {
            elements,
            tail: None,
        }
    }

    /// `[head | Tail]`
    pub fn with_tail(head: Term, tail: impl Into<String>) -> Self {
        ListLiteral {
            elements: vec![head],
            tail: Some(tail.into()),
        }
    }

    pub fn desugar(self) -> Atom {
        let ListLiteral {
            mut elements,
            tail,
        } = self;

        let Some(last) = elements.pop() else {
            return Atom::constant(NIL);
        };
        let end = match tail {
            Some(var) => Term::Var(var),
            None => Term::Ident(NIL.to_string()),
        };

        let mut list = cons(last, end);
        while let Some(element) = elements.pop() {
            list = cons(element, Term::Atom(list));
        }
        list
    }
}

fn cons(head: Term, tail: Term) -> Atom {
    Atom::new(CONS, vec![head, tail])
}
