/// Abstract Syntax Tree definitions for horn
///
/// Nodes are purely structural: two parses that mean the same thing compare
/// equal even if their spelling differs (`[]` and `nil`, say). `Display`
/// renders each node as a fully parenthesized S-expression.
use std::fmt;

mod desugar;

pub use desugar::ListLiteral;

/// Byte range in the source, used by the lexer and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A complete horn program: optional module header, then type
/// signatures, then relations
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub module: Option<Module>,
    pub types: Vec<TypeDef>,
    pub relations: Vec<Relation>,
}

/// Module header: module lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
}

/// Type signature: type append list A -> list A -> list A -> o.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub signature: TypeSeq,
}

/// Arrow-separated type terms, right-associative. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSeq {
    pub items: Vec<TypeTerm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTerm {
    /// Type constructor application: list A
    Atom(Atom),
    /// Type variable: A
    Var(String),
    /// Parenthesized sequence: (A -> o)
    Group(TypeSeq),
}

/// Fact `head.` or rule `head :- body.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub head: Atom,
    pub body: Option<Goal>,
}

/// Clause bodies. `,` binds tighter than `;`; both nest to the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    Atom(Atom),
    Conj(Box<Goal>, Box<Goal>),
    Disj(Box<Goal>, Box<Goal>),
}

/// An identifier applied to zero or more arguments by juxtaposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub functor: String,
    pub args: Vec<Term>,
}

/// Atom arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Bare identifier argument: the `b` in `a b`
    Ident(String),
    Var(String),
    /// Parenthesized atom or desugared list
    Atom(Atom),
}

impl Atom {
    pub fn new(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Atom {
            functor: functor.into(),
            args,
        }
    }

    /// Atom without arguments
    pub fn constant(functor: impl Into<String>) -> Self {
        Atom::new(functor, Vec::new())
    }
}

impl Goal {
    pub fn conj(left: Goal, right: Goal) -> Self {
        Goal::Conj(Box::new(left), Box::new(right))
    }

    pub fn disj(left: Goal, right: Goal) -> Self {
        Goal::Disj(Box::new(left), Box::new(right))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PROG")?;
        if let Some(module) = &self.module {
            write!(f, " ({})", module)?;
        }
        for typedef in &self.types {
            write!(f, " ({})", typedef)?;
        }
        for relation in &self.relations {
            write!(f, " ({})", relation)?;
        }
        Ok(())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MODULE (ID {})", self.name)
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TYPEDEF (ID {}) ({})", self.name, self.signature)
    }
}

impl fmt::Display for TypeSeq {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TYPESEQ")?;
        for item in &self.items {
            write!(f, " ({})", item)?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeTerm::Atom(atom) => write!(f, "{}", atom),
            TypeTerm::Var(name) => write!(f, "VAR {}", name),
            TypeTerm::Group(seq) => write!(f, "{}", seq),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "REL ({})", self.head)?;
        if let Some(body) = &self.body {
            write!(f, " ({})", body)?;
        }
        Ok(())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Goal::Atom(atom) => write!(f, "{}", atom),
            Goal::Conj(left, right) => write!(f, "CONJ ({}) ({})", left, right),
            Goal::Disj(left, right) => write!(f, "DISJ ({}) ({})", left, right),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ATOM (ID {})", self.functor)?;
        for arg in &self.args {
            write!(f, " ({})", arg)?;
        }
        Ok(())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Ident(name) => write!(f, "ID {}", name),
            Term::Var(name) => write!(f, "VAR {}", name),
            Term::Atom(atom) => write!(f, "{}", atom),
        }
    }
}
