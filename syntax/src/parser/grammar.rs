/// Grammar definitions built from the combinators
///
/// Alternation commits after the first consumed token, so every rule is
/// left-factored: alternatives that share a prefix parse the prefix once and
/// branch afterwards.
use super::combinators::*;
use super::state::{Cursor, Parser, Reply};
use crate::ast::*;

/// Parse a complete program
/// Example: module lists. type nil list A. append nil L L.
pub fn program<'a>(input: Cursor<'a>) -> Reply<'a, Program> {
    sequence(input, |s| {
        let module = s.run(optional(module_decl))?;
        let types = s.run(many(type_def))?;
        let relations = s.run(many(relation))?;
        Ok(Program {
            module,
            types,
            relations,
        })
    })
}

/// Parse a module header
/// Example: module lists.
pub fn module_decl<'a>(input: Cursor<'a>) -> Reply<'a, Module> {
    sequence(input, |s| {
        s.run(keyword_module)?;
        let name = s.run(identifier)?;
        s.run(dot)?;
        Ok(Module { name })
    })
}

/// Parse a type signature
/// Example: type filter (A -> o) -> list A -> list A -> o.
pub fn type_def<'a>(input: Cursor<'a>) -> Reply<'a, TypeDef> {
    sequence(input, |s| {
        s.run(keyword_type)?;
        let name = s.run(identifier)?;
        let signature = s.run(type_seq)?;
        s.run(dot)?;
        Ok(TypeDef { name, signature })
    })
}

/// Parse an arrow-separated type sequence
/// Example: pair A B -> (A -> C) -> pair C D
pub fn type_seq<'a>(input: Cursor<'a>) -> Reply<'a, TypeSeq> {
    map(sep_by1(type_term, arrow), |items| TypeSeq { items }).parse(input)
}

fn type_term<'a>(input: Cursor<'a>) -> Reply<'a, TypeTerm> {
    or(
        map(atom, TypeTerm::Atom),
        or(map(variable, TypeTerm::Var), map(type_group, TypeTerm::Group)),
    )
    .parse(input)
}

/// `( type_seq )`; redundant parentheses do not add nesting levels
fn type_group<'a>(input: Cursor<'a>) -> Reply<'a, TypeSeq> {
    sequence(input, |s| {
        s.run(lparen)?;
        let seq = s.run(nested(type_seq))?;
        s.run(rparen)?;
        Ok(strip_redundant_group(seq))
    })
}

fn strip_redundant_group(mut seq: TypeSeq) -> TypeSeq {
    if seq.items.len() == 1 && matches!(seq.items[0], TypeTerm::Group(_)) {
        if let Some(TypeTerm::Group(inner)) = seq.items.pop() {
            return inner;
        }
    }
    seq
}

/// Parse a fact or a rule
/// Examples: parent tom bob.  ancestor X Y :- parent X Z, ancestor Z Y.
pub fn relation<'a>(input: Cursor<'a>) -> Reply<'a, Relation> {
    sequence(input, |s| {
        let head = s.run(atom)?;
        let body = s.run(or(map(dot, |()| None::<Goal>), map(rule_body, Some)))?;
        Ok(Relation { head, body })
    })
}

fn rule_body<'a>(input: Cursor<'a>) -> Reply<'a, Goal> {
    sequence(input, |s| {
        s.run(colon_dash)?;
        let goal = s.run(disjunction)?;
        s.run(dot)?;
        Ok(goal)
    })
}

/// Parse a clause body: `;` separated conjunctions, nested to the right.
/// Each link of a chain counts as one nesting level.
pub fn disjunction<'a>(input: Cursor<'a>) -> Reply<'a, Goal> {
    chain_right1(conjunction, semicolon, Goal::disj).parse(input)
}

fn conjunction<'a>(input: Cursor<'a>) -> Reply<'a, Goal> {
    chain_right1(goal_term, comma, Goal::conj).parse(input)
}

fn goal_term<'a>(input: Cursor<'a>) -> Reply<'a, Goal> {
    or(goal_group, map(atom, Goal::Atom)).parse(input)
}

fn goal_group<'a>(input: Cursor<'a>) -> Reply<'a, Goal> {
    sequence(input, |s| {
        s.run(lparen)?;
        let goal = s.run(nested(disjunction))?;
        s.run(rparen)?;
        Ok(goal)
    })
}

/// Parse an atom: an identifier applied to its arguments
/// Example: append (cons X L1) L2 [X | L3]
pub fn atom<'a>(input: Cursor<'a>) -> Reply<'a, Atom> {
    sequence(input, |s| {
        let functor = s.run(identifier)?;
        let args = s.run(many(argument))?;
        Ok(Atom { functor, args })
    })
}

fn argument<'a>(input: Cursor<'a>) -> Reply<'a, Term> {
    or(
        map(list, Term::Atom),
        or(
            map(identifier, Term::Ident),
            or(map(variable, Term::Var), map(paren_atom, Term::Atom)),
        ),
    )
    .parse(input)
}

fn paren_atom<'a>(input: Cursor<'a>) -> Reply<'a, Atom> {
    sequence(input, |s| {
        s.run(lparen)?;
        let inner = s.run(nested(or(paren_atom, atom)))?;
        s.run(rparen)?;
        Ok(inner)
    })
}

/// Parse a list literal, desugared into `cons`/`nil` atoms
/// Examples: [] [a, B, [c]] [H | T]
pub fn list<'a>(input: Cursor<'a>) -> Reply<'a, Atom> {
    sequence(input, |s| {
        s.run(lbracket)?;
        let literal = s.run(nested(list_body))?;
        Ok(literal.desugar())
    })
}

fn list_body<'a>(input: Cursor<'a>) -> Reply<'a, ListLiteral> {
    or(map(rbracket, |()| ListLiteral::empty()), list_items).parse(input)
}

/// Elements nest one `cons` deeper each, so they count against the
/// nesting limit like brackets do
fn list_items<'a>(input: Cursor<'a>) -> Reply<'a, ListLiteral> {
    sequence(input, |s| {
        let mut elements = s.run(chain1(list_element, comma))?;
        if elements.len() == 1 {
            if let Some(tail) = s.run(optional(preceded(pipe, variable)))? {
                s.run(rbracket)?;
                return Ok(ListLiteral::with_tail(elements.swap_remove(0), tail));
            }
        }
        s.run(rbracket)?;
        Ok(ListLiteral::proper(elements))
    })
}

fn list_element<'a>(input: Cursor<'a>) -> Reply<'a, Term> {
    or(
        map(list, Term::Atom),
        or(map(atom, Term::Atom), map(variable, Term::Var)),
    )
    .parse(input)
}
