//! Condition expressions over the flag store.
//!
//! Content authors write conditions as a list of clauses that must all hold.
//! Each clause is a flag name, a negated flag (`!name`), or an OR-group of
//! either joined with `|`. Clauses are compiled once at load time into a
//! [`Condition`] tree, and evaluation afterwards is pure.

use thiserror::Error;

use crate::flags::{FlagKey, FlagStore};

/// Compiled boolean expression over flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    True,
    Atom(FlagKey),
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

/// Malformed authored condition text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("empty clause")]
    EmptyClause,
    #[error("empty term in clause '{0}'")]
    EmptyTerm(String),
    #[error("negation without a flag name in clause '{0}'")]
    BareNegation(String),
}

impl Condition {
    /// Compile authored clauses, resolving each flag name with `resolve`.
    ///
    /// An empty clause list compiles to [`Condition::True`].
    ///
    /// # Errors
    /// Returns a [`ConditionError`] for an empty clause, an empty OR-term, or a
    /// `!` with no flag name after it.
    pub fn parse_clauses<S: AsRef<str>>(
        clauses: &[S],
        resolve: &dyn Fn(&str) -> FlagKey,
    ) -> Result<Condition, ConditionError> {
        let mut parts = Vec::with_capacity(clauses.len());
        for clause in clauses {
            parts.push(parse_clause(clause.as_ref(), resolve)?);
        }
        Ok(match parts.len() {
            0 => Condition::True,
            1 => parts.remove(0),
            _ => Condition::And(parts),
        })
    }

    pub fn flag(key: FlagKey) -> Condition {
        Condition::Atom(key)
    }

    pub fn not(inner: Condition) -> Condition {
        Condition::Not(Box::new(inner))
    }

    /// Evaluate against the current flags. Unknown flags are false.
    pub fn evaluate(&self, flags: &FlagStore) -> bool {
        match self {
            Condition::True => true,
            Condition::Atom(key) => flags.has(key),
            Condition::Not(inner) => !inner.evaluate(flags),
            Condition::And(parts) => parts.iter().all(|part| part.evaluate(flags)),
            Condition::Or(parts) => parts.iter().any(|part| part.evaluate(flags)),
        }
    }

    pub fn is_trivially_true(&self) -> bool {
        matches!(self, Condition::True)
    }
}

fn parse_clause(clause: &str, resolve: &dyn Fn(&str) -> FlagKey) -> Result<Condition, ConditionError> {
    if clause.trim().is_empty() {
        return Err(ConditionError::EmptyClause);
    }
    let mut terms = Vec::new();
    for term in clause.split('|') {
        terms.push(parse_term(term, clause, resolve)?);
    }
    Ok(if terms.len() == 1 {
        terms.remove(0)
    } else {
        Condition::Or(terms)
    })
}

fn parse_term(term: &str, clause: &str, resolve: &dyn Fn(&str) -> FlagKey) -> Result<Condition, ConditionError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ConditionError::EmptyTerm(clause.to_string()));
    }
    if let Some(rest) = term.strip_prefix('!') {
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(ConditionError::BareNegation(clause.to_string()));
        }
        return Ok(Condition::not(Condition::Atom(resolve(rest))));
    }
    Ok(Condition::Atom(resolve(term)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(name: &str) -> FlagKey {
        FlagKey::Custom(name.to_string())
    }

    fn compile(clauses: &[&str]) -> Condition {
        Condition::parse_clauses(clauses, &|name| custom(name)).expect("valid condition")
    }

    fn store(names: &[&str]) -> FlagStore {
        names.iter().map(|name| custom(name)).collect()
    }

    #[test]
    fn empty_condition_is_true() {
        let cond = compile(&[]);
        assert_eq!(cond, Condition::True);
        assert!(cond.evaluate(&FlagStore::new()));
    }

    #[test]
    fn single_flag_and_negation() {
        let flags = store(&["a"]);
        assert!(compile(&["a"]).evaluate(&flags));
        assert!(!compile(&["!a"]).evaluate(&flags));
        assert!(compile(&["!b"]).evaluate(&flags));
        assert!(!compile(&["b"]).evaluate(&flags));
    }

    #[test]
    fn clauses_are_anded() {
        let cond = compile(&["a", "b"]);
        assert!(cond.evaluate(&store(&["a", "b"])));
        assert!(!cond.evaluate(&store(&["a"])));
        assert!(!cond.evaluate(&store(&["b"])));
    }

    #[test]
    fn or_groups_match_any_term() {
        let cond = compile(&["a|!b"]);
        assert!(cond.evaluate(&store(&["a", "b"])));
        assert!(cond.evaluate(&store(&[])));
        assert!(!cond.evaluate(&store(&["b"])));
    }

    #[test]
    fn mixed_and_or() {
        // (a OR b) AND NOT c
        let cond = compile(&["a | b", "!c"]);
        assert!(cond.evaluate(&store(&["b"])));
        assert!(!cond.evaluate(&store(&["a", "c"])));
        assert!(!cond.evaluate(&store(&[])));
    }

    #[test]
    fn whitespace_around_terms_is_ignored() {
        let cond = compile(&["  ! a "]);
        assert_eq!(cond, Condition::not(Condition::Atom(custom("a"))));
    }

    #[test]
    fn malformed_clauses_are_rejected() {
        let resolve = |name: &str| custom(name);
        assert_eq!(
            Condition::parse_clauses(&[" "][..], &resolve),
            Err(ConditionError::EmptyClause)
        );
        assert_eq!(
            Condition::parse_clauses(&["a||b"][..], &resolve),
            Err(ConditionError::EmptyTerm("a||b".into()))
        );
        assert_eq!(
            Condition::parse_clauses(&["a|!"][..], &resolve),
            Err(ConditionError::BareNegation("a|!".into()))
        );
    }

    #[test]
    fn names_go_through_the_resolver() {
        let resolve = |name: &str| {
            if name == "mailboxOpen" {
                FlagKey::ObjectOpen("mailbox".into())
            } else {
                custom(name)
            }
        };
        let cond = Condition::parse_clauses(&["mailboxOpen"][..], &resolve).expect("valid");
        assert_eq!(cond, Condition::Atom(FlagKey::ObjectOpen("mailbox".into())));
    }
}
