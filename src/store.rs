use crate::{lexer::TokenKind, Matrix};
use smol_str::SmolStr;
use std::collections::HashMap;

/// Named matrices which persist between evaluations.
///
/// Each name holds at most one [`Matrix`], and the store owns it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Variables {
    values: HashMap<SmolStr, Matrix>,
}

impl Variables {
    pub fn new() -> Self { Variables::default() }

    pub fn get(&self, name: &str) -> Option<&Matrix> { self.values.get(name) }

    /// Store `matrix` under `name`, returning whatever was there before.
    pub fn set<S>(&mut self, name: S, matrix: Matrix) -> Option<Matrix>
    where
        S: Into<SmolStr>,
    {
        let name = name.into();
        log::debug!("Saving a {:?} matrix as \"{}\"", matrix.shape(), name);
        self.values.insert(name, matrix)
    }

    pub fn remove(&mut self, name: &str) -> Option<Matrix> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn clear(&mut self) { self.values.clear(); }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Every variable name, sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> =
            self.values.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Can a matrix be saved under this name?
///
/// Names look like identifiers (a letter or `_`, then letters, digits or
/// underscores) and can't be spelled the same as an operator.
pub fn is_valid_name(name: &str) -> bool {
    TokenKind::classify(name) == TokenKind::Identifier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_look_up() {
        let mut vars = Variables::new();
        assert!(vars.is_empty());
        assert!(vars.get("x").is_none());

        let previous = vars.set("x", Matrix::identity(2));

        assert!(previous.is_none());
        assert_eq!(vars.get("x"), Some(&Matrix::identity(2)));
        assert!(vars.contains("x"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn overwriting_replaces_the_old_value() {
        let mut vars = Variables::new();
        vars.set("x", Matrix::identity(2));

        let previous = vars.set("x", Matrix::zeros(1, 3));

        assert_eq!(previous, Some(Matrix::identity(2)));
        assert_eq!(vars.get("x"), Some(&Matrix::zeros(1, 3)));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut vars = Variables::new();
        vars.set("b", Matrix::identity(1));
        vars.set("a", Matrix::identity(2));
        assert_eq!(vars.names(), vec!["a", "b"]);

        vars.clear();

        assert!(vars.is_empty());
        assert!(vars.names().is_empty());
    }

    #[test]
    fn remove_a_single_variable() {
        let mut vars = Variables::new();
        vars.set("a", Matrix::identity(2));
        vars.set("b", Matrix::identity(3));

        assert_eq!(vars.remove("a"), Some(Matrix::identity(2)));
        assert_eq!(vars.remove("a"), None);
        assert_eq!(vars.names(), vec!["b"]);
    }

    #[test]
    fn valid_names() {
        let inputs = vec![
            ("x", true),
            ("m1", true),
            ("_tmp", true),
            ("inverse", true),
            ("my_matrix_2", true),
            ("i", false),
            ("d", false),
            ("m", false),
            ("c", false),
            ("t", false),
            ("id", false),
            ("1x", false),
            ("x-y", false),
            ("", false),
            ("?", false),
        ];

        for (name, should_be) in inputs {
            assert_eq!(is_valid_name(name), should_be, "{:?}", name);
        }
    }
}
