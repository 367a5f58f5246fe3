use crate::{
    eval::{self, EvalError, InputSource},
    infix,
    store::Variables,
    Matrix, ParseError,
};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// How expressions passed to [`Session::evaluate()`] are written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Notation {
    /// `x = a + b * c`
    Infix,
    /// `= x + a * b c`
    Prefix,
}

impl Notation {
    pub fn toggled(self) -> Notation {
        match self {
            Notation::Infix => Notation::Prefix,
            Notation::Prefix => Notation::Infix,
        }
    }
}

impl Default for Notation {
    fn default() -> Self { Notation::Infix }
}

impl Display for Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Notation::Infix => write!(f, "infix"),
            Notation::Prefix => write!(f, "prefix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown notation \"{0}\", expected \"infix\" or \"prefix\"")]
pub struct UnknownNotation(pub String);

impl FromStr for Notation {
    type Err = UnknownNotation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "infix" => Ok(Notation::Infix),
            "prefix" => Ok(Notation::Prefix),
            _ => Err(UnknownNotation(s.to_string())),
        }
    }
}

/// A calculator session: the variables saved so far, and the notation
/// expressions are written in.
///
/// Sessions are independent of each other. To share one between threads, put
/// it behind a [`std::sync::Mutex`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    variables: Variables,
    notation: Notation,
}

impl Session {
    pub fn new() -> Self { Session::default() }

    pub fn with_notation(notation: Notation) -> Self {
        Session {
            notation,
            ..Session::default()
        }
    }

    pub fn notation(&self) -> Notation { self.notation }

    pub fn set_notation(&mut self, notation: Notation) {
        self.notation = notation;
    }

    /// Switch between infix and prefix, returning the new notation.
    pub fn toggle_notation(&mut self) -> Notation {
        self.notation = self.notation.toggled();
        self.notation
    }

    pub fn variables(&self) -> &Variables { &self.variables }

    pub fn variables_mut(&mut self) -> &mut Variables { &mut self.variables }

    /// The prefix expression `line` would be evaluated as, or `None` when the
    /// session already expects prefix notation.
    pub fn convert(&self, line: &str) -> Option<Result<String, ParseError>> {
        match self.notation {
            Notation::Infix => Some(infix::to_prefix(line)),
            Notation::Prefix => None,
        }
    }

    /// Evaluate a single expression written in the session's notation.
    pub fn evaluate(
        &mut self,
        line: &str,
        input: &mut dyn InputSource,
    ) -> Result<Matrix, EvalError> {
        match self.convert(line) {
            Some(prefix) => {
                let prefix = prefix?;
                eval::evaluate(&prefix, &mut self.variables, input)
            },
            None => eval::evaluate(line, &mut self.variables, input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoInput;
    use std::{
        sync::{Arc, Mutex},
        thread,
    };

    fn session() -> Session {
        let mut session = Session::new();
        let vars = session.variables_mut();
        vars.set("m1", Matrix::from([[1.0, 2.0], [3.0, 4.0]]));
        vars.set("m2", Matrix::from([[5.0, 6.0], [7.0, 8.0]]));
        session
    }

    #[test]
    fn infix_is_the_default() {
        assert_eq!(Session::new().notation(), Notation::Infix);
    }

    #[test]
    fn evaluate_infix() {
        let mut session = session();

        let got = session.evaluate("x = m1 + m2 * m1", &mut NoInput).unwrap();

        // m2 * m1 = [[23, 34], [31, 46]]
        assert_eq!(got, [[24.0, 36.0], [34.0, 50.0]]);
        assert_eq!(session.variables().get("x"), Some(&got));
    }

    #[test]
    fn evaluate_prefix() {
        let mut session = session();
        session.set_notation(Notation::Prefix);

        let got = session.evaluate("+ m1 m2", &mut NoInput).unwrap();

        assert_eq!(got, [[6.0, 8.0], [10.0, 12.0]]);
    }

    #[test]
    fn infix_operators_with_literals() {
        let mut session = session();

        let got = session.evaluate("2 . m1 ^ 2 - id 2", &mut NoInput).unwrap();

        // "^" binds tighter than ".", so this is (2 . (m1 ^ 2)) - id 2
        assert_eq!(got, [[13.0, 20.0], [30.0, 43.0]]);
    }

    #[test]
    fn determinant_in_infix() {
        let mut session = session();

        let got = session.evaluate("d m1", &mut NoInput).unwrap();

        assert_eq!(got, [[-2.0]]);
    }

    #[test]
    fn conversion_only_happens_in_infix_mode() {
        let mut session = session();

        assert_eq!(session.convert("a + b"), Some(Ok(String::from("+ a b"))));

        session.toggle_notation();
        assert_eq!(session.notation(), Notation::Prefix);
        assert_eq!(session.convert("+ a b"), None);
    }

    #[test]
    fn parse_errors_are_reported() {
        let mut session = session();

        let got = session.evaluate("m1 +", &mut NoInput);

        assert_eq!(
            got,
            Err(EvalError::Parse(ParseError::UnexpectedEndOfInput))
        );
    }

    #[test]
    fn a_failed_expression_doesnt_affect_the_next_one() {
        let mut session = session();

        assert!(session.evaluate("y = m1 + nope", &mut NoInput).is_err());
        assert!(session.variables().get("y").is_none());

        let got = session.evaluate("y = t m1", &mut NoInput).unwrap();
        assert_eq!(got, [[1.0, 3.0], [2.0, 4.0]]);
    }

    #[test]
    fn notation_from_str() {
        assert_eq!("infix".parse::<Notation>(), Ok(Notation::Infix));
        assert_eq!(" Prefix ".parse::<Notation>(), Ok(Notation::Prefix));
        assert_eq!(
            "postfix".parse::<Notation>(),
            Err(UnknownNotation(String::from("postfix")))
        );
        assert_eq!(Notation::Prefix.to_string(), "prefix");
    }

    #[test]
    fn independent_sessions_on_separate_threads() {
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                thread::spawn(move || {
                    let mut session = Session::new();
                    let src = format!("x = {} . id {}", n, n);
                    let got = session.evaluate(&src, &mut NoInput).unwrap();
                    let det = session.evaluate("d x", &mut NoInput).unwrap();
                    (n, got, det)
                })
            })
            .collect();

        for handle in handles {
            let (n, got, det) = handle.join().unwrap();
            let scale = n as f64;

            assert_eq!(got.shape(), (n, n));
            assert_eq!(det, Matrix::from([[scale.powi(n as i32)]]));
        }
    }

    #[test]
    fn a_shared_session_behind_a_mutex() {
        let shared = Arc::new(Mutex::new(session()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let src = format!("v{} = m1 + m2", i);
                    let mut session = shared.lock().unwrap();
                    session.evaluate(&src, &mut NoInput).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), [[6.0, 8.0], [10.0, 12.0]]);
        }

        let session = shared.lock().unwrap();
        assert_eq!(session.variables().len(), 6);
    }
}
