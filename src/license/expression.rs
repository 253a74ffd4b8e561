//! SPDX license expressions as found in `package.json` (`"(MIT OR Apache-2.0)"`).
//!
//! Grammar (AND binds tighter than OR):
//! ```text
//! expr     := or_expr
//! or_expr  := and_expr ( "OR" and_expr )*
//! and_expr := atom ( "AND" atom )*
//! atom     := "(" expr ")" | id ( "WITH" id )?
//! ```
//! `WITH` exception clauses are parsed and dropped; the base license decides.

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    License(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse an expression. `/` is read as `OR`, as some older manifests write `MIT/Apache-2.0`.
    ///
    /// Returns `None` for empty input, input with no license identifiers, or free text
    /// that is not an expression (`"The MIT License"`).
    pub fn parse(input: &str) -> Option<Expr> {
        let normalized = input.replace('/', " OR ");
        let mut parser = ExprParser {
            tokens: tokenize(&normalized),
            pos: 0,
        };
        let expr = parser.parse_or()?;
        (parser.pos == parser.tokens.len()).then_some(expr)
    }

    /// Whether the expression can be satisfied when `accept` says which single licenses are usable.
    pub fn satisfied_by(&self, accept: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Expr::License(id) => accept(id),
            Expr::And(a, b) => a.satisfied_by(accept) && b.satisfied_by(accept),
            Expr::Or(a, b) => a.satisfied_by(accept) || b.satisfied_by(accept),
        }
    }

    /// Every license identifier in the expression, left to right.
    pub fn licenses(&self) -> Vec<&str> {
        match self {
            Expr::License(id) => vec![id.as_str()],
            Expr::And(a, b) | Expr::Or(a, b) => {
                let mut ids = a.licenses();
                ids.extend(b.licenses());
                ids
            }
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
enum Token {
    Id(String),
    And,
    Or,
    With,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '(' {
            tokens.push(Token::LParen);
            chars.next();
        } else if c == ')' {
            tokens.push(Token::RParen);
            chars.next();
        } else {
            let mut s = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '(' || c == ')' {
                    break;
                }
                s.push(c);
                chars.next();
            }
            // Operators are case-insensitive in the wild ("MIT or Apache-2.0").
            let token = match s.to_ascii_uppercase().as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                "WITH" => Token::With,
                _ => Token::Id(s),
            };
            tokens.push(token);
        }
    }
    tokens
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut result = self.parse_and();
        while matches!(self.peek(), Some(Token::Or)) {
            self.consume();
            let rhs = self.parse_and();
            result = join(result, rhs, Expr::Or);
        }
        result
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut result = self.parse_atom();
        while matches!(self.peek(), Some(Token::And)) {
            self.consume();
            let rhs = self.parse_atom();
            result = join(result, rhs, Expr::And);
        }
        result
    }

    fn parse_atom(&mut self) -> Option<Expr> {
        match self.consume() {
            Some(Token::LParen) => {
                let inner = self.parse_or();
                if matches!(self.peek(), Some(Token::RParen)) {
                    self.consume();
                }
                inner
            }
            Some(Token::Id(id)) => {
                if matches!(self.peek(), Some(Token::With)) {
                    self.consume(); // WITH
                    self.consume(); // exception identifier
                }
                Some(Expr::License(id))
            }
            _ => None,
        }
    }
}

/// Combine two optional operands; a missing side collapses to the other.
fn join(
    lhs: Option<Expr>,
    rhs: Option<Expr>,
    op: fn(Box<Expr>, Box<Expr>) -> Expr,
) -> Option<Expr> {
    match (lhs, rhs) {
        (Some(a), Some(b)) => Some(op(Box::new(a), Box::new(b))),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permits(expr: &str, allowed: &[&str]) -> bool {
        Expr::parse(expr)
            .map(|e| e.satisfied_by(&|id| allowed.contains(&id)))
            .unwrap_or(false)
    }

    #[test]
    fn test_single_identifier() {
        assert_eq!(Expr::parse("MIT"), Some(Expr::License("MIT".into())));
    }

    #[test]
    fn test_or_needs_one_side() {
        assert!(permits("MIT OR GPL-3.0", &["MIT"]));
        assert!(!permits("MIT OR GPL-3.0", &["ISC"]));
    }

    #[test]
    fn test_and_needs_both_sides() {
        assert!(!permits("MIT AND GPL-3.0", &["MIT"]));
        assert!(permits("MIT AND BSD-3-Clause", &["MIT", "BSD-3-Clause"]));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        // MIT OR (GPL-3.0 AND BSD-3-Clause)
        assert!(permits("MIT OR GPL-3.0 AND BSD-3-Clause", &["MIT"]));
        // (MIT OR GPL-3.0) AND GPL-3.0
        assert!(!permits("(MIT OR GPL-3.0) AND GPL-3.0", &["MIT"]));
    }

    #[test]
    fn test_slash_and_lowercase_operators() {
        assert!(permits("GPL-3.0/MIT", &["MIT"]));
        assert!(permits("(Apache-2.0 or MIT)", &["MIT"]));
    }

    #[test]
    fn test_with_exception_dropped() {
        let expr = Expr::parse("GPL-2.0 WITH Classpath-exception-2.0").unwrap();
        assert_eq!(expr.licenses(), vec!["GPL-2.0"]);
    }

    #[test]
    fn test_free_text_is_not_an_expression() {
        assert_eq!(Expr::parse("The MIT License"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Expr::parse(""), None);
        assert_eq!(Expr::parse("()"), None);
    }
}
