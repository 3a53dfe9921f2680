use std::fmt;

use crate::error::ParseError;

/// Splits ground atom text such as `(on a b)` into tokens.
pub struct Lexer { }

#[derive(Debug, PartialEq)]
pub enum Token<'a> {
    LeftParen(usize),
    RightParen(usize),
    Literal(usize, &'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::LeftParen(_) => write!(f, "("),
            Token::RightParen(_) => write!(f, ")"),
            Token::Literal(_, lit) => write!(f, "{}", lit),
        }
    }
}

impl Lexer {
    pub fn tokenize(text: &str) -> Vec<Token<'_>> {
        let mut tokens = Vec::new();
        let mut start: Option<(usize, usize)> = None; // (byte offset, col) of the literal being read
        let mut col: usize = 0;
        for (offset, c) in text.char_indices() {
            col += 1;
            if c == '(' || c == ')' || c.is_whitespace() {
                if let Some((s, scol)) = start.take() {
                    tokens.push(Token::Literal(scol, &text[s..offset]));
                }
                match c {
                    '(' => tokens.push(Token::LeftParen(col)),
                    ')' => tokens.push(Token::RightParen(col)),
                    _ => (),
                }
            } else if start.is_none() {
                start = Some((offset, col));
            }
        }
        if let Some((s, scol)) = start {
            tokens.push(Token::Literal(scol, &text[s..]));
        }
        tokens
    }
}

/// Parses `(name arg1 arg2 ...)` or `name arg1 arg2 ...` into its name and arguments.
pub fn parse_tuple(text: &str) -> Result<(String, Vec<String>), ParseError> {
    let tokens = Lexer::tokenize(text);
    let mut it = tokens.iter().peekable();
    let open = match it.peek() {
        Some(Token::LeftParen(_)) => { it.next(); true },
        Some(_) => false,
        None => return Err(ParseError::new(text, 1, "Expected atom.")),
    };
    let name = match it.next() {
        Some(Token::Literal(_, name)) => name.to_string(),
        Some(Token::LeftParen(c)) | Some(Token::RightParen(c)) => return Err(ParseError::new(text, *c, "Expected predicate name.")),
        None => return Err(ParseError::new(text, text.chars().count() + 1, "Expected predicate name.")),
    };
    let mut args = Vec::new();
    let mut closed = false;
    for token in it {
        match token {
            Token::Literal(c, _) if closed => return Err(ParseError::new(text, *c, "Unexpected token after ')'.")),
            Token::Literal(_, arg) => args.push(arg.to_string()),
            Token::RightParen(c) if !open || closed => return Err(ParseError::new(text, *c, "Unmatched ')'.")),
            Token::RightParen(_) => closed = true,
            Token::LeftParen(c) => return Err(ParseError::new(text, *c, "Nested '(' in ground atom.")),
        }
    }
    if open && !closed {
        return Err(ParseError::new(text, text.chars().count() + 1, "Expected matched ')'."));
    }
    Ok((name, args))
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token::*, parse_tuple};

    #[test]
    fn test_tokenize() {
        let tokens = Lexer::tokenize("(on a  b)");
        assert_eq!(tokens, vec![LeftParen(1), Literal(2, "on"), Literal(5, "a"), Literal(8, "b"), RightParen(9)]);
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_tuple("(on a b)").unwrap(), ("on".to_owned(), vec!["a".to_owned(), "b".to_owned()]));
        assert_eq!(parse_tuple("pick-up a").unwrap(), ("pick-up".to_owned(), vec!["a".to_owned()]));
        assert_eq!(parse_tuple("(handempty)").unwrap(), ("handempty".to_owned(), vec![]));
        assert_eq!(parse_tuple("(handempty )").unwrap(), ("handempty".to_owned(), vec![]));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_tuple("").unwrap_err().col, 1);
        assert_eq!(parse_tuple("(on a b").unwrap_err().col, 8);
        assert_eq!(parse_tuple("on a b)").unwrap_err().col, 7);
        assert_eq!(parse_tuple("(on (a) b)").unwrap_err().col, 5);
        assert_eq!(parse_tuple("(on a) b").unwrap_err().col, 8);
        assert_eq!(parse_tuple("()").unwrap_err().col, 2);
    }
}
