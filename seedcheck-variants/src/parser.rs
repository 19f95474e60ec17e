//! Recursive-descent parser for variant rule expressions.
//!
//! ```text
//! expr    := and ("or" and)*
//! and     := unary ("and" unary)*
//! unary   := "not" unary | primary
//! primary := "(" expr ")" | N "of" "{" expr ("," expr)* "}" | IDENT
//! ```
//!
//! Keywords are case-insensitive. Identifiers are handed to an [`IdentResolver`], so the parser
//! knows nothing about roles or definitions.
use crate::predicate::Predicate;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("\"{}\"", w),
            Token::LParen => "\"(\"".to_string(),
            Token::RParen => "\")\"".to_string(),
            Token::LBrace => "\"{\"".to_string(),
            Token::RBrace => "\"}\"".to_string(),
            Token::Comma => "\",\"".to_string(),
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

/// Maps identifiers in rule text to predicates.
pub trait IdentResolver {
    fn resolve(&mut self, ident: &str) -> Predicate;
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for c in text.chars() {
        let punct = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = punct {
            flush(&mut word, &mut tokens);
            tokens.push(token);
        } else if c.is_whitespace() {
            flush(&mut word, &mut tokens);
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut tokens);

    tokens
}

struct Parser<'r, R: IdentResolver> {
    tokens: Vec<Token>,
    pos: usize,
    resolver: &'r mut R,
}

impl<R: IdentResolver> Parser<'_, R> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, wanted: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == wanted => Ok(()),
            Some(token) => Err(format!(
                "expected {} but found {}",
                wanted.describe(),
                token.describe()
            )),
            None => Err(format!("expected {} at end of rule", wanted.describe())),
        }
    }

    fn parse_or(&mut self) -> Result<Predicate, String> {
        let mut members = vec![self.parse_and()?];
        while self.peek().is_some_and(|t| t.is_keyword("or")) {
            self.pos += 1;
            members.push(self.parse_and()?);
        }
        Ok(collapse(members, Predicate::Any))
    }

    fn parse_and(&mut self) -> Result<Predicate, String> {
        let mut members = vec![self.parse_unary()?];
        while self.peek().is_some_and(|t| t.is_keyword("and")) {
            self.pos += 1;
            members.push(self.parse_unary()?);
        }
        Ok(collapse(members, Predicate::All))
    }

    fn parse_unary(&mut self) -> Result<Predicate, String> {
        if self.peek().is_some_and(|t| t.is_keyword("not")) {
            self.pos += 1;
            return Ok(Predicate::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Predicate, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Word(word)) => {
                if let Ok(n) = word.parse::<usize>() {
                    if self.peek().is_some_and(|t| t.is_keyword("of")) {
                        self.pos += 1;
                        return self.parse_counted(n);
                    }
                }
                if ["and", "or", "not", "of"]
                    .iter()
                    .any(|k| word.eq_ignore_ascii_case(k))
                {
                    return Err(format!("unexpected keyword \"{}\"", word));
                }
                Ok(self.resolver.resolve(&word))
            }
            Some(token) => Err(format!("unexpected {}", token.describe())),
            None => Err("unexpected end of rule".to_string()),
        }
    }

    fn parse_counted(&mut self, n: usize) -> Result<Predicate, String> {
        self.expect(Token::LBrace)?;
        let mut members = vec![self.parse_or()?];
        loop {
            match self.next() {
                Some(Token::Comma) => members.push(self.parse_or()?),
                Some(Token::RBrace) => break,
                Some(token) => {
                    return Err(format!("expected \",\" or \"}}\" but found {}", token.describe()));
                }
                None => return Err("unclosed \"{\" at end of rule".to_string()),
            }
        }
        Ok(Predicate::AtLeast(n, members))
    }
}

fn collapse(mut members: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if members.len() == 1 {
        members.remove(0)
    } else {
        wrap(members)
    }
}

///
/// Parse one rule expression.
///
/// # Returns
/// The predicate, or a human-readable description of the syntax error.
///
pub fn parse_expression<R: IdentResolver>(text: &str, resolver: &mut R) -> Result<Predicate, String> {
    let mut parser = Parser {
        tokens: tokenize(text),
        pos: 0,
        resolver,
    };
    if parser.peek().is_none() {
        return Err("empty rule expression".to_string());
    }
    let predicate = parser.parse_or()?;
    match parser.peek_at(0) {
        None => Ok(predicate),
        Some(token) => Err(format!("unexpected {} after end of expression", token.describe())),
    }
}
