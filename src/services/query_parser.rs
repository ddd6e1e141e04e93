//! 布尔检索语句 -> 自然语言
//!
//! 支持 `AND` / `OR` / `NOT`（以及 `&&` / `||` / `!`）、括号、
//! `field:"value"`、带引号的短语和普通词；相邻的项之间视为 `AND`。
//! 解析失败时 [`narrative`] 原样返回输入。

use tracing::warn;

use crate::error::QueryParseError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Colon,
    Word(String),
    Quoted(String),
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
            Token::Not => "NOT".to_string(),
            Token::Colon => ":".to_string(),
            Token::Word(w) => w.clone(),
            Token::Quoted(q) => format!("\"{}\"", q),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Term(String),
    Phrase(String),
    Field { name: String, value: Box<Node> },
    Not(Box<Node>),
    And(Vec<Node>),
    Or(Vec<Node>),
}

impl Node {
    fn is_compound(&self) -> bool {
        matches!(self, Node::And(_) | Node::Or(_))
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, QueryParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::RParen));
                i += 1;
            }
            ':' => {
                tokens.push((i, Token::Colon));
                i += 1;
            }
            '&' if next == Some('&') => {
                tokens.push((i, Token::And));
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push((i, Token::Or));
                i += 2;
            }
            '!' => {
                tokens.push((i, Token::Not));
                i += 1;
            }
            '"' => {
                let start = i;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(QueryParseError::UnterminatedQuote { position: start }),
                        Some('\\') if i + 1 < chars.len() => {
                            text.push(chars[i + 1]);
                            i += 2;
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            text.push(*ch);
                            i += 1;
                        }
                    }
                }
                tokens.push((start, Token::Quoted(text)));
            }
            _ => {
                let start = i;
                let mut word = String::new();
                while i < chars.len()
                    && !chars[i].is_whitespace()
                    && !matches!(chars[i], '(' | ')' | ':' | '"')
                {
                    word.push(chars[i]);
                    i += 1;
                }
                let token = match word.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Word(word),
                };
                tokens.push((start, token));
            }
        }
    }

    Ok(tokens)
}

/// 括号和否定的最大嵌套层数
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> Result<(usize, Token), QueryParseError> {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(QueryParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(item)
    }

    fn nested<T>(
        &mut self,
        position: usize,
        parse: impl FnOnce(&mut Self) -> Result<T, QueryParseError>,
    ) -> Result<T, QueryParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(QueryParseError::TooDeep {
                position,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Node, QueryParseError> {
        let mut items = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            items.push(self.parse_and()?);
        }
        Ok(collapse(items, Node::Or))
    }

    fn parse_and(&mut self) -> Result<Node, QueryParseError> {
        let mut items = vec![self.parse_unary()?];
        loop {
            if self.eat(&Token::And) {
                items.push(self.parse_unary()?);
            } else if matches!(
                self.peek(),
                Some(Token::LParen | Token::Not | Token::Word(_) | Token::Quoted(_))
            ) {
                items.push(self.parse_unary()?);
            } else {
                break;
            }
        }
        Ok(collapse(items, Node::And))
    }

    fn parse_unary(&mut self) -> Result<Node, QueryParseError> {
        if self.peek() == Some(&Token::Not) {
            let (position, _) = self.next()?;
            let inner = self.nested(position, Self::parse_unary)?;
            return Ok(Node::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, QueryParseError> {
        let (position, token) = self.next()?;
        match token {
            Token::LParen => self.nested(position, Self::parse_group),
            Token::Word(name) if self.peek() == Some(&Token::Colon) => {
                self.pos += 1;
                let value = self.parse_field_value()?;
                Ok(Node::Field {
                    name,
                    value: Box::new(value),
                })
            }
            Token::Word(word) => Ok(Node::Term(word)),
            Token::Quoted(phrase) => Ok(Node::Phrase(phrase)),
            other => Err(QueryParseError::UnexpectedToken {
                position,
                token: other.text(),
            }),
        }
    }

    fn parse_field_value(&mut self) -> Result<Node, QueryParseError> {
        let (position, token) = self.next()?;
        match token {
            Token::Word(word) => Ok(Node::Term(word)),
            Token::Quoted(phrase) => Ok(Node::Phrase(phrase)),
            Token::LParen => self.nested(position, Self::parse_group),
            other => Err(QueryParseError::UnexpectedToken {
                position,
                token: other.text(),
            }),
        }
    }

    /// 已消费左括号
    fn parse_group(&mut self) -> Result<Node, QueryParseError> {
        let inner = self.parse_or()?;
        let (position, token) = self.next()?;
        if token != Token::RParen {
            return Err(QueryParseError::UnexpectedToken {
                position,
                token: token.text(),
            });
        }
        Ok(inner)
    }
}

fn collapse(mut items: Vec<Node>, wrap: fn(Vec<Node>) -> Node) -> Node {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}

fn parse(input: &str) -> Result<Node, QueryParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(QueryParseError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let node = parser.parse_or()?;

    if let Some((position, token)) = parser.tokens.get(parser.pos) {
        return Err(QueryParseError::UnexpectedToken {
            position: *position,
            token: token.text(),
        });
    }
    Ok(node)
}

fn render(node: &Node) -> String {
    match node {
        Node::Term(word) => word.clone(),
        Node::Phrase(phrase) => format!("\"{}\"", phrase),
        Node::Field { name, value } => format!("{} is {}", name, render_nested(value)),
        Node::Not(inner) => format!("not {}", render_nested(inner)),
        Node::And(items) => render_list(items, "and"),
        Node::Or(items) => render_list(items, "or"),
    }
}

fn render_nested(node: &Node) -> String {
    match node {
        Node::And(items) => format!("both {}", render_list(items, "and")),
        Node::Or(items) => format!("either {}", render_list(items, "or")),
        other => render(other),
    }
}

fn render_list(items: &[Node], conjunction: &str) -> String {
    let separator = if items.iter().any(Node::is_compound) {
        format!(", {} ", conjunction)
    } else {
        format!(" {} ", conjunction)
    };
    items
        .iter()
        .map(render_nested)
        .collect::<Vec<_>>()
        .join(&separator)
}

/// 把布尔检索语句翻译成自然语言
pub fn parse_narrative(query: &str) -> Result<String, QueryParseError> {
    parse(query).map(|node| render(&node))
}

/// 尽力翻译；失败时原样返回输入
pub fn narrative(query: &str) -> String {
    match parse_narrative(query) {
        Ok(text) => text,
        Err(e) => {
            warn!("无法解析检索语句 '{}': {}", query, e);
            query.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompt_builder::brand_query;

    #[test]
    fn test_brand_query_narrative() {
        assert_eq!(
            narrative(&brand_query("BMW")),
            r#"either brand is "BMW" or company is "BMW", and either news or announcement or press"#
        );
    }

    #[test]
    fn test_not_and_implicit_and() {
        assert_eq!(narrative("tesla AND NOT recall"), "tesla and not recall");
        assert_eq!(narrative("electric cars"), "electric and cars");
        assert_eq!(narrative("tesla && !recall || ford"), "both tesla and not recall, or ford");
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(narrative("a OR (b AND c)"), "a, or both b and c");
        assert_eq!(
            narrative(r#"topic:(ev OR hybrid) "model 3""#),
            r#"topic is either ev or hybrid and "model 3""#
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_narrative(""), Err(QueryParseError::Empty));
        assert_eq!(parse_narrative("(tesla"), Err(QueryParseError::UnexpectedEnd));
        assert_eq!(
            parse_narrative("\"open"),
            Err(QueryParseError::UnterminatedQuote { position: 0 })
        );
        assert_eq!(
            parse_narrative("AND tesla"),
            Err(QueryParseError::UnexpectedToken {
                position: 0,
                token: "AND".to_string()
            })
        );
        assert_eq!(
            parse_narrative("tesla )"),
            Err(QueryParseError::UnexpectedToken {
                position: 6,
                token: ")".to_string()
            })
        );
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let negations = format!("{}tesla", "!".repeat(10_000));
        assert_eq!(
            parse_narrative(&negations),
            Err(QueryParseError::TooDeep {
                position: MAX_DEPTH,
                limit: MAX_DEPTH
            })
        );
        assert_eq!(narrative(&negations), negations);

        let groups = format!("{}tesla", "(".repeat(10_000));
        assert_eq!(
            parse_narrative(&groups),
            Err(QueryParseError::TooDeep {
                position: MAX_DEPTH,
                limit: MAX_DEPTH
            })
        );

        let at_limit = format!("{}tesla{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse_narrative(&at_limit), Ok("tesla".to_string()));
    }

    #[test]
    fn test_narrative_falls_back_to_input() {
        assert_eq!(narrative("brand:(BMW"), "brand:(BMW");
        assert_eq!(narrative("   "), "   ");
    }
}
