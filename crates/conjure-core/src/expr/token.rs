//! Lexer for the expression language

use crate::error::CompileError;

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),

    // Keywords
    Fn,
    Let,
    If,
    Else,
    True,
    False,
    Nil,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Assign,
    Dot,
    Colon,
    Arrow,
}

impl Token {
    /// Human-readable rendering used in parse error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Int(v) => format!("integer {}", v),
            Token::Float(v) => format!("float {}", v),
            Token::Str(_) => "string literal".to_string(),
            Token::Fn => "'fn'".to_string(),
            Token::Let => "'let'".to_string(),
            Token::If => "'if'".to_string(),
            Token::Else => "'else'".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::Nil => "'nil'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
            Token::Bang => "'!'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Assign => "'='".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Arrow => "'->'".to_string(),
        }
    }
}

/// A token together with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Whether `name` is a keyword of the language
pub fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "fn" | "let" | "if" | "else" | "true" | "false" | "nil"
    )
}

/// Whether `name` is usable as a function or parameter identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let leading_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    leading_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_keyword(name)
}

/// Tokenize a source string
///
/// `#` starts a line comment. Strings use double quotes with `\n`, `\t`,
/// `\"`, `\\` and `\r` escapes.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, CompileError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        if c == '#' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        let start = pos;

        if c.is_ascii_alphabetic() || c == '_' {
            let mut name = String::new();
            while pos < chars.len()
                && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
            {
                name.push(chars[pos]);
                pos += 1;
            }
            let token = match name.as_str() {
                "fn" => Token::Fn,
                "let" => Token::Let,
                "if" => Token::If,
                "else" => Token::Else,
                "true" => Token::True,
                "false" => Token::False,
                "nil" => Token::Nil,
                _ => Token::Ident(name),
            };
            tokens.push(Spanned { token, offset: start });
            continue;
        }

        if c.is_ascii_digit() {
            let mut text = String::new();
            let mut is_float = false;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                text.push(chars[pos]);
                pos += 1;
            }
            // A dot is part of the number only when followed by a digit,
            // so `1.max(2)`-style field syntax stays unambiguous.
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                is_float = true;
                text.push('.');
                pos += 1;
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    text.push(chars[pos]);
                    pos += 1;
                }
            }
            let token = if is_float {
                Token::Float(
                    text.parse::<f64>()
                        .map_err(|_| CompileError::InvalidNumber(text.clone()))?,
                )
            } else {
                Token::Int(
                    text.parse::<i64>()
                        .map_err(|_| CompileError::InvalidNumber(text.clone()))?,
                )
            };
            tokens.push(Spanned { token, offset: start });
            continue;
        }

        if c == '"' {
            pos += 1;
            let mut value = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(CompileError::UnterminatedString(start));
                }
                match chars[pos] {
                    '"' => {
                        pos += 1;
                        break;
                    }
                    '\\' => {
                        pos += 1;
                        if pos >= chars.len() {
                            return Err(CompileError::UnterminatedString(start));
                        }
                        match chars[pos] {
                            'n' => value.push('\n'),
                            't' => value.push('\t'),
                            'r' => value.push('\r'),
                            '"' => value.push('"'),
                            '\\' => value.push('\\'),
                            other => {
                                return Err(CompileError::UnexpectedChar(other, pos));
                            }
                        }
                        pos += 1;
                    }
                    other => {
                        value.push(other);
                        pos += 1;
                    }
                }
            }
            tokens.push(Spanned {
                token: Token::Str(value),
                offset: start,
            });
            continue;
        }

        let (token, width) = match c {
            '+' => (Token::Plus, 1),
            '-' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '>' {
                    (Token::Arrow, 2)
                } else {
                    (Token::Minus, 1)
                }
            }
            '*' => (Token::Star, 1),
            '/' => (Token::Slash, 1),
            '%' => (Token::Percent, 1),
            '=' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    (Token::EqEq, 2)
                } else {
                    (Token::Assign, 1)
                }
            }
            '!' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    (Token::NotEq, 2)
                } else {
                    (Token::Bang, 1)
                }
            }
            '<' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    (Token::LtEq, 2)
                } else {
                    (Token::Lt, 1)
                }
            }
            '>' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    (Token::GtEq, 2)
                } else {
                    (Token::Gt, 1)
                }
            }
            '&' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '&' {
                    (Token::AndAnd, 2)
                } else {
                    return Err(CompileError::UnexpectedChar(c, pos));
                }
            }
            '|' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '|' {
                    (Token::OrOr, 2)
                } else {
                    return Err(CompileError::UnexpectedChar(c, pos));
                }
            }
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '{' => (Token::LBrace, 1),
            '}' => (Token::RBrace, 1),
            '[' => (Token::LBracket, 1),
            ']' => (Token::RBracket, 1),
            ',' => (Token::Comma, 1),
            ';' => (Token::Semicolon, 1),
            '.' => (Token::Dot, 1),
            ':' => (Token::Colon, 1),
            other => return Err(CompileError::UnexpectedChar(other, pos)),
        };
        tokens.push(Spanned { token, offset: start });
        pos += width;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_tokenize_fn_header() {
        assert_eq!(
            kinds("fn add(x, y) {"),
            vec![
                Token::Fn,
                Token::Ident("add".to_string()),
                Token::LParen,
                Token::Ident("x".to_string()),
                Token::Comma,
                Token::Ident("y".to_string()),
                Token::RParen,
                Token::LBrace,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            kinds("1 2.5 -3"),
            vec![
                Token::Int(1),
                Token::Float(2.5),
                Token::Minus,
                Token::Int(3),
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_and_arrow() {
        assert_eq!(
            kinds("== != <= >= && || ->"),
            vec![
                Token::EqEq,
                Token::NotEq,
                Token::LtEq,
                Token::GtEq,
                Token::AndAnd,
                Token::OrOr,
                Token::Arrow,
            ]
        );
    }

    #[test]
    fn test_tokenize_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\"c""#),
            vec![Token::Str("a\nb\"c".to_string())]
        );
    }

    #[test]
    fn test_tokenize_comments_skipped() {
        assert_eq!(
            kinds("1 # trailing comment\n2"),
            vec![Token::Int(1), Token::Int(2)]
        );
    }

    #[test]
    fn test_tokenize_rejects_stray_character() {
        assert!(matches!(
            tokenize("a @ b"),
            Err(CompileError::UnexpectedChar('@', _))
        ));
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        assert!(matches!(
            tokenize("\"oops"),
            Err(CompileError::UnterminatedString(_))
        ));
    }

    #[test]
    fn test_identifier_validity() {
        assert!(is_identifier("snake_case2"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("fn"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("kebab-case"));
    }
}
