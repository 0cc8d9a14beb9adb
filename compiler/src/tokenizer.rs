use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::FlatrecError;

lazy_static! {
    pub static ref TOKEN_REGEX:    Regex = Regex::new(r"((?:-|\b)\d+\b|[;{}<>\[\]]|\b[A-Za-z_][A-Za-z0-9_]*\b|//.*|\s+)").unwrap();
    pub static ref WHITESPACE_RX:  Regex = Regex::new(r"^(//.*|\s+)$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Split schema text into tokens, dropping whitespace and `//` comments.
/// The last token is always an empty EOF marker.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, FlatrecError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end   = mat.end();
        let part  = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !WHITESPACE_RX.is_match(part) {
            tokens.push(Token {
                text:   part.to_string(),
                line,
                column,
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.len() + 1;
            }
        } else {
            column += part.len();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    tokens.push(Token {
        text:   "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_field() {
        let input = "u32 fee;";
        let expected = vec![
            Token { text: "u32".into(), line: 1, column: 1 },
            Token { text: "fee".into(), line: 1, column: 5 },
            Token { text: ";".into(),   line: 1, column: 8 },
            Token { text: "".into(),    line: 1, column: 9 },
        ];
        let got = tokenize_schema(input).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_tokenize_text_buffer_and_dims() {
        let input = "chars<128> fum[2];";
        let texts: Vec<_> = tokenize_schema(input)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["chars", "<", "128", ">", "fum", "[", "2", "]", ";", ""]);
    }

    #[test]
    fn test_tokenize_tracks_lines_and_skips_comments() {
        let input = "// header\nstruct t0 {\n  u8 a; // trailing\n}";
        let tokens = tokenize_schema(input).unwrap();
        assert_eq!(tokens[0], Token { text: "struct".into(), line: 2, column: 1 });
        assert_eq!(tokens[3], Token { text: "u8".into(),     line: 3, column: 3 });
        assert_eq!(tokens.last().unwrap().line, 4);
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let input = "u32 x = 10;";
        let err = tokenize_schema(input).unwrap_err();
        assert!(
            matches!(err, FlatrecError::ParseError { line: 1, column: 7, .. }),
            "expected a ParseError but got {:?}",
            err
        );
    }
}
