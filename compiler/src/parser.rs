use crate::{
    tokenizer::Token,
    types::{Definition, Field, Schema, TypeRef},
    utils::{error, quote},
    error::FlatrecError,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:      Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref SEMICOLON:       Regex = Regex::new(r"^;$").unwrap();
    static ref INTEGER:         Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref LEFT_BRACE:      Regex = Regex::new(r"^\{$").unwrap();
    static ref RIGHT_BRACE:     Regex = Regex::new(r"^\}$").unwrap();
    static ref LEFT_BRACKET:    Regex = Regex::new(r"^\[$").unwrap();
    static ref RIGHT_BRACKET:   Regex = Regex::new(r"^\]$").unwrap();
    static ref LEFT_ANGLE:      Regex = Regex::new(r"^<$").unwrap();
    static ref RIGHT_ANGLE:     Regex = Regex::new(r"^>$").unwrap();
    static ref STRUCT_KEYWORD:  Regex = Regex::new(r"^struct$").unwrap();
    static ref PACKAGE_KEYWORD: Regex = Regex::new(r"^package$").unwrap();
    static ref EOF:             Regex = Regex::new(r"^$").unwrap();
}

pub fn parse_schema(tokens: &[Token]) -> Result<Schema, FlatrecError> {
    let mut definitions  = Vec::new();
    let mut package_text = None;
    let mut index        = 0;

    if tokens.is_empty() {
        return Err(error("Unexpected end of input", 0, 0));
    }

    // Past the end, keep returning the EOF token.
    fn current_token(tokens: &[Token], index: usize) -> &Token {
        &tokens[index.min(tokens.len() - 1)]
    }

    fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> bool {
        if test.is_match(&current_token(tokens, *index).text) {
            *index += 1;
            true
        } else {
            false
        }
    }

    fn expect(tokens: &[Token], index: &mut usize, test: &Regex, expected: &str) -> Result<(), FlatrecError> {
        if !eat(tokens, index, test) {
            let tok = current_token(tokens, *index);
            return Err(error(
                &format!("Expected {} but found {}", expected, quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(())
    }

    fn unexpected_token(tokens: &[Token], index: &mut usize) -> FlatrecError {
        let tok = current_token(tokens, *index);
        error(
            &format!("Unexpected token {}", quote(&tok.text)),
            tok.line,
            tok.column,
        )
    }

    fn expect_count(tokens: &[Token], index: &mut usize) -> Result<u64, FlatrecError> {
        let tok = current_token(tokens, *index);
        expect(tokens, index, &INTEGER, "integer")?;
        tok.text.parse::<u64>().map_err(|_| {
            error(
                &format!("Invalid count {}", quote(&tok.text)),
                tok.line,
                tok.column,
            )
        })
    }

    if eat(tokens, &mut index, &PACKAGE_KEYWORD) {
        let pkg_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        package_text = Some(pkg_tok.text.clone());
        expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
    }

    while !eat(tokens, &mut index, &EOF) {
        if !eat(tokens, &mut index, &STRUCT_KEYWORD) {
            return Err(unexpected_token(tokens, &mut index));
        }

        let name_tok = current_token(tokens, index);
        expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
        expect(tokens, &mut index, &LEFT_BRACE, "\"{\"")?;

        let mut fields = Vec::new();
        while !eat(tokens, &mut index, &RIGHT_BRACE) {
            let t_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "type")?;

            // `chars<N>` and `cstr<N>` are the only parameterised types.
            let type_ = if eat(tokens, &mut index, &LEFT_ANGLE) {
                let capacity = expect_count(tokens, &mut index)?;
                expect(tokens, &mut index, &RIGHT_ANGLE, "\">\"")?;
                match t_tok.text.as_str() {
                    "chars" => TypeRef::Chars(capacity),
                    "cstr" => TypeRef::CStr(capacity),
                    other => {
                        return Err(error(
                            &format!("Type {} does not take a capacity", quote(other)),
                            t_tok.line,
                            t_tok.column,
                        ))
                    }
                }
            } else {
                TypeRef::Named(t_tok.text.clone())
            };

            let f_tok = current_token(tokens, index);
            expect(tokens, &mut index, &IDENTIFIER, "identifier")?;

            let mut dims = Vec::new();
            while eat(tokens, &mut index, &LEFT_BRACKET) {
                dims.push(expect_count(tokens, &mut index)?);
                expect(tokens, &mut index, &RIGHT_BRACKET, "\"]\"")?;
            }

            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;

            fields.push(Field {
                name:   f_tok.text.clone(),
                line:   f_tok.line,
                column: f_tok.column,
                type_,
                dims,
            });
        }

        definitions.push(Definition {
            name:   name_tok.text.clone(),
            line:   name_tok.line,
            column: name_tok.column,
            fields,
        });
    }

    Ok(Schema {
        package:     package_text,
        definitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_schema;

    fn parse(text: &str) -> Result<Schema, FlatrecError> {
        parse_schema(&tokenize_schema(text)?)
    }

    #[test]
    fn parses_package_and_text_buffers() {
        let schema = parse("package demo; struct s { cstr<16> name; chars<4> tag[3]; }").unwrap();
        assert_eq!(schema.package.as_deref(), Some("demo"));
        let fields = &schema.definitions[0].fields;
        assert_eq!(fields[0].type_, TypeRef::CStr(16));
        assert!(fields[0].dims.is_empty());
        assert_eq!(fields[1].type_, TypeRef::Chars(4));
        assert_eq!(fields[1].dims, vec![3]);
    }

    #[test]
    fn rejects_capacity_on_plain_type() {
        let err = parse("struct s { u8<4> x; }").unwrap_err();
        assert!(matches!(err, FlatrecError::ParseError { line: 1, column: 12, .. }), "{:?}", err);
    }

    #[test]
    fn rejects_negative_dimension() {
        let err = parse("struct s { u8 x[-1]; }").unwrap_err();
        match err {
            FlatrecError::ParseError { msg, .. } => assert!(msg.contains("Invalid count"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_semicolon() {
        let err = parse("struct s { u8 x }").unwrap_err();
        match err {
            FlatrecError::ParseError { msg, .. } => assert_eq!(msg, "Expected \";\" but found \"}\""),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_unterminated_struct() {
        assert!(parse("struct s { u8 x;").is_err());
    }

    #[test]
    fn rejects_unknown_top_level_keyword() {
        let err = parse("message m { }").unwrap_err();
        match err {
            FlatrecError::ParseError { msg, .. } => assert_eq!(msg, "Unexpected token \"message\""),
            other => panic!("unexpected {:?}", other),
        }
    }
}
