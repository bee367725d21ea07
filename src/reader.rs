// ABOUTME: Surface reader — turns source text into a generic syntax tree (§4.C, §6)

use crate::error::ParseError;
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, opt, recognize, value},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, preceded},
    Err as NomErr, IResult, Parser,
};

/// The generic syntax tree §4.C's parser consumes: `Number | SymbolicAtom |
/// TrueAtom | FalseAtom | StringAtom | List(children)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    Int(i64),
    Sym(String),
    Bool(bool),
    Str(String),
    List(Vec<Sexp>),
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws(input: &str) -> IResult<&str, ()> {
    map(many0(alt((value((), multispace1), line_comment))), |_| ()).parse(input)
}

/// `digit1` only guarantees the token is all digits, not that it fits
/// `i64` — a literal like `99999999999999999999` parses fine as a token
/// but overflows on conversion. Fail hard (`Err::Failure`) rather than
/// falling back to `parse_symbol`, so the reader reports it as the
/// malformed token it is instead of silently reinterpreting it as an
/// identifier.
fn parse_int(input: &str) -> IResult<&str, Sexp> {
    let (rest, digits) = recognize((opt(char('-')), digit1)).parse(input)?;
    match digits.parse::<i64>() {
        Ok(n) => Ok((rest, Sexp::Int(n))),
        Err(_) => Err(NomErr::Failure(NomError::new(input, ErrorKind::Digit))),
    }
}

fn parse_bool(input: &str) -> IResult<&str, Sexp> {
    alt((
        value(Sexp::Bool(true), tag("#t")),
        value(Sexp::Bool(false), tag("#f")),
    ))
    .parse(input)
}

fn parse_string(input: &str) -> IResult<&str, Sexp> {
    map(
        delimited(
            char('"'),
            opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                    value('\n', char('n')),
                    value('\t', char('t')),
                    value('\\', char('\\')),
                    value('"', char('"')),
                )),
            )),
            char('"'),
        ),
        |s: Option<String>| Sexp::Str(s.unwrap_or_default()),
    )
    .parse(input)
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')' && c != '\'' && c != '"' && c != ';'
}

fn parse_symbol(input: &str) -> IResult<&str, Sexp> {
    map(take_while1(is_symbol_char), |s: &str| Sexp::Sym(s.to_string())).parse(input)
}

fn parse_atom(input: &str) -> IResult<&str, Sexp> {
    alt((parse_bool, parse_int, parse_string, parse_symbol)).parse(input)
}

fn parse_quote(input: &str) -> IResult<&str, Sexp> {
    map(preceded(char('\''), parse_sexp), |quoted| {
        Sexp::List(vec![Sexp::Sym("quote".to_string()), quoted])
    })
    .parse(input)
}

fn parse_list(input: &str) -> IResult<&str, Sexp> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, items) = many0(|i| {
        let (i, item) = parse_sexp(i)?;
        let (i, _) = ws(i)?;
        Ok((i, item))
    })
    .parse(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, Sexp::List(items)))
}

fn parse_sexp(input: &str) -> IResult<&str, Sexp> {
    alt((parse_list, parse_quote, parse_atom)).parse(input)
}

/// Reads one top-level form, returning it along with the unconsumed input.
/// Used by the REPL driver to pull forms off of a stream one at a time.
pub fn read_one(input: &str) -> Result<Option<(Sexp, &str)>, ParseError> {
    let (rest, _) = ws(input).map_err(|_| ParseError::UnexpectedEof)?;
    if rest.is_empty() {
        return Ok(None);
    }
    match parse_sexp(rest) {
        Ok((rest, sexp)) => Ok(Some((sexp, rest))),
        Err(_) => Err(ParseError::UnexpectedToken(
            rest.chars().take(40).collect::<String>(),
        )),
    }
}

/// Reads every top-level form in `input`, erroring if trailing garbage
/// remains after the last well-formed form.
pub fn read_all(input: &str) -> Result<Vec<Sexp>, ParseError> {
    let mut forms = Vec::new();
    let mut rest = input;
    while let Some((sexp, tail)) = read_one(rest)? {
        forms.push(sexp);
        rest = tail;
    }
    Ok(forms)
}
