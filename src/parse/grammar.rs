use std::borrow::Cow;

use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{take_till, take_until, take_while};

/// One markup construct, as found at the front of the remaining input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'i> {
    Start {
        name: &'i str,
        attributes: Vec<RawAttribute<'i>>,
        empty: bool,
    },
    End {
        name: &'i str,
    },
    Text(&'i str),
    CData(&'i str),
    Comment,
    Instruction,
    Doctype,
}

/// An attribute exactly as written, before entity expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawAttribute<'i> {
    pub(crate) name: &'i str,
    pub(crate) value: &'i str,
}

// -- Names ------------------------------------------------------------------

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_numeric() || c == '-' || c == '.'
}

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (take_while(1, is_name_start), take_while(0.., is_name_char))
        .take()
        .parse_next(input)
}

// -- Tags -------------------------------------------------------------------

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        delimited('"', take_till(0.., |c: char| c == '"' || c == '<'), '"'),
        delimited('\'', take_till(0.., |c: char| c == '\'' || c == '<'), '\''),
    ))
    .parse_next(input)
}

fn attribute<'i>(input: &mut &'i str) -> ModalResult<RawAttribute<'i>> {
    let name = preceded(multispace1, name).parse_next(input)?;
    let _ = cut_err((multispace0, '=', multispace0))
        .context(StrContext::Expected(StrContextValue::CharLiteral('=')))
        .parse_next(input)?;
    let value = cut_err(quoted)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted attribute value",
        )))
        .parse_next(input)?;
    Ok(RawAttribute { name, value })
}

fn start_tag<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    '<'.parse_next(input)?;
    let name = name.parse_next(input)?;
    let attributes: Vec<RawAttribute<'i>> = repeat(0.., attribute).parse_next(input)?;
    multispace0.parse_next(input)?;
    let empty = cut_err(alt(("/>".value(true), '>'.value(false))))
        .context(StrContext::Label("start tag"))
        .context(StrContext::Expected(StrContextValue::StringLiteral(">")))
        .parse_next(input)?;
    Ok(Token::Start {
        name,
        attributes,
        empty,
    })
}

fn end_tag<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    let name = delimited(
        "</",
        cut_err(name).context(StrContext::Label("end tag")),
        cut_err((multispace0, '>'))
            .context(StrContext::Expected(StrContextValue::CharLiteral('>'))),
    )
    .parse_next(input)?;
    Ok(Token::End { name })
}

// -- Everything that is not an element --------------------------------------

fn comment<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    preceded(
        "<!--",
        cut_err(terminated(take_until(0.., "-->"), "-->")).context(StrContext::Label("comment")),
    )
    .map(|_| Token::Comment)
    .parse_next(input)
}

fn cdata<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    preceded(
        "<![CDATA[",
        cut_err(terminated(take_until(0.., "]]>"), "]]>"))
            .context(StrContext::Label("CDATA section")),
    )
    .map(Token::CData)
    .parse_next(input)
}

/// A quoted literal inside a DOCTYPE; may contain `]`, `>`, and `<`.
fn literal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

/// The bracketed internal subset. Declarations are skipped, not interpreted:
/// entities declared here are not available to attribute values.
fn internal_subset(input: &mut &str) -> ModalResult<()> {
    (
        '[',
        repeat::<_, _, (), _, _>(
            0..,
            alt((
                literal.void(),
                take_till(1.., |c: char| c == '"' || c == '\'' || c == ']').void(),
            )),
        ),
        ']',
    )
        .void()
        .parse_next(input)
}

fn doctype<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    "<!DOCTYPE".parse_next(input)?;
    let _ = cut_err((
        repeat::<_, _, (), _, _>(
            0..,
            alt((
                literal.void(),
                take_till(1.., |c: char| c == '[' || c == '>' || c == '"' || c == '\'').void(),
            )),
        ),
        opt(internal_subset),
        multispace0,
        '>',
    ))
    .context(StrContext::Label("document type declaration"))
    .parse_next(input)?;
    Ok(Token::Doctype)
}

fn instruction<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    preceded(
        "<?",
        cut_err(terminated(take_until(0.., "?>"), "?>"))
            .context(StrContext::Label("processing instruction")),
    )
    .map(|_| Token::Instruction)
    .parse_next(input)
}

fn text<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    take_till(1.., '<').map(Token::Text).parse_next(input)
}

// -- Top-level token --------------------------------------------------------

pub(crate) fn token<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    alt((
        comment,
        cdata,
        doctype,
        instruction,
        end_tag,
        start_tag,
        text,
    ))
    .context(StrContext::Expected(StrContextValue::Description("markup")))
    .parse_next(input)
}

/// Render a winnow failure as a one-line message.
pub(crate) fn describe(err: ErrMode<ContextError>) -> String {
    match err {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let msg = e.to_string().replace('\n', "; ");
            if msg.is_empty() {
                "malformed markup".to_owned()
            } else {
                msg
            }
        }
        ErrMode::Incomplete(_) => "unexpected end of input".to_owned(),
    }
}

/// Expand the predefined and numeric character references in an attribute
/// value. Borrows when there is nothing to expand.
pub(crate) fn unescape(raw: &str) -> Result<Cow<'_, str>, String> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let semi = tail
            .find(';')
            .ok_or_else(|| format!("unterminated entity reference in '{raw}'"))?;
        let entity = &tail[..semi];
        let ch = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| format!("unknown entity reference '&{entity};'"))?
            }
        };
        out.push(ch);
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    Ok(Cow::Owned(out))
}
