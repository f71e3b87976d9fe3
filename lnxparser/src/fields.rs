use std::net::Ipv4Addr;
use std::str::SplitAsciiWhitespace;

use ipnet::Ipv4Net;
use log::warn;

use crate::error::FieldError;

/// Longest interface name accepted in `interface` and `neighbor` directives
pub const MAX_NAME_LEN: usize = 32;
/// Longest prefix length literal, in digits
const MAX_PREFIX_DIGITS: usize = 2;
pub const MAX_PREFIX_LEN: u8 = 32;

/// Positional scanner over the fields that follow a directive keyword.
///
/// Every accessor consumes exactly one whitespace-delimited token. Once all
/// fields of a directive are taken, [`Fields::finish`] checks that nothing but
/// an optional `#` comment is left on the line.
#[derive(Debug)]
pub(crate) struct Fields<'a> {
    tokens: SplitAsciiWhitespace<'a>,
    in_comment: bool,
}

impl<'a> Fields<'a> {
    pub fn new(rest: &'a str) -> Self {
        Fields {
            tokens: rest.split_ascii_whitespace(),
            in_comment: false,
        }
    }

    /// Next raw token, or a syntax error naming the missing field
    pub fn next(&mut self, what: &str) -> Result<&'a str, FieldError> {
        if self.in_comment {
            return Err(missing(what));
        }
        match self.tokens.next() {
            Some(token) if !token.starts_with('#') => Ok(token),
            _ => Err(missing(what)),
        }
    }

    /// Consumes a literal keyword such as `at` or `via`
    pub fn keyword(&mut self, keyword: &str) -> Result<(), FieldError> {
        let token = self.next(&format!("`{keyword}`"))?;
        if token != keyword {
            return Err(FieldError::syntax(format!(
                "expected `{keyword}`, found {token:?}"
            )));
        }
        Ok(())
    }

    pub fn name(&mut self, what: &str) -> Result<String, FieldError> {
        let token = self.next(what)?;
        bounded_name(token, what)
    }

    /// Like [`Fields::name`], but `#` also ends the name; whatever follows it
    /// is a comment.
    pub fn name_until_comment(&mut self, what: &str) -> Result<String, FieldError> {
        let token = self.next(what)?;
        let name = match token.split_once('#') {
            Some((name, _)) => {
                self.in_comment = true;
                name
            }
            None => token,
        };
        bounded_name(name, what)
    }

    pub fn addr(&mut self, what: &str) -> Result<Ipv4Addr, FieldError> {
        parse_addr(self.next(what)?)
    }

    pub fn number(&mut self, what: &str) -> Result<u64, FieldError> {
        parse_u64(self.next(what)?)
    }

    /// Rejects anything left on the line that isn't a comment
    pub fn finish(mut self) -> Result<(), FieldError> {
        if self.in_comment {
            return Ok(());
        }
        match self.tokens.next() {
            None => Ok(()),
            Some(token) if token.starts_with('#') => Ok(()),
            Some(token) => Err(FieldError::syntax(format!(
                "unexpected trailing token {token:?}"
            ))),
        }
    }
}

fn missing(what: &str) -> FieldError {
    FieldError::syntax(format!("Did not find enough tokens (missing {what})"))
}

fn bounded_name(name: &str, what: &str) -> Result<String, FieldError> {
    if name.is_empty() {
        return Err(missing(what));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(FieldError::syntax(format!(
            "{what} {name:?} is longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Strict dotted-decimal IPv4: four components, each 0-255, nothing left over
pub(crate) fn parse_addr(text: &str) -> Result<Ipv4Addr, FieldError> {
    text.parse::<Ipv4Addr>()
        .map_err(|source| FieldError::InvalidAddress {
            text: text.to_string(),
            source,
        })
}

/// Unsigned decimal literal. Signs, hex and empty strings are rejected.
pub(crate) fn parse_u64(text: &str) -> Result<u64, FieldError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::number(text, "not an unsigned decimal integer"));
    }
    text.parse::<u64>()
        .map_err(|e| FieldError::number(text, e.to_string()))
}

pub(crate) fn parse_prefix_len(text: &str) -> Result<u8, FieldError> {
    if text.len() > MAX_PREFIX_DIGITS {
        return Err(FieldError::number(
            text,
            format!("prefix length has more than {MAX_PREFIX_DIGITS} digits"),
        ));
    }
    let value = parse_u64(text)?;
    if value > u64::from(MAX_PREFIX_LEN) {
        return Err(FieldError::number(
            text,
            format!("prefix length out of range 0-{MAX_PREFIX_LEN}"),
        ));
    }
    // At most 32 here
    Ok(value as u8)
}

/// Ports are stored in 16 bits; larger literals wrap around (value mod 65536)
pub(crate) fn parse_port(text: &str) -> Result<u16, FieldError> {
    let value = parse_u64(text)?;
    let port = (value % (u64::from(u16::MAX) + 1)) as u16;
    if u64::from(port) != value {
        warn!("port {value} does not fit in 16 bits, truncated to {port}");
    }
    Ok(port)
}

fn split_field<'a>(
    text: &'a str,
    delim: char,
    shape: &str,
) -> Result<(&'a str, &'a str), FieldError> {
    text.split_once(delim)
        .ok_or_else(|| FieldError::syntax(format!("expected {shape}, found {text:?}")))
}

/// `<addr>/<prefix>`. Host bits are kept as written.
pub(crate) fn parse_addr_prefix(text: &str) -> Result<Ipv4Net, FieldError> {
    let (addr, prefix) = split_field(text, '/', "<addr>/<prefix>")?;
    let addr = parse_addr(addr)?;
    let prefix_len = parse_prefix_len(prefix)?;
    Ipv4Net::new(addr, prefix_len).map_err(|e| FieldError::number(prefix, e.to_string()))
}

/// `<addr>:<port>`
pub(crate) fn parse_addr_port(text: &str) -> Result<(Ipv4Addr, u16), FieldError> {
    let (addr, port) = split_field(text, ':', "<addr>:<port>")?;
    Ok((parse_addr(addr)?, parse_port(port)?))
}
