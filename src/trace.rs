use std::path::Path;

use winnow::combinator::{alt, delimited, dispatch, fail, separated};
use winnow::error::{ContextError, ErrMode, ParseError, StrContext, StrContextValue};
use winnow::token::{take, take_while};
use winnow::{ModalResult, Parser};

use crate::error::SimError;

/// How digit strings without a `0x`/`0b`/`0o` prefix are read.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TraceEncoding {
    #[default]
    Decimal,
    Binary,
}

impl TraceEncoding {
    fn radix(self) -> u32 {
        match self {
            TraceEncoding::Decimal => 10,
            TraceEncoding::Binary => 2,
        }
    }
}

/// An ordered list of accessed addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    name: String,
    addresses: Vec<u64>,
}

impl Trace {
    pub fn new(name: impl Into<String>, addresses: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            addresses,
        }
    }

    /// Parses comma and/or whitespace separated addresses.
    ///
    /// A trace without a single address is rejected.
    pub fn parse(
        name: impl Into<String>,
        input: &str,
        encoding: TraceEncoding,
    ) -> Result<Self, SimError> {
        let name = name.into();
        let addresses = parse_addresses(input, encoding).map_err(|e| SimError::TraceSyntax {
            name: name.clone(),
            message: e.to_string(),
        })?;

        if addresses.is_empty() {
            return Err(SimError::trace_unavailable(
                name,
                "trace contains no addresses",
            ));
        }

        log::debug!("trace '{name}': {} addresses", addresses.len());
        Ok(Self { name, addresses })
    }

    pub fn from_file(path: impl AsRef<Path>, encoding: TraceEncoding) -> Result<Self, SimError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file_content =
            std::fs::read_to_string(path).map_err(|e| SimError::trace_unavailable(&name, e))?;

        Self::parse(name, &file_content, encoding)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addresses(&self) -> &[u64] {
        &self.addresses
    }
}

impl IntoIterator for Trace {
    type Item = u64;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.into_iter()
    }
}

pub fn parse_addresses(
    input: &str,
    encoding: TraceEncoding,
) -> Result<Vec<u64>, ParseError<&str, ContextError>> {
    delimited(
        separators(0),
        separated(0.., move |i: &mut &str| address(i, encoding), separators(1)),
        separators(0),
    )
    .parse(input)
}

fn separators<'i>(min: usize) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    take_while(min.., |c: char| c == ',' || c.is_whitespace())
        .context(StrContext::Label("separator"))
        .context(StrContext::Expected(StrContextValue::Description(
            "',' or whitespace between addresses",
        )))
}

fn address(input: &mut &str, encoding: TraceEncoding) -> ModalResult<u64> {
    // a prefix always wins over the default encoding
    alt((prefixed_integer, digits(encoding.radix())))
        .context(StrContext::Label("address"))
        .parse_next(input)
}

fn prefixed_integer(input: &mut &str) -> ModalResult<u64> {
    dispatch! {
        take(2usize);
        "0b" => digits(2),
        "0o" => digits(8),
        "0x" => digits(16),
        _ => fail::<_, u64, _>,
    }
    .parse_next(input)
}

fn digits<'i>(radix: u32) -> impl Parser<&'i str, u64, ErrMode<ContextError>> {
    take_while(1.., move |c: char| c.is_digit(radix))
        .try_map(move |s: &str| u64::from_str_radix(s, radix))
}
