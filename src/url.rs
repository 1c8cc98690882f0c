//! Strict remote URL grammar used to recognise plugins that are pinned to a
//! git repository instead of a registry version.
//!
//! Uses [`chumsky`] for the parsing grammar.
//!
//! ## Grammar
//!
//! ```text
//! url      = scheme "://" [userinfo "@"] host [":" port] [path]
//! scheme   = ALPHA (ALNUM | "+" | "-" | ".")*
//! userinfo = (any char except "@" "/" "?" "#" and whitespace)+
//! host     = label ("." label)+
//! label    = ALNUM (ALNUM | "-")*
//! port     = DIGIT+
//! path     = ("/" | "?" | "#") (any non-whitespace char)*
//! ```

use chumsky::prelude::*;

/// Pieces of a parsed remote URL, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteUrl<'a> {
    pub scheme: &'a str,
    pub userinfo: Option<&'a str>,
    pub host: &'a str,
    pub port: Option<&'a str>,
    pub path: &'a str,
}

fn url_parser<'a>() -> impl Parser<'a, &'a str, RemoteUrl<'a>, extra::Err<Simple<'a, char>>> {
    let scheme = any()
        .filter(|c: &char| c.is_ascii_alphabetic())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                .repeated(),
        )
        .to_slice();

    let userinfo = none_of("@/?# \t\r\n")
        .repeated()
        .at_least(1)
        .to_slice()
        .then_ignore(just('@'));

    let label = any()
        .filter(|c: &char| c.is_ascii_alphanumeric())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '-')
                .repeated(),
        );

    let host = label
        .separated_by(just('.'))
        .at_least(2)
        .collect::<Vec<_>>()
        .to_slice();

    let port = just(':').ignore_then(
        any()
            .filter(|c: &char| c.is_ascii_digit())
            .repeated()
            .at_least(1)
            .to_slice(),
    );

    let path = one_of("/?#")
        .then(any().filter(|c: &char| !c.is_whitespace()).repeated())
        .or_not()
        .to_slice();

    scheme
        .then_ignore(just("://"))
        .then(userinfo.or_not())
        .then(host)
        .then(port.or_not())
        .then(path)
        .then_ignore(end())
        .map(|((((scheme, userinfo), host), port), path)| RemoteUrl {
            scheme,
            userinfo,
            host,
            port,
            path,
        })
}

/// Parse `input` as a remote URL with an explicit host.
pub fn parse_url(input: &str) -> Result<RemoteUrl<'_>, String> {
    url_parser()
        .parse(input)
        .into_result()
        .map_err(|errs| {
            let messages: Vec<String> = errs.iter().map(|e| format!("{e}")).collect();
            format!("Failed to parse URL '{}': {}", input, messages.join("; "))
        })
}

/// `true` when `name` is a well-formed remote URL that mentions `.git`.
///
/// Plugins named this way carry their own location, so the name doubles as
/// the version spec.
pub fn is_git_url(name: &str) -> bool {
    name.contains(".git") && parse_url(name).is_ok()
}
