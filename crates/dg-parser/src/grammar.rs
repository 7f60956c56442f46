//! Line grammar: a line is either a declaration or a chain.
//!
//! ```text
//! declaration := letters ':=' quoted
//! chain       := element (link element)*
//! element     := enclosed-literal | enclosed-reference
//! link        := '->' | '<-'
//! ```

use dg_core::{Enclosure, LinkOperator};

use crate::scanner::{
    ScanError, scan_enclosed_literal, scan_enclosed_reference, scan_letters, scan_quoted,
    skip_blank,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Inline quoted text, addressed by its content.
    Literal,
    /// A declared name.
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainElement {
    pub kind: ElementKind,
    pub enclosure: Enclosure,
    pub text: String,
}

/// Elements joined by operators; `operators.len() + 1 == elements.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub elements: Vec<ChainElement>,
    pub operators: Vec<LinkOperator>,
}

impl Chain {
    /// `(left, operator, right)` for every link in source order.
    pub fn links(&self) -> impl Iterator<Item = (&ChainElement, LinkOperator, &ChainElement)> {
        self.elements
            .windows(2)
            .zip(&self.operators)
            .map(|(pair, operator)| (&pair[0], *operator, &pair[1]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Declaration(Declaration),
    Chain(Chain),
}

/// Runs `first`, then `second` if it failed. When both fail, the error that
/// got further into the line wins; ties go to `first`.
pub fn deepest_of<T>(
    first: impl FnOnce() -> Result<T, ScanError>,
    second: impl FnOnce() -> Result<T, ScanError>,
) -> Result<T, ScanError> {
    let first_err = match first() {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    match second() {
        Ok(value) => Ok(value),
        Err(second_err) if second_err.pos > first_err.pos => Err(second_err),
        Err(_) => Err(first_err),
    }
}

/// Parses a comment-free, trimmed line.
pub fn parse_statement(line: &[char]) -> Result<Statement, ScanError> {
    deepest_of(
        || parse_declaration(line).map(Statement::Declaration),
        || parse_chain(line).map(Statement::Chain),
    )
}

pub fn parse_declaration(line: &[char]) -> Result<Declaration, ScanError> {
    let start = skip_blank(line, 0);
    if start >= line.len() {
        return Err(ScanError::new("empty declaration", start));
    }

    let (name, pos) = scan_letters(line, start);
    if name.is_empty() {
        return Err(ScanError::new("invalid variable name", start));
    }

    let pos = skip_blank(line, pos);
    if !matches!(line.get(pos..pos + 2), Some([':', '='])) {
        return Err(ScanError::new("expected := after variable name", pos));
    }

    let value_start = skip_blank(line, pos + 2);
    let (value, pos) = scan_quoted(line, value_start)?;
    if value.is_empty() {
        return Err(ScanError::new("empty string value", value_start));
    }

    let pos = skip_blank(line, pos);
    if pos < line.len() {
        return Err(ScanError::new("trailing characters after declaration", pos));
    }

    Ok(Declaration { name, value })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    ExpectElement,
    ExpectLinkOrEnd,
}

pub fn parse_chain(line: &[char]) -> Result<Chain, ScanError> {
    let mut elements = Vec::new();
    let mut operators = Vec::new();
    let mut state = ChainState::ExpectElement;
    let mut pos = 0;

    loop {
        let next = skip_blank(line, pos);
        match state {
            ChainState::ExpectElement => {
                if next >= line.len() && !operators.is_empty() {
                    return Err(ScanError::new("dangling link", next));
                }
                let (element, end) = parse_element(line, pos)?;
                elements.push(element);
                pos = end;
                state = ChainState::ExpectLinkOrEnd;
            }
            ChainState::ExpectLinkOrEnd => {
                if next >= line.len() {
                    break;
                }
                let Some(operator) = line
                    .get(next..next + 2)
                    .and_then(LinkOperator::from_token)
                else {
                    return Err(ScanError::new("expected one of ->, <-", next));
                };
                operators.push(operator);
                pos = next + 2;
                state = ChainState::ExpectElement;
            }
        }
    }

    debug_assert_eq!(operators.len() + 1, elements.len());
    Ok(Chain {
        elements,
        operators,
    })
}

fn parse_element(line: &[char], pos: usize) -> Result<(ChainElement, usize), ScanError> {
    let element = |kind: ElementKind| {
        move |((text, enclosure), end): ((String, Enclosure), usize)| {
            (
                ChainElement {
                    kind,
                    enclosure,
                    text,
                },
                end,
            )
        }
    };

    deepest_of(
        || scan_enclosed_literal(line, pos).map(element(ElementKind::Literal)),
        || scan_enclosed_reference(line, pos).map(element(ElementKind::Reference)),
    )
    .map_err(|err| ScanError::new("expected a string or variable", err.pos))
}

#[cfg(test)]
mod tests {
    use dg_core::{Enclosure, LinkOperator};

    use super::{
        ChainElement, Declaration, ElementKind, Statement, deepest_of, parse_chain,
        parse_declaration, parse_statement,
    };
    use crate::scanner::ScanError;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn reference(name: &str, enclosure: Enclosure) -> ChainElement {
        ChainElement {
            kind: ElementKind::Reference,
            enclosure,
            text: name.to_string(),
        }
    }

    fn literal(text: &str, enclosure: Enclosure) -> ChainElement {
        ChainElement {
            kind: ElementKind::Literal,
            enclosure,
            text: text.to_string(),
        }
    }

    #[test]
    fn deepest_of_prefers_first_success() {
        let result: Result<u8, ScanError> = deepest_of(|| Ok(1), || Ok(2));
        assert_eq!(result, Ok(1));
        let result: Result<u8, ScanError> =
            deepest_of(|| Err(ScanError::new("a", 9)), || Ok(2));
        assert_eq!(result, Ok(2));
    }

    #[test]
    fn deepest_of_reports_furthest_error() {
        let result: Result<(), ScanError> = deepest_of(
            || Err(ScanError::new("first", 2)),
            || Err(ScanError::new("second", 5)),
        );
        assert_eq!(result, Err(ScanError::new("second", 5)));
    }

    #[test]
    fn deepest_of_breaks_ties_toward_first() {
        let result: Result<(), ScanError> = deepest_of(
            || Err(ScanError::new("first", 4)),
            || Err(ScanError::new("second", 4)),
        );
        assert_eq!(result, Err(ScanError::new("first", 4)));
    }

    #[test]
    fn declaration_parses_name_and_value() {
        let parsed = parse_declaration(&chars(r#"greeting := "Hello there""#));
        assert_eq!(
            parsed,
            Ok(Declaration {
                name: "greeting".to_string(),
                value: "Hello there".to_string(),
            })
        );
    }

    #[test]
    fn declaration_allows_tight_spacing() {
        let parsed = parse_declaration(&chars(r#"a:="x""#)).expect("declaration");
        assert_eq!(parsed.name, "a");
        assert_eq!(parsed.value, "x");
    }

    #[test]
    fn declaration_errors_are_distinct_and_positioned() {
        let cases = [
            ("", "empty declaration", 0),
            (r#"1 := "x""#, "invalid variable name", 0),
            (r#"abc = "x""#, "expected := after variable name", 4),
            ("abc := x", "invalid string", 7),
            (r#"abc := """#, "empty string value", 7),
            (r#"abc := "x" y"#, "trailing characters after declaration", 11),
        ];
        for (input, message, pos) in cases {
            assert_eq!(
                parse_declaration(&chars(input)),
                Err(ScanError::new(message, pos)),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn chain_of_single_element() {
        let chain = parse_chain(&chars(r#"["Hello"]"#)).expect("chain");
        assert_eq!(chain.elements, vec![literal("Hello", Enclosure::Rectangle)]);
        assert!(chain.operators.is_empty());
    }

    #[test]
    fn chain_mixes_literals_references_and_operators() {
        let chain =
            parse_chain(&chars(r#"[a] -> ("two") <- /c/ -> <"d">"#)).expect("chain");
        assert_eq!(
            chain.elements,
            vec![
                reference("a", Enclosure::Rectangle),
                literal("two", Enclosure::RoundedRectangle),
                reference("c", Enclosure::Parallelogram),
                literal("d", Enclosure::Other),
            ]
        );
        assert_eq!(
            chain.operators,
            vec![
                LinkOperator::Forward,
                LinkOperator::Backward,
                LinkOperator::Forward
            ]
        );
        assert_eq!(chain.links().count(), 3);
    }

    #[test]
    fn chain_accepts_operators_without_spaces() {
        let chain = parse_chain(&chars("[a]->[b]<-[c]")).expect("chain");
        assert_eq!(chain.elements.len(), 3);
        assert_eq!(chain.operators.len(), 2);
    }

    #[test]
    fn chain_rejects_dangling_link() {
        assert_eq!(
            parse_chain(&chars("[a] ->")),
            Err(ScanError::new("dangling link", 6))
        );
        assert_eq!(
            parse_chain(&chars("[a] -> ")),
            Err(ScanError::new("dangling link", 7))
        );
    }

    #[test]
    fn chain_rejects_unknown_operator() {
        assert_eq!(
            parse_chain(&chars("[a] => [b]")),
            Err(ScanError::new("expected one of ->, <-", 4))
        );
        assert_eq!(
            parse_chain(&chars("[a] |> [b]")),
            Err(ScanError::new("expected one of ->, <-", 4))
        );
    }

    #[test]
    fn chain_element_error_uses_deepest_attempt() {
        // literal attempt stops at 1, reference attempt reaches the missing closer
        assert_eq!(
            parse_chain(&chars("[abc -> [d]")),
            Err(ScanError::new("expected a string or variable", 5))
        );
        assert_eq!(
            parse_chain(&chars("abc")),
            Err(ScanError::new("expected a string or variable", 0))
        );
    }

    #[test]
    fn statement_picks_declaration_when_it_succeeds() {
        let parsed = parse_statement(&chars(r#"a := "x""#)).expect("statement");
        assert!(matches!(parsed, Statement::Declaration(_)));
    }

    #[test]
    fn statement_picks_chain_when_declaration_fails() {
        let parsed = parse_statement(&chars("[a] -> [b]")).expect("statement");
        assert!(matches!(parsed, Statement::Chain(_)));
    }

    #[test]
    fn statement_reports_the_parse_that_got_further() {
        // declaration reaches the value, chain fails at column 0
        assert_eq!(
            parse_statement(&chars("abc := x")),
            Err(ScanError::new("invalid string", 7))
        );
        // chain reaches the dangling link, declaration fails at column 0
        assert_eq!(
            parse_statement(&chars("[a] -> [b] ->")),
            Err(ScanError::new("dangling link", 13))
        );
    }

    #[test]
    fn statement_tie_prefers_declaration_error() {
        assert_eq!(
            parse_statement(&chars("-> [a]")),
            Err(ScanError::new("invalid variable name", 0))
        );
    }
}
