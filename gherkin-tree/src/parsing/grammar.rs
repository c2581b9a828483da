//! Recursive descent over classified lines
//!
//! The grammar, top down:
//!
//! ```text
//! document   := language? (tags? feature)?
//! feature    := header description background? test* rule*
//! rule       := tags? header description background? test*
//! background := header description step*
//! test       := tags? header description step* examples*
//! examples   := tags? header description table?
//! step       := step-line (table | doc-string)?
//! ```
//!
//! Blank lines and comments may appear between any two constructs. A
//! description is every free text line after a header up to the next
//! construct; it is kept raw and trimmed later by the builder.

use super::cells::{split_cells, CellText};
use super::lines::{split_tags, Line, LineKind};
use super::GrammarOptions;
use crate::dialect::{self, Dialect, KeywordKind};
use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Header {
    pub location: Location,
    pub keyword: String,
    pub kind: KeywordKind,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagNode {
    pub location: Location,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document {
    pub feature: Option<FeatureNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeatureNode {
    pub language: String,
    pub tags: Vec<TagNode>,
    pub header: Header,
    pub children: Vec<ChildNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChildNode {
    Background(BackgroundNode),
    Scenario(ScenarioNode),
    Rule(RuleNode),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuleNode {
    pub tags: Vec<TagNode>,
    pub header: Header,
    pub children: Vec<ChildNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BackgroundNode {
    pub header: Header,
    pub steps: Vec<StepNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScenarioNode {
    pub tags: Vec<TagNode>,
    pub header: Header,
    pub steps: Vec<StepNode>,
    pub examples: Vec<ExamplesNode>,
}

impl ScenarioNode {
    pub(crate) fn is_outline(&self) -> bool {
        self.header.kind == KeywordKind::ScenarioOutline || !self.examples.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExamplesNode {
    pub tags: Vec<TagNode>,
    pub header: Header,
    pub table_header: Option<RowNode>,
    pub table_body: Vec<RowNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StepNode {
    pub location: Location,
    /// Keyword as written, trailing space included.
    pub keyword: String,
    pub text: String,
    pub argument: Option<ArgumentNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ArgumentNode {
    DataTable {
        location: Location,
        rows: Vec<RowNode>,
    },
    DocString {
        location: Location,
        delimiter: String,
        content_type: Option<String>,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RowNode {
    pub location: Location,
    pub cells: Vec<CellText>,
}

pub(crate) struct Grammar<'s> {
    uri: &'s str,
    lines: Vec<&'s str>,
    position: usize,
    dialect: &'static Dialect,
    options: GrammarOptions,
}

type ParseResult<T> = Result<T, SyntaxError>;

impl<'s> Grammar<'s> {
    pub(crate) fn new(
        source: &'s str,
        uri: &'s str,
        dialect: &'static Dialect,
        options: GrammarOptions,
    ) -> Self {
        Self {
            uri,
            lines: source.lines().collect(),
            position: 0,
            dialect,
            options,
        }
    }

    pub(crate) fn parse(mut self) -> ParseResult<Document> {
        self.skip_preamble()?;
        let tags = self.parse_tags()?;

        let feature = match self.peek() {
            None if tags.is_empty() => None,
            None => return Err(self.eof_error("#Feature")),
            Some(line) => match line.kind {
                LineKind::Header {
                    kind: KeywordKind::Feature,
                    ..
                } => Some(self.parse_feature(tags)?),
                _ => return Err(self.unexpected(&line, "#Feature")),
            },
        };

        self.skip_ignorable();
        if let Some(line) = self.peek() {
            return Err(self.unexpected(&line, "#EOF"));
        }
        Ok(Document { feature })
    }

    // =====================
    // Line access
    // =====================

    fn peek(&self) -> Option<Line<'s>> {
        self.lines
            .get(self.position)
            .map(|raw| Line::classify(self.position + 1, *raw, self.dialect))
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_ignorable(&mut self) {
        while let Some(line) = self.peek() {
            match line.kind {
                LineKind::Empty | LineKind::Comment | LineKind::Language(_) => self.advance(),
                _ => break,
            }
        }
    }

    /// Blank lines and comments before the feature; a language header switches dialects.
    fn skip_preamble(&mut self) -> ParseResult<()> {
        while let Some(line) = self.peek() {
            match line.kind {
                LineKind::Empty | LineKind::Comment => self.advance(),
                LineKind::Language(code) => {
                    let Ok(dialect) = dialect::lookup(code) else {
                        return Err(self.error_at(
                            line.number,
                            line.column(),
                            format!("Language not supported: {}", code),
                        ));
                    };
                    self.dialect = dialect;
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn error_at(&self, line: usize, column: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            file: self.uri.to_string(),
            line,
            column,
            message: message.into(),
        }
    }

    fn unexpected(&self, line: &Line<'_>, expected: &str) -> SyntaxError {
        self.error_at(
            line.number,
            line.column(),
            format!("expected: {}, got '{}'", expected, line.trimmed),
        )
    }

    fn eof_error(&self, expected: &str) -> SyntaxError {
        self.error_at(
            self.lines.len() + 1,
            0,
            format!("unexpected end of file, expected: {}", expected),
        )
    }

    // =====================
    // Shared pieces
    // =====================

    /// Every tag line up to the next construct. Blank lines and comments may sit in between.
    fn parse_tags(&mut self) -> ParseResult<Vec<TagNode>> {
        let mut tags = Vec::new();
        loop {
            self.skip_ignorable();
            match self.peek() {
                Some(line) if line.kind == LineKind::Tags => {
                    for token in split_tags(line.raw) {
                        if !token.name.starts_with('@') || token.name.len() == 1 {
                            return Err(self.error_at(
                                line.number,
                                token.column,
                                format!("A tag may not contain whitespace: {}", line.trimmed),
                            ));
                        }
                        tags.push(TagNode {
                            location: Location {
                                line: line.number,
                                column: token.column,
                            },
                            name: token.name,
                        });
                    }
                    self.advance();
                }
                _ => return Ok(tags),
            }
        }
    }

    fn parse_header(&mut self, expected: KeywordKind) -> ParseResult<Header> {
        let line = match self.peek() {
            Some(line) => line,
            None => return Err(self.eof_error(expected_token(expected))),
        };
        let (keyword, kind, name) = match line.kind {
            LineKind::Header { keyword, kind, name }
                if kind == expected
                    || (expected == KeywordKind::Scenario && kind == KeywordKind::ScenarioOutline) =>
            {
                (keyword, kind, name)
            }
            _ => return Err(self.unexpected(&line, expected_token(expected))),
        };
        self.advance();

        Ok(Header {
            location: Location {
                line: line.number,
                column: line.column(),
            },
            keyword: keyword.to_string(),
            kind,
            name: name.to_string(),
            description: self.parse_description(),
        })
    }

    fn parse_description(&mut self) -> String {
        let mut collected: Vec<&'s str> = Vec::new();
        while let Some(line) = self.peek() {
            match line.kind {
                LineKind::Other => collected.push(line.raw),
                LineKind::Empty if !collected.is_empty() => collected.push(line.raw),
                LineKind::Empty | LineKind::Comment | LineKind::Language(_) => {}
                _ => break,
            }
            self.advance();
        }
        while collected.last().is_some_and(|line| line.trim().is_empty()) {
            collected.pop();
        }
        collected.join("\n")
    }

    fn expect_no_tags(&self, tags: &[TagNode], construct: &str) -> ParseResult<()> {
        match tags.first() {
            Some(tag) => Err(self.error_at(
                tag.location.line,
                tag.location.column,
                format!("Tags are not allowed before a {}", construct),
            )),
            None => Ok(()),
        }
    }

    // =====================
    // Constructs
    // =====================

    fn parse_feature(&mut self, tags: Vec<TagNode>) -> ParseResult<FeatureNode> {
        let header = self.parse_header(KeywordKind::Feature)?;
        let mut children = Vec::new();

        loop {
            let mark = self.position;
            let tags = self.parse_tags()?;
            let line = match self.peek() {
                Some(line) => line,
                None if tags.is_empty() => break,
                None => return Err(self.eof_error("#ScenarioLine, #RuleLine")),
            };
            match line.kind {
                LineKind::Header {
                    kind: KeywordKind::Background,
                    ..
                } if children.is_empty() => {
                    self.expect_no_tags(&tags, "background")?;
                    children.push(ChildNode::Background(self.parse_background()?));
                }
                LineKind::Header {
                    kind: KeywordKind::Scenario | KeywordKind::ScenarioOutline,
                    ..
                } => children.push(ChildNode::Scenario(self.parse_scenario(tags)?)),
                LineKind::Header {
                    kind: KeywordKind::Rule,
                    ..
                } => {
                    self.position = mark;
                    children.extend(self.parse_rules()?.into_iter().map(ChildNode::Rule));
                    break;
                }
                _ => return Err(self.unexpected(&line, "#ScenarioLine, #RuleLine, #TagLine")),
            }
        }

        Ok(FeatureNode {
            language: self.dialect.code.to_string(),
            tags,
            header,
            children,
        })
    }

    fn parse_rules(&mut self) -> ParseResult<Vec<RuleNode>> {
        let mut rules = Vec::new();
        loop {
            let tags = self.parse_tags()?;
            let line = match self.peek() {
                Some(line) => line,
                None if tags.is_empty() => return Ok(rules),
                None => return Err(self.eof_error("#RuleLine")),
            };
            if !self.options.rules {
                return Err(self.error_at(
                    line.number,
                    line.column(),
                    "Rule is not supported by this parser version",
                ));
            }
            if !self.options.rule_tags {
                self.expect_no_tags(&tags, "rule")?;
            }
            rules.push(self.parse_rule(tags)?);
        }
    }

    fn parse_rule(&mut self, tags: Vec<TagNode>) -> ParseResult<RuleNode> {
        let header = self.parse_header(KeywordKind::Rule)?;
        let mut children = Vec::new();

        loop {
            let mark = self.position;
            let tags = self.parse_tags()?;
            let line = match self.peek() {
                Some(line) => line,
                None if tags.is_empty() => break,
                None => return Err(self.eof_error("#ScenarioLine, #RuleLine")),
            };
            match line.kind {
                LineKind::Header {
                    kind: KeywordKind::Background,
                    ..
                } if children.is_empty() => {
                    self.expect_no_tags(&tags, "background")?;
                    children.push(ChildNode::Background(self.parse_background()?));
                }
                LineKind::Header {
                    kind: KeywordKind::Scenario | KeywordKind::ScenarioOutline,
                    ..
                } => children.push(ChildNode::Scenario(self.parse_scenario(tags)?)),
                LineKind::Header {
                    kind: KeywordKind::Rule,
                    ..
                } => {
                    self.position = mark;
                    break;
                }
                _ => return Err(self.unexpected(&line, "#ScenarioLine, #RuleLine, #TagLine")),
            }
        }

        Ok(RuleNode {
            tags,
            header,
            children,
        })
    }

    fn parse_background(&mut self) -> ParseResult<BackgroundNode> {
        let header = self.parse_header(KeywordKind::Background)?;
        let steps = self.parse_steps()?;
        Ok(BackgroundNode { header, steps })
    }

    fn parse_scenario(&mut self, tags: Vec<TagNode>) -> ParseResult<ScenarioNode> {
        let header = self.parse_header(KeywordKind::Scenario)?;
        let steps = self.parse_steps()?;
        let outline = header.kind == KeywordKind::ScenarioOutline;
        let mut examples = Vec::new();

        loop {
            let mark = self.position;
            let tags = self.parse_tags()?;
            match self.peek() {
                Some(line)
                    if matches!(
                        line.kind,
                        LineKind::Header {
                            kind: KeywordKind::Examples,
                            ..
                        }
                    ) =>
                {
                    if !outline && !self.options.examples_in_scenarios {
                        return Err(self.unexpected(&line, "#StepLine, #ScenarioLine, #TagLine"));
                    }
                    examples.push(self.parse_examples(tags)?);
                }
                _ => {
                    self.position = mark;
                    break;
                }
            }
        }

        Ok(ScenarioNode {
            tags,
            header,
            steps,
            examples,
        })
    }

    fn parse_examples(&mut self, tags: Vec<TagNode>) -> ParseResult<ExamplesNode> {
        let header = self.parse_header(KeywordKind::Examples)?;
        self.skip_ignorable();
        let mut rows = self.parse_rows()?.into_iter();
        Ok(ExamplesNode {
            tags,
            header,
            table_header: rows.next(),
            table_body: rows.collect(),
        })
    }

    fn parse_steps(&mut self) -> ParseResult<Vec<StepNode>> {
        let mut steps = Vec::new();
        loop {
            self.skip_ignorable();
            let line = match self.peek() {
                Some(line) => line,
                None => return Ok(steps),
            };
            let (keyword, text) = match line.kind {
                LineKind::Step { keyword, text } => (keyword, text),
                _ => return Ok(steps),
            };
            self.advance();
            steps.push(StepNode {
                location: Location {
                    line: line.number,
                    column: line.column(),
                },
                keyword: keyword.to_string(),
                text: text.to_string(),
                argument: self.parse_argument()?,
            });
        }
    }

    fn parse_argument(&mut self) -> ParseResult<Option<ArgumentNode>> {
        self.skip_ignorable();
        let line = match self.peek() {
            Some(line) => line,
            None => return Ok(None),
        };
        let location = Location {
            line: line.number,
            column: line.column(),
        };
        match line.kind {
            LineKind::TableRow => Ok(Some(ArgumentNode::DataTable {
                location,
                rows: self.parse_rows()?,
            })),
            LineKind::DocStringSeparator {
                delimiter,
                content_type,
            } => {
                self.advance();
                let content = self.parse_doc_string_content(&line, delimiter)?;
                Ok(Some(ArgumentNode::DocString {
                    location,
                    delimiter: delimiter.to_string(),
                    content_type: (!content_type.is_empty()).then(|| content_type.to_string()),
                    content,
                }))
            }
            _ => Ok(None),
        }
    }

    fn parse_rows(&mut self) -> ParseResult<Vec<RowNode>> {
        let mut rows: Vec<RowNode> = Vec::new();
        while let Some(line) = self.peek() {
            match line.kind {
                LineKind::TableRow => {
                    let cells = split_cells(line.raw);
                    if let Some(first) = rows.first() {
                        if first.cells.len() != cells.len() {
                            return Err(self.error_at(
                                line.number,
                                line.column(),
                                "inconsistent cell count within the table",
                            ));
                        }
                    }
                    rows.push(RowNode {
                        location: Location {
                            line: line.number,
                            column: line.column(),
                        },
                        cells,
                    });
                    self.advance();
                }
                LineKind::Comment => self.advance(),
                _ => break,
            }
        }
        Ok(rows)
    }

    fn parse_doc_string_content(
        &mut self,
        opening: &Line<'_>,
        delimiter: &str,
    ) -> ParseResult<String> {
        let escaped = delimiter
            .chars()
            .map(|c| format!("\\{}", c))
            .collect::<String>();
        let mut content: Vec<String> = Vec::new();

        loop {
            let raw = match self.lines.get(self.position) {
                Some(raw) => *raw,
                None => {
                    return Err(self.error_at(
                        opening.number,
                        opening.column(),
                        "unexpected end of file, expected: #DocStringSeparator",
                    ))
                }
            };
            self.advance();
            if raw.trim() == delimiter {
                return Ok(content.join("\n"));
            }
            content.push(strip_indent(raw, opening.indent).replace(&escaped, delimiter));
        }
    }
}

/// Removes up to `indent` leading whitespace characters.
fn strip_indent(raw: &str, indent: usize) -> &str {
    let mut rest = raw;
    for _ in 0..indent {
        match rest.chars().next() {
            Some(c) if c.is_whitespace() => rest = &rest[c.len_utf8()..],
            _ => break,
        }
    }
    rest
}

fn expected_token(kind: KeywordKind) -> &'static str {
    match kind {
        KeywordKind::Feature => "#FeatureLine",
        KeywordKind::Rule => "#RuleLine",
        KeywordKind::Background => "#BackgroundLine",
        KeywordKind::Scenario | KeywordKind::ScenarioOutline => "#ScenarioLine",
        KeywordKind::Examples => "#ExamplesLine",
        KeywordKind::Step => "#StepLine",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::ENGLISH;

    fn parse(source: &str) -> ParseResult<Document> {
        Grammar::new(source, "test.feature", &ENGLISH, GrammarOptions::for_version(27)).parse()
    }

    fn feature(source: &str) -> FeatureNode {
        parse(source).unwrap().feature.unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse("").unwrap().feature, None);
        assert_eq!(parse("\n# just a comment\n\n").unwrap().feature, None);
    }

    #[test]
    fn test_feature_header_and_description() {
        let feature = feature("@a @b\nFeature: A name\n\n    Some text\n\n  more text\n\n  Scenario: s");
        assert_eq!(feature.header.keyword, "Feature");
        assert_eq!(feature.header.name, "A name");
        assert_eq!(feature.header.description, "    Some text\n\n  more text");
        assert_eq!(feature.tags.len(), 2);
        assert_eq!(feature.tags[1].location, Location { line: 1, column: 4 });
        assert_eq!(feature.children.len(), 1);
    }

    #[test]
    fn test_rules_collect_following_tests() {
        let feature = feature(
            "Feature: f\n  Scenario: before\n  Rule: one\n    Scenario: a\n    @tagged\n    Scenario: b\n  @next\n  Rule: two\n    Background:\n      * step",
        );
        let rules: Vec<_> = feature
            .children
            .iter()
            .filter_map(|child| match child {
                ChildNode::Rule(rule) => Some(rule),
                _ => None,
            })
            .collect();
        assert_eq!(feature.children.len(), 3);
        assert_eq!(rules[0].children.len(), 2);
        assert_eq!(rules[1].tags[0].name, "@next");
        assert!(matches!(rules[1].children[0], ChildNode::Background(_)));
    }

    #[test]
    fn test_steps_with_arguments() {
        let feature = feature(
            "Feature: f\n  Scenario: s\n    Given a table\n      | a | b |\n      | 1 | 2 |\n    And a doc string\n      \"\"\" text/plain\n      line one\n        \\\"\\\"\\\"\n      \"\"\"",
        );
        let ChildNode::Scenario(scenario) = &feature.children[0] else {
            panic!("expected a scenario");
        };
        assert_eq!(scenario.steps.len(), 2);
        match &scenario.steps[0].argument {
            Some(ArgumentNode::DataTable { rows, .. }) => assert_eq!(rows.len(), 2),
            other => panic!("expected a table, got {:?}", other),
        }
        match &scenario.steps[1].argument {
            Some(ArgumentNode::DocString {
                content_type,
                content,
                ..
            }) => {
                assert_eq!(content_type.as_deref(), Some("text/plain"));
                assert_eq!(content, "line one\n  \"\"\"");
            }
            other => panic!("expected a doc string, got {:?}", other),
        }
    }

    #[test]
    fn test_outline_examples() {
        let feature = feature(
            "Feature: f\n  Scenario Outline: o\n    * <x>\n  @e\n  Examples: first\n    | x |\n    | 1 |\n  Examples:",
        );
        let ChildNode::Scenario(outline) = &feature.children[0] else {
            panic!("expected an outline");
        };
        assert!(outline.is_outline());
        assert_eq!(outline.examples.len(), 2);
        assert_eq!(outline.examples[0].tags[0].name, "@e");
        assert_eq!(outline.examples[0].table_body.len(), 1);
        assert_eq!(outline.examples[1].table_header, None);
    }

    #[test]
    fn test_syntax_errors() {
        let error = parse("Feature: f\n  Scenario: s\n    Given x\n    stray text").unwrap_err();
        assert_eq!(error.line, 4);
        assert_eq!(error.column, 5);
        assert_eq!(error.file, "test.feature");

        assert!(parse("not a feature").is_err());
        assert!(parse("@dangling").is_err());
        assert!(parse("Feature: f\n  Scenario: s\n    * x\n    \"\"\"\n    never closed").is_err());
        assert!(parse("Feature: f\n  Scenario: s\n    * x\n      | a |\n      | 1 | 2 |").is_err());
        assert!(parse("Feature: f\n  @bad\n  Background:").is_err());
        assert!(parse("Feature: f\n  Scenario: s\n  Background:").is_err());
    }

    #[test]
    fn test_language_header_switches_dialect() {
        let feature = feature("# language: de\nFunktionalität: f\n  Szenario: s\n    Angenommen x");
        assert_eq!(feature.language, "de");
        assert_eq!(feature.children.len(), 1);

        let error = parse("# language: xx\nFeature: f").unwrap_err();
        assert_eq!(error.message, "Language not supported: xx");
    }

    #[test]
    fn test_strip_indent() {
        assert_eq!(strip_indent("      text", 4), "  text");
        assert_eq!(strip_indent("  text", 4), "text");
        assert_eq!(strip_indent("", 4), "");
    }
}
