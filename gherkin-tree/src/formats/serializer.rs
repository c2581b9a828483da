//! Gherkin serializer
//!
//! Renders an element subtree back to source text. Layout is fixed by kind:
//! one indentation unit per nesting level, one blank line before every
//! background, test, rule and examples block, and a blank line between a
//! description and whatever follows it. Tables are column aligned on display
//! width. Rendering never fails; missing pieces are simply not written.
//!
//! The output carries no trailing newline.

use super::FormattingRules;
use crate::tree::{Element, NodeId, Tree};
use unicode_width::UnicodeWidthStr;

const DOC_STRING_DELIMITER: &str = "\"\"\"";
const ESCAPED_DOC_STRING_DELIMITER: &str = "\\\"\\\"\\\"";

pub struct GherkinSerializer {
    rules: FormattingRules,
    output: String,
    indent_level: usize,
    consecutive_newlines: usize,
}

impl GherkinSerializer {
    pub fn new(rules: FormattingRules) -> Self {
        Self {
            rules,
            output: String::new(),
            indent_level: 0,
            consecutive_newlines: 2, // Start as if we have blank lines
        }
    }

    pub fn serialize(mut self, tree: &Tree, id: NodeId) -> String {
        self.element(tree, id);
        while self.output.ends_with('\n') {
            self.output.pop();
        }
        self.output
    }

    fn indent(&self) -> String {
        self.rules.indent_string.repeat(self.indent_level)
    }

    fn write_line(&mut self, text: &str) {
        if !text.is_empty() {
            self.output.push_str(&self.indent());
            self.output.push_str(text);
        }
        self.output.push('\n');
        self.consecutive_newlines = if text.is_empty() {
            self.consecutive_newlines + 1
        } else {
            1
        };
    }

    fn ensure_blank_lines(&mut self, count: usize) {
        let target_newlines = count + 1;
        while self.consecutive_newlines < target_newlines {
            self.output.push('\n');
            self.consecutive_newlines += 1;
        }
    }

    fn nested(&mut self, render: impl FnOnce(&mut Self)) {
        self.indent_level += 1;
        render(self);
        self.indent_level -= 1;
    }

    fn element(&mut self, tree: &Tree, id: NodeId) {
        match tree.element(id) {
            Element::Directory(directory) => {
                self.write_line(&directory.path.display().to_string())
            }
            Element::FeatureFile(file) => {
                if let Some(feature) = file.feature() {
                    let language = tree
                        .element(feature)
                        .as_feature()
                        .map_or("", |feature| feature.language.as_str());
                    if !language.is_empty() && language != "en" {
                        self.write_line(&format!("# language: {}", language));
                    }
                    self.element(tree, feature);
                }
            }
            Element::Feature(feature) => {
                self.tags(tree, id);
                self.header(&feature.keyword, &feature.name);
                self.description(&feature.description);
                let children: Vec<NodeId> = feature
                    .background()
                    .into_iter()
                    .chain(feature.tests().iter().copied())
                    .chain(feature.rules().iter().copied())
                    .collect();
                self.blocks(tree, &children);
            }
            Element::Rule(rule) => {
                self.tags(tree, id);
                self.header(&rule.keyword, &rule.name);
                self.description(&rule.description);
                let children: Vec<NodeId> = rule
                    .background()
                    .into_iter()
                    .chain(rule.tests().iter().copied())
                    .collect();
                self.blocks(tree, &children);
            }
            Element::Background(background) => {
                self.header(&background.keyword, &background.name);
                self.description(&background.description);
                self.steps(tree, background.steps());
            }
            Element::Scenario(scenario) => {
                self.tags(tree, id);
                self.header(&scenario.keyword, &scenario.name);
                self.description(&scenario.description);
                self.steps(tree, scenario.steps());
            }
            Element::Outline(outline) => {
                self.tags(tree, id);
                self.header(&outline.keyword, &outline.name);
                self.description(&outline.description);
                self.steps(tree, outline.steps());
                self.blocks(tree, outline.examples());
            }
            Element::Example(example) => {
                self.tags(tree, id);
                self.header(&example.keyword, &example.name);
                self.description(&example.description);
                if !example.rows().is_empty() {
                    self.nested(|this| this.table(tree, example.rows()));
                }
            }
            Element::Step(step) => {
                if step.text.is_empty() {
                    self.write_line(&step.keyword);
                } else {
                    self.write_line(&format!("{} {}", step.keyword, step.text));
                }
                if let Some(block) = step.block() {
                    self.nested(|this| this.element(tree, block));
                }
            }
            Element::Table(table) => self.table(tree, table.rows()),
            Element::Row(_) => self.table(tree, &[id]),
            Element::DocString(doc_string) => {
                match &doc_string.content_type {
                    Some(content_type) => {
                        self.write_line(&format!("{} {}", DOC_STRING_DELIMITER, content_type))
                    }
                    None => self.write_line(DOC_STRING_DELIMITER),
                }
                if !doc_string.contents.is_empty() {
                    for line in doc_string.contents.split('\n') {
                        self.write_line(
                            &line.replace(DOC_STRING_DELIMITER, ESCAPED_DOC_STRING_DELIMITER),
                        );
                    }
                }
                self.write_line(DOC_STRING_DELIMITER);
            }
            Element::Tag(tag) => self.write_line(&tag.name),
        }
    }

    fn tags(&mut self, tree: &Tree, id: NodeId) {
        let names = tree.tag_names(tree.tags(id));
        if !names.is_empty() {
            self.write_line(&names.join(" "));
        }
    }

    fn header(&mut self, keyword: &str, name: &str) {
        if name.is_empty() {
            self.write_line(&format!("{}:", keyword));
        } else {
            self.write_line(&format!("{}: {}", keyword, name));
        }
    }

    /// Descriptions sit at the owner's own depth, after a blank line.
    fn description(&mut self, description: &str) {
        if description.is_empty() {
            return;
        }
        self.ensure_blank_lines(1);
        for line in description.split('\n') {
            self.write_line(line);
        }
        // Whatever follows a description is set off by a blank line
        self.ensure_blank_lines(1);
    }

    /// Children that are each preceded by a blank line, one level deeper.
    fn blocks(&mut self, tree: &Tree, children: &[NodeId]) {
        self.nested(|this| {
            for child in children {
                this.ensure_blank_lines(1);
                this.element(tree, *child);
            }
        });
    }

    fn steps(&mut self, tree: &Tree, steps: &[NodeId]) {
        self.nested(|this| {
            for step in steps {
                this.element(tree, *step);
            }
        });
    }

    fn table(&mut self, tree: &Tree, rows: &[NodeId]) {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| tree.row_values(*row).iter().map(|cell| escape_cell(cell)).collect())
            .collect();

        let mut widths: Vec<usize> = Vec::new();
        for row in &rows {
            for (column, cell) in row.iter().enumerate() {
                let width = cell.width();
                match widths.get_mut(column) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }

        for row in &rows {
            if row.is_empty() {
                self.write_line("|");
                continue;
            }
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    format!("{}{}", cell, " ".repeat(width.saturating_sub(cell.width())))
                })
                .collect();
            self.write_line(&format!("| {} |", cells.join(" | ")));
        }
    }
}

fn escape_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\n', "\\n")
}
