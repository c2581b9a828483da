//! Keyword tables
//!
//! A dialect maps the localized keywords of the language onto the structural
//! kinds they introduce. Step keywords keep their trailing space, the way they
//! are written in source (`"Given "`), except for languages that attach the
//! keyword directly to the text.
//!
//! The active dialect is a process-wide setting consulted whenever a parser is
//! created without an explicit dialect. Use [`scoped`] for temporary changes so
//! the previous setting is restored even on early return.

use crate::error::ConfigurationError;
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

/// What a keyword introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Feature,
    Rule,
    Background,
    Scenario,
    ScenarioOutline,
    Examples,
    Step,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    pub code: &'static str,
    pub name: &'static str,
    pub feature: &'static [&'static str],
    pub rule: &'static [&'static str],
    pub background: &'static [&'static str],
    pub scenario: &'static [&'static str],
    pub scenario_outline: &'static [&'static str],
    pub examples: &'static [&'static str],
    pub given: &'static [&'static str],
    pub when: &'static [&'static str],
    pub then: &'static [&'static str],
    pub and: &'static [&'static str],
    pub but: &'static [&'static str],
}

pub const ENGLISH: Dialect = Dialect {
    code: "en",
    name: "English",
    feature: &["Feature", "Business Need", "Ability"],
    rule: &["Rule"],
    background: &["Background"],
    scenario: &["Example", "Scenario"],
    scenario_outline: &["Scenario Outline", "Scenario Template"],
    examples: &["Examples", "Scenarios"],
    given: &["* ", "Given "],
    when: &["* ", "When "],
    then: &["* ", "Then "],
    and: &["* ", "And "],
    but: &["* ", "But "],
};

pub const GERMAN: Dialect = Dialect {
    code: "de",
    name: "German",
    feature: &["Funktionalität", "Funktion"],
    rule: &["Rule", "Regel"],
    background: &["Grundlage", "Hintergrund", "Voraussetzungen", "Vorbedingungen"],
    scenario: &["Beispiel", "Szenario"],
    scenario_outline: &["Szenariogrundriss", "Szenarien"],
    examples: &["Beispiele"],
    given: &["* ", "Angenommen ", "Gegeben sei ", "Gegeben seien "],
    when: &["* ", "Wenn "],
    then: &["* ", "Dann "],
    and: &["* ", "Und "],
    but: &["* ", "Aber "],
};

static DIALECTS: [&Dialect; 2] = [&ENGLISH, &GERMAN];

static ACTIVE: Lazy<RwLock<&'static Dialect>> = Lazy::new(|| RwLock::new(DIALECTS[0]));

/// Finds the dialect with the given code.
pub fn lookup(code: &str) -> Result<&'static Dialect, ConfigurationError> {
    DIALECTS
        .iter()
        .copied()
        .find(|dialect| dialect.code == code)
        .ok_or_else(|| ConfigurationError::UnknownDialect(code.to_string()))
}

/// Codes of every known dialect.
pub fn codes() -> impl Iterator<Item = &'static str> {
    DIALECTS.iter().map(|dialect| dialect.code)
}

pub fn active_dialect() -> &'static Dialect {
    *ACTIVE.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_active_dialect(code: &str) -> Result<(), ConfigurationError> {
    let dialect = lookup(code)?;
    replace_active(dialect);
    Ok(())
}

fn replace_active(dialect: &'static Dialect) -> &'static Dialect {
    let mut active = ACTIVE.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *active, dialect)
}

/// Switches the active dialect until the returned guard is dropped.
pub fn scoped(code: &str) -> Result<DialectScope, ConfigurationError> {
    let dialect = lookup(code)?;
    Ok(DialectScope {
        previous: replace_active(dialect),
    })
}

/// Restores the previously active dialect on drop.
#[must_use = "the previous dialect is restored as soon as the scope is dropped"]
pub struct DialectScope {
    previous: &'static Dialect,
}

impl Drop for DialectScope {
    fn drop(&mut self) {
        replace_active(self.previous);
    }
}

impl Dialect {
    /// All step keywords, without duplicates, in table order.
    pub fn step_keywords(&self) -> Vec<&'static str> {
        let mut keywords: Vec<&'static str> = Vec::new();
        for keyword in [self.given, self.when, self.then, self.and, self.but]
            .into_iter()
            .flatten()
        {
            if !keywords.contains(keyword) {
                keywords.push(*keyword);
            }
        }
        keywords
    }

    /// Header keywords (those followed by a colon) with their kinds, longest first.
    pub fn header_keywords(&self) -> Vec<(&'static str, KeywordKind)> {
        let mut keywords: Vec<(&'static str, KeywordKind)> = [
            (self.feature, KeywordKind::Feature),
            (self.rule, KeywordKind::Rule),
            (self.background, KeywordKind::Background),
            (self.scenario, KeywordKind::Scenario),
            (self.scenario_outline, KeywordKind::ScenarioOutline),
            (self.examples, KeywordKind::Examples),
        ]
        .into_iter()
        .flat_map(|(words, kind)| words.iter().map(move |word| (*word, kind)))
        .collect();
        keywords.sort_by_key(|(word, _)| std::cmp::Reverse(word.chars().count()));
        keywords
    }

    /// The kind a keyword introduces in this dialect.
    pub fn kind_of(&self, keyword: &str) -> Option<KeywordKind> {
        let keyword = keyword.trim_end();
        if self
            .step_keywords()
            .iter()
            .any(|step| step.trim_end() == keyword)
        {
            return Some(KeywordKind::Step);
        }
        self.header_keywords()
            .into_iter()
            .find(|(word, _)| *word == keyword)
            .map(|(_, kind)| kind)
    }

    /// The first keyword listed for a kind; used when synthesizing source.
    pub fn primary(&self, kind: KeywordKind) -> &'static str {
        let words = match kind {
            KeywordKind::Feature => self.feature,
            KeywordKind::Rule => self.rule,
            KeywordKind::Background => self.background,
            KeywordKind::Scenario => self.scenario,
            KeywordKind::ScenarioOutline => self.scenario_outline,
            KeywordKind::Examples => self.examples,
            KeywordKind::Step => self.given,
        };
        words
            .iter()
            .copied()
            .find(|word| word.trim() != "*")
            .or_else(|| words.first().copied())
            .unwrap_or("")
    }
}
