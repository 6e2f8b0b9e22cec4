#![forbid(unsafe_code)]

//! Role labels and their usage counters.
//!
//! Two kinds of tag exist. Officer tags are classroom duties and are stored
//! on a student verbatim. Teacher tags name a subject; a student holding one
//! is that subject's helper and carries the label with [`TEACHER_SUFFIX`]
//! appended. Counters are keyed by the base name in both cases.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix marking a subject-helper title.
pub const TEACHER_SUFFIX: &str = "小老師";

pub const DEFAULT_OFFICER_TAGS: [&str; 14] = [
    "班長", "副班", "學藝", "副學", "衛生", "環保", "資源", "風紀", "總務", "輔導", "設備", "安全",
    "體育", "圖書",
];

pub const DEFAULT_TEACHER_TAGS: [&str; 14] = [
    "國文", "英文", "數學", "歷史", "地理", "公民", "物理", "化學", "生物", "地科", "音樂", "美術",
    "家政", "國防",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Officer,
    Teacher,
}

impl TagKind {
    /// Label as stored in a student's title list.
    #[must_use]
    pub fn full_tag(self, base: &str) -> String {
        match self {
            Self::Officer => base.to_string(),
            Self::Teacher => format!("{base}{TEACHER_SUFFIX}"),
        }
    }

    /// Split a stored title back into its kind and base name.
    #[must_use]
    pub fn classify(label: &str) -> (Self, &str) {
        match label.strip_suffix(TEACHER_SUFFIX) {
            Some(base) => (Self::Teacher, base),
            None => (Self::Officer, label),
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Officer => "officer",
            Self::Teacher => "teacher",
        })
    }
}

/// Outcome of [`TagRegistry::add_custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAdd {
    Added,
    /// Blank label; nothing stored.
    Blank,
    /// A tag of that kind already carries the label.
    Duplicate,
    /// Officer label ending in [`TEACHER_SUFFIX`]; it would read back as a
    /// subject-helper title.
    Reserved,
}

/// Whether `label` may name an officer tag.
#[must_use]
pub fn is_officer_label(label: &str) -> bool {
    !label.ends_with(TEACHER_SUFFIX)
}

/// Wire form of one tag kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct TagParts {
    pub tags: Vec<String>,
    pub custom: Vec<String>,
    pub usage: BTreeMap<String, u32>,
}

impl TagParts {
    fn into_list(self) -> TagList {
        let Self {
            mut tags,
            custom,
            usage,
        } = self;
        for label in &custom {
            if !tags.contains(label) {
                tags.push(label.clone());
            }
        }
        TagList {
            tags,
            custom,
            usage,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TagList {
    tags: Vec<String>,
    custom: Vec<String>,
    usage: BTreeMap<String, u32>,
}

impl TagList {
    fn with_builtins<I, S>(builtins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: builtins.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Available tags of both kinds, which of them are custom, and how many
/// students hold each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRegistry {
    officer: TagList,
    teacher: TagList,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_builtins(DEFAULT_OFFICER_TAGS, DEFAULT_TEACHER_TAGS)
    }
}

impl TagRegistry {
    pub fn with_builtins<O, T, S1, S2>(officer: O, teacher: T) -> Self
    where
        O: IntoIterator<Item = S1>,
        T: IntoIterator<Item = S2>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            officer: TagList::with_builtins(officer),
            teacher: TagList::with_builtins(teacher),
        }
    }

    /// Rebuild a registry from its wire parts. Custom labels missing from
    /// the tag list are appended so every custom tag is listed.
    /// Officer labels that would classify as helper titles are dropped.
    pub(crate) fn from_parts(mut officer: TagParts, teacher: TagParts) -> Self {
        let before = officer.tags.len() + officer.custom.len();
        officer.tags.retain(|t| is_officer_label(t));
        officer.custom.retain(|t| is_officer_label(t));
        let dropped = before - officer.tags.len() - officer.custom.len();
        if dropped > 0 {
            tracing::warn!(target: "seatplan.tags", dropped, "officer tags with helper suffix dropped");
        }
        Self {
            officer: officer.into_list(),
            teacher: teacher.into_list(),
        }
    }

    pub(crate) fn parts(&self, kind: TagKind) -> TagParts {
        let list = self.list(kind);
        TagParts {
            tags: list.tags.clone(),
            custom: list.custom.clone(),
            usage: list.usage.clone(),
        }
    }

    fn list(&self, kind: TagKind) -> &TagList {
        match kind {
            TagKind::Officer => &self.officer,
            TagKind::Teacher => &self.teacher,
        }
    }

    fn list_mut(&mut self, kind: TagKind) -> &mut TagList {
        match kind {
            TagKind::Officer => &mut self.officer,
            TagKind::Teacher => &mut self.teacher,
        }
    }

    /// Every tag of a kind, built-ins first, custom tags in insertion order.
    #[must_use]
    pub fn tags(&self, kind: TagKind) -> &[String] {
        &self.list(kind).tags
    }

    #[must_use]
    pub fn custom_tags(&self, kind: TagKind) -> &[String] {
        &self.list(kind).custom
    }

    #[must_use]
    pub fn contains(&self, kind: TagKind, base: &str) -> bool {
        self.list(kind).tags.iter().any(|t| t == base)
    }

    #[must_use]
    pub fn is_custom(&self, kind: TagKind, base: &str) -> bool {
        self.list(kind).custom.iter().any(|t| t == base)
    }

    #[must_use]
    pub fn usage(&self, kind: TagKind, base: &str) -> u32 {
        self.list(kind).usage.get(base).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn usage_map(&self, kind: TagKind) -> &BTreeMap<String, u32> {
        &self.list(kind).usage
    }

    /// Register a user-defined tag.
    pub fn add_custom(&mut self, kind: TagKind, label: &str) -> TagAdd {
        let label = label.trim();
        if label.is_empty() {
            return TagAdd::Blank;
        }
        if kind == TagKind::Officer && !is_officer_label(label) {
            tracing::debug!(target: "seatplan.tags", %kind, label, "officer tag with helper suffix refused");
            return TagAdd::Reserved;
        }
        let list = self.list_mut(kind);
        if list.tags.iter().any(|t| t == label) {
            tracing::debug!(target: "seatplan.tags", %kind, label, "duplicate custom tag ignored");
            return TagAdd::Duplicate;
        }
        list.tags.push(label.to_string());
        list.custom.push(label.to_string());
        tracing::debug!(target: "seatplan.tags", %kind, label, "custom tag added");
        TagAdd::Added
    }

    /// Remove a custom tag and its counter. Built-in and unknown labels are
    /// left alone. Callers strip the tag from title lists.
    pub(crate) fn remove_custom(&mut self, kind: TagKind, label: &str) -> bool {
        let list = self.list_mut(kind);
        let Some(pos) = list.custom.iter().position(|t| t == label) else {
            return false;
        };
        list.custom.remove(pos);
        list.tags.retain(|t| t != label);
        list.usage.remove(label);
        true
    }

    pub(crate) fn increment(&mut self, kind: TagKind, base: &str) {
        *self.list_mut(kind).usage.entry(base.to_string()).or_default() += 1;
    }

    /// Lower a counter. A counter that reaches zero is removed, so a tag
    /// nobody holds has no entry.
    pub(crate) fn decrement(&mut self, kind: TagKind, base: &str) {
        let usage = &mut self.list_mut(kind).usage;
        if let Some(count) = usage.get_mut(base) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                usage.remove(base);
            }
        }
    }

    /// Rebuild every counter from the labels in `titles`.
    pub(crate) fn recount<'a, I>(&mut self, titles: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.officer.usage.clear();
        self.teacher.usage.clear();
        for label in titles {
            let (kind, base) = TagKind::classify(label);
            self.increment(kind, base);
        }
    }
}
