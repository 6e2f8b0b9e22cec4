#![forbid(unsafe_code)]

//! Per-student title lists.

use std::collections::BTreeMap;

use crate::roster::StudentId;
use crate::tags::{TagKind, TagRegistry, is_officer_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleToggle {
    Added,
    Removed,
    /// Tag unknown to the registry and not held by the student.
    Ignored,
}

/// Titles held by each student, in the order they were granted.
///
/// Students without titles have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleBook {
    titles: BTreeMap<StudentId, Vec<String>>,
}

impl TitleBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn titles(&self, student: StudentId) -> &[String] {
        self.titles.get(&student).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, student: StudentId, label: &str) -> bool {
        self.titles(student).iter().any(|t| t == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StudentId, &[String])> {
        self.titles.iter().map(|(id, t)| (*id, t.as_slice()))
    }

    /// Every held label, once per holder.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.titles.values().flatten().map(String::as_str)
    }

    /// Number of students holding `label`.
    #[must_use]
    pub fn holders(&self, label: &str) -> usize {
        self.titles
            .values()
            .filter(|t| t.iter().any(|l| l == label))
            .count()
    }

    /// Grant or revoke `base` of `kind`, keeping the registry counter in step.
    pub fn toggle(
        &mut self,
        registry: &mut TagRegistry,
        student: StudentId,
        base: &str,
        kind: TagKind,
    ) -> TitleToggle {
        if kind == TagKind::Officer && !is_officer_label(base) {
            return TitleToggle::Ignored;
        }
        let full = kind.full_tag(base);
        if let Some(list) = self.titles.get_mut(&student) {
            if let Some(pos) = list.iter().position(|t| *t == full) {
                list.remove(pos);
                if list.is_empty() {
                    self.titles.remove(&student);
                }
                registry.decrement(kind, base);
                tracing::debug!(target: "seatplan.tags", %student, title = %full, "title revoked");
                return TitleToggle::Removed;
            }
        }
        if !registry.contains(kind, base) {
            return TitleToggle::Ignored;
        }
        self.titles.entry(student).or_default().push(full);
        registry.increment(kind, base);
        tracing::debug!(target: "seatplan.tags", %student, %kind, base, "title granted");
        TitleToggle::Added
    }

    /// Revoke a stored label such as `"數學小老師"`.
    pub fn remove_label(
        &mut self,
        registry: &mut TagRegistry,
        student: StudentId,
        label: &str,
    ) -> bool {
        if !self.has(student, label) {
            return false;
        }
        let (kind, base) = TagKind::classify(label);
        self.toggle(registry, student, base, kind) == TitleToggle::Removed
    }

    /// Remove `label` from every student. Returns how many lost it.
    pub(crate) fn strip_label(&mut self, label: &str) -> usize {
        let mut stripped = 0;
        self.titles.retain(|_, list| {
            let before = list.len();
            list.retain(|t| t != label);
            stripped += before - list.len();
            !list.is_empty()
        });
        stripped
    }

    pub(crate) fn remove_student(&mut self, student: StudentId) -> Vec<String> {
        self.titles.remove(&student).unwrap_or_default()
    }

    /// Store a list as-is, used by the snapshot codec.
    pub(crate) fn insert_raw(&mut self, student: StudentId, labels: Vec<String>) {
        if labels.is_empty() {
            self.titles.remove(&student);
        } else {
            self.titles.insert(student, labels);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;

    fn setup() -> (Roster, TagRegistry, TitleBook) {
        (
            Roster::from_names(["a", "b"]),
            TagRegistry::default(),
            TitleBook::new(),
        )
    }

    #[test]
    fn toggling_twice_restores_state() {
        let (roster, mut registry, mut book) = setup();
        let a = roster.find_by_name("a").unwrap();
        let before = (book.clone(), registry.usage(TagKind::Officer, "班長"));

        assert_eq!(
            book.toggle(&mut registry, a, "班長", TagKind::Officer),
            TitleToggle::Added
        );
        assert_eq!(registry.usage(TagKind::Officer, "班長"), 1);
        assert_eq!(
            book.toggle(&mut registry, a, "班長", TagKind::Officer),
            TitleToggle::Removed
        );
        assert_eq!((book, registry.usage(TagKind::Officer, "班長")), before);
    }

    #[test]
    fn teacher_titles_carry_suffix() {
        let (roster, mut registry, mut book) = setup();
        let b = roster.find_by_name("b").unwrap();
        book.toggle(&mut registry, b, "數學", TagKind::Teacher);
        book.toggle(&mut registry, b, "衛生", TagKind::Officer);
        assert_eq!(book.titles(b), ["數學小老師", "衛生"]);
        assert_eq!(registry.usage(TagKind::Teacher, "數學"), 1);
        assert_eq!(registry.usage(TagKind::Officer, "數學"), 0);
    }

    #[test]
    fn unknown_tag_is_ignored() {
        let (roster, mut registry, mut book) = setup();
        let a = roster.find_by_name("a").unwrap();
        assert_eq!(
            book.toggle(&mut registry, a, "不存在", TagKind::Officer),
            TitleToggle::Ignored
        );
        assert!(book.titles(a).is_empty());
        assert!(registry.usage_map(TagKind::Officer).is_empty());
    }

    #[test]
    fn officer_toggle_cannot_touch_a_helper_title() {
        let (roster, mut registry, mut book) = setup();
        let a = roster.find_by_name("a").unwrap();
        book.toggle(&mut registry, a, "英文", TagKind::Teacher);
        assert_eq!(
            book.toggle(&mut registry, a, "英文小老師", TagKind::Officer),
            TitleToggle::Ignored
        );
        assert_eq!(book.titles(a), ["英文小老師"]);
        assert_eq!(registry.usage(TagKind::Teacher, "英文"), 1);
        assert!(registry.usage_map(TagKind::Officer).is_empty());
    }

    #[test]
    fn remove_label_resolves_kind_from_suffix() {
        let (roster, mut registry, mut book) = setup();
        let a = roster.find_by_name("a").unwrap();
        book.toggle(&mut registry, a, "英文", TagKind::Teacher);
        assert!(book.remove_label(&mut registry, a, "英文小老師"));
        assert!(!book.remove_label(&mut registry, a, "英文小老師"));
        assert_eq!(registry.usage(TagKind::Teacher, "英文"), 0);
    }

    #[test]
    fn strip_label_counts_holders() {
        let (roster, mut registry, mut book) = setup();
        for id in roster.ids() {
            book.toggle(&mut registry, id, "環保", TagKind::Officer);
        }
        assert_eq!(book.holders("環保"), 2);
        assert_eq!(book.strip_label("環保"), 2);
        assert_eq!(book.iter().count(), 0);
    }
}
