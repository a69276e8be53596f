use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static TAG_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s;,]+").expect("valid tag separator regex"));

/// One slot in a tag set: either a plain tag or a nested set.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Tag(String),
    Set(Tags),
}

/// An ordered tree of string tags and nested tag sets supporting boolean
/// any/all containment queries.
///
/// The `normalize_*` fields are the per-instance defaults used by the
/// convenience methods; the full query and mutation methods take their
/// normalization flags explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags {
    pub normalize_add: bool,
    pub normalize_has: bool,
    pub normalize_want: bool,
    children: Vec<Child>,
}

/// Lowercase a tag and strip one leading `#`.
pub fn normalize(tag: &str) -> String {
    let lower = tag.to_lowercase();
    match lower.strip_prefix('#') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

/// Split a delimited tag string on runs of whitespace, `;` and `,`.
///
/// Empty segments produced by leading or trailing separators are kept;
/// filtering them is the caller's decision.
pub fn split_tag_string(input: &str, normalize_tags: bool) -> Vec<String> {
    TAG_SEPARATORS
        .split(input)
        .map(|tag| {
            if normalize_tags {
                normalize(tag)
            } else {
                tag.to_string()
            }
        })
        .collect()
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a delimited string, e.g. `"red, heavy; #Sale"`.
    pub fn from_tag_string(input: &str, normalize_tags: bool) -> Self {
        let mut tags = Tags::new();
        tags.add_tag_string(input, None, normalize_tags);
        tags
    }

    /// Build a set from a JSON array: strings become tags, nested arrays
    /// become nested sets, anything else is ignored.
    pub fn from_json(input: &[Value], normalize_tags: bool) -> Self {
        let mut tags = Tags::new();
        tags.add_tags_json(input, None, normalize_tags);
        tags
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The direct string children, in order. Does not recurse and does
    /// not normalize.
    pub fn tags(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(|child| match child {
                Child::Tag(tag) => Some(tag.as_str()),
                Child::Set(_) => None,
            })
            .collect()
    }

    /// The direct nested-set children, in order.
    pub fn sets(&self) -> Vec<&Tags> {
        self.children
            .iter()
            .filter_map(|child| match child {
                Child::Tag(_) => None,
                Child::Set(set) => Some(set),
            })
            .collect()
    }

    /// Collect tag strings, descending `recurse` levels into nested sets.
    /// Recursive collection de-duplicates while keeping first-seen order.
    pub fn get_tags(&self, normalize_tags: bool, recurse: usize) -> Vec<String> {
        if recurse > 0 {
            let mut list = Vec::new();
            for child in &self.children {
                match child {
                    Child::Tag(tag) => list.push(if normalize_tags {
                        normalize(tag)
                    } else {
                        tag.clone()
                    }),
                    Child::Set(set) => list.extend(set.get_tags(normalize_tags, recurse - 1)),
                }
            }
            list.into_iter().unique().collect()
        } else {
            self.tags()
                .into_iter()
                .map(|tag| {
                    if normalize_tags {
                        normalize(tag)
                    } else {
                        tag.to_string()
                    }
                })
                .collect()
        }
    }

    /// Tags as simple strings, nested sets as nested arrays.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.children
                .iter()
                .map(|child| match child {
                    Child::Tag(tag) => Value::String(tag.clone()),
                    Child::Set(set) => set.to_json(),
                })
                .collect(),
        )
    }

    fn insert_children(&mut self, new: Vec<Child>, pos: Option<usize>) {
        match pos {
            Some(pos) if pos <= self.children.len() => {
                self.children.splice(pos..pos, new);
            }
            _ => self.children.extend(new),
        }
    }

    /// Add one tag, at `pos` or appended when `None`.
    pub fn add_tag(&mut self, tag: &str, pos: Option<usize>, normalize_tag: bool) {
        let tag = if normalize_tag {
            normalize(tag)
        } else {
            tag.to_string()
        };
        self.insert_children(vec![Child::Tag(tag)], pos);
    }

    /// Add one tag using the instance's add-normalization default.
    pub fn push_tag(&mut self, tag: &str) {
        self.add_tag(tag, None, self.normalize_add);
    }

    /// Add every tag parsed out of a delimited string.
    pub fn add_tag_string(&mut self, input: &str, pos: Option<usize>, normalize_tags: bool) {
        let children = split_tag_string(input, normalize_tags)
            .into_iter()
            .map(Child::Tag)
            .collect();
        self.insert_children(children, pos);
    }

    /// Add the string tags of another set (to `recurse` depth). Nested
    /// sets themselves are not carried over; see [`Tags::merge_tags`].
    pub fn add_tags_from(
        &mut self,
        other: &Tags,
        pos: Option<usize>,
        normalize_tags: bool,
        recurse: usize,
    ) {
        let children = other
            .get_tags(normalize_tags, recurse)
            .into_iter()
            .map(Child::Tag)
            .collect();
        self.insert_children(children, pos);
    }

    /// Add entries from a JSON array; see [`Tags::from_json`].
    pub fn add_tags_json(&mut self, input: &[Value], start: Option<usize>, normalize_tags: bool) {
        let mut pos = start;
        for item in input {
            match item {
                Value::String(tag) if !tag.is_empty() => {
                    self.add_tag(tag, pos, normalize_tags);
                }
                Value::Array(nested) => {
                    self.add_set(Tags::from_json(nested, normalize_tags), pos);
                }
                _ => continue,
            }
            if let Some(p) = pos.as_mut() {
                *p += 1;
            }
        }
    }

    /// Add a nested set as one child.
    pub fn add_set(&mut self, set: Tags, pos: Option<usize>) {
        self.insert_children(vec![Child::Set(set)], pos);
    }

    /// Add every child of another set, nested sets included.
    pub fn merge_tags(&mut self, other: &Tags, pos: Option<usize>) {
        self.insert_children(other.children.clone(), pos);
    }

    /// Index of the first direct tag child matching `want`. Nested sets
    /// never match a tag lookup.
    pub fn index_of(&self, want: &str, normalize_want: bool, normalize_has: bool) -> Option<usize> {
        let want = if normalize_want {
            normalize(want)
        } else {
            want.to_string()
        };
        self.children.iter().position(|child| match child {
            Child::Tag(tag) => {
                if normalize_has {
                    normalize(tag) == want
                } else {
                    *tag == want
                }
            }
            Child::Set(_) => false,
        })
    }

    pub fn index_of_set(&self, set: &Tags) -> Option<usize> {
        self.children.iter().position(|child| match child {
            Child::Set(candidate) => candidate == set,
            Child::Tag(_) => false,
        })
    }

    pub fn child_for(
        &self,
        want: &str,
        normalize_want: bool,
        normalize_has: bool,
    ) -> Option<&Child> {
        self.index_of(want, normalize_want, normalize_has)
            .map(|pos| &self.children[pos])
    }

    /// Swap a tag for another tag, keeping its position; appends when the
    /// old tag is absent.
    pub fn replace(&mut self, old: &str, new: &str, normalize_old: bool, normalize_new: bool) {
        let pos = self.index_of(old, normalize_old, normalize_old);
        if let Some(pos) = pos {
            self.remove_at(pos);
        }
        self.add_tag(new, pos, normalize_new);
    }

    /// Swap a tag for the string tags of another set, keeping its
    /// position; appends when the old tag is absent.
    pub fn replace_with_tags(
        &mut self,
        old: &str,
        new: &Tags,
        normalize_old: bool,
        normalize_new: bool,
    ) {
        let pos = self.index_of(old, normalize_old, normalize_old);
        if let Some(pos) = pos {
            self.remove_at(pos);
        }
        self.add_tags_from(new, pos, normalize_new, 0);
    }

    pub fn remove_at(&mut self, pos: usize) -> Child {
        self.children.remove(pos)
    }

    pub fn remove_tag(&mut self, tag: &str, normalize_want: bool, normalize_has: bool) -> bool {
        match self.index_of(tag, normalize_want, normalize_has) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn remove_set(&mut self, set: &Tags) -> bool {
        match self.index_of_set(set) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    /// True if a direct tag child matches; when `recurse_sets` is above
    /// zero, nested sets are searched to that depth.
    pub fn has(
        &self,
        want: &str,
        normalize_want: bool,
        normalize_has: bool,
        recurse_sets: usize,
    ) -> bool {
        let want = if normalize_want {
            normalize(want)
        } else {
            want.to_string()
        };
        if self.index_of(&want, false, normalize_has).is_some() {
            return true;
        }
        if recurse_sets > 0 {
            return self
                .sets()
                .iter()
                .any(|set| set.has(&want, false, normalize_has, recurse_sets - 1));
        }
        false
    }

    /// True if any child of `want` matches: a leaf tag must be [`Tags::has`]
    /// here, a nested set must be wholly satisfied via [`Tags::all`].
    pub fn any(
        &self,
        want: &Tags,
        normalize_want: bool,
        normalize_has: bool,
        recurse_has: usize,
    ) -> bool {
        want.children.iter().any(|child| match child {
            Child::Set(set) => self.all(set, normalize_want, normalize_has, recurse_has),
            Child::Tag(tag) => self.has(tag, normalize_want, normalize_has, recurse_has),
        })
    }

    /// True only if every child of `want` matches: a leaf tag must be
    /// [`Tags::has`] here, a nested set is satisfied via [`Tags::any`],
    /// mirroring [`Tags::any`]'s treatment.
    pub fn all(
        &self,
        want: &Tags,
        normalize_want: bool,
        normalize_has: bool,
        recurse_has: usize,
    ) -> bool {
        want.children.iter().all(|child| match child {
            Child::Set(set) => self.any(set, normalize_want, normalize_has, recurse_has),
            Child::Tag(tag) => self.has(tag, normalize_want, normalize_has, recurse_has),
        })
    }

    /// [`Tags::has`] with the instance defaults and no recursion.
    pub fn contains_tag(&self, want: &str) -> bool {
        self.has(want, self.normalize_want, self.normalize_has, 0)
    }

    /// [`Tags::any`] with the instance defaults and no recursion.
    pub fn any_of(&self, want: &Tags) -> bool {
        self.any(want, self.normalize_want, self.normalize_has, 0)
    }

    /// [`Tags::all`] with the instance defaults and no recursion.
    pub fn all_of(&self, want: &Tags) -> bool {
        self.all(want, self.normalize_want, self.normalize_has, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_handles_separator_runs() {
        assert_eq!(split_tag_string("a, b;c", false), vec!["a", "b", "c"]);
        assert_eq!(split_tag_string("one\t two", false), vec!["one", "two"]);
        assert_eq!(
            split_tag_string(",lead", false),
            vec!["", "lead"],
            "boundary separators keep the empty segment"
        );
    }

    #[test]
    fn normalize_lowercases_and_strips_hash() {
        assert_eq!(normalize("#Sale"), "sale");
        assert_eq!(normalize("HEAVY"), "heavy");
        assert_eq!(normalize("##double"), "#double", "only one leading hash is stripped");
    }

    #[test]
    fn from_tag_string_normalized() {
        let tags = Tags::from_tag_string("#A B", true);
        assert_eq!(tags.get_tags(false, 0), vec!["a", "b"]);
    }

    #[test]
    fn json_round_trip_with_nested_sets() {
        let input = json!(["red", ["inner", "pair"], "blue", 7]);
        let tags = Tags::from_json(input.as_array().unwrap(), false);

        assert_eq!(tags.tags(), vec!["red", "blue"], "number is ignored");
        assert_eq!(tags.sets().len(), 1);
        assert_eq!(tags.to_json(), json!(["red", ["inner", "pair"], "blue"]));
    }

    #[test]
    fn get_tags_recurses_and_dedupes() {
        let tags = Tags::from_json(json!(["a", ["b", "a"], "c"]).as_array().unwrap(), false);
        assert_eq!(tags.get_tags(false, 0), vec!["a", "c"]);
        assert_eq!(tags.get_tags(false, 1), vec!["a", "b", "c"]);
    }

    #[test]
    fn positional_insert_and_replace() {
        let mut tags = Tags::from_tag_string("a c", false);
        tags.add_tag("b", Some(1), false);
        assert_eq!(tags.tags(), vec!["a", "b", "c"]);

        tags.replace("b", "B2", false, false);
        assert_eq!(tags.tags(), vec!["a", "B2", "c"], "replacement keeps position");

        tags.replace("missing", "z", false, false);
        assert_eq!(
            tags.tags(),
            vec!["a", "B2", "c", "z"],
            "replacing an absent tag appends"
        );
    }

    #[test]
    fn replace_with_tags_splices_strings() {
        let mut tags = Tags::from_tag_string("x mid y", false);
        let replacement = Tags::from_tag_string("m1 m2", false);
        tags.replace_with_tags("mid", &replacement, false, false);
        assert_eq!(tags.tags(), vec!["x", "m1", "m2", "y"]);
    }

    #[test]
    fn has_with_normalization_and_recursion() {
        let mut tags = Tags::from_tag_string("Alpha", false);
        let mut inner = Tags::new();
        inner.add_tag("Deep", None, false);
        tags.add_set(inner, None);

        assert!(tags.has("#ALPHA", true, true, 0));
        assert!(!tags.has("deep", true, true, 0), "nested needs recursion");
        assert!(tags.has("deep", true, true, 1));
    }

    #[test]
    fn any_and_all_duality_on_flat_sets() {
        let have = Tags::from_tag_string("red green blue", false);
        let overlap = Tags::from_tag_string("blue yellow", false);
        let subset = Tags::from_tag_string("red blue", false);
        let disjoint = Tags::from_tag_string("cyan", false);

        assert!(have.any_of(&overlap));
        assert!(!have.all_of(&overlap));
        assert!(have.all_of(&subset));
        assert!(!have.any_of(&disjoint));
    }

    #[test]
    fn nested_want_sets_cross_call() {
        let have = Tags::from_tag_string("a b", false);

        // A nested set inside an any-query must fully hold (all).
        let mut want_any = Tags::new();
        let mut branch = Tags::new();
        branch.add_tag("a", None, false);
        branch.add_tag("missing", None, false);
        want_any.add_set(branch, None);
        assert!(!have.any(&want_any, false, false, 0));

        // A nested set inside an all-query may hold partially (any).
        let mut want_all = Tags::new();
        let mut options = Tags::new();
        options.add_tag("missing", None, false);
        options.add_tag("b", None, false);
        want_all.add_set(options, None);
        assert!(have.all(&want_all, false, false, 0));
    }

    #[test]
    fn remove_and_merge() {
        let mut tags = Tags::from_tag_string("a b", false);
        assert!(tags.remove_tag("a", false, false));
        assert!(!tags.remove_tag("a", false, false));

        let mut other = Tags::from_tag_string("x", false);
        let mut inner = Tags::new();
        inner.push_tag("y");
        other.add_set(inner.clone(), None);

        tags.merge_tags(&other, Some(0));
        assert_eq!(tags.to_json(), json!(["x", ["y"], "b"]));
        assert!(tags.remove_set(&inner));
        assert_eq!(tags.to_json(), json!(["x", "b"]));
    }
}
