use crate::ir::GroupRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

pub const LOCATIONS: [&str; 4] = ["CT", "NS", "UC", "HQ"];
pub const CATEGORIES: [&str; 7] = ["MAG", "MIS", "MEM", "MAT", "MIN", "M SUP", "KIDS"];

static CAMPUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(CT|NS|UC)\s+(.+)$").unwrap());
static HQ_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(~HQ)\s+(.+)$").unwrap());

/// Upper-cased, trimmed name with a single leading `~` alias marker removed.
pub fn canonical_name(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    match upper.strip_prefix('~') {
        Some(rest) => rest.trim_start().to_string(),
        None => upper,
    }
}

/// The active `"<LOCATION> <CATEGORY>"` selections.
///
/// Matching is exact on canonical names: `CT M SUP` never matches
/// `CT M SUPPORT`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    combinations: Vec<String>,
}

impl FilterSet {
    pub fn new<I, S>(combinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for combination in combinations {
            set.insert(combination.as_ref());
        }
        set
    }

    pub fn insert(&mut self, combination: &str) -> bool {
        let canonical = canonical_name(combination);
        if canonical.is_empty() || self.combinations.contains(&canonical) {
            return false;
        }
        self.combinations.push(canonical);
        true
    }

    /// Adds the combination when absent, removes it when present.
    pub fn toggle(&mut self, combination: &str) -> bool {
        let canonical = canonical_name(combination);
        if let Some(pos) = self.combinations.iter().position(|c| *c == canonical) {
            self.combinations.remove(pos);
            false
        } else {
            self.insert(&canonical)
        }
    }

    /// Selects every available combination at `location`, or clears them
    /// all when each one is already selected. Returns whether the group is
    /// now selected.
    pub fn toggle_location(&mut self, location: &str, available: &BTreeSet<String>) -> bool {
        let location = canonical_name(location);
        self.toggle_group(available, |loc, _| loc == location)
    }

    /// Same as [`FilterSet::toggle_location`], across locations for one
    /// category.
    pub fn toggle_category(&mut self, category: &str, available: &BTreeSet<String>) -> bool {
        let category = canonical_name(category);
        self.toggle_group(available, |_, cat| cat == category)
    }

    fn toggle_group(
        &mut self,
        available: &BTreeSet<String>,
        in_group: impl Fn(&str, &str) -> bool,
    ) -> bool {
        let group: Vec<String> = available
            .iter()
            .map(|combination| canonical_name(combination))
            .filter(|combination| {
                combination
                    .split_once(' ')
                    .is_some_and(|(location, category)| in_group(location, category))
            })
            .collect();
        if group.is_empty() {
            return false;
        }
        if group.iter().all(|combination| self.combinations.contains(combination)) {
            self.combinations.retain(|combination| !group.contains(combination));
            return false;
        }
        for combination in &group {
            self.insert(combination);
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn combinations(&self) -> &[String] {
        &self.combinations
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.combinations.is_empty() {
            return false;
        }
        let canonical = canonical_name(name);
        self.combinations.iter().any(|c| *c == canonical)
    }
}

/// Filter combinations that at least one record can satisfy.
pub fn available_combinations(records: &[GroupRecord]) -> BTreeSet<String> {
    let mut combinations = BTreeSet::new();
    for record in records {
        let name = record.name.to_uppercase();
        for pattern in [&*CAMPUS_RE, &*HQ_RE] {
            let Some(caps) = pattern.captures(&name) else {
                continue;
            };
            let location = match &caps[1] {
                "~HQ" => "HQ",
                other => other,
            };
            let category = &caps[2];
            if CATEGORIES.contains(&category) {
                combinations.insert(format!("{location} {category}"));
            }
        }
    }
    combinations
}
