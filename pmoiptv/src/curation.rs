//! Curation and ranking of probed channels
//!
//! The policy is plain data: a denylist of exact channel names and the prefix
//! of the insecure transport to strip. Surviving channels are projected to
//! their public shape and ranked available-first, then by name.

use crate::models::{CuratedRecord, ProbedChannelRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Endpoints starting with this prefix use plain, unencrypted transport
pub const DEFAULT_INSECURE_PREFIX: &str = "http://";

/// Channel names removed from the published list
pub const DEFAULT_DENYLIST: &[&str] = &[
    "BOOBA",
    "ERT NEWS",
    "ERT SPORTS",
    "ERT SPORTS 1",
    "ERT SPORTS 2",
    "ERT SPORTS 3",
    "ERT SPORTS 4",
    "ERT SPORTS 5",
    "ERT SPORTS 6",
    "ERT WORLD",
    "FIGARO",
    "GROOVY",
    "MAD TV",
    "PEMPTOUSIA TV",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationPolicy {
    /// Exact, case-sensitive channel names to drop
    pub denylist: HashSet<String>,
    pub insecure_prefix: String,
}

impl Default for CurationPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_DENYLIST.iter().map(|name| name.to_string()),
            DEFAULT_INSECURE_PREFIX,
        )
    }
}

impl CurationPolicy {
    pub fn new<I>(denylist: I, insecure_prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            denylist: denylist.into_iter().collect(),
            insecure_prefix: insecure_prefix.into(),
        }
    }

    /// `true` when the record survives both filters
    pub fn keeps(&self, record: &ProbedChannelRecord) -> bool {
        !self.denylist.contains(&record.channel.name)
            && (self.insecure_prefix.is_empty()
                || !record.channel.url.starts_with(&self.insecure_prefix))
    }

    /// Filter, project and rank probed channels
    pub fn curate(&self, records: Vec<ProbedChannelRecord>) -> Vec<CuratedRecord> {
        let mut curated: Vec<CuratedRecord> = records
            .into_iter()
            .filter(|record| self.keeps(record))
            .map(CuratedRecord::from)
            .collect();

        sort_curated(&mut curated);
        curated
    }
}

/// Stable sort: enabled first, then ascending name
pub fn sort_curated(records: &mut [CuratedRecord]) {
    records.sort_by(|a, b| {
        b.enabled
            .cmp(&a.enabled)
            .then_with(|| locale_cmp(&a.name, &b.name))
    });
}

/// Name comparison close to a root-locale collation
///
/// Names are decomposed (NFD) and compared in three levels: base letters
/// without accents or case, then accents, then case with lowercase first.
/// Code points break the remaining ties so the order is total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accents(a).cmp(&accents(b)))
        .then_with(|| case_ranks(a).cmp(case_ranks(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

// Marks grouped per base letter; a bare letter sorts before its accented forms
fn accents(s: &str) -> Vec<Vec<char>> {
    let mut marks: Vec<Vec<char>> = Vec::new();
    for c in s.nfd() {
        if !is_combining_mark(c) {
            marks.push(Vec::new());
        } else if let Some(last) = marks.last_mut() {
            last.push(c);
        } else {
            marks.push(vec![c]);
        }
    }
    marks
}

fn case_ranks(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_uppercase() { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelRecord;

    fn probed(name: &str, url: &str, enabled: bool) -> ProbedChannelRecord {
        ChannelRecord::new(name, url).probed(enabled)
    }

    fn names(records: &[CuratedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_denylist_is_exact_and_case_sensitive() {
        let policy = CurationPolicy::default();
        let curated = policy.curate(vec![
            probed("BOOBA", "https://booba", true),
            probed("booba", "https://booba", true),
            probed("BOOBA ", "https://booba", true),
        ]);

        assert_eq!(names(&curated), ["booba", "BOOBA "]);
    }

    #[test]
    fn test_insecure_endpoints_removed_regardless_of_probe() {
        let policy = CurationPolicy::default();
        let curated = policy.curate(vec![
            probed("Plain up", "http://host/live.m3u8", true),
            probed("Plain down", "http://host/live.m3u8", false),
            probed("Secure", "https://host/live.m3u8", false),
            probed("Other", "rtmp://host/live", false),
        ]);

        assert_eq!(names(&curated), ["Other", "Secure"]);
    }

    #[test]
    fn test_enabled_first_then_by_name() {
        let policy = CurationPolicy::new(Vec::new(), DEFAULT_INSECURE_PREFIX);
        let curated = policy.curate(vec![
            probed("Zeta", "https://z", true),
            probed("alpha", "https://a", false),
            probed("Beta", "https://b", true),
            probed("Alpha", "https://a2", true),
        ]);

        assert_eq!(names(&curated), ["Alpha", "Beta", "Zeta", "alpha"]);
        assert!(curated[..3].iter().all(|r| r.enabled));
        assert!(!curated[3].enabled);
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut records = vec![
            CuratedRecord { name: "Same".into(), url: "https://1".into(), enabled: false },
            CuratedRecord { name: "ΣΚΑΪ".into(), url: "https://2".into(), enabled: true },
            CuratedRecord { name: "Same".into(), url: "https://3".into(), enabled: false },
            CuratedRecord { name: "ANT1".into(), url: "https://4".into(), enabled: true },
        ];

        sort_curated(&mut records);
        let once = records.clone();
        sort_curated(&mut records);

        assert_eq!(records, once);
        assert_eq!(names(&records), ["ANT1", "ΣΚΑΪ", "Same", "Same"]);
        // Ties keep their input order
        assert_eq!(records[2].url, "https://1");
        assert_eq!(records[3].url, "https://3");
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(locale_cmp("Beta", "alpha"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("Mega", "MEGA HD"), Ordering::Less);
        assert_eq!(locale_cmp("Star", "Star"), Ordering::Equal);
    }

    #[test]
    fn test_locale_cmp_accented_names() {
        // Accents do not move a name away from its base letter
        assert_eq!(locale_cmp("Écho", "Zeta"), Ordering::Less);
        assert_eq!(locale_cmp("Écho", "Delta"), Ordering::Greater);
        assert_eq!(locale_cmp("Έψιλον", "Δέλτα"), Ordering::Greater);
        assert_eq!(locale_cmp("Άλφα", "Βήτα"), Ordering::Less);
        assert_eq!(locale_cmp("Ήλιος", "Θεσσαλία"), Ordering::Less);

        // Same letters: unaccented first, then lowercase first
        assert_eq!(locale_cmp("cote", "côte"), Ordering::Less);
        assert_eq!(locale_cmp("Ελλάδα", "Ελλαδα"), Ordering::Greater);
        assert_eq!(locale_cmp("ελλάδα", "ΕΛΛΆΔΑ"), Ordering::Less);

        // Latin before Greek
        assert_eq!(locale_cmp("Zeta", "Άλφα"), Ordering::Less);
    }

    #[test]
    fn test_greek_channels_ranked_by_base_letter() {
        let policy = CurationPolicy::new(Vec::new(), DEFAULT_INSECURE_PREFIX);
        let curated = policy.curate(vec![
            probed("Ωμέγα TV", "https://o", true),
            probed("Έψιλον", "https://e", true),
            probed("Δέλτα", "https://d", true),
            probed("Άλφα", "https://a", true),
            probed("Βήτα", "https://b", true),
        ]);

        assert_eq!(names(&curated), ["Άλφα", "Βήτα", "Δέλτα", "Έψιλον", "Ωμέγα TV"]);
    }

    #[test]
    fn test_default_policy() {
        let policy = CurationPolicy::default();
        assert_eq!(policy.denylist.len(), 14);
        assert!(policy.denylist.contains("PEMPTOUSIA TV"));
        assert_eq!(policy.insecure_prefix, "http://");
    }
}
