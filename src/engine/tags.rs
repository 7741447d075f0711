//! Rating → tag-set catalog and the random selection rule.

use crate::error::RunError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// A combination of tag codes submitted together with one rating.
pub type TagSet = Vec<String>;

/// Built-in catalog: for each star rating, the tag combinations the partner
/// page offers. Codes are `<stars>-<dimension>-<n>`.
const BUILTIN: &[(u8, &[&[&str]])] = &[
    (1, &[
        &["1-A-1"],
        &["1-A-2"],
        &["1-B-1"],
        &["1-A-1", "1-C-1"],
        &["1-B-2", "1-C-2"],
    ]),
    (2, &[
        &["2-A-1"],
        &["2-A-2"],
        &["2-B-1"],
        &["2-A-1", "2-C-1"],
        &["2-B-2", "2-C-2"],
    ]),
    (3, &[
        &["3-A-1"],
        &["3-A-2"],
        &["3-B-1"],
        &["3-A-1", "3-B-2"],
        &["3-B-1", "3-C-1"],
        &["3-A-2", "3-C-2"],
    ]),
    (4, &[
        &["4-A-1"],
        &["4-A-2"],
        &["4-B-1"],
        &["4-A-1", "4-B-2"],
        &["4-B-1", "4-C-1"],
        &["4-A-2", "4-C-2"],
    ]),
    (5, &[
        &["5-A-1"],
        &["5-A-2"],
        &["5-B-1"],
        &["5-A-1", "5-B-2"],
        &["5-B-1", "5-C-1"],
    ]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    sets: BTreeMap<u8, Vec<TagSet>>,
}

impl Default for TagGroup {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TagGroup {
    pub fn builtin() -> Self {
        let sets = BUILTIN
            .iter()
            .map(|(stars, sets)| {
                let sets = sets
                    .iter()
                    .map(|set| set.iter().map(|t| t.to_string()).collect())
                    .collect();
                (*stars, sets)
            })
            .collect();
        Self { sets }
    }

    /// Build a catalog from the `[tags]` config table. Keys are star ratings
    /// written as strings ("1".."5"); every rating needs at least one
    /// non-empty tag set.
    pub fn from_table(table: &BTreeMap<String, Vec<TagSet>>) -> Result<Self, RunError> {
        let mut sets = BTreeMap::new();
        for (key, list) in table {
            let stars: u8 = key
                .trim()
                .parse()
                .ok()
                .filter(|s| (1..=5).contains(s))
                .ok_or_else(|| RunError::ConfigInvalid(format!("tag group key {key:?} is not a star rating 1-5")))?;
            if list.is_empty() || list.iter().any(|set| set.is_empty()) {
                return Err(RunError::ConfigInvalid(format!(
                    "tag group for {stars} stars must hold non-empty tag sets"
                )));
            }
            sets.insert(stars, list.clone());
        }
        Ok(Self { sets })
    }

    pub fn contains(&self, stars: u8) -> bool {
        self.sets.contains_key(&stars)
    }

    pub fn sets_for(&self, stars: u8) -> Option<&[TagSet]> {
        self.sets.get(&stars).map(Vec::as_slice)
    }

    /// Pick one tag set for `stars`, uniformly at random.
    pub fn select<R: Rng + ?Sized>(&self, stars: u8, rng: &mut R) -> Result<&TagSet, RunError> {
        self.sets
            .get(&stars)
            .and_then(|list| list.choose(rng))
            .ok_or(RunError::UnknownRating(stars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_covers_every_rating() {
        let group = TagGroup::builtin();
        for stars in 1..=5 {
            let sets = group.sets_for(stars).unwrap();
            assert!(!sets.is_empty());
            for set in sets {
                assert!(set.iter().all(|t| t.starts_with(&format!("{stars}-"))));
            }
        }
        assert!(!group.contains(0));
        assert!(!group.contains(6));
    }

    #[test]
    fn test_select_draws_from_rating_group() {
        let group = TagGroup::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let set = group.select(4, &mut rng).unwrap();
            assert!(group.sets_for(4).unwrap().contains(set));
        }
    }

    #[test]
    fn test_select_is_deterministic_for_seeded_rng() {
        let group = TagGroup::builtin();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(group.select(3, &mut a).unwrap(), group.select(3, &mut b).unwrap());
        }
    }

    #[test]
    fn test_select_visits_more_than_one_set() {
        let group = TagGroup::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(group.select(5, &mut rng).unwrap().clone());
        }
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_select_unknown_rating() {
        let group = TagGroup::builtin();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(group.select(9, &mut rng), Err(RunError::UnknownRating(9))));
    }

    #[test]
    fn test_from_table() {
        let mut table = BTreeMap::new();
        table.insert("3".to_string(), vec![vec!["x".to_string(), "y".to_string()]]);
        let group = TagGroup::from_table(&table).unwrap();
        assert!(group.contains(3));
        assert!(!group.contains(4));

        let mut bad = BTreeMap::new();
        bad.insert("7".to_string(), vec![vec!["x".to_string()]]);
        assert!(matches!(TagGroup::from_table(&bad), Err(RunError::ConfigInvalid(_))));

        let mut empty = BTreeMap::new();
        empty.insert("2".to_string(), vec![]);
        assert!(matches!(TagGroup::from_table(&empty), Err(RunError::ConfigInvalid(_))));
    }
}
