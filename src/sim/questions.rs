//! Quiz questions and per-station allocation
//!
//! Every level session hands each of its five key stations a primary and a
//! backup question. The pool for a level is fetched and shuffled on the first
//! visit only; restarts of the same level reuse the cached order.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::KEYS_PER_LEVEL;
use crate::error::SimError;

/// Slots filled per session: one primary and one backup per station
pub const QUESTION_SLOTS: usize = KEYS_PER_LEVEL as usize * 2;

/// Built-in question table
const BUILTIN_QUESTIONS: &str = include_str!("../../data/questions.json");

/// Question category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Vocabulary,
    Grammar,
    Idiom,
    Collocation,
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// Proficiency tag (A1..C2)
    pub level: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: [String; 4],
    /// Index into `options`
    pub correct: usize,
    pub explanation: String,
    pub hint: String,
}

impl Question {
    #[inline]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.correct >= self.options.len() {
            return Err(SimError::InvalidQuestion {
                id: self.id.clone(),
                reason: format!("correct option {} out of range", self.correct),
            });
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(SimError::InvalidQuestion {
                id: self.id.clone(),
                reason: "empty option".to_string(),
            });
        }
        Ok(())
    }
}

/// Supplies question lists by proficiency tag
pub trait QuestionSource {
    /// Questions for `tag`, possibly empty
    fn questions_for(&mut self, tag: &str) -> Vec<Question>;
}

/// In-memory question table grouped by proficiency tag
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    by_tag: HashMap<String, Vec<Question>>,
}

#[derive(Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Parse a `{ "questions": [...] }` document
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let file: QuestionFile = serde_json::from_str(json)?;
        let mut bank = Self::default();
        for q in file.questions {
            q.validate()?;
            bank.insert(q);
        }
        Ok(bank)
    }

    /// The question table shipped with the game
    pub fn builtin() -> Result<Self, SimError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn insert(&mut self, question: Question) {
        self.by_tag
            .entry(question.level.clone())
            .or_default()
            .push(question);
    }

    pub fn count(&self, tag: &str) -> usize {
        self.by_tag.get(tag).map_or(0, Vec::len)
    }

    /// Proficiency tags present in the bank, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.by_tag.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl QuestionSource for QuestionBank {
    fn questions_for(&mut self, tag: &str) -> Vec<Question> {
        self.by_tag.get(tag).cloned().unwrap_or_default()
    }
}

#[allow(clippy::too_many_arguments)]
fn make_question(
    id: String,
    level: &str,
    kind: QuestionKind,
    prompt: &str,
    options: [&str; 4],
    correct: usize,
    explanation: &str,
    hint: &str,
) -> Question {
    Question {
        id,
        level: level.to_string(),
        kind,
        prompt: prompt.to_string(),
        options: options.map(str::to_string),
        correct,
        explanation: explanation.to_string(),
        hint: hint.to_string(),
    }
}

/// Minimal pool used when the source has nothing for a tag
pub fn fallback_pool(tag: &str) -> Vec<Question> {
    vec![
        make_question(
            format!("fallback_{tag}_1"),
            tag,
            QuestionKind::Vocabulary,
            "Which word is a greeting?",
            ["hello", "goodbye", "thanks", "sorry"],
            0,
            "\"Hello\" is used to greet someone.",
            "You say it when you meet someone",
        ),
        make_question(
            format!("fallback_{tag}_2"),
            tag,
            QuestionKind::Grammar,
            "I ___ a student.",
            ["am", "is", "are", "be"],
            0,
            "First person singular takes \"am\".",
            "First person",
        ),
    ]
}

/// Single question handed out for a station with no allocation
pub fn fallback_question(tag: &str) -> Question {
    make_question(
        "fallback".to_string(),
        tag,
        QuestionKind::Vocabulary,
        "Which word names something you play?",
        ["game", "film", "book", "song"],
        0,
        "You play a game.",
        "Entertainment activity",
    )
}

/// Identifies one cached, shuffled pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub tag: String,
    pub level: u8,
}

impl PoolKey {
    pub fn new(tag: impl Into<String>, level: u8) -> Self {
        Self {
            tag: tag.into(),
            level,
        }
    }
}

/// Primary/backup questions for one station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPair {
    pub primary: Question,
    pub backup: Question,
    /// Set once the primary has been handed out
    pub consumed: bool,
}

/// Pair up `ordered` into one pair per station, repeating the list
/// cyclically when it has fewer than `QUESTION_SLOTS` entries
pub fn build_pairs(ordered: &[Question]) -> Vec<QuestionPair> {
    if ordered.is_empty() {
        return Vec::new();
    }
    let slots: Vec<&Question> = ordered.iter().cycle().take(QUESTION_SLOTS).collect();
    slots
        .chunks_exact(2)
        .map(|pair| QuestionPair {
            primary: pair[0].clone(),
            backup: pair[1].clone(),
            consumed: false,
        })
        .collect()
}

/// Hands out station questions for the current level session
#[derive(Debug, Clone, Default)]
pub struct QuestionAllocator {
    cache: HashMap<PoolKey, Vec<Question>>,
    pairs: Vec<QuestionPair>,
    tag: String,
}

impl QuestionAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this session's pairs for `key`.
    ///
    /// The source is queried and the result shuffled only on the first visit
    /// of a key. Later calls reuse the cached order.
    pub fn initialize<S, R>(&mut self, key: &PoolKey, source: &mut S, rng: &mut R)
    where
        S: QuestionSource + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.cache.contains_key(key) {
            let mut questions = source.questions_for(&key.tag);
            if questions.is_empty() {
                log::warn!(
                    "No questions for {} (level {}), using fallback pool",
                    key.tag,
                    key.level
                );
                questions = fallback_pool(&key.tag);
            }
            let mut seen = HashSet::new();
            questions.retain(|q| seen.insert(q.id.clone()));
            if questions.len() < 2 {
                log::warn!(
                    "Only one question for {} (level {}), topping up from fallback pool",
                    key.tag,
                    key.level
                );
                for q in fallback_pool(&key.tag) {
                    if !questions.iter().any(|existing| existing.id == q.id) {
                        questions.push(q);
                    }
                }
            }
            questions.shuffle(rng);
            log::info!(
                "Loaded {} questions for {} level {}",
                questions.len(),
                key.tag,
                key.level
            );
            self.cache.insert(key.clone(), questions);
        }

        let ordered = &self.cache[key];
        self.pairs = build_pairs(ordered);
        self.tag = key.tag.clone();
    }

    /// Question for `station`: the primary on first request, the backup on
    /// every later one. The two always differ.
    pub fn allocate(&mut self, station: usize) -> Question {
        let Some(pair) = self.pairs.get_mut(station) else {
            log::warn!("No question pair for station {station}, using fallback");
            return fallback_question(&self.tag);
        };
        if pair.consumed {
            pair.backup.clone()
        } else {
            pair.consumed = true;
            pair.primary.clone()
        }
    }

    pub fn is_consumed(&self, station: usize) -> bool {
        self.pairs.get(station).is_some_and(|p| p.consumed)
    }

    pub fn pairs(&self) -> &[QuestionPair] {
        &self.pairs
    }

    /// Shuffled order cached for `key`, if visited
    pub fn cached(&self, key: &PoolKey) -> Option<&[Question]> {
        self.cache.get(key).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn numbered(tag: &str, n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                make_question(
                    format!("{tag}_{i}"),
                    tag,
                    QuestionKind::Grammar,
                    "prompt",
                    ["a", "b", "c", "d"],
                    i % 4,
                    "because",
                    "think",
                )
            })
            .collect()
    }

    /// Source that counts how often it is queried
    struct CountingSource {
        questions: Vec<Question>,
        calls: usize,
    }

    impl QuestionSource for CountingSource {
        fn questions_for(&mut self, _tag: &str) -> Vec<Question> {
            self.calls += 1;
            self.questions.clone()
        }
    }

    #[test]
    fn test_builtin_bank_loads() {
        let bank = QuestionBank::builtin().unwrap();
        assert_eq!(bank.tags(), vec!["A1", "A2", "B1", "B2", "C1", "C2"]);
        assert!(bank.count("A1") >= 10);
        assert_eq!(bank.count("Z9"), 0);
    }

    #[test]
    fn test_rejects_out_of_range_answer() {
        let json = r#"{"questions":[{"id":"x","level":"A1","type":"grammar","prompt":"p",
            "options":["a","b","c","d"],"correct":4,"explanation":"e","hint":"h"}]}"#;
        assert!(matches!(
            QuestionBank::from_json(json),
            Err(SimError::InvalidQuestion { .. })
        ));
    }

    #[test]
    fn test_large_pool_uses_ten_distinct() {
        let mut source = CountingSource {
            questions: numbered("A1", 25),
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut alloc = QuestionAllocator::new();
        alloc.initialize(&PoolKey::new("A1", 1), &mut source, &mut rng);

        let pairs = alloc.pairs();
        assert_eq!(pairs.len(), 5);
        let mut ids: Vec<&str> = pairs
            .iter()
            .flat_map(|p| [p.primary.id.as_str(), p.backup.id.as_str()])
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_two_question_pool_cycles() {
        let mut source = CountingSource {
            questions: numbered("C2", 2),
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let mut alloc = QuestionAllocator::new();
        alloc.initialize(&PoolKey::new("C2", 1), &mut source, &mut rng);

        assert_eq!(alloc.pairs().len(), 5);
        for station in 0..5 {
            let first = alloc.allocate(station);
            let second = alloc.allocate(station);
            assert_ne!(first.id, second.id);
        }
    }

    #[test]
    fn test_primary_then_backup_per_station() {
        let mut source = CountingSource {
            questions: numbered("B1", 12),
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut alloc = QuestionAllocator::new();
        alloc.initialize(&PoolKey::new("B1", 2), &mut source, &mut rng);

        let primary = alloc.pairs()[2].primary.clone();
        let backup = alloc.pairs()[2].backup.clone();
        assert!(!alloc.is_consumed(2));
        assert_eq!(alloc.allocate(2), primary);
        assert!(alloc.is_consumed(2));
        assert_eq!(alloc.allocate(2), backup);
        assert_eq!(alloc.allocate(2), backup);

        // Other stations are untouched
        assert!(!alloc.is_consumed(0));
        assert_eq!(alloc.allocate(0), alloc.pairs()[0].primary.clone());
    }

    #[test]
    fn test_restart_reuses_cached_order() {
        let mut source = CountingSource {
            questions: numbered("A2", 15),
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(4);
        let mut alloc = QuestionAllocator::new();
        let key = PoolKey::new("A2", 1);

        alloc.initialize(&key, &mut source, &mut rng);
        let first: Vec<String> = alloc.pairs().iter().map(|p| p.primary.id.clone()).collect();
        alloc.allocate(0);

        alloc.initialize(&key, &mut source, &mut rng);
        let second: Vec<String> = alloc.pairs().iter().map(|p| p.primary.id.clone()).collect();

        assert_eq!(source.calls, 1);
        assert_eq!(first, second);
        // Consumption resets with the new session
        assert!(!alloc.is_consumed(0));

        alloc.initialize(&PoolKey::new("A2", 2), &mut source, &mut rng);
        assert_eq!(source.calls, 2);
    }

    #[test]
    fn test_empty_source_falls_back() {
        let mut source = CountingSource {
            questions: Vec::new(),
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut alloc = QuestionAllocator::new();
        alloc.initialize(&PoolKey::new("B2", 3), &mut source, &mut rng);
        assert_eq!(alloc.pairs().len(), 5);
        for station in 0..5 {
            assert!(alloc.allocate(station).id.starts_with("fallback_B2"));
        }
    }

    #[test]
    fn test_single_question_pool_tops_up_from_fallback() {
        let mut source = CountingSource {
            questions: numbered("C2", 1),
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(6);
        let mut alloc = QuestionAllocator::new();
        alloc.initialize(&PoolKey::new("C2", 4), &mut source, &mut rng);

        assert_eq!(alloc.cached(&PoolKey::new("C2", 4)).map(<[_]>::len), Some(3));
        for pair in alloc.pairs() {
            assert_ne!(pair.primary.id, pair.backup.id);
        }
        let first = alloc.allocate(0);
        let second = alloc.allocate(0);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_duplicate_ids_are_collapsed() {
        let mut questions = numbered("B2", 1);
        questions.push(questions[0].clone());
        let mut source = CountingSource {
            questions,
            calls: 0,
        };
        let mut rng = Pcg32::seed_from_u64(7);
        let mut alloc = QuestionAllocator::new();
        alloc.initialize(&PoolKey::new("B2", 1), &mut source, &mut rng);
        for pair in alloc.pairs() {
            assert_ne!(pair.primary.id, pair.backup.id);
        }
    }

    #[test]
    fn test_unknown_station_gets_fallback() {
        let mut alloc = QuestionAllocator::new();
        let q = alloc.allocate(9);
        assert_eq!(q.id, "fallback");
        assert!(q.is_correct(0));
    }

    proptest! {
        #[test]
        fn prop_station_never_repeats_question(pool in 1usize..40, seed in any::<u64>()) {
            let mut source = CountingSource { questions: numbered("A1", pool), calls: 0 };
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut alloc = QuestionAllocator::new();
            alloc.initialize(&PoolKey::new("A1", 1), &mut source, &mut rng);
            prop_assert_eq!(alloc.pairs().len(), 5);
            for station in 0..5 {
                let a = alloc.allocate(station);
                let b = alloc.allocate(station);
                prop_assert_ne!(a.id, b.id);
            }
        }
    }
}
