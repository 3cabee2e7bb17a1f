//! BPE learner implementation.
//!
//! Classic frequency-driven BPE: count every adjacent pair over the distinct words,
//! merge the most frequent pair, update the counts of the words it touched, repeat.

use super::cancel::CancelToken;
use super::config::{AlphabetPolicy, TrainingConfig};
use super::counter::WordCounter;
use super::stats::PairStatistics;
use super::word::WordModel;
use compact_str::CompactString;
use sharif_bpe_core::{BpeError, Model, Result, Splitter, BYTE_ALPHABET_SIZE};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Called after every merge with the number of merges done so far.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// BPE learner.
///
/// Trains a [`Model`] from text by iteratively merging the most frequent byte pairs.
/// Ties between equally frequent pairs go to the smallest `(left, right)` pair, so
/// training is deterministic.
#[derive(Clone, Default)]
pub struct BpeLearner {
    config: TrainingConfig,
    cancel: CancelToken,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for BpeLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BpeLearner")
            .field("config", &self.config)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl BpeLearner {
    /// Create a new learner with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Create a new learner with the default configuration and the given target size.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig {
            vocab_size,
            ..Default::default()
        })
    }

    /// Use `token` to stop training from another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Report progress after every merge step.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The token checked between merge steps.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn splitter(&self) -> Splitter {
        Splitter::new(self.config.split)
    }

    /// Learn a model from text chunks.
    pub fn learn<S>(&self, chunks: &[S]) -> Result<Model>
    where
        S: AsRef<str> + Sync,
    {
        self.config.validate()?;
        let counter = if self.config.parallel {
            WordCounter::count_chunks_parallel(self.splitter(), chunks)?
        } else {
            WordCounter::count_chunks_sequential(self.splitter(), chunks)?
        };
        self.learn_word_counts(counter)
    }

    /// Learn a model from a UTF-8 text file.
    pub fn learn_file(&self, path: impl AsRef<Path>) -> Result<Model> {
        self.config.validate()?;
        let path = path.as_ref();
        log::info!("Counting words in {}", path.display());
        let counter = WordCounter::count_file(self.splitter(), path, self.config.parallel)?;
        self.learn_word_counts(counter)
    }

    /// Learn a model from pre-counted words.
    ///
    /// The counter must have been filled with the configured split policy.
    pub fn learn_word_counts(&self, counter: WordCounter) -> Result<Model> {
        self.config.validate()?;
        if counter.splitter().policy() != self.config.split {
            return Err(BpeError::InvalidConfig(format!(
                "words were split with {:?} but the learner is configured for {:?}",
                counter.splitter().policy().as_str(),
                self.config.split.as_str()
            )));
        }
        if counter.is_empty() {
            return Err(BpeError::EmptyCorpus);
        }

        let start = Instant::now();
        let total = counter.total_occurrences();
        let entries = counter.into_sorted();

        let mut model = Model::new(self.base_alphabet(&entries), self.config.split);
        let mut words = entries
            .iter()
            .map(|(word, count)| WordModel::from_text(word, *count, model.symbols()))
            .collect::<Result<Vec<_>>>()?;
        drop(entries);

        let mut stats = PairStatistics::from_words(&words, self.config.parallel);

        let target = self.config.vocab_size;
        log::info!(
            "Training on {} distinct words ({} occurrences): {} base symbols, {} pairs, target vocab {}",
            words.len(),
            total,
            model.base_size(),
            stats.live_pairs(),
            target
        );

        let mut merges_done = 0usize;
        while model.vocab_size() < target {
            if self.cancel.is_cancelled() {
                log::warn!("Training cancelled after {merges_done} merges");
                return Err(BpeError::Cancelled { merges_done });
            }

            let best = match stats.pop_best() {
                Some(best) => best,
                None => {
                    log::debug!("No pairs left to merge");
                    break;
                }
            };
            if best.count < self.config.min_frequency {
                log::debug!(
                    "Best pair {:?} has count {} below min_frequency {}",
                    best.pair,
                    best.count,
                    self.config.min_frequency
                );
                break;
            }

            let (left, right) = best.pair;
            let id = model.push_merge(left, right)?;
            let changed = stats.merge(&mut words, best.pair, id);
            merges_done += 1;

            if log::log_enabled!(log::Level::Debug) {
                let rendered = model.symbols().render(id).unwrap_or_default();
                log::debug!(
                    "merge {merges_done}: ({left}, {right}) -> {id} {rendered:?} count={}",
                    best.count
                );
            }
            log::trace!("merge {merges_done} rewrote {changed} words");
            if let Some(progress) = &self.progress {
                progress(merges_done);
            }

            if self.config.log_interval > 0 && merges_done % self.config.log_interval == 0 {
                log::info!(
                    "{merges_done} merges, vocab {}, {} live pairs, last count {}",
                    model.vocab_size(),
                    stats.live_pairs(),
                    best.count
                );
            }
        }

        log::info!(
            "Learned {} merges in {:.2?}: vocab size {}",
            merges_done,
            start.elapsed(),
            model.vocab_size()
        );
        Ok(model)
    }

    fn base_alphabet(&self, entries: &[(CompactString, u64)]) -> Vec<u8> {
        match self.config.alphabet {
            AlphabetPolicy::Full => (0..=u8::MAX).collect(),
            AlphabetPolicy::Observed => {
                let mut seen = [false; BYTE_ALPHABET_SIZE];
                for (word, _) in entries {
                    for byte in word.bytes() {
                        seen[byte as usize] = true;
                    }
                }
                (0..=u8::MAX).filter(|&b| seen[b as usize]).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharif_bpe_core::SplitPolicy;

    fn learner(vocab_size: usize) -> BpeLearner {
        BpeLearner::new(TrainingConfig {
            vocab_size,
            parallel: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_single_merge_scenario() {
        let model = learner(257)
            .learn(&["Hello", "He", "is", "Programmer"])
            .unwrap();

        assert_eq!(model.vocab_size(), 257);
        assert_eq!(model.merge_count(), 1);
        assert_eq!(model.merges().get((72, 101)), Some((0, 256)));
        assert_eq!(model.symbols().decode(256).unwrap(), b"He");
    }

    #[test]
    fn test_training_with_simple_text() {
        let model = learner(300)
            .learn(&["low low low low low lower lower newest newest newest widest"])
            .unwrap();

        assert!(model.merge_count() > 0);
        assert!(model.vocab_size() <= 300);
        // "lo" and "ow" both occur 7 times; the smaller pair wins the tie.
        let first = model.merges().rule(0).unwrap();
        assert_eq!(first.pair(), (b'l' as u32, b'o' as u32));
    }

    #[test]
    fn test_stops_when_no_pairs_left() {
        let model = learner(10_000).learn(&["abc abc"]).unwrap();
        // a+b, then ab+c
        assert_eq!(model.merge_count(), 2);
        assert_eq!(model.vocab_size(), 258);
    }

    #[test]
    fn test_target_below_base_gives_no_rules() {
        let model = learner(10).learn(&["hello hello"]).unwrap();
        assert_eq!(model.merge_count(), 0);
        assert_eq!(model.vocab_size(), 256);
    }

    #[test]
    fn test_min_frequency_filter() {
        let model = BpeLearner::new(TrainingConfig {
            vocab_size: 1_000,
            min_frequency: 3,
            parallel: false,
            ..Default::default()
        })
        .learn(&["ab ab ab cd cd"])
        .unwrap();

        assert_eq!(model.merge_count(), 1);
        assert_eq!(model.merges().rule(0).unwrap().pair(), (97, 98));
    }

    #[test]
    fn test_empty_corpus() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            learner(300).learn(&empty),
            Err(BpeError::EmptyCorpus)
        ));
        assert!(matches!(
            learner(300).learn(&["   ", "\n\t"]),
            Err(BpeError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_zero_vocab_size() {
        assert!(matches!(
            learner(0).learn(&["abc"]),
            Err(BpeError::InvalidVocabSize { requested: 0 })
        ));
    }

    #[test]
    fn test_deterministic_and_parallel_agree() {
        let corpus: Vec<String> = (0..200)
            .map(|i| format!("aa bb ab ba {} the quick brown fox {}", i % 7, i % 11))
            .collect();

        let serial = learner(400).learn(&corpus).unwrap();
        let again = learner(400).learn(&corpus).unwrap();
        let parallel = BpeLearner::with_vocab_size(400).learn(&corpus).unwrap();

        assert_eq!(serial, again);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_observed_alphabet() {
        let model = BpeLearner::new(TrainingConfig {
            vocab_size: 1_000,
            alphabet: AlphabetPolicy::Observed,
            parallel: false,
            ..Default::default()
        })
        .learn(&["cab cab"])
        .unwrap();

        assert_eq!(model.symbols().base_units(), b"abc");
        assert_eq!(model.base_size(), 3);
        // "ca" and "ab" tie; a+b first, then c+ab
        assert_eq!(model.merge_count(), 2);
        assert_eq!(model.merges().rule(0).unwrap().pair(), (0, 1));
        assert_eq!(model.merges().rule(1).unwrap().pair(), (2, 3));
    }

    #[test]
    fn test_gpt2_split_is_recorded() {
        let model = BpeLearner::new(TrainingConfig {
            vocab_size: 260,
            split: SplitPolicy::Gpt2,
            parallel: false,
            ..Default::default()
        })
        .learn(&["hello world hello world"])
        .unwrap();

        assert_eq!(model.split_policy(), SplitPolicy::Gpt2);
        assert_eq!(model.merge_count(), 4);
    }

    #[test]
    fn test_cancelled_before_training() {
        let learner = learner(1_000);
        learner.cancel_token().cancel();
        assert!(matches!(
            learner.learn(&["abc abc"]),
            Err(BpeError::Cancelled { merges_done: 0 })
        ));
    }

    #[test]
    fn test_cancelled_between_merges() {
        let learner = learner(1_000);
        let token = learner.cancel_token();
        let learner = learner.with_progress(Arc::new(move |merges_done| {
            if merges_done == 3 {
                token.cancel();
            }
        }));

        let corpus = ["the quick brown fox jumps over the lazy dog the end"];
        assert!(matches!(
            learner.learn(&corpus),
            Err(BpeError::Cancelled { merges_done: 3 })
        ));
    }

    #[test]
    fn test_progress_reports_every_merge() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let model = learner(1_000)
            .with_progress(Arc::new(move |n| sink.lock().unwrap().push(n)))
            .learn(&["abc abc"])
            .unwrap();

        assert_eq!(model.merge_count(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_counter_policy_mismatch() {
        let counter = WordCounter::new(Splitter::new(SplitPolicy::Gpt2));
        assert!(matches!(
            learner(300).learn_word_counts(counter),
            Err(BpeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_learn_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Hello He").unwrap();
        writeln!(file, "is Programmer").unwrap();

        let model = BpeLearner::with_vocab_size(257).learn_file(file.path()).unwrap();
        assert_eq!(model.merges().get((72, 101)), Some((0, 256)));
    }
}
