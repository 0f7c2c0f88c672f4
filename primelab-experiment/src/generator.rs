use crate::config::{ConditionSpec, DesignConfig};
use crate::error::GenerationError;
use crate::trial::TrialLists;
use primelab_core::{
    AssetError, AssetId, AssetLibrary, AssetPool, AuxRole, Design, Replacement, SessionPhase,
    Signal, Trial, TrialKind,
};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const WORD_POOL: &str = "prime-words";

/// Builds stratified, balanced and shuffled trial lists from asset pools.
///
/// All randomness comes from the injected `rng`, so a seeded generator
/// replays the same session.
pub struct TrialListGenerator<R: Rng> {
    config: DesignConfig,
    rng: R,
}

/// Pools a session draws its auxiliary assets from
struct AuxiliaryPools<'a> {
    babble: &'a AssetPool,
    masks: &'a AssetPool,
    faces: std::vec::IntoIter<AssetId>,
}

impl<R: Rng> TrialListGenerator<R> {
    pub fn new(config: DesignConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    pub fn into_rng(self) -> R {
        self.rng
    }

    /// Generates the practice and main lists. Any asset shortfall aborts the
    /// whole generation; no partial list is returned.
    pub fn generate(&mut self, library: &AssetLibrary) -> Result<TrialLists, GenerationError> {
        let Self { config, rng } = self;
        config.validate()?;

        let masks = library.get(&config.mask_pool)?;
        if masks.size() < 2 {
            return Err(AssetError::InsufficientAssets {
                pool: masks.name().to_owned(),
                requested: 2,
                available: masks.size(),
            }
            .into());
        }

        let words = match config.design {
            Design::ForcedChoice => Some(distractor_words(config, library)?),
            _ => None,
        };

        let faces = match &config.face_pool {
            Some(name) => {
                let total = config.total_trials(SessionPhase::Practice)
                    + config.total_trials(SessionPhase::Main);
                library
                    .get(name)?
                    .sample(rng, total, Replacement::WithoutReplacement, &[])?
            }
            None => Vec::new(),
        };

        let mut aux = AuxiliaryPools {
            babble: library.get(&config.babble_pool)?,
            masks,
            faces: faces.into_iter(),
        };

        let mut lists = TrialLists::default();
        for condition in &config.conditions {
            let (practice_primes, main_primes) = draw_primes(config, condition, library, rng)?;

            for (phase, primes) in [
                (SessionPhase::Practice, practice_primes),
                (SessionPhase::Main, main_primes),
            ] {
                let n = condition.trials(phase);
                let kinds = trial_kinds(config.design, n, primes, words.as_ref(), rng)?;
                let target = match phase {
                    SessionPhase::Practice => &mut lists.practice,
                    _ => &mut lists.main,
                };
                for kind in kinds {
                    target.push(Trial {
                        ordinal: 0,
                        phase,
                        stratum: condition.key.clone(),
                        auxiliary: draw_auxiliary(&mut aux, rng)?,
                        kind,
                    });
                }
            }
            debug!(
                stratum = %condition.key,
                practice = condition.practice_trials,
                main = condition.main_trials,
                "built stratum"
            );
        }

        for list in [&mut lists.practice, &mut lists.main] {
            list.shuffle(rng);
            for (ordinal, trial) in list.iter_mut().enumerate() {
                trial.ordinal = ordinal;
            }
        }

        info!(
            practice = lists.practice.len(),
            main = lists.main.len(),
            "generated trial lists"
        );
        Ok(lists)
    }
}

/// Number of trials in a phase that carry a prime
fn primes_needed(design: Design, condition: &ConditionSpec, trials: usize) -> usize {
    match design {
        // present trials round down; absent trials take the remainder
        Design::Detection => trials / 2,
        Design::Rating if condition.prime_pool.is_none() => 0,
        _ => trials,
    }
}

fn draw_primes<R: Rng + ?Sized>(
    config: &DesignConfig,
    condition: &ConditionSpec,
    library: &AssetLibrary,
    rng: &mut R,
) -> Result<(Vec<AssetId>, Vec<AssetId>), GenerationError> {
    let practice = primes_needed(config.design, condition, condition.practice_trials);
    let main = primes_needed(config.design, condition, condition.main_trials);

    let Some(pool_name) = &condition.prime_pool else {
        return Ok((Vec::new(), Vec::new()));
    };
    let pool = library.get(pool_name)?;

    // one draw for both phases keeps practice and main primes disjoint
    let mut primes = pool.sample(rng, practice + main, config.prime_draws, &[])?;
    let main_primes = primes.split_off(practice);
    Ok((primes, main_primes))
}

/// Unique words across all prime pools of the design
fn distractor_words(
    config: &DesignConfig,
    library: &AssetLibrary,
) -> Result<AssetPool, GenerationError> {
    let mut words = BTreeSet::new();
    for condition in &config.conditions {
        if let Some(name) = &condition.prime_pool {
            for id in library.get(name)?.items() {
                words.insert(id.word().to_owned());
            }
        }
    }
    if words.len() < 2 {
        return Err(AssetError::InsufficientAssets {
            pool: WORD_POOL.to_owned(),
            requested: 2,
            available: words.len(),
        }
        .into());
    }
    Ok(AssetPool::new(WORD_POOL, words)?)
}

fn trial_kinds<R: Rng + ?Sized>(
    design: Design,
    trials: usize,
    primes: Vec<AssetId>,
    words: Option<&AssetPool>,
    rng: &mut R,
) -> Result<Vec<TrialKind>, GenerationError> {
    let kinds = match design {
        Design::Detection => {
            let absent = trials - primes.len();
            primes
                .into_iter()
                .map(|prime| TrialKind::Detection {
                    signal: Signal::Present,
                    prime: Some(prime),
                })
                .chain((0..absent).map(|_| TrialKind::Detection {
                    signal: Signal::Absent,
                    prime: None,
                }))
                .collect()
        }
        Design::Identification => primes
            .into_iter()
            .map(|prime| TrialKind::Identification { prime })
            .collect(),
        Design::ForcedChoice => {
            let words = words.ok_or_else(|| {
                GenerationError::InvalidDesign("forced choice requires a word pool".into())
            })?;
            let mut kinds = Vec::with_capacity(primes.len());
            for prime in primes {
                let correct = AssetId::from(prime.word());
                let distractor = words.sample_excluding(rng, std::slice::from_ref(&correct))?;
                kinds.push(TrialKind::ForcedChoice {
                    prime,
                    distractor: distractor.to_string(),
                });
            }
            kinds
        }
        Design::Rating if primes.is_empty() => {
            (0..trials).map(|_| TrialKind::Rating { prime: None }).collect()
        }
        Design::Rating => primes
            .into_iter()
            .map(|prime| TrialKind::Rating { prime: Some(prime) })
            .collect(),
    };
    Ok(kinds)
}

fn draw_auxiliary<R: Rng + ?Sized>(
    pools: &mut AuxiliaryPools<'_>,
    rng: &mut R,
) -> Result<BTreeMap<AuxRole, AssetId>, GenerationError> {
    let mask1 = pools.masks.choose(rng);
    let mask2 = pools
        .masks
        .sample_excluding(rng, std::slice::from_ref(&mask1))?;

    let mut auxiliary = BTreeMap::new();
    auxiliary.insert(AuxRole::Babble, pools.babble.choose(rng));
    auxiliary.insert(AuxRole::Mask1, mask1);
    auxiliary.insert(AuxRole::Mask2, mask2);
    if let Some(face) = pools.faces.next() {
        auxiliary.insert(AuxRole::Face, face);
    }
    Ok(auxiliary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use primelab_core::StratumKey;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn library_for(config: &DesignConfig, per_pool: usize) -> AssetLibrary {
        let mut library = AssetLibrary::new();
        for (p, name) in config.pool_names().into_iter().enumerate() {
            let items = (0..per_pool).map(|i| format!("w{p}x{i}_compressed.wav"));
            library.insert(AssetPool::new(name, items).unwrap());
        }
        library
    }

    #[test]
    fn detection_strata_are_balanced_per_phase() {
        let config = DesignConfig::detection();
        let library = library_for(&config, 10);
        let mut generator = TrialListGenerator::new(config.clone(), StdRng::seed_from_u64(5));
        let lists = generator.generate(&library).unwrap();

        for condition in &config.conditions {
            for phase in [SessionPhase::Practice, SessionPhase::Main] {
                let trials: Vec<_> = lists
                    .phase(phase)
                    .iter()
                    .filter(|t| t.stratum == condition.key)
                    .collect();
                assert_eq!(trials.len(), condition.trials(phase));
                let present = trials
                    .iter()
                    .filter(|t| t.signal() == Some(Signal::Present))
                    .count();
                assert_eq!(present, condition.trials(phase) / 2);
            }
        }
    }

    #[test]
    fn odd_counts_give_absent_the_remainder() {
        let mut config = DesignConfig::detection();
        config.conditions = vec![ConditionSpec::new("0.3", Some("audio/0.3".into()), 3, 5)];
        let library = library_for(&config, 10);
        let lists = TrialListGenerator::new(config, StdRng::seed_from_u64(1))
            .generate(&library)
            .unwrap();
        let present = |list: &[Trial]| {
            list.iter()
                .filter(|t| t.signal() == Some(Signal::Present))
                .count()
        };
        assert_eq!(present(&lists.practice), 1);
        assert_eq!(present(&lists.main), 2);
        assert_eq!(lists.practice.len(), 3);
        assert_eq!(lists.main.len(), 5);
    }

    #[test]
    fn primes_are_not_reused_across_phases() {
        let config = DesignConfig::identification();
        let library = library_for(&config, 2);
        let lists = TrialListGenerator::new(config, StdRng::seed_from_u64(9))
            .generate(&library)
            .unwrap();
        let mut seen = std::collections::HashSet::new();
        for trial in lists.iter() {
            assert!(seen.insert(trial.prime().cloned()), "prime reused: {trial:?}");
        }
    }

    #[test]
    fn undersized_stratum_aborts_generation() {
        let mut config = DesignConfig::detection();
        config.conditions = vec![ConditionSpec::new("0.3", Some("audio/0.3".into()), 0, 16)];
        let library = library_for(&config, 5);
        let err = TrialListGenerator::new(config, StdRng::seed_from_u64(3))
            .generate(&library)
            .unwrap_err();
        match err {
            GenerationError::Asset(AssetError::InsufficientAssets {
                pool,
                requested,
                available,
            }) => {
                assert_eq!(pool, "audio/0.3");
                assert_eq!(requested, 8);
                assert_eq!(available, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_mask_cannot_satisfy_distinct_pair() {
        let config = DesignConfig::detection();
        let mut library = library_for(&config, 10);
        library.insert(AssetPool::new("masks", ["only.wav"]).unwrap());
        let err = TrialListGenerator::new(config, StdRng::seed_from_u64(3))
            .generate(&library)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Asset(AssetError::InsufficientAssets {
                requested: 2,
                available: 1,
                ..
            })
        ));
    }

    #[test]
    fn forced_choice_distractor_differs_from_correct_word() {
        let config = DesignConfig::forced_choice();
        let library = library_for(&config, 3);
        let lists = TrialListGenerator::new(config, StdRng::seed_from_u64(21))
            .generate(&library)
            .unwrap();
        assert_eq!(lists.len(), 10);
        for trial in lists.iter() {
            assert_ne!(trial.correct_answer(), trial.distractor_answer());
            assert!(trial.distractor_answer().is_some());
        }
    }

    #[test]
    fn rating_design_assigns_unique_faces_and_silent_primes() {
        let config = DesignConfig::rating();
        let library = library_for(&config, 10);
        let lists = TrialListGenerator::new(config, StdRng::seed_from_u64(4))
            .generate(&library)
            .unwrap();
        let faces: std::collections::HashSet<_> =
            lists.iter().filter_map(|t| t.aux(AuxRole::Face)).collect();
        assert_eq!(faces.len(), lists.len());

        let silent = StratumKey::from("no-prime");
        for trial in lists.iter().filter(|t| t.stratum == silent) {
            assert_eq!(trial.prime(), None);
        }
    }

    #[test]
    fn rating_design_needs_enough_faces() {
        let config = DesignConfig::rating();
        let mut library = library_for(&config, 10);
        library.insert(AssetPool::new("faces", ["f1.jpg", "f2.jpg"]).unwrap());
        let err = TrialListGenerator::new(config, StdRng::seed_from_u64(4))
            .generate(&library)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Asset(AssetError::InsufficientAssets { requested: 10, .. })
        ));
    }

    #[test]
    fn ordinals_follow_shuffled_positions() {
        let config = DesignConfig::detection();
        let library = library_for(&config, 10);
        let lists = TrialListGenerator::new(config, StdRng::seed_from_u64(12))
            .generate(&library)
            .unwrap();
        for list in [&lists.practice, &lists.main] {
            for (i, trial) in list.iter().enumerate() {
                assert_eq!(trial.ordinal, i);
            }
        }
    }
}
