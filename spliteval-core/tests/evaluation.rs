//! End-to-end tests for the evaluator
//!
//! These tests drive the public API only:
//! - Every split is evaluated exactly once and aggregated once
//! - Concurrent dispatch loses and duplicates nothing
//! - A single failing split fails the whole evaluation
//! - Results do not depend on the worker count

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spliteval_core::{
    Average, BoxError, CrossValidationSplitGenerator, EvaluationError, EvaluationStrategy,
    Evaluator, EvaluatorConfig, FixedSplitGenerator, LeaveOneOutSplitGenerator, MetricStrategy,
    PerformanceMeasure, PerformanceResult, RandomPermutationAndDivisionSplitGenerator, Reduction,
    Split, SplitGenerator,
};

/// One validation-only split per example.
fn single_example_splits(count: usize) -> Arc<dyn SplitGenerator> {
    Arc::new(FixedSplitGenerator::new(
        (0..count).map(|i| Split::validation_only(vec![i])).collect(),
    ))
}

fn parallel(workers: usize) -> EvaluatorConfig {
    EvaluatorConfig::default().with_workers(workers)
}

/// Counts hook invocations; every split contributes 1 and aggregation sums.
#[derive(Default)]
struct CountingStrategy {
    seen: Mutex<Vec<usize>>,
    aggregations: AtomicUsize,
    fail_on: Option<usize>,
    slow_split: Option<usize>,
}

impl EvaluationStrategy for CountingStrategy {
    type Example = usize;
    type Output = u64;
    type Error = BoxError;

    fn evaluate_on_split(&self, examples: &[usize], split: &Split) -> Result<u64, BoxError> {
        let index = split.validation()[0];
        if self.slow_split == Some(index) {
            std::thread::sleep(Duration::from_millis(50));
        } else {
            std::thread::sleep(Duration::from_micros(200));
        }
        self.seen.lock().unwrap().push(examples[index]);
        if self.fail_on == Some(index) {
            return Err(format!("learner diverged on example {index}").into());
        }
        Ok(1)
    }

    fn average_results(&self, results: Vec<u64>) -> Result<u64, BoxError> {
        self.aggregations.fetch_add(1, Ordering::SeqCst);
        Ok(results.into_iter().sum())
    }
}

// === Scenario ===

#[test]
fn mean_of_single_example_splits_is_mean_of_examples() {
    let strategy = MetricStrategy::new(|examples: &[i64], split: &Split| {
        let index = split.validation()[0];
        Ok::<_, BoxError>(examples[index] as f64)
    });
    let evaluator = Evaluator::new(strategy, single_example_splits(4)).unwrap();

    let result = evaluator.evaluate(&[2, 4, 6, 8]).unwrap();

    assert!((result - 5.0).abs() < 1e-12);
}

#[test]
fn leave_one_out_gives_the_same_scenario_result() {
    let strategy = MetricStrategy::new(|examples: &[i64], split: &Split| {
        Ok::<_, BoxError>(examples[split.validation()[0]] as f64)
    });
    let evaluator = Evaluator::with_config(
        strategy,
        Arc::new(LeaveOneOutSplitGenerator),
        EvaluatorConfig::sequential(),
    )
    .unwrap();

    assert_eq!(evaluator.evaluate(&[2, 4, 6, 8]).unwrap(), 5.0);
}

// === Exactly once ===

#[test]
fn every_split_is_evaluated_exactly_once() {
    let split_count = 32;
    let examples: Vec<usize> = (0..split_count).collect();
    let evaluator = Evaluator::with_config(
        CountingStrategy::default(),
        single_example_splits(split_count),
        parallel(4),
    )
    .unwrap();

    let total = evaluator.evaluate(&examples).unwrap();

    assert_eq!(total, split_count as u64);
    let mut seen = evaluator.strategy().seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, examples);
    assert_eq!(evaluator.strategy().aggregations.load(Ordering::SeqCst), 1);
}

// === Concurrency ===

#[test]
fn concurrent_dispatch_loses_no_results() {
    for split_count in [1, 2, 8, 64] {
        let examples: Vec<usize> = (0..split_count).collect();
        let evaluator = Evaluator::with_config(
            CountingStrategy::default(),
            single_example_splits(split_count),
            parallel(8),
        )
        .unwrap();

        let total = evaluator.evaluate(&examples).unwrap();

        assert_eq!(total, split_count as u64, "split count {split_count}");
        let seen: HashSet<usize> = evaluator
            .strategy()
            .seen
            .lock()
            .unwrap()
            .iter()
            .copied()
            .collect();
        assert_eq!(seen.len(), split_count, "duplicated or lost splits");
    }
}

#[test]
fn evaluator_can_be_shared_across_threads() {
    let evaluator = Arc::new(
        Evaluator::with_config(
            CountingStrategy::default(),
            single_example_splits(8),
            parallel(4),
        )
        .unwrap(),
    );
    let examples: Arc<Vec<usize>> = Arc::new((0..8).collect());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let evaluator = Arc::clone(&evaluator);
            let examples = Arc::clone(&examples);
            std::thread::spawn(move || evaluator.evaluate(&examples).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 8);
    }
    assert_eq!(evaluator.strategy().aggregations.load(Ordering::SeqCst), 4);
}

// === Fault propagation ===

#[test]
fn one_failing_split_fails_the_evaluation_wherever_it_is() {
    let split_count = 16;
    let examples: Vec<usize> = (0..split_count).collect();

    for fail_on in [0, split_count / 2, split_count - 1] {
        let strategy = CountingStrategy {
            fail_on: Some(fail_on),
            ..Default::default()
        };
        let evaluator =
            Evaluator::with_config(strategy, single_example_splits(split_count), parallel(4))
                .unwrap();

        let error = evaluator.evaluate(&examples).unwrap_err();

        match error {
            EvaluationError::SplitEvaluation { split, ref source } => {
                assert_eq!(split, fail_on);
                assert!(source.to_string().contains("diverged"));
            }
            other => panic!("expected SplitEvaluation, got {other:?}"),
        }
        assert_eq!(evaluator.strategy().aggregations.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn last_split_to_complete_failing_still_fails_the_evaluation() {
    let split_count = 8;
    let examples: Vec<usize> = (0..split_count).collect();
    let strategy = CountingStrategy {
        fail_on: Some(3),
        slow_split: Some(3),
        ..Default::default()
    };
    let evaluator =
        Evaluator::with_config(strategy, single_example_splits(split_count), parallel(4)).unwrap();

    let error = evaluator.evaluate(&examples).unwrap_err();

    assert!(matches!(error, EvaluationError::SplitEvaluation { split: 3, .. }));
    assert_eq!(evaluator.strategy().aggregations.load(Ordering::SeqCst), 0);
}

#[test]
fn aggregation_failure_is_surfaced() {
    let strategy = MetricStrategy::new(|_: &[f64], _: &Split| Ok::<_, BoxError>(f64::NAN));
    struct Rejecting<S>(S);

    impl<S: EvaluationStrategy<Output = f64>> EvaluationStrategy for Rejecting<S> {
        type Example = S::Example;
        type Output = f64;
        type Error = BoxError;

        fn evaluate_on_split(&self, examples: &[S::Example], split: &Split) -> Result<f64, BoxError> {
            self.0.evaluate_on_split(examples, split).map_err(Into::into)
        }

        fn average_results(&self, results: Vec<f64>) -> Result<f64, BoxError> {
            if results.iter().any(|r| r.is_nan()) {
                return Err("results contain NaN".into());
            }
            self.0.average_results(results).map_err(Into::into)
        }
    }

    let evaluator = Evaluator::new(Rejecting(strategy), single_example_splits(3)).unwrap();
    let error = evaluator.evaluate(&[1.0, 2.0, 3.0]).unwrap_err();

    assert!(matches!(
        error,
        EvaluationError::Aggregation {
            result_count: 3,
            ..
        }
    ));
    assert!(error.is_computation_error());
}

#[test]
fn empty_input_never_reaches_aggregation() {
    let evaluator = Evaluator::new(CountingStrategy::default(), single_example_splits(3)).unwrap();

    let error = evaluator.evaluate(&[]).unwrap_err();

    assert!(matches!(error, EvaluationError::EmptyInput));
    assert!(error.is_configuration_error());
    assert_eq!(evaluator.strategy().aggregations.load(Ordering::SeqCst), 0);
}

#[test]
fn generator_errors_are_configuration_errors() {
    let generator = Arc::new(CrossValidationSplitGenerator::new(10, 0).unwrap());
    let evaluator = Evaluator::new(CountingStrategy::default(), generator).unwrap();

    let error = evaluator.evaluate(&[0, 1, 2]).unwrap_err();

    assert!(matches!(error, EvaluationError::SplitGeneration(_)));
    assert!(error.is_configuration_error());
}

// === Aggregation order ===

#[test]
fn reference_mean_is_independent_of_result_order() {
    let strategy = MetricStrategy::new(|_: &[f64], _: &Split| Ok::<_, BoxError>(0.0));
    let results = vec![0.1, 0.25, 1e-9, 3.75, 0.6, 0.3333];
    let reference = strategy.average_results(results.clone()).unwrap();

    let mut permuted = results;
    for _ in 0..permuted.len() {
        permuted.rotate_right(1);
        let value = strategy.average_results(permuted.clone()).unwrap();
        assert_eq!(value.to_bits(), reference.to_bits());
    }
    permuted.reverse();
    assert_eq!(
        strategy.average_results(permuted).unwrap().to_bits(),
        reference.to_bits()
    );
}

// === Determinism ===

/// Scores a "predict the training mean" learner on each split.
struct TrainingMeanStrategy;

impl EvaluationStrategy for TrainingMeanStrategy {
    type Example = f64;
    type Output = PerformanceResult;
    type Error = BoxError;

    fn evaluate_on_split(&self, examples: &[f64], split: &Split) -> Result<PerformanceResult, BoxError> {
        let training: Vec<f64> = split.training().iter().map(|&i| examples[i]).collect();
        let prediction = f64::average(&training)?;
        let squared_errors: Vec<f64> = split
            .validation()
            .iter()
            .map(|&i| (examples[i] - prediction).powi(2))
            .collect();
        let absolute_errors: Vec<f64> = split
            .validation()
            .iter()
            .map(|&i| (examples[i] - prediction).abs())
            .collect();

        Ok(PerformanceResult::new()
            .with_measure("mse", PerformanceMeasure::from_samples(&squared_errors)?)
            .with_measure("mae", PerformanceMeasure::from_samples(&absolute_errors)?))
    }

    fn average_results(&self, results: Vec<PerformanceResult>) -> Result<PerformanceResult, BoxError> {
        Ok(PerformanceResult::average(&results)?)
    }
}

fn noisy_series(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| (i as f64 * 0.37).sin() * 3.0 + i as f64 * 0.01)
        .collect()
}

#[test]
fn result_is_independent_of_worker_count() {
    let examples = noisy_series(97);

    let evaluate_with = |workers: usize| {
        let generator = Arc::new(CrossValidationSplitGenerator::new(10, 7).unwrap());
        Evaluator::with_config(TrainingMeanStrategy, generator, parallel(workers))
            .unwrap()
            .evaluate(&examples)
            .unwrap()
    };

    let sequential = evaluate_with(1);
    let pooled = evaluate_with(8);

    assert_eq!(sequential, pooled);
    assert_eq!(sequential.get("mse").unwrap().sample_count, 97);
}

#[test]
fn repeated_evaluations_with_deterministic_splits_agree() {
    let examples = noisy_series(40);
    let evaluator =
        Evaluator::with_config(TrainingMeanStrategy, Arc::new(LeaveOneOutSplitGenerator), parallel(4))
            .unwrap();

    let first = evaluator.evaluate(&examples).unwrap();
    let second = evaluator.evaluate(&examples).unwrap();

    assert_eq!(first, second);
}

#[test]
fn random_division_with_median_reduction() {
    let strategy = MetricStrategy::with_reduction(
        |examples: &[f64], split: &Split| {
            let validation: Vec<f64> = split.validation().iter().map(|&i| examples[i]).collect();
            f64::average(&validation)
        },
        Reduction::Median,
    );
    let generator = Arc::new(RandomPermutationAndDivisionSplitGenerator::new(9, 0.5, 3).unwrap());
    let evaluator = Evaluator::new(strategy, generator).unwrap();
    let examples = vec![1.0; 20];

    assert_eq!(evaluator.evaluate(&examples).unwrap(), 1.0);
}
