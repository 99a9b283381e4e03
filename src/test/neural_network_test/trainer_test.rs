use super::*;

fn small_hps(num_epochs: usize) -> HyperParameters {
    HyperParameters {
        num_epochs,
        mini_batch_size: 3,
        initial_learning_rate: 0.1,
        ..HyperParameters::default()
    }
}

fn tanh_net() -> Network {
    Network::new(
        vec![2, 3, 1],
        vec![ActivationKind::Tanh, ActivationKind::Sigmoid],
    )
    .unwrap()
}

#[test]
fn report_cadence_for_long_runs() {
    for epoch in [0, 1, 2, 10, 100, 1000, 200, 9900] {
        assert!(should_report(epoch, 10000), "epoch {} should report", epoch);
    }
    for epoch in [3, 150, 999, 1001] {
        assert!(!should_report(epoch, 10000), "epoch {} should not report", epoch);
    }
}

#[test]
fn report_cadence_for_short_runs() {
    // an interval of 0.5 divides every epoch
    assert!((0..50).all(|e| should_report(e, 50)));

    assert!(should_report(4, 200));
    assert!(!should_report(5, 200));
    assert!(!should_report(7, 200));
    assert!(should_report(10, 200));
}

#[test]
fn one_cost_per_mini_batch() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let report = net.train(&x, &y, Some(&small_hps(7))).unwrap();

    // ceil(10 / 3) = 4 batches per epoch
    assert_eq!(report.costs.len(), 28);
    assert_eq!(report.final_cost(), report.costs.last().copied());
    assert!(report.costs.iter().all(|c| c.is_finite()));
}

#[test]
fn training_separates_clusters() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let hps = HyperParameters {
        num_epochs: 300,
        mini_batch_size: 5,
        initial_learning_rate: 0.05,
        optimization_strategy: OptimizationStrategy::Adam,
        ..HyperParameters::default()
    };

    let report = net.train(&x, &y, Some(&hps)).unwrap();
    let first = report.costs[0];
    let last = report.final_cost().unwrap();
    assert!(last < first, "cost went from {} to {}", first, last);

    let predictions = net.predict(&x).unwrap();
    assert!(predictions.iter().all(|&p| p == 0.0 || p == 1.0));
    assert!(crate::metric::accuracy(&predictions, &y).unwrap() >= 0.9);
}

#[test]
fn training_is_deterministic_and_reinitializes() {
    let (x, y) = separable_data();
    let hps = HyperParameters {
        regularize: true,
        lambda: 0.3,
        dropout: true,
        keep_prob: 0.8,
        ..small_hps(20)
    };

    let mut first = tanh_net();
    let report_a = first.train(&x, &y, Some(&hps)).unwrap();

    let mut second = tanh_net();
    let report_b = second.train(&x, &y, Some(&hps)).unwrap();
    assert_eq!(report_a, report_b);
    assert_eq!(first.parameters().unwrap(), second.parameters().unwrap());

    // a second call starts over from fresh parameters
    let report_c = first.train(&x, &y, Some(&hps)).unwrap();
    assert_eq!(report_a.costs, report_c.costs);
}

#[test]
fn final_learning_rate_follows_inverse_time_decay() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let epochs = 40;
    let report = net.train(&x, &y, Some(&small_hps(epochs))).unwrap();

    let expected = (0.1 / (1.0 + 0.0009 * (epochs - 1) as f64)).max(0.001);
    assert_abs_diff_eq!(report.final_learning_rate, expected, epsilon = 1e-15);
}

#[test]
fn learning_rate_floors_at_minimum() {
    let hps = HyperParameters {
        initial_learning_rate: 0.075,
        learning_rate_decay: 1.0,
        min_learning_rate: 0.01,
        ..HyperParameters::default()
    };
    assert_abs_diff_eq!(hps.learning_rate_after(0), 0.075, epsilon = 1e-15);
    assert_abs_diff_eq!(hps.learning_rate_after(1), 0.0375, epsilon = 1e-15);
    assert_abs_diff_eq!(hps.learning_rate_after(100), 0.01, epsilon = 1e-15);
}

#[test]
fn custom_schedule_drives_the_learning_rate() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let hps = HyperParameters {
        learning_rate_schedule: LearningRateSchedule::custom(|epoch| 0.5 / (epoch as f64 + 1.0)),
        ..small_hps(10)
    };
    let report = net.train(&x, &y, Some(&hps)).unwrap();
    assert_abs_diff_eq!(report.final_learning_rate, 0.05, epsilon = 1e-15);
}

#[test]
fn zero_learning_rate_freezes_parameters() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let hps = HyperParameters {
        num_epochs: 5,
        initial_learning_rate: 0.0,
        min_learning_rate: 0.0,
        ..HyperParameters::default()
    };
    let report = net.train(&x, &y, Some(&hps)).unwrap();

    // one batch per epoch, so every epoch scores the same parameters on the same data
    assert_eq!(report.costs.len(), 5);
    assert!(report.costs.iter().all(|&c| c == report.costs[0]));
    assert_eq!(report.final_learning_rate, 0.0);
}

#[test]
fn malformed_training_data_is_rejected() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let hps = small_hps(1);

    let short_y = Array2::<f64>::zeros((1, 9));
    assert!(matches!(
        net.train(&x, &short_y, Some(&hps)),
        Err(ModelError::InputValidationError(_))
    ));

    let tall_y = Array2::<f64>::zeros((2, 10));
    assert!(matches!(
        net.train(&x, &tall_y, Some(&hps)),
        Err(ModelError::InputValidationError(_))
    ));

    let wide_x = Array2::<f64>::zeros((3, 10));
    assert!(matches!(
        net.train(&wide_x, &y, Some(&hps)),
        Err(ModelError::InputValidationError(_))
    ));

    let mut two_outputs = Network::new(
        vec![2, 3, 2],
        vec![ActivationKind::Tanh, ActivationKind::Sigmoid],
    )
    .unwrap();
    assert!(matches!(
        two_outputs.train(&x, &y, Some(&hps)),
        Err(ModelError::InputValidationError(_))
    ));

    // nothing was installed by the failed calls
    assert!(matches!(net.parameters(), Err(ModelError::NotFitted)));
}

#[test]
fn invalid_hyper_parameters_are_rejected() {
    let (x, y) = separable_data();
    let mut net = tanh_net();

    let zero_batch = HyperParameters {
        mini_batch_size: 0,
        ..small_hps(1)
    };
    assert!(matches!(
        net.train(&x, &y, Some(&zero_batch)),
        Err(ModelError::InputValidationError(_))
    ));

    let bad_beta = HyperParameters {
        optimization_strategy: OptimizationStrategy::Adam,
        beta1: 1.0,
        ..small_hps(1)
    };
    assert!(matches!(
        net.train(&x, &y, Some(&bad_beta)),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn cost_of_an_uninformed_prediction_is_ln_2() {
    let net = tanh_net();
    let al = Array2::from_elem((1, 4), 0.5);
    let y = array![[1.0, 0.0, 0.0, 1.0]];
    let c = net.compute_cost(&al, &y, None).unwrap();
    assert_abs_diff_eq!(c, std::f64::consts::LN_2, epsilon = 1e-12);

    // the penalty needs parameters
    assert!(matches!(
        net.compute_cost(&al, &y, Some(1.0)),
        Err(ModelError::NotFitted)
    ));
}

#[test]
fn cost_includes_l2_penalty() {
    let mut net = Network::new(vec![3, 1], vec![ActivationKind::Sigmoid]).unwrap();
    let params = ParameterState::from_layers(vec![LayerParameters {
        weights: array![[1.0, 1.0, 2.0]],
        bias: array![[5.0]],
    }])
    .unwrap();
    net.set_parameters(params).unwrap();
    assert_abs_diff_eq!(net.parameters().unwrap().squared_weight_sum(), 6.0);

    let al = Array2::from_elem((1, 2), 0.5);
    let y = array![[1.0, 0.0]];
    let c = net.compute_cost(&al, &y, Some(0.5)).unwrap();
    // 0.5 / (2 * 2) * 6
    assert_abs_diff_eq!(c, std::f64::consts::LN_2 + 0.75, epsilon = 1e-12);

    let mismatched = Array2::from_elem((1, 3), 0.5);
    assert!(matches!(
        net.compute_cost(&mismatched, &y, None),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn predict_proba_agrees_with_predict() {
    let (x, _) = separable_data();
    let net = seeded_network(
        vec![2, 3, 1],
        vec![ActivationKind::Tanh, ActivationKind::Sigmoid],
        13,
    );
    let proba = net.predict_proba(&x).unwrap();
    let classes = net.predict(&x).unwrap();
    for (&p, &c) in proba.iter().zip(classes.iter()) {
        assert_eq!(c, if p > 0.5 { 1.0 } else { 0.0 });
    }
}

#[test]
fn optimizer_uses_the_scheduled_learning_rate() {
    let (x, y) = separable_data();
    let mut net = tanh_net();
    let hps = HyperParameters {
        num_epochs: 4,
        initial_learning_rate: 0.1,
        learning_rate_schedule: LearningRateSchedule::custom(|_| 0.0),
        ..HyperParameters::default()
    };
    let report = net.train(&x, &y, Some(&hps)).unwrap();

    // one batch per epoch: only epoch 0 moves the parameters
    assert_eq!(report.costs.len(), 4);
    assert_ne!(report.costs[0], report.costs[1]);
    assert!(report.costs[1..].iter().all(|&c| c == report.costs[1]));

    // epoch 0 took exactly one plain step at the initial learning rate
    let mut rng = StdRng::seed_from_u64(hps.seed);
    let initial = ParameterState::he_initialized(net.definition(), &mut rng);
    let mut replay = Network::from_definition(net.definition().clone());
    replay.set_parameters(initial.clone()).unwrap();

    let batch = random_mini_batches(&x, &y, hps.mini_batch_size, hps.seed)
        .unwrap()
        .remove(0);
    let cache = replay.train_forward(&batch.x, None, &mut rng).unwrap();
    let grads = replay.backward(&cache, &batch.y, None).unwrap();
    let mut expected = initial;
    GradientDescent::new()
        .step(&mut expected, &grads, 0.1, None)
        .unwrap();

    let trained = net.parameters().unwrap();
    for (got, want) in trained.iter().zip(expected.iter()) {
        for (a, b) in got.weights.iter().zip(want.weights.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
        for (a, b) in got.bias.iter().zip(want.bias.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
