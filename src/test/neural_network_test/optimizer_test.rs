use super::*;

fn two_layer_state() -> ParameterState {
    ParameterState::from_layers(vec![
        LayerParameters {
            weights: array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            bias: array![[0.5], [0.5], [0.5]],
        },
        LayerParameters {
            weights: array![[1.0, -1.0, 2.0]],
            bias: array![[0.0]],
        },
    ])
    .unwrap()
}

fn gradients_like(params: &ParameterState, value: f64) -> Gradients {
    Gradients {
        layers: params
            .iter()
            .map(|l| LayerGradients {
                d_weights: Array2::from_elem(l.weights.dim(), value),
                d_bias: Array2::from_elem(l.bias.dim(), value),
            })
            .collect(),
    }
}

#[test]
fn gradient_descent_moves_against_the_gradient() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = gradients_like(&params, 0.5);

    let mut optimizer = GradientDescent::new();
    optimizer.step(&mut params, &grads, 0.1, None).unwrap();

    for (new, old) in params.iter().zip(before.iter()) {
        for (w, w0) in new.weights.iter().zip(old.weights.iter()) {
            assert_abs_diff_eq!(*w, w0 - 0.05, epsilon = 1e-12);
        }
        for (b, b0) in new.bias.iter().zip(old.bias.iter()) {
            assert_abs_diff_eq!(*b, b0 - 0.05, epsilon = 1e-12);
        }
    }
}

#[test]
fn adam_first_step_is_bias_corrected() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = Gradients {
        layers: vec![
            LayerGradients {
                d_weights: array![[0.2, -0.4], [1.0, 0.0], [-3.0, 0.5]],
                d_bias: array![[0.1], [-0.1], [2.0]],
            },
            LayerGradients {
                d_weights: array![[0.3, 0.3, -0.6]],
                d_bias: array![[1.5]],
            },
        ],
    };

    let epsilon = 1e-8;
    let lr = 0.01;
    let mut adam = Adam::new(&params, 0.9, 0.999, epsilon);
    assert_eq!(adam.step_count(), 1);
    adam.step(&mut params, &grads, lr, None).unwrap();
    assert_eq!(adam.step_count(), 2);

    for l in 1..=2 {
        let g = grads.layer(l);
        let state = adam.states(l);
        for (&v, &gw) in state.v_weights.iter().zip(g.d_weights.iter()) {
            assert_abs_diff_eq!(v, 0.1 * gw, epsilon = 1e-12);
        }
        for (&s, &gw) in state.s_weights.iter().zip(g.d_weights.iter()) {
            assert_abs_diff_eq!(s, 0.001 * gw * gw, epsilon = 1e-12);
        }

        // after correction V = g and S = g², so the step is lr * g / (|g| + eps)
        let old = before.layer(l);
        let new = params.layer(l);
        for ((&w, &w0), &gw) in new
            .weights
            .iter()
            .zip(old.weights.iter())
            .zip(g.d_weights.iter())
        {
            let expected = w0 - lr * gw / (gw.abs() + epsilon);
            assert_abs_diff_eq!(w, expected, epsilon = 1e-9);
        }
        for ((&b, &b0), &gb) in new.bias.iter().zip(old.bias.iter()).zip(g.d_bias.iter()) {
            let expected = b0 - lr * gb / (gb.abs() + epsilon);
            assert_abs_diff_eq!(b, expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn adam_zero_gradient_leaves_parameters_in_place() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = gradients_like(&params, 0.0);

    let mut adam = Adam::new(&params, 0.9, 0.999, 1e-8);
    adam.step(&mut params, &grads, 0.1, None).unwrap();
    assert_eq!(params, before);
}

#[test]
fn adam_moments_accumulate_across_steps() {
    let mut params = two_layer_state();
    let grads = gradients_like(&params, 1.0);

    let mut adam = Adam::new(&params, 0.9, 0.999, 1e-8);
    adam.step(&mut params, &grads, 0.01, None).unwrap();
    adam.step(&mut params, &grads, 0.01, None).unwrap();

    assert_eq!(adam.step_count(), 3);
    // V = 0.9 * 0.1 + 0.1
    assert_abs_diff_eq!(adam.states(1).v_weights[[0, 0]], 0.19, epsilon = 1e-12);
    assert_abs_diff_eq!(adam.states(2).s_bias[[0, 0]], 0.999 * 0.001 + 0.001, epsilon = 1e-12);
}

#[test]
fn masked_update_skips_dropped_hidden_units() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = gradients_like(&params, 1.0);

    // masks for A[0] (2 inputs) and A[1] (3 hidden units)
    let masks = vec![
        Array1::from(vec![true, true]),
        Array1::from(vec![true, false, true]),
    ];

    let mut optimizer = GradientDescent::new();
    optimizer
        .step(&mut params, &grads, 0.1, Some(&masks))
        .unwrap();

    let hidden = params.layer(1);
    let hidden_before = before.layer(1);
    assert_eq!(hidden.weights.row(1), hidden_before.weights.row(1));
    assert_eq!(hidden.bias[[1, 0]], hidden_before.bias[[1, 0]]);
    for row in [0, 2] {
        for (w, w0) in hidden.weights.row(row).iter().zip(hidden_before.weights.row(row).iter()) {
            assert_abs_diff_eq!(*w, w0 - 0.1, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(hidden.bias[[row, 0]], hidden_before.bias[[row, 0]] - 0.1, epsilon = 1e-12);
    }

    // the output layer is always updated in full
    for (w, w0) in params.layer(2).weights.iter().zip(before.layer(2).weights.iter()) {
        assert_abs_diff_eq!(*w, w0 - 0.1, epsilon = 1e-12);
    }
}

#[test]
fn adam_masked_update_still_advances_moments() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = gradients_like(&params, 1.0);
    let masks = vec![
        Array1::from(vec![true, true]),
        Array1::from(vec![false, false, false]),
    ];

    let mut adam = Adam::new(&params, 0.9, 0.999, 1e-8);
    adam.step(&mut params, &grads, 0.1, Some(&masks)).unwrap();

    assert_eq!(params.layer(1), before.layer(1));
    assert_ne!(params.layer(2), before.layer(2));
    assert_abs_diff_eq!(adam.states(1).v_weights[[1, 1]], 0.1, epsilon = 1e-12);
}

#[test]
fn mismatched_gradients_are_rejected() {
    let mut params = two_layer_state();
    let grads = Gradients {
        layers: vec![LayerGradients {
            d_weights: Array2::zeros((3, 2)),
            d_bias: Array2::zeros((3, 1)),
        }],
    };
    assert!(matches!(
        GradientDescent::new().step(&mut params, &grads, 0.1, None),
        Err(ModelError::ProcessingError(_))
    ));

    let wrong_shape = Gradients {
        layers: vec![
            LayerGradients {
                d_weights: Array2::zeros((2, 2)),
                d_bias: Array2::zeros((2, 1)),
            },
            LayerGradients {
                d_weights: Array2::zeros((1, 3)),
                d_bias: Array2::zeros((1, 1)),
            },
        ],
    };
    let mut adam = Adam::new(&params, 0.9, 0.999, 1e-8);
    assert!(matches!(
        adam.step(&mut params, &wrong_shape, 0.1, None),
        Err(ModelError::ProcessingError(_))
    ));
    assert_eq!(adam.step_count(), 1);
}

#[test]
fn strategy_builds_the_matching_optimizer() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = gradients_like(&params, 2.0);

    let hps = HyperParameters::default();
    let mut plain = OptimizationStrategy::Plain.build(&params, &hps);
    plain.step(&mut params, &grads, 0.5, None).unwrap();
    assert_abs_diff_eq!(params.layer(2).bias[[0, 0]], before.layer(2).bias[[0, 0]] - 1.0, epsilon = 1e-12);

    let mut params = before.clone();
    let mut adam = OptimizationStrategy::Adam.build(&params, &hps);
    adam.step(&mut params, &grads, 0.5, None).unwrap();
    // Adam normalizes the step to roughly the learning rate
    assert_abs_diff_eq!(params.layer(2).bias[[0, 0]], before.layer(2).bias[[0, 0]] - 0.5, epsilon = 1e-6);
}

#[test]
fn adam_bias_correction_holds_over_many_steps() {
    let mut params = two_layer_state();
    let before = params.clone();
    let grads = gradients_like(&params, 1.0);
    let lr = 0.01;
    let steps = 60;

    let mut adam = Adam::new(&params, 0.9, 0.999, 1e-8);
    for _ in 0..steps {
        adam.step(&mut params, &grads, lr, None).unwrap();
    }
    assert_eq!(adam.step_count(), steps + 1);

    // a constant gradient keeps both corrected moments at 1, so every step moves by lr
    let moved = before.layer(1).weights[[0, 0]] - params.layer(1).weights[[0, 0]];
    assert_abs_diff_eq!(moved, steps as f64 * lr, epsilon = 1e-8);
}
