//! End-to-end properties of the metafunction evaluator and its inputs.

use metafunction::DesignMatrix;
use metafunction::design::{MatrixSet, SamplingScheme, generate};
use metafunction::distribution::{Distribution, DistributionSelector, select_and_apply};
use metafunction::function::Function;
use metafunction::interaction::enumerate;
use metafunction::metafunction::{FunctionAssignment, Metafunction, evaluate};
use metafunction::Error;

fn uniform_design(n: usize, k: usize, seed: u64) -> DesignMatrix {
    let params: Vec<String> = (1..=k).map(|i| format!("X{i}")).collect();
    let mut m = generate(n, &params, SamplingScheme::Random, MatrixSet::Base, seed).unwrap();
    select_and_apply(&mut m, DistributionSelector::Fixed(Distribution::Uniform), seed).unwrap();
    m
}

#[test]
fn identical_inputs_give_bit_identical_output() {
    let m = uniform_design(128, 7, 3);
    let a = evaluate(&m, 21, 5).unwrap();
    let b = evaluate(&m.clone(), 21, 5).unwrap();
    assert_eq!(a.len(), 128);
    assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
}

#[test]
fn two_linear_inputs_scenario() {
    let x = DesignMatrix::from_columns(&[vec![0.5, -0.3], vec![0.2, 0.7]]);
    let assignment = FunctionAssignment::new(vec![Function::Linear; 2], 2).unwrap();
    let y = Metafunction::new(assignment, 2).unwrap().evaluate(&x).unwrap();
    assert!((y[0] - 0.8).abs() < 1e-12);
    assert!((y[1] - 0.19).abs() < 1e-12);
}

#[test]
fn order_one_output_is_sum_of_transformed_columns() {
    let m = uniform_design(32, 5, 8);
    let f = Metafunction::seeded(5, 13, 1).unwrap();
    let y = f.evaluate(&m).unwrap();
    for (row, &out) in m.rows().zip(&y) {
        let expected: f64 = row
            .iter()
            .zip(f.assignment().functions())
            .map(|(&x, func)| func.eval(x))
            .sum();
        assert!((out - expected).abs() < 1e-12);
    }
}

#[test]
fn full_order_adds_the_k_way_product() {
    let k = 4;
    let m = uniform_design(16, k, 2);
    let full = Metafunction::seeded(k, 6, k).unwrap();
    let below = Metafunction::seeded(k, 6, k - 1).unwrap();
    let d_full = full.decompose(&m).unwrap();
    let d_below = below.decompose(&m).unwrap();

    for (i, row) in m.rows().enumerate() {
        let product: f64 = row
            .iter()
            .zip(full.assignment().functions())
            .map(|(&x, func)| func.eval(x))
            .product();
        let diff = d_full.interactions[i] - d_below.interactions[i];
        assert!((diff - product).abs() < 1e-9, "row {i}: {diff} vs {product}");
    }
}

#[test]
fn order_above_k_is_a_configuration_error() {
    let m = uniform_design(8, 3, 1);
    let err = evaluate(&m, 1, 4).unwrap_err();
    assert!(matches!(err, Error::InteractionOrderTooHigh { order: 4, k: 3 }));
    assert!(err.is_configuration());
}

#[test]
fn four_inputs_up_to_triples() {
    let sets = enumerate(4, 3);
    assert_eq!(sets[&2].len(), 6);
    assert_eq!(sets[&3].len(), 4);
}

#[test]
fn distribution_selection_is_reproducible() {
    let a = DistributionSelector::Mixed.assign(12, 99);
    let b = DistributionSelector::Mixed.assign(12, 99);
    assert_eq!(a, b);
    assert!((100..110).any(|s| DistributionSelector::Mixed.assign(12, s) != a));
}

#[test]
fn mixed_selector_with_one_column_draws_one_law() {
    let mut m = generate(16, &["X1"], SamplingScheme::Sobol, MatrixSet::Base, 4).unwrap();
    let laws = select_and_apply(&mut m, DistributionSelector::Mixed, 4).unwrap();
    assert_eq!(laws.len(), 1);
    assert!(Distribution::ALL.contains(&laws[0]));
}

#[test]
fn assignment_must_cover_every_column() {
    let err = FunctionAssignment::new(vec![Function::Cubic; 2], 3).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_points_are_independent_of_the_drawn_model() {
    let k = 6;
    let params: Vec<String> = (1..=k).map(|i| format!("X{i}")).collect();
    let mut same_function_stratum = 0;
    let mut same_law_stratum = 0;

    for seed in 1..=200 {
        let raw = generate(2, &params, SamplingScheme::Random, MatrixSet::Base, seed).unwrap();
        let functions = FunctionAssignment::sample(k, seed);
        let laws = DistributionSelector::Mixed.assign(k, seed);
        for j in 0..k {
            let u = raw.get(0, j);
            let f = Function::ALL.iter().position(|&f| f == functions.functions()[j]).unwrap();
            let d = Distribution::ALL.iter().position(|&d| d == laws[j]).unwrap();
            if (u * 13.0) as usize == f {
                same_function_stratum += 1;
            }
            if (u * 7.0) as usize == d {
                same_law_stratum += 1;
            }
        }
    }

    // Independent draws land in the matching stratum about 1/13 and 1/7 of the time.
    assert!(same_function_stratum < 200, "{same_function_stratum}/1200");
    assert!(same_law_stratum < 300, "{same_law_stratum}/1200");
}
