use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use redeem_stacking::config::{
    load_stack_config, FoldConfig, LayerConfig, ModelType, PreprocessorType, SlotConfig,
    StackConfig,
};
use redeem_stacking::models::factory::build_stack;

/// Noisy samples of `y = 2*x0 - x1 + 0.5*x2 + 1`.
fn synthetic(n: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, 3), |_| rng.gen_range(-5.0..5.0));
    let y = Array1::from_shape_fn(n, |i| {
        2.0 * x[[i, 0]] - x[[i, 1]] + 0.5 * x[[i, 2]] + 1.0 + rng.gen_range(-0.1..0.1)
    });
    (x, y)
}

fn default_config() -> StackConfig {
    StackConfig {
        layers: vec![
            LayerConfig {
                models: vec![
                    SlotConfig::new(ModelType::LinearRegression { fit_intercept: true }),
                    SlotConfig::new(ModelType::LinearRegression { fit_intercept: false })
                        .with_preprocessor(PreprocessorType::Standard),
                ],
            },
            LayerConfig {
                models: vec![SlotConfig::default()],
            },
        ],
        folds: Some(FoldConfig::KFold {
            n_splits: 2,
            shuffle: true,
            seed: Some(7),
        }),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    // Usage: cargo run --example stacked_regression -- [config.json]
    let config = match std::env::args().nth(1) {
        Some(path) => load_stack_config(&path)?,
        None => default_config(),
    };

    let (x_train, y_train) = synthetic(200, 1);
    let (x_test, y_test) = synthetic(50, 2);
    println!("Training on {:?}, testing on {:?}", x_train.shape(), x_test.shape());

    let mut stack = build_stack(&config).context("Failed to build stack")?;
    let predictions = stack
        .fit(&x_train, &y_train)?
        .predict(&x_test)?
        .into_matrix();

    for warning in stack.warnings() {
        println!("warning: {}", warning);
    }

    let residuals = &predictions.column(0) - &y_test;
    let rmse = (residuals.mapv(|r| r * r).mean().unwrap_or(f64::NAN)).sqrt();
    println!("Test RMSE: {:.4}", rmse);

    let n = y_test.len().min(5);
    for i in 0..n {
        println!("  target {:8.3}  predicted {:8.3}", y_test[i], predictions[[i, 0]]);
    }
    Ok(())
}
