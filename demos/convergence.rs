//! Convergence study: how fast do the sampling schemes settle?
//!
//! Builds a small metafunction grid, runs it on tokio's blocking pool and
//! prints the RMSE of the mean output per scheme and sample size, followed
//! by effective-dimension and anomaly statistics.
//!
//! Run with: `cargo run --release --example convergence`

use std::time::Instant;

use metafunction::prelude::*;
use metafunction::results::DEFAULT_IMPORTANCE_THRESHOLD;

#[tokio::main]
async fn main() -> metafunction::Result<()> {
    let config = GridConfig::default()
        .base_size(32)
        .max_k(8)
        .sample_sizes((6..=11).map(|p| 1 << p).collect());
    let grid = ExperimentGrid::build(&config)?;
    let concurrency = default_concurrency();

    println!(
        "Running {} rows ({} outer points) with {concurrency} workers...",
        grid.len(),
        config.base_size
    );
    let start = Instant::now();
    let results = grid.run_parallel(concurrency).await?;
    println!("Finished in {:.2?}\n", start.elapsed());

    println!("{:<8} {:>6} {:>12}", "scheme", "N", "rmse");
    for p in results.convergence() {
        println!("{:<8} {:>6} {:>12.6}", p.scheme, p.sample_size, p.rmse);
    }

    let dims = results.effective_dimensions(DEFAULT_IMPORTANCE_THRESHOLD);
    println!("\n{:>4} {:>3} {:>5} {:>8} {:>9} {:>8}", "id", "k", "order", "sum S", "important", "sum T");
    for d in dims.iter().filter(|d| d.scheme == SamplingScheme::Sobol) {
        println!(
            "{:>4} {:>3} {:>5} {:>8.3} {:>9} {:>8.3}",
            d.id, d.k, d.order, d.first_order_sum, d.n_important, d.total_order_sum
        );
    }

    let a = results.anomalies();
    println!(
        "\n{} of {} runs had a first-order sum outside [0, 1]; {} had negative indices",
        a.first_order_sum_out_of_range, a.n_runs, a.negative_index
    );
    for f in results.failures() {
        println!("failed: {f}");
    }
    Ok(())
}
