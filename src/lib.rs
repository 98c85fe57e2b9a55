#![allow(clippy::multiple_crate_versions)]

//! # t-SNE: t-distributed Stochastic Neighbor Embedding
//!
//! This crate provides a Rust implementation of exact t-SNE, a dimensionality
//! reduction technique that embeds high-dimensional feature vectors in two or
//! three dimensions while keeping similar vectors close together.
//!
//! t-SNE converts distances into probabilities on both sides of the mapping
//! and moves the embedded points until the two distributions agree:
//! - In the input space, each point gets a Gaussian kernel whose width is
//!   calibrated so that its neighbor distribution has a fixed perplexity
//! - In the embedding, a heavy-tailed Student-t kernel spreads moderately
//!   distant points apart and avoids crowding
//! - Gradient descent minimizes the Kullback-Leibler divergence between the
//!   two
//!
//! The implementation provides:
//! - PCA pre-reduction before the quadratic distance stage, with exact or
//!   randomized SVD
//! - Binary-search calibration of per-point kernel precisions
//! - Early exaggeration with a configurable duration
//! - Momentum gradient descent with adaptive per-coordinate gains
//! - Periodic divergence reporting and caller-controlled early stopping
//! - Optional snapshot capture of intermediate states
//!
//! ## Examples
//!
//! Basic usage with default parameters:
//! ```rust,no_run
//! use ndarray::Array2;
//! use tsne::{Configuration, fit_transform};
//!
//! let data: Array2<f64> = // ... load your high-dimensional data
//! # Array2::zeros((100, 50));
//! let config = Configuration::default();
//! let embedding = fit_transform(data.view(), config).unwrap();
//! println!("{}", embedding.coordinates);
//! ```
//!
//! Customized embedding:
//! ```rust,no_run
//! use tsne::{Configuration, Execution, Initialization};
//!
//! let config = Configuration::builder()
//!     .embedding_dimensions(3)
//!     .initial_dimensions(30)
//!     .perplexity(10.0)
//!     .max_iter(500)
//!     .exaggeration_iterations(100)
//!     .initialization(Initialization::Random(Some(42)))
//!     .execution(Execution::Threads(4))
//!     .build();
//! ```
//!
//! Stopping once the divergence stalls:
//! ```rust,no_run
//! use std::ops::ControlFlow;
//! use ndarray::Array2;
//! use tsne::{Configuration, fit_transform_with_monitor};
//!
//! # let data: Array2<f64> = Array2::zeros((100, 50));
//! let config = Configuration::builder().max_iter(1000).build();
//! let mut last = f64::INFINITY;
//! let embedding = fit_transform_with_monitor(data.view(), config, |progress| {
//!     match progress.cost {
//!         Some(cost) if last - cost < 1e-4 => ControlFlow::Break(()),
//!         Some(cost) => {
//!             last = cost;
//!             ControlFlow::Continue(())
//!         }
//!         None => ControlFlow::Continue(()),
//!     }
//! });
//! ```
//!
//! ## Configuration
//!
//! Core parameters:
//! - `embedding_dimensions`: Output dimensionality (default: 2)
//! - `initial_dimensions`: PCA dimensionality before calibration (default:
//!   50, must not exceed the feature count)
//! - `perplexity`: Effective neighborhood size (default: 30.0)
//! - `max_iter`: Number of gradient descent iterations (default: 100)
//! - `initialization`: How to initialize coordinates:
//!   - `Random(seed)` - Standard normal with optional seed (default)
//!   - `Pca` - Leading PCA components, scaled down
//!   - `Value(array)` - Use provided coordinates
//! - `execution`: Thread pool the computation runs on
//!
//! Optimizer parameters:
//! - `exaggeration` / `exaggeration_iterations`: Early exaggeration factor
//!   and duration (default: 4.0 for 100 iterations)
//! - `learning_rate`: Step size on the exact gradient (default: 125, the
//!   classic step of 500 on the gradient without its factor of four)
//! - `initial_momentum` / `final_momentum` / `momentum_switch_iter`: Momentum
//!   schedule (default: 0.5, then 0.8 from iteration 20)
//! - `min_gain`: Lower bound on adaptive gains (default: 0.01)
//! - `cost_interval`: Iterations between divergence evaluations (default: 10)
//!
//! ## Implementation Notes
//!
//! - Computes exact `O(n²)` affinities, suited to a few thousand points
//! - Uses squared Euclidean distances in both spaces
//! - Leverages ndarray for matrix operations and rayon for per-point
//!   parallelism, confined to a thread pool owned by each run
//! - Never fails on numeric degeneracy: affinities are floored instead
//!
//! ## References
//!
//! [Visualizing Data using t-SNE](https://www.jmlr.org/papers/v9/vandermaaten08a.html).
//! van der Maaten, L., & Hinton, G. (2008).
//! Journal of Machine Learning Research, 9(86), 2579-2605.

// Submodule imports
mod affinity;
pub mod distance;
mod gains;
mod gradient;
pub mod layout;
mod pca;
mod perplexity;
mod schedule;


use bon::Builder;
use ndarray::{s, Array2, Array3, ArrayView2, CowArray, Ix2};
use ndarray_rand::rand_distr::{Normal, NormalError};
use ndarray_rand::RandomExt;
use petal_decomposition::DecompositionError;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::ops::ControlFlow;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

use crate::affinity::{joint_probabilities, relax_exaggeration};
use crate::distance::pairwise_squared_distances;
use crate::gains::{center_columns, update_embedding_gains, StepParameters};
use crate::gradient::{kl_divergence, student_t_affinities, tsne_grad};
use crate::perplexity::{calibrate, SearchParameters};
use crate::schedule::Schedule;

/// Configuration options for the t-SNE embedding process.
///
/// Controls preprocessing, calibration, optimization parameters, snapshot
/// capture, and the execution context.
#[derive(Builder, Clone, Debug)]
pub struct Configuration {
    /// Number of dimensions in the output embedding space, typically 2 or 3
    #[builder(default = 2)]
    pub embedding_dimensions: usize,

    /// Number of PCA components kept before computing affinities
    #[builder(default = 50)]
    pub initial_dimensions: usize,

    /// Target perplexity of every conditional neighbor distribution
    #[builder(default = 30.0)]
    pub perplexity: f64,

    /// Number of gradient descent iterations
    #[builder(default = 100)]
    pub max_iter: usize,

    /// Accepted entropy deviation of the perplexity search
    #[builder(default = 1e-5)]
    pub tolerance: f64,

    /// Maximum number of bisection steps per point in the perplexity search
    #[builder(default = 50)]
    pub max_tries: usize,

    /// Multiplier applied to `P` during early exaggeration
    #[builder(default = 4.0)]
    pub exaggeration: f64,

    /// Number of iterations run against the exaggerated `P`; must not exceed
    /// `max_iter`
    #[builder(default = 100)]
    pub exaggeration_iterations: usize,

    /// Gradient descent step size (eta) applied to the exact gradient
    #[builder(default = 125.0)]
    pub learning_rate: f64,

    /// Momentum before `momentum_switch_iter`
    #[builder(default = 0.5)]
    pub initial_momentum: f64,

    /// Momentum from `momentum_switch_iter` on
    #[builder(default = 0.8)]
    pub final_momentum: f64,

    /// First iteration using `final_momentum`
    #[builder(default = 20)]
    pub momentum_switch_iter: usize,

    /// Lower bound on adaptive gains
    #[builder(default = 0.01)]
    pub min_gain: f64,

    /// Iterations between divergence evaluations; zero disables them
    #[builder(default = 10)]
    pub cost_interval: usize,

    /// Method for initializing the embedding coordinates
    #[builder(default)]
    pub initialization: Initialization,

    /// Scaling applied to the input before PCA
    #[builder(default)]
    pub normalization: Normalization,

    /// Decomposition used for PCA pre-reduction
    #[builder(default)]
    pub pca_solver: PcaSolver,

    /// Feature count above which `PcaSolver::Auto` uses randomized SVD
    #[builder(default = 500)]
    pub randomized_pca_threshold: usize,

    /// Optional random seed for randomized PCA
    pub seed: Option<u64>,

    /// Optional iteration counts (1-based) after which to save embedding
    /// states
    pub snapshots: Option<Vec<usize>>,

    /// Thread pool the computation runs on
    #[builder(default)]
    pub execution: Execution,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            embedding_dimensions: 2,
            initial_dimensions: 50,
            perplexity: 30.0,
            max_iter: 100,
            tolerance: 1e-5,
            max_tries: 50,
            exaggeration: 4.0,
            exaggeration_iterations: 100,
            learning_rate: 125.0,
            initial_momentum: 0.5,
            final_momentum: 0.8,
            momentum_switch_iter: 20,
            min_gain: 0.01,
            cost_interval: 10,
            initialization: Initialization::default(),
            normalization: Normalization::default(),
            pca_solver: PcaSolver::default(),
            randomized_pca_threshold: 500,
            seed: None,
            snapshots: None,
            execution: Execution::default(),
        }
    }
}

/// Methods for initializing the embedding coordinates.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Initialization {
    /// Draw from a standard normal distribution with an optional seed
    Random(Option<u64>),

    /// Use the leading PCA components, scaled so the first has standard
    /// deviation 1e-4
    Pca,

    /// Use provided coordinate values
    Value(Array2<f64>),
}

impl Default for Initialization {
    fn default() -> Self {
        Self::Random(None)
    }
}

/// Scaling applied to the feature matrix before PCA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Normalization {
    /// Use the features as given
    #[default]
    Raw,

    /// Divide every feature by the global maximum
    Max,
}

/// Decomposition strategy for PCA pre-reduction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum PcaSolver {
    /// Randomized SVD above `randomized_pca_threshold` features, exact below
    #[default]
    Auto,

    /// Full SVD
    Exact,

    /// Randomized SVD
    Randomized,
}

/// Thread pool a run executes on.
///
/// Every run builds its own pool, so concurrent runs with different settings
/// never share global state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Execution {
    /// One worker per available core
    #[default]
    Parallel,

    /// A fixed number of workers; zero means one per available core
    Threads(usize),

    /// A single worker on the calling host
    Sequential,
}

impl Execution {
    /// Builds the thread pool for this execution context.
    fn thread_pool(self) -> Result<ThreadPool, ThreadPoolBuildError> {
        let num_threads = match self {
            Execution::Parallel => 0,
            Execution::Threads(n) => n,
            Execution::Sequential => 1,
        };
        ThreadPoolBuilder::new().num_threads(num_threads).build()
    }
}

/// Divergence recorded after an iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationCost {
    /// Number of completed iterations
    pub iteration: usize,

    /// Kullback-Leibler divergence between `P` and `Q`
    pub kl_divergence: f64,
}

/// State reported to the monitor after every iteration.
#[derive(Debug)]
pub struct Progress<'a> {
    /// Number of completed iterations
    pub iteration: usize,

    /// Divergence, present every `cost_interval` iterations
    pub cost: Option<f64>,

    /// Embedding after this iteration
    pub embedding: ArrayView2<'a, f64>,
}

/// Output of a t-SNE run.
#[derive(Clone, Debug)]
pub struct Embedding {
    /// Final embedding coordinates, one row per input sample
    pub coordinates: Array2<f64>,

    /// Intermediate embedding states if snapshots were requested
    pub snapshots: Option<Array3<f64>>,

    /// Divergence recorded every `cost_interval` iterations
    pub costs: Vec<IterationCost>,
}

/// Reduces dimensionality of input data using t-SNE.
///
/// # Arguments
/// * `x` - Input data matrix where each row is a sample
/// * `config` - Configuration options controlling the embedding process
///
/// # Returns
/// The final embedding with optional snapshots and recorded costs
///
/// # Errors
/// See [`fit_transform_with_monitor`].
pub fn fit_transform(x: ArrayView2<f64>, config: Configuration) -> Result<Embedding, TsneError> {
    fit_transform_with_monitor(x, config, |_| ControlFlow::Continue(()))
}

/// Reduces dimensionality of input data using t-SNE, reporting progress
/// after every iteration.
///
/// The monitor returns `ControlFlow::Break` to stop the optimization early;
/// the embedding at that point is returned.
///
/// # Arguments
/// * `x` - Input data matrix where each row is a sample
/// * `config` - Configuration options controlling the embedding process
/// * `monitor` - Callback receiving each iteration's progress
///
/// # Errors
/// * `TsneError::EmptyInput` - Input has no samples or no features
/// * `TsneError::InvalidEmbeddingDimensions` - `embedding_dimensions` is zero
/// * `TsneError::InvalidPcaDimensions` - `initial_dimensions` is zero or
///   exceeds the feature count
/// * `TsneError::InvalidPerplexity` - Perplexity is not a positive number
/// * `TsneError::InvalidIterations` - `max_iter` is zero
/// * `TsneError::InvalidExaggeration` - Exaggeration is not a positive number
/// * `TsneError::InvalidExaggerationSchedule` - Exaggeration outlasts
///   `max_iter`
/// * `TsneError::InvalidInitialization` - Provided coordinates have the wrong
///   shape
/// * `TsneError::InvalidPcaInitialization` - PCA initialization needs more
///   components than `initial_dimensions`
/// * `TsneError::NonFiniteInput` - Input contains NaN or infinite values
/// * `TsneError::ZeroRange` - Max normalization of an all-zero maximum
/// * `TsneError::Pca` - PCA decomposition fails
/// * `TsneError::Normal` - Random initialization fails
/// * `TsneError::ThreadPool` - The execution thread pool cannot be built
pub fn fit_transform_with_monitor<F>(
    x: ArrayView2<f64>,
    mut config: Configuration,
    monitor: F,
) -> Result<Embedding, TsneError>
where
    F: FnMut(&Progress<'_>) -> ControlFlow<()> + Send,
{
    validate(x, &config)?;

    let pool = config.execution.thread_pool()?;
    let initialization = std::mem::take(&mut config.initialization);
    pool.install(|| run(x, &config, initialization, monitor))
}

/// Rejects invalid input shapes and parameters before any computation.
fn validate(x: ArrayView2<f64>, config: &Configuration) -> Result<(), TsneError> {
    let (n, dim) = x.dim();
    if n == 0 || dim == 0 {
        return Err(TsneError::EmptyInput);
    }

    if config.embedding_dimensions == 0 {
        return Err(TsneError::InvalidEmbeddingDimensions);
    }

    if config.initial_dimensions == 0 || config.initial_dimensions > dim {
        return Err(TsneError::InvalidPcaDimensions {
            requested: config.initial_dimensions,
            available: dim,
        });
    }

    if !(config.perplexity.is_finite() && config.perplexity > 0.0) {
        return Err(TsneError::InvalidPerplexity(config.perplexity));
    }

    if config.max_iter == 0 {
        return Err(TsneError::InvalidIterations);
    }

    if !(config.exaggeration.is_finite() && config.exaggeration > 0.0) {
        return Err(TsneError::InvalidExaggeration(config.exaggeration));
    }

    if config.exaggeration_iterations > config.max_iter {
        return Err(TsneError::InvalidExaggerationSchedule {
            exaggeration_iterations: config.exaggeration_iterations,
            max_iter: config.max_iter,
        });
    }

    match &config.initialization {
        Initialization::Value(y) if y.dim() != (n, config.embedding_dimensions) => {
            return Err(TsneError::InvalidInitialization {
                expected: [n, config.embedding_dimensions],
                actual: y.shape().to_vec(),
            });
        }
        Initialization::Pca if config.embedding_dimensions > config.initial_dimensions => {
            return Err(TsneError::InvalidPcaInitialization {
                embedding_dimensions: config.embedding_dimensions,
                initial_dimensions: config.initial_dimensions,
            });
        }
        _ => {}
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(TsneError::NonFiniteInput);
    }

    Ok(())
}

/// Runs the full pipeline on the current thread pool.
fn run<F>(
    x: ArrayView2<f64>,
    config: &Configuration,
    initialization: Initialization,
    mut monitor: F,
) -> Result<Embedding, TsneError>
where
    F: FnMut(&Progress<'_>) -> ControlFlow<()>,
{
    let start_time = Instant::now();
    let x = normalize(x, config.normalization)?;

    let reduced = pca::reduce(
        x.view(),
        config.initial_dimensions,
        config.pca_solver,
        config.randomized_pca_threshold,
        config.seed,
    )?;

    let n = reduced.nrows();
    if n > 1 && config.perplexity >= (n - 1) as f64 {
        warn!(
            "Perplexity {} is not below the neighbor count {}, calibration will not converge",
            config.perplexity,
            n - 1
        );
    }

    // Compute P-values
    debug!("Computing pairwise distances...");
    let distances = pairwise_squared_distances(reduced.view());
    let calibration = calibrate(
        distances.view(),
        SearchParameters {
            perplexity: config.perplexity,
            tolerance: config.tolerance,
            max_tries: config.max_tries,
        },
    );
    drop(distances);

    if calibration.unconverged > 0 {
        debug!(
            "Perplexity search did not converge for {} of {n} points",
            calibration.unconverged
        );
    }
    debug!(
        "Mean value of sigma: {}",
        calibration.betas.mapv(|beta| (1.0 / beta).sqrt()).mean().unwrap_or(0.0)
    );

    let exaggeration = if config.exaggeration_iterations == 0 {
        1.0
    } else {
        config.exaggeration
    };
    let p = joint_probabilities(calibration.conditional.view(), exaggeration);
    drop(calibration);

    let y = initialize(initialization, reduced.view(), config.embedding_dimensions)?;
    drop(reduced);

    let embedding = tsne(p, y, config, exaggeration, &mut monitor)?;

    let elapsed = start_time.elapsed();
    debug!("Elapsed time: {:.2?}", elapsed);

    Ok(embedding)
}

/// Applies the configured input scaling.
///
/// # Errors
/// * `TsneError::ZeroRange` if max scaling divides by zero
fn normalize(
    x: ArrayView2<'_, f64>,
    normalization: Normalization,
) -> Result<CowArray<'_, f64, Ix2>, TsneError> {
    match normalization {
        Normalization::Raw => Ok(CowArray::from(x)),
        Normalization::Max => {
            let x_max = x
                .iter()
                .copied()
                .max_by(f64::total_cmp)
                .ok_or(TsneError::EmptyInput)?;

            if x_max == 0.0 {
                return Err(TsneError::ZeroRange);
            }

            debug!("x is normalized by its maximum {x_max}");
            Ok(CowArray::from(x.mapv(|v| v / x_max)))
        }
    }
}

/// Builds the initial embedding coordinates.
///
/// # Errors
/// * `TsneError::Normal` if the normal distribution cannot be created
fn initialize(
    initialization: Initialization,
    reduced: ArrayView2<f64>,
    n_dims: usize,
) -> Result<Array2<f64>, TsneError> {
    let n = reduced.nrows();
    let y = match initialization {
        Initialization::Random(maybe_seed) => {
            let normal = Normal::new(0.0, 1.0)?;

            match maybe_seed {
                None => Array2::random((n, n_dims), normal),
                Some(seed) => {
                    Array2::random_using((n, n_dims), normal, &mut SmallRng::seed_from_u64(seed))
                }
            }
        }
        Initialization::Pca => {
            let mut y = reduced.slice(s![.., ..n_dims]).to_owned();
            let std = y.column(0).std(0.0);
            if std > 0.0 {
                y.mapv_inplace(|v| v / std * 1e-4);
            }
            y
        }
        Initialization::Value(y) => y,
    };

    Ok(y)
}

/// Core t-SNE optimization loop.
///
/// Iteratively updates embedding coordinates through momentum gradient
/// descent with adaptive gains, re-centering after every step. Early
/// exaggeration is removed once after `exaggeration_iterations` iterations.
///
/// # Arguments
/// * `p` - Joint input affinities, already exaggerated by `exaggeration`
/// * `y` - Initial embedding coordinates
/// * `config` - Optimizer parameters
/// * `exaggeration` - Factor `p` is currently scaled by
/// * `monitor` - Progress callback, may stop the loop early
///
/// # Errors
/// * `TsneError::EmptyArrayMean` if the embedding cannot be re-centered
fn tsne<F>(
    mut p: Array2<f64>,
    mut y: Array2<f64>,
    config: &Configuration,
    exaggeration: f64,
    monitor: &mut F,
) -> Result<Embedding, TsneError>
where
    F: FnMut(&Progress<'_>) -> ControlFlow<()>,
{
    let (n, n_dims) = y.dim();
    let mut inter_snapshots = Snapshots::from(n_dims, n, config.snapshots.as_deref());

    let schedule = Schedule {
        initial_momentum: config.initial_momentum,
        final_momentum: config.final_momentum,
        momentum_switch_iter: config.momentum_switch_iter,
        exaggeration_iterations: config.exaggeration_iterations,
    };

    let mut velocity = Array2::zeros((n, n_dims));
    let mut gains = Array2::ones((n, n_dims));
    let mut costs = Vec::new();

    // Main optimization loop
    for itr in 0..config.max_iter {
        let affinities = student_t_affinities(y.view());
        let grad = tsne_grad(y.view(), p.view(), &affinities);

        update_embedding_gains(
            y.view_mut(),
            grad.view(),
            velocity.view_mut(),
            gains.view_mut(),
            StepParameters {
                momentum: schedule.momentum(itr),
                learning_rate: config.learning_rate,
                min_gain: config.min_gain,
            },
        );
        center_columns(&mut y)?;

        let cost = (config.cost_interval > 0 && (itr + 1) % config.cost_interval == 0)
            .then(|| kl_divergence(p.view(), affinities.q.view()));

        if let Some(kl_divergence) = cost {
            debug!("Iteration {}: error is {kl_divergence}", itr + 1);
            costs.push(IterationCost {
                iteration: itr + 1,
                kl_divergence,
            });
        }

        // Stop lying about P-values
        if schedule.ends_exaggeration(itr) {
            relax_exaggeration(&mut p, exaggeration);
            debug!("Early exaggeration removed after {} iterations", itr + 1);
        }

        if let Some(ref mut snapshots) = inter_snapshots {
            if let Some(index) = snapshots.indices.iter().position(|&x| x == itr + 1) {
                snapshots.states.slice_mut(s![index, .., ..]).assign(&y);
            }
        }

        let progress = Progress {
            iteration: itr + 1,
            cost,
            embedding: y.view(),
        };
        if monitor(&progress).is_break() {
            debug!("Stopped by monitor after {} iterations", itr + 1);
            break;
        }
    }

    Ok(Embedding {
        coordinates: y,
        snapshots: inter_snapshots.map(|s| s.states),
        costs,
    })
}

/// Manages intermediate embedding states during optimization.
struct Snapshots<'a> {
    /// Stored embedding states
    states: Array3<f64>,

    /// Iteration counts after which to take snapshots
    indices: &'a [usize],
}

impl<'a> Snapshots<'a> {
    /// Creates new snapshot manager if indices are provided.
    ///
    /// # Arguments
    /// * `n_dims` - Dimensionality of embedding
    /// * `n` - Number of samples
    /// * `maybe_snapshots` - Optional snapshot indices
    fn from(n_dims: usize, n: usize, maybe_snapshots: Option<&'a [usize]>) -> Option<Self> {
        let snapshots = maybe_snapshots?;
        Some(Self {
            states: Array3::zeros((snapshots.len(), n, n_dims)),
            indices: snapshots,
        })
    }
}

/// Errors that can occur during t-SNE embedding.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TsneError {
    /// Input data has no samples or no features
    #[error("Input must have at least one sample and one feature")]
    EmptyInput,

    /// Output dimensionality is zero
    #[error("The number of embedding dimensions must be positive")]
    InvalidEmbeddingDimensions,

    /// PCA dimensionality is zero or exceeds the feature count
    #[error("Cannot reduce {available} features to {requested} PCA dimensions")]
    InvalidPcaDimensions {
        /// Requested number of PCA components
        requested: usize,
        /// Number of input features
        available: usize,
    },

    /// Perplexity is not a positive finite number
    #[error("Perplexity must be positive and finite, got {0}")]
    InvalidPerplexity(f64),

    /// No iterations were requested
    #[error("The number of iterations must be positive")]
    InvalidIterations,

    /// Exaggeration factor is not a positive finite number
    #[error("Exaggeration must be positive and finite, got {0}")]
    InvalidExaggeration(f64),

    /// Early exaggeration would outlast the optimization
    #[error(
        "Exaggeration lasts {exaggeration_iterations} iterations but only {max_iter} are run"
    )]
    InvalidExaggerationSchedule {
        /// Configured exaggeration duration
        exaggeration_iterations: usize,
        /// Configured iteration count
        max_iter: usize,
    },

    /// Provided initial coordinates have incorrect dimensions
    #[error("Invalid shape for initial coordinates. Expected {expected:?}, got {actual:?}")]
    InvalidInitialization {
        /// Expected shape: [`n_samples`, `embedding_dimensions`]
        expected: [usize; 2],
        /// Actual shape of provided matrix
        actual: Vec<usize>,
    },

    /// PCA initialization needs more components than are computed
    #[error(
        "PCA initialization needs {embedding_dimensions} components but only {initial_dimensions} are computed"
    )]
    InvalidPcaInitialization {
        /// Configured output dimensionality
        embedding_dimensions: usize,
        /// Configured PCA dimensionality
        initial_dimensions: usize,
    },

    /// Input contains NaN or infinite values
    #[error("Input contains NaN or infinite values")]
    NonFiniteInput,

    /// Data cannot be normalized due to a zero maximum
    #[error("The maximum of X is zero, cannot normalize")]
    ZeroRange,

    /// Mean calculation failed due to empty array
    #[error("Failed to calculate mean axis: the array is empty")]
    EmptyArrayMean,

    /// Normal distribution creation failed
    #[error(transparent)]
    Normal(#[from] NormalError),

    /// PCA decomposition failed
    #[error(transparent)]
    Pca(#[from] DecompositionError),

    /// Thread pool construction failed
    #[error(transparent)]
    ThreadPool(#[from] ThreadPoolBuildError),
}
