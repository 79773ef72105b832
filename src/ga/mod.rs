//! Genetic algorithm for single-vehicle tour improvement.
//!
//! The generational loop, selection and order crossover come from
//! [`u_metaheur::ga`]; this module supplies the routing side.
//!
//! - [`Tour`] — Permutation chromosome over one vehicle's customers
//! - [`shuffle_indexes`] — Per-gene swap mutation
//! - [`DeadheadingProblem`] — Tour cost including the return leg
//! - [`GaSettings`] — Deserializable parameters mapped onto a runner config

mod chromosome;
mod operators;
mod problem;
mod settings;

pub use chromosome::Tour;
pub use operators::shuffle_indexes;
pub use problem::DeadheadingProblem;
pub use settings::GaSettings;
