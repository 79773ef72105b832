//! Mutation over permutations of customer labels.
//!
//! Crossover and selection come from [`u_metaheur::ga`]; the shuffle-indexes
//! mutation has no counterpart there.

use rand::Rng;

/// Shuffle-indexes mutation.
///
/// Each position is, with probability `indpb`, swapped with a uniformly chosen
/// different position.
///
/// # Examples
///
/// ```
/// use eco_routing::ga::shuffle_indexes;
/// use rand::SeedableRng;
///
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
/// let mut genes = vec![4, 8, 15, 16, 23, 42];
/// shuffle_indexes(&mut genes, 0.5, &mut rng);
/// let mut sorted = genes.clone();
/// sorted.sort();
/// assert_eq!(sorted, vec![4, 8, 15, 16, 23, 42]);
/// ```
pub fn shuffle_indexes<R: Rng>(genes: &mut [usize], indpb: f64, rng: &mut R) {
    let n = genes.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        if rng.random_bool(indpb) {
            let mut other = rng.random_range(0..n - 1);
            if other >= i {
                other += 1;
            }
            genes.swap(i, other);
        }
    }
}
