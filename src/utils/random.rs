use rand::{Rng, SeedableRng};

/// Cells of a `side` x `side` square at the origin, each alive with
/// probability `fill_rate`.
///
/// `seed` - random seed (if `None`, then random seed is generated)
pub fn random_field(side: u32, fill_rate: f64, seed: Option<u64>) -> (Vec<i64>, Vec<i64>) {
    let mut rng = if let Some(x) = seed {
        rand_chacha::ChaCha8Rng::seed_from_u64(x)
    } else {
        rand_chacha::ChaCha8Rng::from_entropy()
    };
    let (mut field_x, mut field_y) = (vec![], vec![]);
    for y in 0..side as i64 {
        for x in 0..side as i64 {
            if rng.gen_bool(fill_rate) {
                field_x.push(x);
                field_y.push(y);
            }
        }
    }
    (field_x, field_y)
}
