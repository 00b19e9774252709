use rand::Rng;
use shared::Color;

/// Lowest value of each color channel, so players stay visible on a dark arena
const MIN_CHANNEL: u8 = 50;

// Pick a random display color for a newly admitted player
pub fn random_color<R: Rng>(rng: &mut R) -> Color {
    (
        rng.gen_range(MIN_CHANNEL..=u8::MAX),
        rng.gen_range(MIN_CHANNEL..=u8::MAX),
        rng.gen_range(MIN_CHANNEL..=u8::MAX),
    )
}

// Scale a vector to unit length, or zero if it has none
pub fn normalize_vector(x: f32, y: f32) -> (f32, f32) {
    let magnitude = (x * x + y * y).sqrt();
    if magnitude > 0.0 {
        (x / magnitude, y / magnitude)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_color_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let (r, g, b) = random_color(&mut rng);
            assert!(r >= MIN_CHANNEL && g >= MIN_CHANNEL && b >= MIN_CHANNEL);
        }
    }

    #[test]
    fn test_normalize_vector() {
        let (x, y) = normalize_vector(3.0, 4.0);
        assert_approx_eq!(x, 0.6);
        assert_approx_eq!(y, 0.8);
        assert_eq!(normalize_vector(0.0, 0.0), (0.0, 0.0));
    }
}
