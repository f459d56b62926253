use rand::Rng;
use serde::{Deserialize, Serialize};

/// A gem color from the fixed palette.
///
/// The palette is closed: every consumer matches exhaustively against these
/// variants, so a color that is not listed here cannot reach the board.
/// Game variants play with a prefix of the palette (see [`GemColor::palette`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemColor {
    Ruby,
    Amber,
    Topaz,
    Emerald,
    Sapphire,
    Amethyst,
}

impl GemColor {
    pub const LEN: usize = Self::ALL.len();

    pub const ALL: [Self; 6] = [
        Self::Ruby,
        Self::Amber,
        Self::Topaz,
        Self::Emerald,
        Self::Sapphire,
        Self::Amethyst,
    ];

    /// Returns the first `n` colors, clamped to the full palette.
    ///
    /// Variants with fewer colors in play pass their configured count here.
    #[must_use]
    pub fn palette(n: usize) -> &'static [Self] {
        &Self::ALL[..n.clamp(1, Self::LEN)]
    }

    /// Samples a color uniformly from `palette`.
    ///
    /// # Panics
    ///
    /// Panics if `palette` is empty.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, palette: &[Self]) -> Self {
        palette[rng.random_range(0..palette.len())]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn palette_is_clamped() {
        assert_eq!(GemColor::palette(4).len(), 4);
        assert_eq!(GemColor::palette(0).len(), 1);
        assert_eq!(GemColor::palette(100).len(), GemColor::LEN);
    }

    #[test]
    fn sample_stays_in_palette() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let palette = GemColor::palette(3);
        for _ in 0..200 {
            let color = GemColor::sample(&mut rng, palette);
            assert!(palette.contains(&color));
        }
    }
}
