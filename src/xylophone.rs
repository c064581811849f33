//! Tile index to note mapping for the hover chime.

/// C4.
pub const BASE_FREQUENCY: f64 = 261.63;

/// Major pentatonic ratios.
const PENTATONIC: [f64; 5] = [1.0, 9.0 / 8.0, 5.0 / 4.0, 3.0 / 2.0, 5.0 / 3.0];

const OCTAVE_SPAN: f64 = 2.0;

/// Seconds a note rings.
pub const NOTE_SECONDS: f64 = 0.4;

/// Frequency for the tile at `index` of `total`, spread over two octaves.
pub fn frequency_for(index: usize, total: usize) -> f64 {
    if total < 2 {
        return BASE_FREQUENCY;
    }
    let position = (index.min(total - 1) as f64 / (total - 1) as f64) * OCTAVE_SPAN;
    let octave = position.floor();
    let notes = PENTATONIC.len();
    let step = ((position.fract() * notes as f64).floor() as usize).min(notes - 1);
    BASE_FREQUENCY * 2f64.powf(octave) * PENTATONIC[step]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_two_octaves() {
        assert_eq!(frequency_for(0, 10), BASE_FREQUENCY);
        assert!((frequency_for(9, 10) - BASE_FREQUENCY * 4.0).abs() < 1e-9);
    }

    #[test]
    fn single_tile_plays_base() {
        assert_eq!(frequency_for(0, 1), BASE_FREQUENCY);
        assert_eq!(frequency_for(3, 0), BASE_FREQUENCY);
    }

    #[test]
    fn rises_with_index() {
        let notes: Vec<f64> = (0..12).map(|i| frequency_for(i, 12)).collect();
        assert!(notes.windows(2).all(|w| w[1] >= w[0]));
    }
}
