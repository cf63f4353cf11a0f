//! In-place radix-2 Cooley-Tukey FFT.

use num_complex::Complex32;
use std::f32::consts::PI;

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    /// Inverse transform, scaled by 1/N.
    Inverse,
}

/// Transforms `data` in place. `data.len()` must be a power of two.
pub fn fft_in_place(data: &mut [Complex32], direction: Direction) {
    let n = data.len();
    debug_assert!(n.is_power_of_two(), "radix-2 FFT needs a power-of-two length");
    if n <= 1 {
        return;
    }

    bit_reverse(data);

    let sign = match direction {
        Direction::Forward => -1.0,
        Direction::Inverse => 1.0,
    };

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = sign * 2.0 * PI / size as f32;
        let wn = Complex32::new(angle.cos(), angle.sin());

        for start in (0..n).step_by(size) {
            let mut w = Complex32::new(1.0, 0.0);
            for k in 0..half {
                let t = w * data[start + k + half];
                let u = data[start + k];
                data[start + k] = u + t;
                data[start + k + half] = u - t;
                w *= wn;
            }
        }
        size *= 2;
    }

    if direction == Direction::Inverse {
        let scale = 1.0 / n as f32;
        for value in data.iter_mut() {
            *value *= scale;
        }
    }
}

/// Reorders `data` into bit-reversed index order.
fn bit_reverse(data: &mut [Complex32]) {
    let n = data.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            data.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real_signal(values: impl Iterator<Item = f32>) -> Vec<Complex32> {
        values.map(|v| Complex32::new(v, 0.0)).collect()
    }

    /// Reference O(n^2) DFT.
    fn naive_dft(input: &[Complex32]) -> Vec<Complex32> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(t, &x)| {
                        let angle = -2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64;
                        x * Complex32::new(angle.cos() as f32, angle.sin() as f32)
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_bit_reverse_order_of_eight() {
        let mut data = real_signal((0..8).map(|i| i as f32));
        bit_reverse(&mut data);
        let order: Vec<f32> = data.iter().map(|c| c.re).collect();
        assert_eq!(order, vec![0.0, 4.0, 2.0, 6.0, 1.0, 5.0, 3.0, 7.0]);
    }

    #[test]
    fn test_unit_impulse_has_flat_spectrum() {
        let mut data = vec![Complex32::new(0.0, 0.0); 512];
        data[0] = Complex32::new(1.0, 0.0);
        fft_in_place(&mut data, Direction::Forward);

        for (k, bin) in data.iter().take(257).enumerate() {
            assert!((bin.norm() - 1.0).abs() < 1e-5, "bin {} = {}", k, bin);
        }
    }

    #[test]
    fn test_cosine_concentrates_in_its_bin() {
        let n = 512;
        let k0 = 17;
        let mut data = real_signal(
            (0..n).map(|t| (2.0 * PI * k0 as f32 * t as f32 / n as f32).cos()),
        );
        fft_in_place(&mut data, Direction::Forward);

        assert!((data[k0].norm() - n as f32 / 2.0).abs() < 0.1);
        for (k, bin) in data.iter().take(n / 2 + 1).enumerate() {
            if k != k0 {
                assert!(bin.norm() < 0.1, "leakage at bin {}: {}", k, bin.norm());
            }
        }
    }

    #[test]
    fn test_matches_naive_dft() {
        let input = real_signal((0..64).map(|i| ((i * 7919) % 13) as f32 / 13.0 - 0.5));
        let expected = naive_dft(&input);

        let mut data = input.clone();
        fft_in_place(&mut data, Direction::Forward);

        for (a, b) in data.iter().zip(&expected) {
            assert!((a - b).norm() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_inverse_recovers_input() {
        let input: Vec<Complex32> = (0..256)
            .map(|i| Complex32::new((i as f32 * 0.37).sin(), (i as f32 * 0.11).cos()))
            .collect();
        let mut data = input.clone();
        fft_in_place(&mut data, Direction::Forward);
        fft_in_place(&mut data, Direction::Inverse);

        for (a, b) in data.iter().zip(&input) {
            assert!((a - b).norm() < 1e-3);
        }
    }

    #[test]
    fn test_real_input_is_hermitian() {
        let mut data = real_signal((0..32).map(|i| (i as f32).sqrt()));
        fft_in_place(&mut data, Direction::Forward);
        for i in 1..16 {
            assert!((data[32 - i] - data[i].conj()).norm() < 1e-3);
        }
    }

    #[test]
    fn test_length_one_is_identity() {
        let mut data = vec![Complex32::new(3.0, -1.0)];
        fft_in_place(&mut data, Direction::Inverse);
        assert_eq!(data[0], Complex32::new(3.0, -1.0));
    }
}
