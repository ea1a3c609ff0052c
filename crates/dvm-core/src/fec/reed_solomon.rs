// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reed-Solomon over GF(2^6) (spec §4.1 "Reed-Solomon"), parameterized for
//! the seven `(n,k)` shapes used across the P25/DMR/NXDN trunking and data
//! headers.
//!
//! Symbols are 6-bit values in `0..64`; the field is built from the
//! primitive polynomial `x^6 + x + 1` (0x43). Decoding is the standard
//! syndrome / Berlekamp-Massey / Chien-search / Forney pipeline, corrects
//! up to `(n-k)/2` symbol errors, and reports whether it found a
//! consistent error locator (i.e. decoding succeeded).

const FIELD_SIZE: usize = 64;
const FIELD_ORDER: usize = 63; // 2^6 - 1
const PRIMITIVE_POLY: u16 = 0x43;

struct GfTables {
    exp: [u8; 2 * FIELD_ORDER],
    log: [u8; FIELD_SIZE],
}

impl GfTables {
    fn build() -> Self {
        let mut exp = [0u8; 2 * FIELD_ORDER];
        let mut log = [0u8; FIELD_SIZE];
        let mut x: u16 = 1;
        for i in 0..FIELD_ORDER {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & FIELD_SIZE as u16 != 0 {
                x ^= PRIMITIVE_POLY;
            }
        }
        for i in FIELD_ORDER..2 * FIELD_ORDER {
            exp[i] = exp[i - FIELD_ORDER];
        }
        Self { exp, log }
    }

    fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let la = self.log[a as usize] as usize;
        let lb = self.log[b as usize] as usize;
        self.exp[la + lb]
    }

    fn div(&self, a: u8, b: u8) -> u8 {
        if a == 0 {
            return 0;
        }
        assert!(b != 0, "division by zero in GF(64)");
        let la = self.log[a as usize] as usize;
        let lb = self.log[b as usize] as usize;
        self.exp[(la + FIELD_ORDER - lb) % FIELD_ORDER]
    }

    fn pow(&self, base: u8, exp_val: usize) -> u8 {
        if base == 0 {
            return 0;
        }
        let l = self.log[base as usize] as usize;
        self.exp[(l * exp_val) % FIELD_ORDER]
    }

    fn inv(&self, a: u8) -> u8 {
        assert!(a != 0, "inverse of zero in GF(64)");
        let l = self.log[a as usize] as usize;
        self.exp[(FIELD_ORDER - l) % FIELD_ORDER]
    }
}

/// A Reed-Solomon code instance over GF(64) with `n` total symbols and `k`
/// data symbols (`n - k` parity symbols, correcting up to `(n-k)/2`
/// errors).
pub struct Rs64Code {
    n: usize,
    k: usize,
    tables: GfTables,
    generator: Vec<u8>,
}

impl Rs64Code {
    fn new(n: usize, k: usize) -> Self {
        assert!(n <= FIELD_ORDER && k < n, "invalid RS(n,k) shape");
        let tables = GfTables::build();
        let parity_len = n - k;

        // Generator polynomial with roots alpha^1 .. alpha^(n-k).
        let mut generator = vec![1u8];
        for i in 1..=parity_len {
            let root = tables.pow(2, i);
            let mut next = vec![0u8; generator.len() + 1];
            for (j, &coeff) in generator.iter().enumerate() {
                next[j] ^= tables.mul(coeff, root);
                next[j + 1] ^= coeff;
            }
            generator = next;
        }

        Self { n, k, tables, generator }
    }

    /// Total codeword length in symbols.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Data length in symbols.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Systematic encode: `data` (length `k`) is placed unchanged as the
    /// leading symbols of the returned codeword, followed by `n - k`
    /// parity symbols.
    #[must_use]
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        assert_eq!(data.len(), self.k);
        let parity_len = self.n - self.k;
        let mut remainder = vec![0u8; parity_len];

        for &symbol in data {
            let feedback = symbol ^ remainder[0];
            remainder.rotate_left(1);
            *remainder.last_mut().unwrap() = 0;
            if feedback != 0 {
                for (r, &g) in remainder.iter_mut().zip(self.generator.iter().skip(1)) {
                    *r ^= self.tables.mul(feedback, g);
                }
            }
        }

        let mut codeword = Vec::with_capacity(self.n);
        codeword.extend_from_slice(data);
        codeword.extend_from_slice(&remainder);
        codeword
    }

    fn syndromes(&self, received: &[u8]) -> Vec<u8> {
        let parity_len = self.n - self.k;
        (1..=parity_len)
            .map(|i| {
                let root = self.tables.pow(2, i);
                let mut acc = 0u8;
                for &symbol in received {
                    acc = self.tables.mul(acc, root) ^ symbol;
                }
                acc
            })
            .collect()
    }

    /// Berlekamp-Massey: find the error locator polynomial from the
    /// syndrome sequence.
    fn error_locator(&self, syndromes: &[u8]) -> Vec<u8> {
        let mut c = vec![1u8];
        let mut b = vec![1u8];
        let mut l = 0usize;
        let mut m = 1usize;
        let mut bb = 1u8;

        for n in 0..syndromes.len() {
            let mut delta = syndromes[n];
            for i in 1..=l {
                delta ^= self.tables.mul(c[i], syndromes[n - i]);
            }

            if delta == 0 {
                m += 1;
            } else if 2 * l <= n {
                let t = c.clone();
                let coeff = self.tables.div(delta, bb);
                let shifted_len = b.len() + m;
                if c.len() < shifted_len {
                    c.resize(shifted_len, 0);
                }
                for (i, &bi) in b.iter().enumerate() {
                    c[i + m] ^= self.tables.mul(coeff, bi);
                }
                l = n + 1 - l;
                b = t;
                bb = delta;
                m = 1;
            } else {
                let coeff = self.tables.div(delta, bb);
                let shifted_len = b.len() + m;
                if c.len() < shifted_len {
                    c.resize(shifted_len, 0);
                }
                for (i, &bi) in b.iter().enumerate() {
                    c[i + m] ^= self.tables.mul(coeff, bi);
                }
                m += 1;
            }
        }
        c
    }

    fn evaluate(&self, poly: &[u8], x: u8) -> u8 {
        let mut acc = 0u8;
        for &coeff in poly.iter().rev() {
            acc = self.tables.mul(acc, x) ^ coeff;
        }
        acc
    }

    /// Decode a received codeword, correcting up to `(n-k)/2` symbol
    /// errors. Returns `(data, correctable)`.
    #[must_use]
    pub fn decode(&self, received: &[u8]) -> (Vec<u8>, bool) {
        assert_eq!(received.len(), self.n);
        let syndromes = self.syndromes(received);
        if syndromes.iter().all(|&s| s == 0) {
            return (received[..self.k].to_vec(), true);
        }

        let locator = self.error_locator(&syndromes);
        let degree = locator.iter().rposition(|&c| c != 0).unwrap_or(0);
        if degree == 0 || degree > (self.n - self.k) / 2 {
            return (received[..self.k].to_vec(), false);
        }

        // Chien search: error positions are i where locator(alpha^-i) = 0.
        let mut error_positions = Vec::new();
        for i in 0..self.n {
            let x_inv = self.tables.pow(2, (FIELD_ORDER - i) % FIELD_ORDER);
            if self.evaluate(&locator[..=degree], x_inv) == 0 {
                error_positions.push(i);
            }
        }
        if error_positions.len() != degree {
            return (received[..self.k].to_vec(), false);
        }

        // Error evaluator: Omega(x) = [S(x) * Lambda(x)] mod x^(n-k+1).
        let parity_len = self.n - self.k;
        let mut syndrome_poly = vec![0u8; parity_len + 1];
        syndrome_poly[1..=parity_len].copy_from_slice(&syndromes);
        let mut omega = vec![0u8; parity_len + 1];
        for (i, &li) in locator[..=degree].iter().enumerate() {
            if li == 0 {
                continue;
            }
            for (j, &sj) in syndrome_poly.iter().enumerate() {
                if i + j <= parity_len {
                    omega[i + j] ^= self.tables.mul(li, sj);
                }
            }
        }

        let mut locator_deriv = vec![0u8; degree];
        for i in (1..=degree).step_by(2) {
            locator_deriv[i - 1] = locator[i];
        }

        let mut corrected = received.to_vec();
        for &pos in &error_positions {
            let x_inv = self.tables.pow(2, (FIELD_ORDER - pos) % FIELD_ORDER);
            let num = self.evaluate(&omega, x_inv);
            let den = self.evaluate(&locator_deriv, x_inv);
            if den == 0 {
                return (received[..self.k].to_vec(), false);
            }
            let magnitude = self.tables.div(num, den);
            corrected[pos] ^= magnitude;
        }

        (corrected[..self.k].to_vec(), true)
    }
}

/// `(24,12)`: P25 header RS code, 12 parity symbols.
#[must_use]
pub fn rs_24_12() -> Rs64Code {
    Rs64Code::new(24, 12)
}

/// `(24,16)`: P25 MBT header RS code, 8 parity symbols.
#[must_use]
pub fn rs_24_16() -> Rs64Code {
    Rs64Code::new(24, 16)
}

/// `(36,20)`: P25 extended link-control RS code, 16 parity symbols.
#[must_use]
pub fn rs_36_20() -> Rs64Code {
    Rs64Code::new(36, 20)
}

/// `(18,6)`: shortened low-speed data RS code, 12 parity symbols.
#[must_use]
pub fn rs_18_6() -> Rs64Code {
    Rs64Code::new(18, 6)
}

/// `(20,8)`: DMR-style short header RS code, 12 parity symbols.
#[must_use]
pub fn rs_20_8() -> Rs64Code {
    Rs64Code::new(20, 8)
}

/// `(12,8)`: short trunking RS code, 4 parity symbols.
#[must_use]
pub fn rs_12_8() -> Rs64Code {
    Rs64Code::new(12, 8)
}

/// `(16,8)`: NXDN content-indicator RS code, 8 parity symbols.
#[must_use]
pub fn rs_16_8() -> Rs64Code {
    Rs64Code::new(16, 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_clean(code: &Rs64Code) {
        let data: Vec<u8> = (0..code.k() as u8).map(|i| i.wrapping_mul(7) & 0x3F).collect();
        let codeword = code.encode(&data);
        let (decoded, ok) = code.decode(&codeword);
        assert!(ok);
        assert_eq!(decoded, data);
    }

    fn corrects_t_errors(code: &Rs64Code) {
        let data: Vec<u8> = (0..code.k() as u8).map(|i| (i * 3 + 1) & 0x3F).collect();
        let mut codeword = code.encode(&data);
        let t = (code.n() - code.k()) / 2;
        for i in 0..t {
            let pos = i * (code.n() / t.max(1));
            codeword[pos.min(code.n() - 1)] ^= 0x15;
        }
        let (decoded, ok) = code.decode(&codeword);
        assert!(ok, "should correct {t} errors");
        assert_eq!(decoded, data);
    }

    #[test]
    fn rs_24_12_round_trip_and_correction() {
        let code = rs_24_12();
        round_trip_clean(&code);
        corrects_t_errors(&code);
    }

    #[test]
    fn rs_12_8_round_trip_and_correction() {
        let code = rs_12_8();
        round_trip_clean(&code);
        corrects_t_errors(&code);
    }

    #[test]
    fn rs_16_8_round_trip_and_correction() {
        let code = rs_16_8();
        round_trip_clean(&code);
        corrects_t_errors(&code);
    }

    #[test]
    fn all_seven_parameter_sets_construct_and_round_trip() {
        for code in [
            rs_24_12(),
            rs_24_16(),
            rs_36_20(),
            rs_18_6(),
            rs_20_8(),
            rs_12_8(),
            rs_16_8(),
        ] {
            round_trip_clean(&code);
        }
    }
}
