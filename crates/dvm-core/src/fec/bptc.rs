// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! BPTC(196,96) (spec §4.1 "BPTC"), the block product turbo code DMR uses
//! for its voice LC/CSBK payloads.
//!
//! 196 transmitted bits are one reserved leading bit plus a 13-row x
//! 15-column grid: each row is a `(15,11,3)` Hamming codeword, each column
//! a `(13,9,3)` Hamming codeword. The 9 rows and 11 columns that are
//! "data" in both their row code and column code (the non-power-of-two
//! positions in each) intersect in a 9x11 block of 99 cells; the 96-bit
//! payload fills the first 96 of those in row-major order, with the last
//! 3 zero-padded. Column parity is then derived from the filled data rows,
//! so every column's 4 parity rows are a function of the 9 data rows
//! above them — the standard product-code construction.
//!
//! Decoding corrects columns first (deinterleaving the product code),
//! then corrects the 9 data rows and reads the payload back out. Bit `b`
//! of a [`super::hamming::HammingCode`] codeword is always its position
//! `b+1`; every word built here for, or read back from, that API follows
//! the same position-indexed (not sequential-MSB) convention.

use super::hamming::{hamming_13_9, hamming_15_11_a};

const ROWS: usize = 13;
const COLS: usize = 15;
const PAYLOAD_BITS: usize = 96;

/// 1-indexed row positions (within a 13-bit column codeword) that carry
/// column data rather than column parity — the non-power-of-two positions.
const DATA_ROWS: [usize; 9] = [3, 5, 6, 7, 9, 10, 11, 12, 13];
/// 1-indexed column positions (within a 15-bit row codeword) that carry
/// row data rather than row parity.
const DATA_COLS: [usize; 11] = [3, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];

/// Encode a 96-bit payload into a 196-bit BPTC block (bit 0 is the
/// standard's reserved leading bit, always `false`).
#[must_use]
pub fn encode(payload: &[bool; PAYLOAD_BITS]) -> [bool; 196] {
    let mut grid = [[false; COLS]; ROWS];

    let row_code = hamming_15_11_a();
    let col_code = hamming_13_9();

    let mut payload_idx = 0;
    for &r in &DATA_ROWS {
        let mut data = 0u32;
        for _ in &DATA_COLS {
            let bit = if payload_idx < PAYLOAD_BITS {
                payload[payload_idx]
            } else {
                false
            };
            data = (data << 1) | u32::from(bit);
            payload_idx += 1;
        }
        let codeword = row_code.encode(data);
        for c in 1..=COLS {
            grid[r - 1][c - 1] = (codeword >> (c - 1)) & 1 != 0;
        }
    }

    for c in 0..COLS {
        let mut data = 0u32;
        for &r in &DATA_ROWS {
            data = (data << 1) | u32::from(grid[r - 1][c]);
        }
        let codeword = col_code.encode(data);
        for row in 1..=ROWS {
            if !DATA_ROWS.contains(&row) {
                grid[row - 1][c] = (codeword >> (row - 1)) & 1 != 0;
            }
        }
    }

    let mut block = [false; 196];
    let mut idx = 1;
    for row in &grid {
        for &cell in row {
            block[idx] = cell;
            idx += 1;
        }
    }
    block
}

/// Decode a 196-bit BPTC block, correcting single-bit errors per column
/// and per data row. Returns `(payload, all_corrections_ok)`.
#[must_use]
pub fn decode(block: &[bool; 196]) -> ([bool; PAYLOAD_BITS], bool) {
    let mut grid = [[false; COLS]; ROWS];
    let mut idx = 1;
    for row in grid.iter_mut() {
        for cell in row.iter_mut() {
            *cell = block[idx];
            idx += 1;
        }
    }

    let mut all_ok = true;
    let col_code = hamming_13_9();
    for c in 0..COLS {
        let mut word = 0u32;
        for row in 1..=ROWS {
            if grid[row - 1][c] {
                word |= 1 << (row - 1);
            }
        }
        let (corrected, ok) = col_code.decode(word);
        all_ok &= ok;
        for (i, &r) in DATA_ROWS.iter().enumerate() {
            let bit = (corrected >> (DATA_ROWS.len() - 1 - i)) & 1;
            grid[r - 1][c] = bit != 0;
        }
    }

    let row_code = hamming_15_11_a();
    let mut payload = [false; PAYLOAD_BITS];
    let mut payload_idx = 0;
    for &r in &DATA_ROWS {
        let mut word = 0u32;
        for c in 1..=COLS {
            if grid[r - 1][c - 1] {
                word |= 1 << (c - 1);
            }
        }
        let (corrected, ok) = row_code.decode(word);
        all_ok &= ok;
        for b in (0..DATA_COLS.len()).rev() {
            if payload_idx >= PAYLOAD_BITS {
                break;
            }
            payload[payload_idx] = (corrected >> b) & 1 != 0;
            payload_idx += 1;
        }
    }

    (payload, all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload(seed: u8) -> [bool; PAYLOAD_BITS] {
        let mut payload = [false; PAYLOAD_BITS];
        for (i, bit) in payload.iter_mut().enumerate() {
            *bit = (seed as usize + i) % 3 == 0;
        }
        payload
    }

    #[test]
    fn round_trip_clean() {
        let payload = sample_payload(7);
        let block = encode(&payload);
        let (decoded, ok) = decode(&block);
        assert!(ok);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn corrects_single_bit_error_in_a_column() {
        let payload = sample_payload(3);
        let mut block = encode(&payload);
        // Row 6 (a DATA_ROWS entry), column index 4: an error only the
        // column decode pass (which runs first) can fix.
        let row6_start = 1 + 5 * COLS;
        block[row6_start + 4] = !block[row6_start + 4];
        let (decoded, ok) = decode(&block);
        assert!(ok);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn corrects_single_bit_error_in_a_data_row() {
        let payload = sample_payload(11);
        let mut block = encode(&payload);
        // Row 3 (DATA_ROWS[0]) starts at block index 1 + (3-1)*COLS.
        let row3_start = 1 + 2 * COLS;
        block[row3_start + 4] = !block[row3_start + 4];
        let (decoded, ok) = decode(&block);
        assert!(ok);
        assert_eq!(decoded, payload);
    }
}
