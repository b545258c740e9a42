//! Fixed-length bit vector
//!
//! Encoders produce a [`BitVector`] per record and hardeners replace it with
//! a new one. Once built, a vector is never mutated, which lets it act as a
//! frequency-table key.

use bitvec::prelude::*;
use std::fmt;

/// Backing storage for bit vectors
pub type Bits = BitVec<u64, Lsb0>;

/// Immutable fixed-length sequence of bits
///
/// # Examples
///
/// ```
/// use bfattack::domain::BitVector;
///
/// let bv = BitVector::from_positions(8, [1, 3, 3, 7]);
/// assert_eq!(bv.len(), 8);
/// assert_eq!(bv.count_ones(), 3);
/// assert_eq!(bv.to_01(), "01010001");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitVector(Bits);

impl BitVector {
    /// All-zero vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self(bitvec![u64, Lsb0; 0; len])
    }

    /// Vector of the given length with the listed positions set
    ///
    /// Positions outside `[0, len)` are ignored.
    pub fn from_positions(len: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut bits = bitvec![u64, Lsb0; 0; len];
        for pos in positions {
            if pos < len {
                bits.set(pos, true);
            }
        }
        Self(bits)
    }

    /// Builds a vector from a slice of booleans
    pub fn from_bools(values: &[bool]) -> Self {
        Self(values.iter().copied().collect())
    }

    /// Parses a string of `0` and `1` characters
    pub fn from_01(s: &str) -> Result<Self, String> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(format!("Invalid bit character '{other}'")),
            })
            .collect::<Result<Bits, _>>()
            .map(Self)
    }

    /// Wraps already-built storage
    pub fn from_bits(bits: Bits) -> Self {
        Self(bits)
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the vector has length zero
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of bit `index`; out-of-range indices read as zero
    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).map(|b| *b).unwrap_or(false)
    }

    /// Number of bits set to one
    pub fn count_ones(&self) -> usize {
        self.0.count_ones()
    }

    /// Indices of all one bits in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter_ones()
    }

    /// Iterator over all bits
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().by_vals()
    }

    /// Borrow the underlying bit slice
    pub fn as_bitslice(&self) -> &BitSlice<u64, Lsb0> {
        self.0.as_bitslice()
    }

    /// Serialised `0`/`1` form used in frequency tables and result files
    pub fn to_01(&self) -> String {
        self.0.iter().map(|b| if *b { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_01())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({})", self.to_01())
    }
}
