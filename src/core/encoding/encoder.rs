//! Record to bit vector encoders

use super::resolved::ResolvedEncoding;
use crate::config::EncodingMethod;
use crate::core::hashing::HashScheme;
use crate::domain::record::{qgrams, Record, TokenSet};
use crate::domain::BitVector;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One encoded attribute column and the scheme hashing its tokens
#[derive(Debug, Clone)]
pub struct AttributeHashing {
    pub column: usize,
    pub scheme: HashScheme,
}

/// One attribute of a record-level filter
#[derive(Debug, Clone)]
pub struct SampledAttribute {
    pub column: usize,

    /// Scheme sized to this attribute's own filter
    pub scheme: HashScheme,

    /// Positions of the attribute filter copied into the record filter
    pub sample: Vec<usize>,
}

/// Encoding strategy
#[derive(Debug, Clone)]
pub enum EncoderKind {
    /// One attribute hashed into the whole vector
    Attribute(AttributeHashing),

    /// All attributes ORed into one vector with a shared scheme
    LongTermKey(Vec<AttributeHashing>),

    /// Bits sampled from per-attribute filters, concatenated and permuted
    Record {
        attributes: Vec<SampledAttribute>,
        permutation: Vec<usize>,
    },

    /// All attributes ORed into one vector, each with its own scheme
    KeyedLongTermKey(Vec<AttributeHashing>),
}

/// Turns records into fixed-length bit vectors
///
/// Encoding goes through two steps so that token-level hardening can sit in
/// between: [`Encoder::tokens`] extracts one q-gram set per attribute and
/// [`Encoder::encode_tokens`] hashes them into a vector.
#[derive(Debug, Clone)]
pub struct Encoder {
    q: usize,
    padded: bool,
    bf_len: usize,
    kind: EncoderKind,
}

impl Encoder {
    /// Builds the encoder for resolved parameters
    ///
    /// `seed` drives the bit sampling and permutation of record-level
    /// encoding; it is drawn from once, here, and never per record.
    pub fn new(resolved: &ResolvedEncoding, seed: u64) -> Self {
        let shared = |len: usize, k: usize| {
            HashScheme::new(resolved.hash_type, len, k, &resolved.secret_key)
        };

        let kind = match resolved.method {
            EncodingMethod::Abf => EncoderKind::Attribute(AttributeHashing {
                column: resolved.columns.first().copied().unwrap_or_default(),
                scheme: shared(resolved.bf_len, resolved.num_hash),
            }),
            EncodingMethod::Clk => EncoderKind::LongTermKey(
                resolved
                    .columns
                    .iter()
                    .map(|&column| AttributeHashing {
                        column,
                        scheme: shared(resolved.bf_len, resolved.num_hash),
                    })
                    .collect(),
            ),
            EncodingMethod::ClkRbf => EncoderKind::KeyedLongTermKey(
                resolved
                    .columns
                    .iter()
                    .zip(&resolved.attr_num_hash)
                    .map(|(&column, &k)| AttributeHashing {
                        column,
                        scheme: shared(resolved.bf_len, k),
                    })
                    .collect(),
            ),
            EncodingMethod::Rbf => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let attributes: Vec<SampledAttribute> = resolved
                    .columns
                    .iter()
                    .zip(resolved.abf_lens.iter().zip(&resolved.attr_bits))
                    .map(|(&column, (&abf_len, &bits))| SampledAttribute {
                        column,
                        scheme: shared(abf_len, resolved.num_hash),
                        sample: (0..bits).map(|_| rng.gen_range(0..abf_len.max(1))).collect(),
                    })
                    .collect();
                let total: usize = attributes.iter().map(|a| a.sample.len()).sum();
                let mut permutation: Vec<usize> = (0..total).collect();
                permutation.shuffle(&mut rng);
                EncoderKind::Record {
                    attributes,
                    permutation,
                }
            }
        };

        Self {
            q: resolved.q,
            padded: resolved.padded,
            bf_len: resolved.bf_len,
            kind,
        }
    }

    /// Length of every produced vector
    pub fn bf_len(&self) -> usize {
        self.bf_len
    }

    pub fn kind(&self) -> &EncoderKind {
        &self.kind
    }

    /// Encoded columns, in encoding order
    pub fn columns(&self) -> Vec<usize> {
        match &self.kind {
            EncoderKind::Attribute(attr) => vec![attr.column],
            EncoderKind::LongTermKey(attrs) | EncoderKind::KeyedLongTermKey(attrs) => {
                attrs.iter().map(|a| a.column).collect()
            }
            EncoderKind::Record { attributes, .. } => {
                attributes.iter().map(|a| a.column).collect()
            }
        }
    }

    /// One q-gram set per encoded attribute
    pub fn tokens(&self, record: &Record) -> Vec<TokenSet> {
        self.columns()
            .into_iter()
            .map(|col| qgrams(record.field(col), self.q, self.padded))
            .collect()
    }

    /// Hashes per-attribute token sets into a bit vector
    ///
    /// `token_sets` is indexed like [`Encoder::columns`]; missing entries
    /// encode as empty.
    pub fn encode_tokens(&self, token_sets: &[TokenSet]) -> BitVector {
        let tokens_of = |i: usize| token_sets.get(i).into_iter().flatten();

        match &self.kind {
            EncoderKind::Attribute(attr) => BitVector::from_positions(
                self.bf_len,
                tokens_of(0).flat_map(|t| attr.scheme.generate(t)),
            ),
            EncoderKind::LongTermKey(attrs) | EncoderKind::KeyedLongTermKey(attrs) => {
                BitVector::from_positions(
                    self.bf_len,
                    attrs
                        .iter()
                        .enumerate()
                        .flat_map(|(i, a)| tokens_of(i).flat_map(move |t| a.scheme.generate(t))),
                )
            }
            EncoderKind::Record {
                attributes,
                permutation,
            } => {
                let mut concatenated = Vec::with_capacity(permutation.len());
                for (i, attr) in attributes.iter().enumerate() {
                    let abf = BitVector::from_positions(
                        attr.scheme.bf_len(),
                        tokens_of(i).flat_map(|t| attr.scheme.generate(t)),
                    );
                    concatenated.extend(attr.sample.iter().map(|&p| abf.get(p)));
                }
                let permuted: Vec<bool> = permutation.iter().map(|&p| concatenated[p]).collect();
                BitVector::from_bools(&permuted)
            }
        }
    }

    /// Encodes a record without token-level hardening
    pub fn encode(&self, record: &Record) -> BitVector {
        self.encode_tokens(&self.tokens(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AbfLenType, EncodingConfig, HashFunctionCount, HashType, RbfConfig};
    use crate::domain::RecordId;

    fn record(id: &str, fields: &[&str]) -> Record {
        Record::new(RecordId::new(id).unwrap(), fields.iter().copied())
    }

    fn resolved(method: EncodingMethod, columns: &[usize], build: &[Record]) -> ResolvedEncoding {
        let config = EncodingConfig {
            method,
            hash_type: HashType::Double,
            num_hash_functions: HashFunctionCount::Fixed(4),
            bf_len: 64,
            rbf: RbfConfig {
                abf_len_type: AbfLenType::Static,
                bit_percentages: vec![0.5; columns.len()],
            },
            clkrbf: crate::config::ClkRbfConfig {
                num_hash_functions: vec![2; columns.len()],
            },
            ..Default::default()
        };
        ResolvedEncoding::resolve(&config, columns, build).unwrap()
    }

    #[test]
    fn test_attribute_encoding_ors_token_positions() {
        let rec = record("1", &["1", "smith"]);
        let res = resolved(EncodingMethod::Abf, &[1], std::slice::from_ref(&rec));
        let encoder = Encoder::new(&res, 0);
        let bv = encoder.encode(&rec);
        assert_eq!(bv.len(), 64);

        let scheme = HashScheme::new(HashType::Double, 64, 4, "");
        let expected: std::collections::BTreeSet<usize> =
            ["sm", "mi", "it", "th"].iter().flat_map(|t| scheme.generate(t)).collect();
        assert_eq!(bv.iter_ones().collect::<std::collections::BTreeSet<_>>(), expected);
    }

    #[test]
    fn test_short_value_encodes_empty_without_padding() {
        let rec = record("1", &["1", "a"]);
        let res = resolved(EncodingMethod::Abf, &[1], std::slice::from_ref(&rec));
        assert_eq!(Encoder::new(&res, 0).encode(&rec).count_ones(), 0);
    }

    #[test]
    fn test_long_term_key_is_union_of_attributes() {
        let rec = record("1", &["1", "smith", "anna"]);
        let build = std::slice::from_ref(&rec);
        let clk = Encoder::new(&resolved(EncodingMethod::Clk, &[1, 2], build), 0).encode(&rec);
        let first = Encoder::new(&resolved(EncodingMethod::Abf, &[1], build), 0).encode(&rec);
        let second = Encoder::new(&resolved(EncodingMethod::Abf, &[2], build), 0).encode(&rec);
        for pos in 0..64 {
            assert_eq!(clk.get(pos), first.get(pos) || second.get(pos));
        }
    }

    #[test]
    fn test_keyed_long_term_key_uses_attribute_counts() {
        let rec = record("1", &["1", "smith", "anna"]);
        let res = resolved(EncodingMethod::ClkRbf, &[1, 2], std::slice::from_ref(&rec));
        let encoder = Encoder::new(&res, 0);
        match encoder.kind() {
            EncoderKind::KeyedLongTermKey(attrs) => {
                assert!(attrs.iter().all(|a| a.scheme.num_hash() == 2));
            }
            other => panic!("unexpected encoder {other:?}"),
        }
        assert!(encoder.encode(&rec).count_ones() > 0);
    }

    #[test]
    fn test_record_encoding_is_seeded() {
        let recs = vec![
            record("1", &["1", "smith", "anna"]),
            record("2", &["2", "jones", "peter"]),
        ];
        let res = resolved(EncodingMethod::Rbf, &[1, 2], &recs);
        let a = Encoder::new(&res, 7);
        let b = Encoder::new(&res, 7);
        for rec in &recs {
            let bv = a.encode(rec);
            assert_eq!(bv.len(), 64);
            assert_eq!(bv, b.encode(rec));
        }
    }

    #[test]
    fn test_empty_token_sets_encode_zero() {
        let rec = record("1", &["1", "smith"]);
        let res = resolved(EncodingMethod::Abf, &[1], std::slice::from_ref(&rec));
        let bv = Encoder::new(&res, 0).encode_tokens(&[]);
        assert_eq!(bv, BitVector::zeros(64));
    }
}
