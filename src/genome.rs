//! The chromosome table: a single linear coordinate system covering the whole
//! genome, with chromosomes concatenated in karyotype order.

use std::path::Path;

use boomphf::Mphf;
use itertools::Itertools;
use log::info;

use crate::error::{PairGenomeError, Result};
use crate::io::for_each_line_in_file;

/// Chromosome sizes of the mm9 mouse assembly, in karyotype order.
pub const MM9_CHROM_SIZES: [(&str, u64); 22] = [
    ("1", 197_195_432),
    ("2", 181_748_087),
    ("3", 159_599_783),
    ("4", 155_630_120),
    ("5", 152_537_259),
    ("6", 149_517_037),
    ("7", 152_524_553),
    ("8", 131_738_871),
    ("9", 124_076_172),
    ("10", 129_993_255),
    ("11", 121_843_856),
    ("12", 121_257_530),
    ("13", 120_284_312),
    ("14", 125_194_864),
    ("15", 103_494_974),
    ("16", 98_319_150),
    ("17", 95_272_651),
    ("18", 90_772_031),
    ("19", 61_342_430),
    ("X", 166_650_296),
    ("Y", 91_744_698),
    ("MT", 16_299),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    // name of the chromosome
    pub name: String,
    // its length
    pub length: u64,
    // its rank in karyotype order
    pub rank: usize,
    // its start offset in the global genome coordinate system
    pub offset: u64,
}

impl Chromosome {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// True when the half-open range `[start, end)` lies inside this chromosome.
    pub fn contains(&self, start: u64, end: u64) -> bool {
        self.offset <= start && end <= self.end()
    }
}

pub struct Genome {
    chroms: Vec<Chromosome>,
    // cumulative offsets, one longer than `chroms`
    offsets: Vec<u64>,
    // maps from chromosome name to a slot in `rank_by_slot`
    name_mphf: Mphf<String>,
    rank_by_slot: Vec<usize>,
}

impl Genome {
    pub fn new<S: Into<String>>(sizes: impl IntoIterator<Item = (S, u64)>) -> Result<Self> {
        let mut chroms: Vec<Chromosome> = Vec::new();
        let mut offset = 0;
        for (rank, (name, length)) in sizes.into_iter().enumerate() {
            chroms.push(Chromosome {
                name: name.into(),
                length,
                rank,
                offset,
            });
            offset += length;
        }
        if chroms.is_empty() {
            return Err(PairGenomeError::EmptyChromosomeTable);
        }
        if let Some((dup, _)) = chroms
            .iter()
            .map(|c| &c.name)
            .sorted()
            .tuple_windows()
            .find(|(a, b)| a == b)
        {
            return Err(PairGenomeError::DuplicateChromosome(dup.clone()));
        }
        Ok(Self::index(chroms, offset))
    }

    /// The mm9 mouse karyotype.
    pub fn mm9() -> Self {
        let mut chroms = Vec::with_capacity(MM9_CHROM_SIZES.len());
        let mut offset = 0;
        for (rank, &(name, length)) in MM9_CHROM_SIZES.iter().enumerate() {
            chroms.push(Chromosome {
                name: name.to_string(),
                length,
                rank,
                offset,
            });
            offset += length;
        }
        Self::index(chroms, offset)
    }

    // `chroms` must be non-empty with unique names
    fn index(chroms: Vec<Chromosome>, genome_length: u64) -> Self {
        let names: Vec<String> = chroms.iter().map(|c| c.name.clone()).collect();
        let name_mphf = Mphf::new(1.7, &names);
        let mut rank_by_slot = vec![0; names.len()];
        for chrom in &chroms {
            rank_by_slot[name_mphf.hash(&chrom.name) as usize] = chrom.rank;
        }
        let offsets = chroms
            .iter()
            .map(|c| c.offset)
            .chain(std::iter::once(genome_length))
            .collect();
        Genome {
            chroms,
            offsets,
            name_mphf,
            rank_by_slot,
        }
    }

    /// Loads a `NAME SIZE` table such as a UCSC `.chrom.sizes` file.
    pub fn from_sizes_file(path: &Path) -> Result<Self> {
        let mut sizes: Vec<(String, u64)> = Vec::new();
        for_each_line_in_file(path, |line_no, l| {
            let mut fields = l.split_whitespace();
            let parse_err = |reason: &str| PairGenomeError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                reason: reason.to_string(),
            };
            let name = fields.next().ok_or_else(|| parse_err("missing name"))?;
            let size = fields
                .next()
                .ok_or_else(|| parse_err("missing size"))?
                .parse::<u64>()
                .map_err(|_| parse_err("size is not an integer"))?;
            sizes.push((name.to_string(), size));
            Ok(())
        })?;
        let genome = Self::new(sizes)?;
        info!(
            "Loaded {} chromosomes ({} bp) from {}",
            genome.len(),
            genome.genome_length(),
            path.display()
        );
        Ok(genome)
    }

    pub fn len(&self) -> usize {
        self.chroms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chroms
    }

    pub fn chrom(&self, idx: usize) -> Option<&Chromosome> {
        self.chroms.get(idx)
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn genome_length(&self) -> u64 {
        self.offsets[self.offsets.len() - 1]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        let slot = self.name_mphf.try_hash(&name.to_string())? as usize;
        let rank = *self.rank_by_slot.get(slot)?;
        if self.chroms[rank].name == name {
            Some(rank)
        } else {
            None
        }
    }

    /// Index of the chromosome holding global position `pos`.
    pub fn chrom_of(&self, pos: u64) -> Option<usize> {
        if pos >= self.genome_length() {
            return None;
        }
        // the last offset <= pos marks the chromosome, which also skips
        // zero-length chromosomes sharing that offset
        Some(self.offsets.partition_point(|&o| o <= pos) - 1)
    }

    /// Converts a chromosome-local position to a global genome position.
    pub fn genome_index(&self, chrom: usize, pos: u64) -> Option<u64> {
        self.chroms.get(chrom).map(|c| c.offset + pos)
    }

    /// Area of the chromosome pair cell, in bp².
    pub fn pair_area(&self, i: usize, j: usize) -> f64 {
        match (self.chroms.get(i), self.chroms.get(j)) {
            (Some(a), Some(b)) => a.length as f64 * b.length as f64,
            _ => 0.0,
        }
    }

    /// Resolves a chromosome given either by name or by 0-based index.
    pub fn resolve(&self, key: &str) -> Result<usize> {
        let key = key.trim();
        if let Some(idx) = self.index_of(key) {
            return Ok(idx);
        }
        match key.parse::<usize>() {
            Ok(idx) if idx < self.len() => Ok(idx),
            _ => Err(PairGenomeError::UnknownChromosome(key.to_string())),
        }
    }

    /// Parses an `I,J` chromosome pair.
    pub fn resolve_pair(&self, pair: &str) -> Result<(usize, usize)> {
        let (a, b) = pair
            .split_once(',')
            .ok_or_else(|| PairGenomeError::UnknownChromosome(pair.to_string()))?;
        Ok((self.resolve(a)?, self.resolve(b)?))
    }
}
