//! Buckets interval records by chromosome pair and aggregates their area per
//! category.

use std::fmt;
use std::str::FromStr;

use fnv::FnvHashMap;
use log::{debug, warn};
use serde::Deserialize;

use crate::genome::Genome;
use crate::record::IntervalRecord;

/// How records are assigned to chromosome pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One forward pass with a pointer per axis. Expects records grouped by
    /// proximal chromosome, then distal chromosome, sorted by start within
    /// each group; records that would move a pointer backwards are dropped.
    Sweep,
    /// Filters the full record set once per pair. Accepts any order.
    FullScan,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Sweep
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sweep" => Ok(Strategy::Sweep),
            "full-scan" | "fullscan" => Ok(Strategy::FullScan),
            _ => Err(format!("unknown partition strategy: {}", s)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sweep => write!(f, "sweep"),
            Strategy::FullScan => write!(f, "full-scan"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairBucket {
    pub records: Vec<IntervalRecord>,
    // summed record area per category
    pub areas: FnvHashMap<u32, u128>,
}

impl PairBucket {
    fn push(&mut self, record: IntervalRecord) {
        *self.areas.entry(record.category).or_insert(0) += record.area();
        self.records.push(record);
    }

    pub fn total_area(&self) -> u128 {
        self.areas.values().sum()
    }

    /// The category covering the largest area; ties go to the larger code.
    pub fn dominant_category(&self) -> Option<u32> {
        self.areas
            .iter()
            .max_by_key(|&(&category, &area)| (area, category))
            .map(|(&category, _)| category)
    }
}

/// Records and category areas for every chromosome pair, stored row-major
/// with the proximal chromosome as the row.
#[derive(Debug, Clone)]
pub struct Partition {
    num_chroms: usize,
    buckets: Vec<PairBucket>,
    rejected: usize,
}

impl Partition {
    pub fn build(records: &[IntervalRecord], genome: &Genome, strategy: Strategy) -> Self {
        let partition = match strategy {
            Strategy::Sweep => Self::sweep(records, genome),
            Strategy::FullScan => Self::full_scan(records, genome),
        };
        if partition.rejected > 0 {
            warn!(
                "{} of {} records were not assigned to a chromosome pair ({} strategy)",
                partition.rejected,
                records.len(),
                strategy
            );
        }
        debug!(
            "Partitioned {} records into {} chromosome pairs",
            records.len() - partition.rejected,
            partition.buckets.iter().filter(|b| !b.records.is_empty()).count()
        );
        partition
    }

    fn empty(num_chroms: usize) -> Self {
        Partition {
            num_chroms,
            buckets: vec![PairBucket::default(); num_chroms * num_chroms],
            rejected: 0,
        }
    }

    fn sweep(records: &[IntervalRecord], genome: &Genome) -> Self {
        let n = genome.len();
        let offsets = genome.offsets();
        let mut partition = Self::empty(n);
        let mut prox_chrom = 0;
        let mut dist_chrom = 0;
        for record in records {
            while prox_chrom + 1 < n && record.prox_start >= offsets[prox_chrom + 1] {
                prox_chrom += 1;
                dist_chrom = 0;
            }
            while dist_chrom + 1 < n && record.dist_start >= offsets[dist_chrom + 1] {
                dist_chrom += 1;
            }
            if !in_pair(record, genome, prox_chrom, dist_chrom) {
                // out of order, or not contained in a single chromosome
                partition.rejected += 1;
                continue;
            }
            let k = partition.flatten_index(prox_chrom, dist_chrom);
            partition.buckets[k].push(*record);
        }
        partition
    }

    fn full_scan(records: &[IntervalRecord], genome: &Genome) -> Self {
        let n = genome.len();
        let mut partition = Self::empty(n);
        let mut assigned = 0;
        for i in 0..n {
            for j in 0..n {
                let k = partition.flatten_index(i, j);
                for record in data_for_chrom_pair(records, genome, i, j) {
                    partition.buckets[k].push(record);
                    assigned += 1;
                }
            }
        }
        partition.rejected = records.len().saturating_sub(assigned);
        partition
    }

    pub fn num_chroms(&self) -> usize {
        self.num_chroms
    }

    /// Number of input records that landed in no bucket.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn flatten_index(&self, i: usize, j: usize) -> usize {
        i * self.num_chroms + j
    }

    pub fn unflatten_index(&self, k: usize) -> (usize, usize) {
        (k / self.num_chroms, k % self.num_chroms)
    }

    pub fn bucket(&self, i: usize, j: usize) -> Option<&PairBucket> {
        if i >= self.num_chroms || j >= self.num_chroms {
            return None;
        }
        self.buckets.get(self.flatten_index(i, j))
    }

    pub fn data_for_chrom_pair(&self, i: usize, j: usize) -> &[IntervalRecord] {
        self.bucket(i, j).map(|b| b.records.as_slice()).unwrap_or(&[])
    }

    /// Iterates `((i, j), bucket)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &PairBucket)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .map(move |(k, b)| (self.unflatten_index(k), b))
    }
}

// A range belongs to the chromosome holding its start, so an empty range on
// a boundary matches the next chromosome only, as in the sweep.
fn in_pair(record: &IntervalRecord, genome: &Genome, i: usize, j: usize) -> bool {
    if genome.chrom_of(record.prox_start) != Some(i) || genome.chrom_of(record.dist_start) != Some(j) {
        return false;
    }
    match (genome.chrom(i), genome.chrom(j)) {
        (Some(prox), Some(dist)) => {
            prox.contains(record.prox_start, record.prox_end)
                && dist.contains(record.dist_start, record.dist_end)
        }
        _ => false,
    }
}

/// Records whose proximal range lies in chromosome `i` and whose distal range
/// lies in chromosome `j`, in input order.
pub fn data_for_chrom_pair(
    records: &[IntervalRecord],
    genome: &Genome,
    i: usize,
    j: usize,
) -> Vec<IntervalRecord> {
    records
        .iter()
        .filter(|r| in_pair(r, genome, i, j))
        .copied()
        .collect()
}
