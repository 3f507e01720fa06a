//! Interval records: pairs of genomic ranges tagged with a category colour.

use std::path::Path;

use fnv::FnvHashMap;
use log::info;

use crate::error::{PairGenomeError, Result};
use crate::genome::Genome;
use crate::io::{for_each_line_in_file, parse_code};

/// Largest category code; codes are packed 24-bit RGB colours.
pub const MAX_CATEGORY: u32 = 0x00ff_ffff;

/// Two genomic ranges in global genome coordinates plus a category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalRecord {
    pub category: u32,
    pub prox_start: u64,
    pub prox_end: u64,
    pub dist_start: u64,
    pub dist_end: u64,
    // index into the owning source's sample names
    pub sample: Option<u32>,
}

impl IntervalRecord {
    pub fn new(category: u32, prox_start: u64, prox_end: u64, dist_start: u64, dist_end: u64) -> Self {
        IntervalRecord {
            category,
            prox_start,
            prox_end,
            dist_start,
            dist_end,
            sample: None,
        }
    }

    pub fn with_sample(mut self, sample: u32) -> Self {
        self.sample = Some(sample);
        self
    }

    pub fn prox_len(&self) -> u64 {
        self.prox_end.saturating_sub(self.prox_start)
    }

    pub fn dist_len(&self) -> u64 {
        self.dist_end.saturating_sub(self.dist_start)
    }

    pub fn area(&self) -> u128 {
        self.prox_len() as u128 * self.dist_len() as u128
    }

    /// Key identifying the rendered rectangle of this record.
    pub fn key(&self) -> String {
        format!("{}:{}", self.prox_start, self.dist_start)
    }

    /// Both dimensions exceed `cutoff`, so the record is visible at overview zoom.
    pub fn is_coarse(&self, cutoff: u64) -> bool {
        self.prox_len() > cutoff && self.dist_len() > cutoff
    }

    /// Checks the record against the chromosome table, returning a reason on failure.
    pub fn validate(&self, genome: &Genome) -> std::result::Result<(), String> {
        if self.category > MAX_CATEGORY {
            return Err(format!("category {:#x} exceeds 24 bits", self.category));
        }
        for (label, start, end) in [
            ("proximal", self.prox_start, self.prox_end),
            ("distal", self.dist_start, self.dist_end),
        ]
        .iter()
        {
            if start > end {
                return Err(format!("{} range {}-{} is inverted", label, start, end));
            }
            let chrom = genome.chrom_of(*start).and_then(|c| genome.chrom(c));
            match chrom {
                None => {
                    return Err(format!(
                        "{} start {} is outside the genome ({} bp)",
                        label,
                        start,
                        genome.genome_length()
                    ))
                }
                Some(c) if !c.contains(*start, *end) => {
                    return Err(format!(
                        "{} range {}-{} crosses the end of chromosome {}",
                        label, start, end, c.name
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl From<[u64; 5]> for IntervalRecord {
    fn from(a: [u64; 5]) -> Self {
        IntervalRecord::new(a[0] as u32, a[1], a[2], a[3], a[4])
    }
}

/// One loadable data set, e.g. the unique combinations of one sample group.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub name: String,
    pub records: Vec<IntervalRecord>,
    /// Names referenced by `IntervalRecord::sample`.
    pub samples: Vec<String>,
}

impl DataSource {
    pub fn new(name: impl Into<String>, records: Vec<IntervalRecord>) -> Self {
        DataSource {
            name: name.into(),
            records,
            samples: Vec::new(),
        }
    }

    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }

    /// Name of the sample `record` was found in, if known.
    pub fn sample_name(&self, record: &IntervalRecord) -> Option<&str> {
        record
            .sample
            .and_then(|idx| self.samples.get(idx as usize))
            .map(String::as_str)
    }

    /// Loads `CODE PROX_START PROX_END DIST_START DIST_END [SAMPLE]` lines,
    /// validating every record against `genome`. The source is named after
    /// the file stem.
    pub fn from_file(path: &Path, genome: &Genome) -> Result<Self> {
        let mut records = Vec::new();
        let mut samples: Vec<String> = Vec::new();
        let mut sample_ids: FnvHashMap<String, u32> = FnvHashMap::default();
        for_each_line_in_file(path, |line_no, l| {
            let (mut record, sample) = parse_record_line(l).map_err(|reason| PairGenomeError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                reason,
            })?;
            if let Some(sample) = sample {
                let next_id = samples.len() as u32;
                let id = *sample_ids.entry(sample.to_string()).or_insert_with(|| {
                    samples.push(sample.to_string());
                    next_id
                });
                record = record.with_sample(id);
            }
            record
                .validate(genome)
                .map_err(|reason| PairGenomeError::InvalidRecord {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason,
                })?;
            records.push(record);
            Ok(())
        })?;
        let name = source_name(path);
        info!(
            "Loaded {} records from {} samples for source {}",
            records.len(),
            samples.len(),
            name
        );
        Ok(DataSource::new(name, records).with_samples(samples))
    }

    pub fn coarse(&self, cutoff: u64) -> Vec<IntervalRecord> {
        self.records
            .iter()
            .filter(|r| r.is_coarse(cutoff))
            .copied()
            .collect()
    }
}

/// Reads `SOURCE_NAME COLOR` lines into a name to colour-code map.
pub fn read_source_colors(path: &Path) -> Result<FnvHashMap<String, u32>> {
    let mut colors = FnvHashMap::default();
    for_each_line_in_file(path, |line_no, l| {
        let mut fields = l.split_whitespace();
        let name = fields.next().unwrap_or_default();
        let color = fields
            .next()
            .and_then(parse_code)
            .filter(|&c| c <= MAX_CATEGORY as u64)
            .ok_or_else(|| PairGenomeError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected a source name and a 24-bit colour, got {:?}", l),
            })?;
        colors.insert(name.to_string(), color as u32);
        Ok(())
    })?;
    Ok(colors)
}

fn source_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    match file_name.find('.') {
        Some(dot) if dot > 0 => file_name[..dot].to_string(),
        _ => file_name.to_string(),
    }
}

/// Parses one record line, returning the record and its sample name if the
/// optional sixth column is present.
pub fn parse_record_line(line: &str) -> std::result::Result<(IntervalRecord, Option<&str>), String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 && fields.len() != 6 {
        return Err(format!("expected 5 or 6 fields, found {}", fields.len()));
    }
    let category = parse_code(fields[0])
        .ok_or_else(|| format!("bad category code {:?}", fields[0]))?;
    if category > MAX_CATEGORY as u64 {
        return Err(format!("category {:#x} exceeds 24 bits", category));
    }
    let mut pos = [0u64; 4];
    for (slot, field) in pos.iter_mut().zip(&fields[1..5]) {
        *slot = field
            .parse::<u64>()
            .map_err(|_| format!("bad position {:?}", field))?;
    }
    let record = IntervalRecord::new(category as u32, pos[0], pos[1], pos[2], pos[3]);
    Ok((record, fields.get(5).copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn genome() -> Genome {
        Genome::new(vec![("1", 100), ("2", 50)]).unwrap()
    }

    #[rstest]
    fn test_area_and_key() {
        let r = IntervalRecord::from([0, 0, 5, 2, 10]);
        assert_eq!(r.area(), 40);
        assert_eq!(r.key(), "0:2");
    }

    #[rstest]
    #[case(IntervalRecord::from([0, 0, 20, 0, 20]), true)]
    #[case(IntervalRecord::from([0, 0, 20, 0, 10]), false)]
    #[case(IntervalRecord::from([0, 0, 5, 0, 20]), false)]
    fn test_is_coarse(#[case] record: IntervalRecord, #[case] coarse: bool) {
        assert_eq!(record.is_coarse(10), coarse);
    }

    #[rstest]
    fn test_parse_line() {
        let (r, sample) = parse_record_line("0xff0000 10 20 30 40").unwrap();
        assert_eq!(r, IntervalRecord::new(0xff0000, 10, 20, 30, 40));
        assert_eq!(sample, None);
        let (_, sample) = parse_record_line("0xff0000 10 20 30 40 CAST_EiJ").unwrap();
        assert_eq!(sample, Some("CAST_EiJ"));
        assert!(parse_record_line("0xff 1 2 3 4 s extra").is_err());
        assert!(parse_record_line("0x1000000 1 2 3 4").is_err());
        assert!(parse_record_line("0xff 1 2 3").is_err());
        assert!(parse_record_line("0xff 1 2 3 x").is_err());
    }

    #[rstest]
    #[case(IntervalRecord::from([0, 0, 100, 100, 150]), true)]
    #[case(IntervalRecord::from([0, 10, 5, 100, 150]), false)]
    #[case(IntervalRecord::from([0, 90, 110, 100, 150]), false)]
    #[case(IntervalRecord::from([0, 0, 10, 150, 160]), false)]
    fn test_validate(genome: Genome, #[case] record: IntervalRecord, #[case] ok: bool) {
        assert_eq!(record.validate(&genome).is_ok(), ok);
    }

    #[rstest]
    fn test_from_file_reports_line(genome: Genome) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.combos.txt");
        std::fs::write(&path, "0x0 0 5 2 10\n0xff 90 120 0 1\n").unwrap();
        match DataSource::from_file(&path, &genome) {
            Err(PairGenomeError::InvalidRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }

        std::fs::write(&path, "0x0 0 5 2 10\n0xff 5 10 1 2\n").unwrap();
        let source = DataSource::from_file(&path, &genome).unwrap();
        assert_eq!(source.name, "bg");
        assert_eq!(source.records.len(), 2);
        assert!(source.samples.is_empty());
    }

    #[rstest]
    fn test_from_file_interns_samples(genome: Genome) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fg.txt");
        std::fs::write(
            &path,
            "0x0 0 5 2 10 WSB\n0xff 5 10 1 2 PWK\n0xff 10 20 1 2 WSB\n0xff 20 30 1 2\n",
        )
        .unwrap();
        let source = DataSource::from_file(&path, &genome).unwrap();
        assert_eq!(source.samples, vec!["WSB", "PWK"]);
        let names: Vec<Option<&str>> = source.records.iter().map(|r| source.sample_name(r)).collect();
        assert_eq!(names, vec![Some("WSB"), Some("PWK"), Some("WSB"), None]);
    }

    #[rstest]
    fn test_read_source_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.txt");
        std::fs::write(&path, "dom_mus 0xff0000\ncas_cas #00ff00\n").unwrap();
        let colors = read_source_colors(&path).unwrap();
        assert_eq!(colors["dom_mus"], 0xff0000);
        assert_eq!(colors["cas_cas"], 0x00ff00);

        std::fs::write(&path, "dom_mus\n").unwrap();
        assert!(read_source_colors(&path).is_err());
    }
}
