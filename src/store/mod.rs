//! 染色体存储：从 FASTA 中挑出指定记录，落成一个紧挨排列的
//! `chromosomes.dat` 加一个 JSON 偏移索引 `chromosomes.idx`，
//! 之后可按名字随机读取单条序列，或在其上应用点突变并输出。

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DnaError;
use crate::io::fasta::{write_wrapped, FastaReader};

pub const DATA_FILE: &str = "chromosomes.dat";
pub const INDEX_FILE: &str = "chromosomes.idx";

/// 存储索引：名字 -> [字节偏移, 长度]，与 .dat 并排落盘的 JSON。
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreIndex {
    #[serde(flatten)]
    pub entries: BTreeMap<String, (u64, u64)>,
}

impl StoreIndex {
    pub fn get(&self, name: &str) -> Option<(u64, u64)> {
        self.entries.get(name).copied()
    }

    pub fn load(dir: &Path) -> Result<StoreIndex> {
        let path = dir.join(INDEX_FILE);
        let f = File::open(&path)
            .with_context(|| format!("cannot open store index '{}'", path.display()))?;
        let idx = serde_json::from_reader(BufReader::new(f))?;
        Ok(idx)
    }
}

/// 从 FASTA 流式抽取 `keep` 中列出的记录写入存储目录。
///
/// 序列符号写入前已统一大写（读取器负责）。返回写出的索引；
/// `keep` 中未在 FASTA 出现的名字静默缺席，由调用方对照索引发现。
pub fn encode_store(fasta: &Path, out_dir: &Path, keep: &[String]) -> Result<StoreIndex> {
    let wanted: HashSet<&str> = keep.iter().map(String::as_str).collect();

    let fh = File::open(fasta)
        .with_context(|| format!("cannot open FASTA file '{}'", fasta.display()))?;
    let mut reader = FastaReader::new(BufReader::new(fh));

    let dat_path = out_dir.join(DATA_FILE);
    let mut dat = BufWriter::new(
        File::create(&dat_path)
            .with_context(|| format!("cannot create '{}'", dat_path.display()))?,
    );

    let mut index = StoreIndex::default();
    let mut offset = 0u64;
    while let Some(rec) = reader.next_record()? {
        if !wanted.contains(rec.id.as_str()) {
            continue;
        }
        dat.write_all(&rec.seq)?;
        index
            .entries
            .insert(rec.id.clone(), (offset, rec.seq.len() as u64));
        offset += rec.seq.len() as u64;
    }
    dat.flush()?;

    let idx_path = out_dir.join(INDEX_FILE);
    let idx_file = File::create(&idx_path)
        .with_context(|| format!("cannot create '{}'", idx_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(idx_file), &index)?;

    Ok(index)
}

/// 按名字读回一条已存储的序列（seek 到记录偏移，定长读取）。
pub fn load_sequence(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let index = StoreIndex::load(dir)?;
    let (offset, len) = match index.get(name) {
        Some(e) => e,
        None => bail!("chromosome '{}' not found in store index", name),
    };

    let dat_path = dir.join(DATA_FILE);
    let mut f = File::open(&dat_path)
        .with_context(|| format!("cannot open '{}'", dat_path.display()))?;
    f.seek(SeekFrom::Start(offset))?;
    let mut seq = vec![0u8; len as usize];
    f.read_exact(&mut seq)?;
    Ok(seq)
}

/// 对一个点突变列表做纯内存替换。
///
/// 越界位置仅告警并跳过（不整体失败）；替换碱基限 {A,C,G,T,N}，
/// 其余以 `InvalidSymbol` 拒绝。返回实际应用的突变数。
pub fn apply_mutations(
    name: &str,
    seq: &mut [u8],
    mutations: &[(usize, u8)],
) -> std::result::Result<usize, DnaError> {
    let mut applied = 0usize;
    for &(pos, base) in mutations {
        let upper = base.to_ascii_uppercase();
        if !matches!(upper, b'A' | b'C' | b'G' | b'T' | b'N') {
            return Err(DnaError::InvalidSymbol { symbol: base, pos });
        }
        if pos >= seq.len() {
            eprintln!(
                "warning: mutation position {} is out of bounds for {}",
                pos, name
            );
            continue;
        }
        seq[pos] = upper;
        applied += 1;
    }
    Ok(applied)
}

/// 读取已存储的染色体，应用点突变，按 60 列换行写出。
/// 输出布局与上游工具一致：纯序列行，不带 FASTA 头。
pub fn mutate(
    dir: &Path,
    name: &str,
    mutations: &[(usize, u8)],
    out_path: &Path,
) -> Result<usize> {
    let mut seq = load_sequence(dir, name)?;
    let applied = apply_mutations(name, &mut seq, mutations)?;

    let out = File::create(out_path)
        .with_context(|| format!("cannot create output file '{}'", out_path.display()))?;
    let mut w = BufWriter::new(out);
    write_wrapped(&mut w, &seq)?;
    w.flush()?;
    Ok(applied)
}
