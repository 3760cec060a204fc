use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{DnaError, Result};
use crate::seq::{Sequence, MAX_K};

/// 一次 k-mer 出现：所在序列编号与 0-based 起始偏移。
/// 序列编号即该序列在构建输入中的下标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hit {
    pub seq: u32,
    pub offset: u32,
}

/// 构建元信息（随索引一起持久化）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// k-mer 多重映射索引：code -> 按 (seq, offset) 升序的出现列表。
///
/// 一次构建、多次查询。构建完成后只读，跨线程共享 `&KmerIndex`
/// 无需任何同步。重复出现的 code 累积记录而不是去重（multimap 而非
/// set）。索引持有参考序列本身，供匹配阶段切取验证窗口。
#[derive(Debug, Serialize, Deserialize)]
pub struct KmerIndex {
    pub k: usize,
    /// 参考序列集，下标即 Hit::seq
    pub seqs: Vec<Sequence>,
    map: HashMap<u64, Vec<Hit>>,
    pub meta: Option<IndexMeta>,
}

impl KmerIndex {
    /// 从已定稿的序列集构建索引。
    ///
    /// 对相同输入与 k，产出的出现列表顺序完全一致（逐序列、
    /// 逐偏移从左到右扫描，列表天然按 (seq, offset) 升序）。
    /// 短于 k 的序列贡献零个窗口而不使整次构建失败；
    /// k 超出 1..=32 时返回 `InvalidK`。
    pub fn build(seqs: Vec<Sequence>, k: usize) -> Result<KmerIndex> {
        if k == 0 || k > MAX_K {
            let len = seqs.iter().map(Sequence::len).max().unwrap_or(0);
            return Err(DnaError::InvalidK { k, len });
        }

        let mut map: HashMap<u64, Vec<Hit>> = HashMap::new();
        for (sid, seq) in seqs.iter().enumerate() {
            if seq.len() < k {
                continue;
            }
            for (code, offset) in seq.kmers(k)? {
                map.entry(code).or_default().push(Hit {
                    seq: sid as u32,
                    offset,
                });
            }
        }

        Ok(KmerIndex {
            k,
            seqs,
            map,
            meta: None,
        })
    }

    /// 查询一个 k-mer 编码的全部出现。不存在时返回空切片，永不失败。
    #[inline]
    pub fn lookup(&self, code: u64) -> &[Hit] {
        self.map.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 索引中不同 k-mer 编码的数量。
    pub fn distinct_kmers(&self) -> usize {
        self.map.len()
    }

    /// 全部出现记录总数。
    pub fn total_hits(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    pub fn seq_name(&self, sid: u32) -> &str {
        &self.seqs[sid as usize].id
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = Some(meta);
    }

    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("cannot create index file '{}'", path))?;
        bincode::serialize_into(&mut f, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("cannot open index file '{}'", path))?;
        let idx: Self = bincode::deserialize_from(f)?;
        Ok(idx)
    }
}
