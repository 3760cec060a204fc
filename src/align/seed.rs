use crate::error::Result;
use crate::index::KmerIndex;
use crate::seq::Sequence;

/// 种子锚点：query 的一个 k-mer 在参考集中的一次命中。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// 参考序列编号
    pub seq: u32,
    /// query 上的 0-based 偏移
    pub qoff: u32,
    /// 参考序列上的 0-based 偏移
    pub roff: u32,
}

impl Anchor {
    /// 对角线编号 roff - qoff：同一无 indel 对齐上的锚点对角线相同，
    /// indel 使其漂移，漂移量以 max_edits 为界。
    #[inline]
    pub fn diag(&self) -> i64 {
        i64::from(self.roff) - i64::from(self.qoff)
    }
}

/// 种子阶段：抽取 query 的全部 k-mer（k 取自索引），逐个查表，
/// 收集所有候选锚点。查表廉价，过滤掉参考集的绝大部分区域，
/// 昂贵的验证只在锚点聚簇出的候选窗口上运行。
pub fn collect_anchors(query: &Sequence, index: &KmerIndex) -> Result<Vec<Anchor>> {
    let mut anchors = Vec::new();
    for (code, qoff) in query.kmers(index.k)? {
        for hit in index.lookup(code) {
            anchors.push(Anchor {
                seq: hit.seq,
                qoff,
                roff: hit.offset,
            });
        }
    }
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::{encode, Alphabet};

    fn index_of(raws: &[&[u8]], k: usize) -> KmerIndex {
        let seqs = raws
            .iter()
            .enumerate()
            .map(|(i, r)| encode(&format!("s{}", i), r, Alphabet::DnaN).unwrap())
            .collect();
        KmerIndex::build(seqs, k).unwrap()
    }

    #[test]
    fn exact_query_anchors_every_window() {
        let idx = index_of(&[b"ACGTACGTAC"], 3);
        let q = encode("q", b"ACGTACGTAC", Alphabet::Dna).unwrap();
        let anchors = collect_anchors(&q, &idx).unwrap();
        // 每个 query 窗口至少命中其原位置；对角线 0 必然出现 8 次
        assert!(anchors.len() >= 8);
        assert_eq!(anchors.iter().filter(|a| a.diag() == 0).count(), 8);
    }

    #[test]
    fn unrelated_query_has_no_anchors() {
        let idx = index_of(&[b"AAAAAAAAAA"], 4);
        let q = encode("q", b"CCCCCC", Alphabet::Dna).unwrap();
        assert!(collect_anchors(&q, &idx).unwrap().is_empty());
    }

    #[test]
    fn anchors_carry_sequence_ids() {
        let idx = index_of(&[b"TTTTTT", b"ACGTTT"], 4);
        let q = encode("q", b"ACGT", Alphabet::Dna).unwrap();
        let anchors = collect_anchors(&q, &idx).unwrap();
        assert_eq!(anchors, vec![Anchor { seq: 1, qoff: 0, roff: 0 }]);
    }

    #[test]
    fn query_shorter_than_k_is_invalid() {
        let idx = index_of(&[b"ACGTACGT"], 5);
        let q = encode("q", b"ACG", Alphabet::Dna).unwrap();
        assert!(collect_anchors(&q, &idx).is_err());
    }
}
