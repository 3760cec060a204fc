//! 近似匹配器：seed-and-extend。
//!
//! 种子阶段用 k-mer 索引廉价定位候选区域（[`seed`]），聚簇阶段把
//! 对角线一致的锚点合并成候选对齐（[`chain`]），验证阶段只对候选
//! 窗口跑带状编辑距离 DP（[`verify`]）。廉价过滤与昂贵验证的分离
//! 是本模块的核心性能属性。

pub mod chain;
pub mod seed;
pub mod verify;

use rayon::prelude::*;

use crate::error::{DnaError, Result};
use crate::index::KmerIndex;
use crate::seq::Sequence;

use chain::cluster_anchors;
use seed::collect_anchors;
use verify::{banded_edit_with_buf, EditBuffer};

/// 一次确认的匹配结果。产出后不再变更。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// 参考序列编号（构建索引时的下标）
    pub seq: u32,
    /// 参考序列上的 0-based 起始偏移
    pub ref_start: u32,
    /// 参考区间长度
    pub len: u32,
    /// 验证得到的编辑距离
    pub edits: u32,
    /// CIGAR（M/I/D，I 消耗 query，D 消耗参考）
    pub cigar: String,
    /// 是否为 query 反向互补方向的匹配
    pub is_rev: bool,
}

/// 在索引化的参考集中定位 query 的近似匹配。
///
/// 两个方向（原序与反向互补）各跑一遍 seed -> cluster -> verify，
/// 编辑距离超过 max_edits 的候选簇被丢弃而非报错。结果按编辑距离
/// 升序排列，并列时按参考偏移、再按序列编号升序；同一落点只保留
/// 编辑距离最低的一条。
///
/// max_edits >= k 时种子召回保证失效（query 可能每个长度为 k 的
/// 窗口都含错），返回 `InvalidMaxEdits`。max_edits < k 时由鸽笼
/// 原理保证：编辑距离 <= max_edits 的真实匹配必有至少一个无错
/// k-mer 窗口，种子阶段不会漏掉它。
pub fn find_matches(
    query: &Sequence,
    index: &KmerIndex,
    max_edits: u32,
) -> Result<Vec<Match>> {
    if max_edits as usize >= index.k {
        return Err(DnaError::InvalidMaxEdits {
            max_edits,
            k: index.k,
        });
    }

    let mut matches = Vec::new();
    let mut buf = EditBuffer::new();

    let rc = query.revcomp();
    for (oriented, is_rev) in [(query, false), (&rc, true)] {
        let qbytes = oriented.decode();
        let anchors = collect_anchors(oriented, index)?;
        let clusters = cluster_anchors(anchors, i64::from(max_edits));

        for c in clusters {
            let rseq = &index.seqs[c.seq as usize];
            let rlen = rseq.len() as i64;
            let qlen = qbytes.len() as i64;
            let d = i64::from(max_edits);

            let win_start = (c.diag_lo - d).max(0) as usize;
            let win_end = ((c.diag_hi + qlen + d).min(rlen)) as usize;
            if win_end <= win_start {
                continue;
            }

            let window = rseq.decode_range(win_start, win_end);
            if let Some(v) = banded_edit_with_buf(&qbytes, &window, max_edits, &mut buf) {
                matches.push(Match {
                    seq: c.seq,
                    ref_start: (win_start + v.ref_start) as u32,
                    len: (v.ref_end - v.ref_start) as u32,
                    edits: v.edits,
                    cigar: v.cigar,
                    is_rev,
                });
            }
        }
    }

    // 同一落点去重（保留编辑距离最低者），再按规约顺序输出
    matches.sort_by(|a, b| {
        (a.seq, a.ref_start, a.is_rev, a.edits).cmp(&(b.seq, b.ref_start, b.is_rev, b.edits))
    });
    matches.dedup_by(|b, a| a.seq == b.seq && a.ref_start == b.ref_start && a.is_rev == b.is_rev);
    matches.sort_by(|a, b| {
        (a.edits, a.ref_start, a.seq, a.is_rev).cmp(&(b.edits, b.ref_start, b.seq, b.is_rev))
    });
    Ok(matches)
}

/// 多条 query 的并行批量匹配。核心本身不起线程；分片由调用方
/// 配置的 rayon 线程池承担，各 query 之间完全独立。
pub fn find_matches_batch(
    queries: &[Sequence],
    index: &KmerIndex,
    max_edits: u32,
) -> Result<Vec<Vec<Match>>> {
    queries
        .par_iter()
        .map(|q| find_matches(q, index, max_edits))
        .collect()
}
