use crate::error::{DnaError, Result};
use crate::seq::codec::Sequence;

/// 单个 u64 字所能容纳的最大 k（2 bit/碱基）。
pub const MAX_K: usize = 32;

/// 滚动 k-mer 扫描器：对序列滑动宽度为 k 的窗口，惰性产出
/// `(code, offset)`。每个后继编码由前一个移出最老碱基、移入新碱基
/// 得到（`code = ((code << 2) | base) & mask`），每步 O(1)。
///
/// 覆盖歧义碱基的窗口整体跳过：遇到 N 时清零有效游程计数，直到
/// 重新累积 k 个连续无歧义碱基才恢复产出。offset 严格递增。
#[derive(Debug)]
pub struct KmerScanner<'a> {
    seq: &'a Sequence,
    k: usize,
    mask: u64,
    code: u64,
    /// 下一个待消费的碱基位置
    pos: usize,
    /// 以当前位置结尾的连续无歧义碱基数
    run: usize,
    /// ambiguous 列表上的游标，避免逐位二分
    amb_cursor: usize,
}

impl<'a> KmerScanner<'a> {
    pub fn new(seq: &'a Sequence, k: usize) -> Result<Self> {
        if k == 0 || k > MAX_K || k > seq.len() {
            return Err(DnaError::InvalidK { k, len: seq.len() });
        }
        let mask = if k == MAX_K {
            u64::MAX
        } else {
            (1u64 << (2 * k)) - 1
        };
        Ok(Self {
            seq,
            k,
            mask,
            code: 0,
            pos: 0,
            run: 0,
            amb_cursor: 0,
        })
    }

    #[inline]
    fn is_ambiguous(&mut self, pos: usize) -> bool {
        let amb = &self.seq.ambiguous;
        while self.amb_cursor < amb.len() && (amb[self.amb_cursor] as usize) < pos {
            self.amb_cursor += 1;
        }
        self.amb_cursor < amb.len() && amb[self.amb_cursor] as usize == pos
    }
}

impl Iterator for KmerScanner<'_> {
    type Item = (u64, u32);

    fn next(&mut self) -> Option<(u64, u32)> {
        while self.pos < self.seq.len() {
            let pos = self.pos;
            self.pos += 1;
            if self.is_ambiguous(pos) {
                self.run = 0;
                continue;
            }
            let base = self.seq.packed_code(pos) as u64;
            self.code = ((self.code << 2) | base) & self.mask;
            self.run += 1;
            if self.run >= self.k {
                return Some((self.code, (pos + 1 - self.k) as u32));
            }
        }
        None
    }
}

impl Sequence {
    /// 抽取本序列的全部 k-mer。每次调用从 offset 0 重新扫描。
    pub fn kmers(&self, k: usize) -> Result<KmerScanner<'_>> {
        KmerScanner::new(self, k)
    }
}

/// 直接对一段解码符号求 k-mer 编码（测试与候选核对用，非滚动路径）。
pub fn encode_kmer(bases: &[u8]) -> Option<u64> {
    if bases.is_empty() || bases.len() > MAX_K {
        return None;
    }
    let mut code = 0u64;
    for &b in bases {
        let c = match b.to_ascii_uppercase() {
            b'A' => 0u64,
            b'C' => 1,
            b'G' => 2,
            b'T' => 3,
            _ => return None,
        };
        code = (code << 2) | c;
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::codec::{encode, Alphabet};

    #[test]
    fn yields_all_windows() {
        let s = encode("r", b"ACGTACGTAC", Alphabet::Dna).unwrap();
        let kmers: Vec<(u64, u32)> = s.kmers(3).unwrap().collect();
        assert_eq!(kmers.len(), 10 - 3 + 1);
        for (i, &(code, off)) in kmers.iter().enumerate() {
            assert_eq!(off as usize, i);
            let window = &s.decode()[i..i + 3];
            assert_eq!(code, encode_kmer(window).unwrap());
        }
    }

    #[test]
    fn rolling_matches_direct_encoding() {
        let s = encode("r", b"TTGACCATGGCA", Alphabet::Dna).unwrap();
        let raw = s.decode();
        for (code, off) in s.kmers(5).unwrap() {
            let off = off as usize;
            assert_eq!(Some(code), encode_kmer(&raw[off..off + 5]));
        }
    }

    #[test]
    fn skips_windows_overlapping_ambiguous() {
        // N 在位置 4：k=3 时窗口 2、3、4 被跳过，其余全部保留
        let s = encode("r", b"ACGTNACGTA", Alphabet::DnaN).unwrap();
        let offsets: Vec<u32> = s.kmers(3).unwrap().map(|(_, o)| o).collect();
        assert_eq!(offsets, vec![0, 1, 5, 6, 7]);
    }

    #[test]
    fn all_ambiguous_yields_nothing() {
        let s = encode("r", b"NNNNN", Alphabet::DnaN).unwrap();
        assert_eq!(s.kmers(2).unwrap().count(), 0);
    }

    #[test]
    fn adjacent_ambiguous_runs_resume_cleanly() {
        let s = encode("r", b"ANNAC", Alphabet::DnaN).unwrap();
        let kmers: Vec<(u64, u32)> = s.kmers(2).unwrap().collect();
        assert_eq!(kmers, vec![(encode_kmer(b"AC").unwrap(), 3)]);
    }

    #[test]
    fn k_equal_to_length() {
        let s = encode("r", b"ACGT", Alphabet::Dna).unwrap();
        let kmers: Vec<(u64, u32)> = s.kmers(4).unwrap().collect();
        assert_eq!(kmers, vec![(encode_kmer(b"ACGT").unwrap(), 0)]);
    }

    #[test]
    fn invalid_k_rejected() {
        let s = encode("r", b"ACGT", Alphabet::Dna).unwrap();
        assert_eq!(
            s.kmers(0).unwrap_err(),
            DnaError::InvalidK { k: 0, len: 4 }
        );
        assert_eq!(
            s.kmers(5).unwrap_err(),
            DnaError::InvalidK { k: 5, len: 4 }
        );
        let long = encode("r", &vec![b'A'; 40], Alphabet::Dna).unwrap();
        assert_eq!(
            long.kmers(33).unwrap_err(),
            DnaError::InvalidK { k: 33, len: 40 }
        );
    }

    #[test]
    fn fresh_scan_restarts_from_zero() {
        let s = encode("r", b"ACGTAC", Alphabet::Dna).unwrap();
        let first: Vec<(u64, u32)> = s.kmers(3).unwrap().collect();
        let second: Vec<(u64, u32)> = s.kmers(3).unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first[0].1, 0);
    }
}
