use std::fmt::Write as _;

const INF: u32 = u32::MAX / 4;

/// 验证结果：query 全长对齐到窗口 [ref_start, ref_end) 的最小编辑距离。
#[derive(Debug, PartialEq, Eq)]
pub struct VerifyHit {
    pub edits: u32,
    pub ref_start: usize,
    pub ref_end: usize,
    pub cigar: String,
}

/// DP 工作缓冲区，可跨调用复用
pub struct EditBuffer {
    d: Vec<u32>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self { d: Vec::new() }
    }

    fn resize(&mut self, size: usize) {
        self.d.resize(size, INF);
        self.d.iter_mut().for_each(|v| *v = INF);
    }
}

impl Default for EditBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// 带状半全局编辑距离：query 必须整体对齐，窗口两端自由。
///
/// 单位代价（替换/插入/删除各记 1），带宽与 max_edits 成正比：
/// 第 i 行只计算 `j - i ∈ [-d, (n - m) + d]` 的单元格，带外按 INF
/// 处理，整体 O(m·d)。编辑距离超过 max_edits 时返回 None。
/// 终点取最后一行的最小值，并列时取最小列（对应最靠左的参考区间）。
pub fn banded_edit(query: &[u8], window: &[u8], max_edits: u32) -> Option<VerifyHit> {
    banded_edit_with_buf(query, window, max_edits, &mut EditBuffer::new())
}

pub fn banded_edit_with_buf(
    query: &[u8],
    window: &[u8],
    max_edits: u32,
    buf: &mut EditBuffer,
) -> Option<VerifyHit> {
    let m = query.len();
    let n = window.len();
    let d = max_edits as isize;

    // query 比窗口长出超过 d：至少需要 m - n 次插入，必然超预算
    if m > n + max_edits as usize {
        return None;
    }

    let cols = n + 1;
    buf.resize((m + 1) * cols);
    let dp = &mut buf.d;

    // 参考端起点自由：第 0 行全 0；第 0 列为纯 query 前缀删除代价
    for j in 0..=n {
        dp[j] = 0;
    }
    for i in 1..=m {
        dp[i * cols] = i as u32;
    }

    let shift_hi = n as isize - m as isize + d;
    for i in 1..=m {
        let i_isize = i as isize;
        let lo = (i_isize - d).max(1) as usize;
        let hi_isize = i_isize + shift_hi;
        if hi_isize < lo as isize {
            continue;
        }
        let hi = (hi_isize as usize).min(n);

        for j in lo..=hi {
            let idx = i * cols + j;
            let sub = if query[i - 1] == window[j - 1] { 0 } else { 1 };
            let mut val = dp[(i - 1) * cols + (j - 1)] + sub;
            let ins = dp[(i - 1) * cols + j] + 1;
            if ins < val {
                val = ins;
            }
            let del = dp[i * cols + (j - 1)] + 1;
            if del < val {
                val = del;
            }
            dp[idx] = val;
        }
    }

    // 参考端终点自由：最后一行取最小，并列取最小列
    let mut best = INF;
    let mut best_j = 0usize;
    for j in 0..=n {
        let v = dp[m * cols + j];
        if v < best {
            best = v;
            best_j = j;
        }
    }
    if best > max_edits {
        return None;
    }

    // 回溯得到 CIGAR 与参考起点（优先对角线，与正向填表一致）
    let mut ops: Vec<char> = Vec::new();
    let mut i = m;
    let mut j = best_j;
    while i > 0 {
        let here = dp[i * cols + j];
        if j > 0 {
            let sub = if query[i - 1] == window[j - 1] { 0 } else { 1 };
            if here == dp[(i - 1) * cols + (j - 1)] + sub {
                ops.push('M');
                i -= 1;
                j -= 1;
                continue;
            }
        }
        if here == dp[(i - 1) * cols + j] + 1 {
            ops.push('I');
            i -= 1;
        } else if j > 0 && here == dp[i * cols + (j - 1)] + 1 {
            ops.push('D');
            j -= 1;
        } else {
            break;
        }
    }

    let ref_start = j;
    ops.reverse();

    Some(VerifyHit {
        edits: best,
        ref_start,
        ref_end: best_j,
        cigar: ops_to_cigar(&ops),
    })
}

pub fn ops_to_cigar(ops: &[char]) -> String {
    let mut cigar = String::new();
    if ops.is_empty() {
        return cigar;
    }
    let mut cur = ops[0];
    let mut len = 1usize;
    for &op in &ops[1..] {
        if op == cur {
            len += 1;
        } else {
            let _ = write!(&mut cigar, "{}{}", len, cur);
            cur = op;
            len = 1;
        }
    }
    let _ = write!(&mut cigar, "{}{}", len, cur);
    cigar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_match_inside_window() {
        let res = banded_edit(b"ACGT", b"TTACGTTT", 1).unwrap();
        assert_eq!(res.edits, 0);
        assert_eq!(res.ref_start, 2);
        assert_eq!(res.ref_end, 6);
        assert_eq!(res.cigar, "4M");
    }

    #[test]
    fn single_substitution() {
        let res = banded_edit(b"AGGT", b"ACGT", 1).unwrap();
        assert_eq!(res.edits, 1);
        assert_eq!(res.cigar, "4M");
        assert_eq!(res.ref_start, 0);
        assert_eq!(res.ref_end, 4);
    }

    #[test]
    fn single_insertion_in_query() {
        let res = banded_edit(b"ACGGT", b"ACGT", 1).unwrap();
        assert_eq!(res.edits, 1);
        assert!(res.cigar.contains('I'));
    }

    #[test]
    fn reference_gap_within_budget() {
        // 与 1 处替换的并列对齐可能更靠左；只断言代价与落点合法
        let res = banded_edit(b"ACGT", b"ACGGT", 1).unwrap();
        assert_eq!(res.edits, 1);
        assert!(res.cigar.contains('D') || res.cigar == "4M");
        assert!(res.ref_end - res.ref_start >= 4);
    }

    #[test]
    fn over_budget_returns_none() {
        assert!(banded_edit(b"AAAA", b"TTTT", 2).is_none());
        // query 比窗口长出超过预算
        assert!(banded_edit(b"ACGTACGT", b"ACG", 2).is_none());
    }

    #[test]
    fn zero_budget_is_exact_search() {
        assert!(banded_edit(b"ACGT", b"TACGTT", 0).is_some());
        assert!(banded_edit(b"ACGA", b"TACGTT", 0).is_none());
    }

    #[test]
    fn leftmost_window_preferred_on_tie() {
        let res = banded_edit(b"AC", b"ACAC", 0).unwrap();
        assert_eq!(res.ref_start, 0);
        assert_eq!(res.ref_end, 2);
    }

    #[test]
    fn buffer_reuse() {
        let mut buf = EditBuffer::new();
        let r1 = banded_edit_with_buf(b"ACGT", b"ACGT", 1, &mut buf).unwrap();
        assert_eq!(r1.edits, 0);
        let r2 = banded_edit_with_buf(b"AGGT", b"ACGT", 1, &mut buf).unwrap();
        assert_eq!(r2.edits, 1);
    }
}
