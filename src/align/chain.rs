use super::seed::Anchor;

/// 锚点簇：同一参考序列上、对角线漂移有界的一组锚点，
/// 对应一个待验证的候选对齐。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub seq: u32,
    /// 簇内最小 / 最大对角线（roff - qoff）
    pub diag_lo: i64,
    pub diag_hi: i64,
    /// 支持该簇的锚点数
    pub support: u32,
}

/// 将锚点按 (seq, 对角线) 聚簇。
///
/// 排序后沿对角线做一次线性扫描：与当前簇起始对角线相差不超过
/// max_drift（取 max_edits，indel 每发生一次对角线至多漂移 1）的
/// 锚点并入同簇，否则开新簇。同一真实对齐的所有无错 k-mer 窗口
/// 落在同一簇内，种子召回不因聚簇而丢失。
pub fn cluster_anchors(mut anchors: Vec<Anchor>, max_drift: i64) -> Vec<Cluster> {
    if anchors.is_empty() {
        return Vec::new();
    }

    anchors.sort_by_key(|a| (a.seq, a.diag(), a.roff));

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut cur = Cluster {
        seq: anchors[0].seq,
        diag_lo: anchors[0].diag(),
        diag_hi: anchors[0].diag(),
        support: 1,
    };

    for a in &anchors[1..] {
        let d = a.diag();
        if a.seq == cur.seq && d - cur.diag_lo <= max_drift {
            cur.diag_hi = d;
            cur.support += 1;
        } else {
            clusters.push(cur);
            cur = Cluster {
                seq: a.seq,
                diag_lo: d,
                diag_hi: d,
                support: 1,
            };
        }
    }
    clusters.push(cur);
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(seq: u32, qoff: u32, roff: u32) -> Anchor {
        Anchor { seq, qoff, roff }
    }

    #[test]
    fn same_diagonal_forms_one_cluster() {
        let clusters = cluster_anchors(
            vec![anchor(0, 0, 5), anchor(0, 3, 8), anchor(0, 6, 11)],
            1,
        );
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].diag_lo, 5);
        assert_eq!(clusters[0].diag_hi, 5);
        assert_eq!(clusters[0].support, 3);
    }

    #[test]
    fn bounded_drift_stays_in_cluster() {
        // indel 造成对角线 5 -> 6 的漂移，max_drift=1 时仍为一簇
        let clusters = cluster_anchors(vec![anchor(0, 0, 5), anchor(0, 4, 10)], 1);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].diag_lo, 5);
        assert_eq!(clusters[0].diag_hi, 6);
    }

    #[test]
    fn distant_diagonals_split() {
        let clusters = cluster_anchors(vec![anchor(0, 0, 0), anchor(0, 0, 50)], 2);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn different_sequences_never_merge() {
        let clusters = cluster_anchors(vec![anchor(0, 0, 5), anchor(1, 0, 5)], 10);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].seq, 0);
        assert_eq!(clusters[1].seq, 1);
    }

    #[test]
    fn empty_input() {
        assert!(cluster_anchors(Vec::new(), 1).is_empty());
    }

    #[test]
    fn unsorted_input_is_handled() {
        let clusters = cluster_anchors(
            vec![anchor(1, 0, 0), anchor(0, 2, 2), anchor(0, 0, 0)],
            0,
        );
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].seq, 0);
        assert_eq!(clusters[0].support, 2);
    }
}
