use thiserror::Error;

/// 核心错误类型。
///
/// 三个变体对应三处同步校验：编码时的字母表检查、k-mer 抽取时的
/// 窗口宽度检查、匹配时的编辑距离上限检查。所有错误在检测到的
/// 调用点立即返回，库内部不做重试。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DnaError {
    /// 输入包含字母表之外的符号（严格模式下 N 也在此列）
    #[error("invalid symbol {:?} at position {pos}", *symbol as char)]
    InvalidSymbol { symbol: u8, pos: usize },

    /// k 超出合法范围：k=0、k>32（单个 u64 字的 2-bit 打包上限）、
    /// 或 k 大于被扫描序列的长度
    #[error("invalid k={k} for sequence of length {len} (valid: 1..=32, k <= len)")]
    InvalidK { k: usize, len: usize },

    /// max_edits >= k 时种子保证失效（长度为 k 的每个窗口都可能含错，
    /// 无法由鸽笼原理保证存在无错种子），显式拒绝
    #[error("max_edits={max_edits} must be less than k={k} for seeding to guarantee recall")]
    InvalidMaxEdits { max_edits: u32, k: usize },
}

pub type Result<T> = std::result::Result<T, DnaError>;
