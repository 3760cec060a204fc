//! # dna-processing
//!
//! 核苷酸序列处理引擎：紧凑序列编码、k-mer 抽取与索引、近似匹配。
//!
//! 本 crate 提供了基于 k-mer 索引的 DNA 序列处理功能，包括：
//!
//! - **序列编码**：{A,C,G,T}（可选歧义类 N）的 2-bit 打包编解码
//! - **k-mer 抽取**：滚动哈希滑窗，O(1) 步进，歧义窗口跳过
//! - **索引构建**：一次构建、多次查询的 k-mer 出现多重映射
//! - **近似匹配**：seed-and-extend，带状编辑距离验证，正反两向
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use dna_processing::align::find_matches;
//! use dna_processing::index::KmerIndex;
//! use dna_processing::seq::{encode, Alphabet};
//!
//! // 构建 k-mer 索引
//! let reference = encode("chr1", b"ACGTACGTAC", Alphabet::DnaN).unwrap();
//! let index = KmerIndex::build(vec![reference], 3).unwrap();
//!
//! // 允许 1 个编辑的近似搜索
//! let query = encode("q1", b"ACGTTCGTAC", Alphabet::Dna).unwrap();
//! let matches = find_matches(&query, &index, 1).unwrap();
//! for m in &matches {
//!     println!("{}:{} len={} edits={}", index.seq_name(m.seq), m.ref_start, m.len, m.edits);
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`seq`] — 序列编解码与滚动 k-mer 扫描
//! - [`index`] — k-mer 出现索引的构建、查询与持久化
//! - [`align`] — 种子收集、对角线聚簇、带状验证与匹配编排
//! - [`io`] — FASTA 解析与换行写出
//! - [`store`] — 染色体抽取存储与点突变应用

pub mod align;
pub mod error;
pub mod index;
pub mod io;
pub mod seq;
pub mod store;

pub use error::DnaError;
