//! 演示如何在 library 模式下使用 dna-processing 做近似序列匹配。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_match
//! ```

use dna_processing::align::find_matches;
use dna_processing::index::KmerIndex;
use dna_processing::seq::{encode, Alphabet};

fn main() {
    // 1. 编码参考序列（含一个歧义碱基 N）
    let reference = b"ACGTACGTAGCTGATCGTAGCTNGCTAGCTGATCGTAGCTAGCTAGCTGAT";
    let chr = encode("ref1", reference, Alphabet::DnaN).unwrap();
    println!("参考序列: {}", std::str::from_utf8(reference).unwrap());
    println!("参考长度: {} bp，打包后 {} 字节", chr.len(), chr.packed.len());

    // 2. 构建 k-mer 索引
    let index = KmerIndex::build(vec![chr], 5).unwrap();
    println!(
        "索引构建完成：k={}, 不同 k-mer {} 个，出现记录 {} 条",
        index.k,
        index.distinct_kmers(),
        index.total_hits()
    );

    // 3. 近似匹配（1 个错配）
    let query = encode("q1", b"GCTGATCGTTG", Alphabet::Dna).unwrap();
    let matches = find_matches(&query, &index, 1).unwrap();
    println!("\n查询 'GCTGATCGTTG'，max_edits=1：");
    for m in &matches {
        println!(
            "  {}:{} 方向={} 长度={} 编辑距离={} CIGAR={}",
            index.seq_name(m.seq),
            m.ref_start,
            if m.is_rev { '-' } else { '+' },
            m.len,
            m.edits,
            m.cigar
        );
    }

    // 4. 精确匹配（max_edits=0）
    let exact = encode("q2", b"GCTGATC", Alphabet::Dna).unwrap();
    let matches = find_matches(&exact, &index, 0).unwrap();
    println!("\n查询 'GCTGATC'，max_edits=0：找到 {} 处", matches.len());
    for m in &matches {
        println!("  offset={}, strand={}", m.ref_start, if m.is_rev { '-' } else { '+' });
    }

    println!("\n完成！");
}
