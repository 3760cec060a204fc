use serde::{Deserialize, Serialize};

use crate::error::{DnaError, Result};

/// 字母表配置：是否接受歧义碱基 N。
///
/// 在 encode 时选定，并在 Sequence 的整个生命周期内固定不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alphabet {
    /// 严格 {A,C,G,T}：N 视为非法符号
    Dna,
    /// {A,C,G,T} + 歧义类 N：N 被标记而非拒绝
    DnaN,
}

/// 2-bit 编码的不可变核苷酸序列。
///
/// 打包约定（全进程唯一的规范位序，保证 k-mer 编码跨序列可比）：
/// - A=0, C=1, G=2, T=3；
/// - 第 i 个碱基占据字节 `i / 4` 的位 `6 - 2 * (i % 4)`，即字节内
///   高位在前，字节序与碱基序一致；
/// - 歧义碱基 N 在 packed 中占位 0，真实位置记录在升序的
///   `ambiguous` 列表中，decode 时无损还原。
///
/// 不变式：`packed.len() == (len + 3) / 4`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub len: usize,
    pub packed: Vec<u8>,
    pub ambiguous: Vec<u32>,
    pub alphabet: Alphabet,
}

/// 规范化单个符号并转为 2-bit 编码；N 与非法符号返回 None。
#[inline]
fn base_to_code(b: u8) -> Option<u8> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' | b'U' => Some(3),
        _ => None,
    }
}

#[inline]
pub fn code_to_base(code: u8) -> u8 {
    match code & 3 {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        _ => b'T',
    }
}

/// 将原始符号编码为 2-bit 打包序列。
///
/// 纯变换，无副作用。小写字母接受，`U` 归一化为 `T`。
/// 字母表之外的符号以 `InvalidSymbol` 报错；`Dna` 模式下 N 同样拒绝。
pub fn encode(id: &str, raw: &[u8], alphabet: Alphabet) -> Result<Sequence> {
    let mut packed = vec![0u8; (raw.len() + 3) / 4];
    let mut ambiguous: Vec<u32> = Vec::new();

    for (i, &b) in raw.iter().enumerate() {
        let code = match base_to_code(b) {
            Some(c) => c,
            None if b.to_ascii_uppercase() == b'N' && alphabet == Alphabet::DnaN => {
                ambiguous.push(i as u32);
                0
            }
            None => return Err(DnaError::InvalidSymbol { symbol: b, pos: i }),
        };
        packed[i / 4] |= code << (6 - 2 * (i % 4));
    }

    Ok(Sequence {
        id: id.to_string(),
        len: raw.len(),
        packed,
        ambiguous,
        alphabet,
    })
}

impl Sequence {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 第 i 个碱基的 2-bit 编码；歧义位置返回 None。调用方保证 i < len。
    #[inline]
    pub fn code_at(&self, i: usize) -> Option<u8> {
        if self.ambiguous.binary_search(&(i as u32)).is_ok() {
            return None;
        }
        Some(self.packed_code(i))
    }

    /// packed 中的原始 2-bit 值（歧义位置为占位 0）。
    #[inline]
    pub(crate) fn packed_code(&self, i: usize) -> u8 {
        (self.packed[i / 4] >> (6 - 2 * (i % 4))) & 3
    }

    /// 第 i 个碱基的 ASCII 符号（歧义位置还原为 N）。
    #[inline]
    pub fn base_at(&self, i: usize) -> u8 {
        match self.code_at(i) {
            Some(c) => code_to_base(c),
            None => b'N',
        }
    }

    /// 解码回原始符号串，encode 的精确逆变换（含 N 的位置无损还原）。
    pub fn decode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        let mut amb = self.ambiguous.iter().peekable();
        for i in 0..self.len {
            if amb.peek() == Some(&&(i as u32)) {
                amb.next();
                out.push(b'N');
            } else {
                out.push(code_to_base(self.packed_code(i)));
            }
        }
        out
    }

    /// 解码 [start, end) 的符号子串（验证窗口切取用）。
    pub fn decode_range(&self, start: usize, end: usize) -> Vec<u8> {
        debug_assert!(start <= end && end <= self.len);
        let mut out = Vec::with_capacity(end - start);
        let first_amb = self.ambiguous.partition_point(|&p| (p as usize) < start);
        let mut amb = self.ambiguous[first_amb..].iter().peekable();
        for i in start..end {
            if amb.peek() == Some(&&(i as u32)) {
                amb.next();
                out.push(b'N');
            } else {
                out.push(code_to_base(self.packed_code(i)));
            }
        }
        out
    }

    /// 反向互补序列（N 映射为 N），返回新的 Sequence。
    pub fn revcomp(&self) -> Sequence {
        let mut packed = vec![0u8; (self.len + 3) / 4];
        for (j, i) in (0..self.len).rev().enumerate() {
            let code = 3 - self.packed_code(i);
            packed[j / 4] |= code << (6 - 2 * (j % 4));
        }
        let mut ambiguous: Vec<u32> = self
            .ambiguous
            .iter()
            .map(|&p| (self.len as u32 - 1) - p)
            .collect();
        ambiguous.reverse();
        // 歧义位置的占位值在互补后不再为 0，清零以维持规范表示
        for &p in &ambiguous {
            let i = p as usize;
            packed[i / 4] &= !(3 << (6 - 2 * (i % 4)));
        }
        Sequence {
            id: self.id.clone(),
            len: self.len,
            packed,
            ambiguous,
            alphabet: self.alphabet,
        }
    }
}
