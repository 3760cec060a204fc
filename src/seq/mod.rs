pub mod codec;
pub mod kmer;

pub use codec::{encode, Alphabet, Sequence};
pub use kmer::{KmerScanner, MAX_K};
