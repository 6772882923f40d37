pub mod external;
pub mod grammar;
pub mod heuristic;
pub mod normalizer;
pub mod unified;

pub use external::{ExternalParser, FormatListParser};
pub use grammar::{Grammar, Token};
pub use heuristic::complete;
pub use normalizer::{NormalizedDate, NormalizedFragments, NormalizedTime, normalize};
pub use unified::{Extractor, ExtractorConfig, extract, extract_with};
