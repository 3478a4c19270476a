pub mod anchors;
pub mod error;
pub mod oracle;
pub mod trust_check;
pub mod types;
pub mod verdict;
