// Domain types and value objects
pub mod candle;
pub mod pivot;

// Re-export commonly used types
pub use candle::PricePoint;
pub use pivot::{Pivot, PivotKind};
