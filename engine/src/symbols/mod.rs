// Name to exchange-code resolution
pub mod registry;

pub use registry::{ResolvedSymbol, SymbolEntry, SymbolRegistry};
