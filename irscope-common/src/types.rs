//! Identifier types shared across the workspace

/// Basic block identifier within a function
pub type LabelId = u32;

/// Identifier of an SSA value (parameter or instruction result) within a function
pub type TempId = u32;

/// Placeholder rendered for anything that carries no explicit name
pub const UNNAMED: &str = "unnamed";
