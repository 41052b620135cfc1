/// UI building blocks
///
/// - `layout` - grid column arithmetic
/// - `grid` - the grid adapter binding photo paths to cells
/// - `photo` - the full-size photo screen view

pub mod grid;
pub mod layout;
pub mod photo;
