use super::sort::SortOrder;

/// Column order that specifies how the values of a column are ordered for the
/// purposes of the `min`/`max` statistics stored alongside each column chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnOrder {
    /// Column uses the order defined by its logical or physical type.
    TypeDefinedOrder(SortOrder),
    /// Column does not have a well-defined sort order.
    Undefined,
}
