//! The runtime contract implemented by generated model code.

use crate::descriptor::ProviderKind;
use crate::error::MappingError;
use crate::row::{Row, Values};
use crate::value::Value;

/// A struct mapped to one table.
///
/// Implementations are emitted by the code generator; the constants mirror
/// the model's descriptor so runtime code never consults metadata.
pub trait Model: Sized {
    /// Declared model name.
    const NAME: &'static str;
    const TABLE_NAME: &'static str;
    /// Column names in declaration order.
    const COLUMNS: &'static [&'static str];
    /// Primary-key column name.
    const PRIMARY_KEY: &'static str;
    /// Name of the owning provider.
    const PROVIDER: &'static str;
    const PROVIDER_KIND: ProviderKind;
    const CREATE_TABLE: &'static str;
    /// `CREATE INDEX` statements for indexed columns.
    const CREATE_INDEXES: &'static [&'static str];

    /// The `CREATE TABLE` statement for this model.
    fn create_table_sql() -> &'static str {
        Self::CREATE_TABLE
    }

    /// Maps a row onto a new instance, then runs the model's init hooks.
    fn from_row(row: &Row) -> Result<Self, MappingError>;

    /// Insert/update payload for this instance.
    ///
    /// Required columns are always present. Empty optional columns and an
    /// unassigned auto-increment key are left out so the backend applies
    /// its defaults.
    fn to_values(&self) -> Values;

    fn primary_key(&self) -> Value;

    /// Stores a backend-assigned key.
    fn set_primary_key(&mut self, value: &Value) -> Result<(), MappingError>;
}
