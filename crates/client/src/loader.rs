//! Bulk loads and single-record calls.

use crate::error::LoadError;
use crate::transport::{Method, RpcClient};
use mirra_core::{validate_table, DynamicValue, Record, Table};

/// Calls a table-shaped method and validates the answer.
pub fn load_table(
    client: &dyn RpcClient,
    path: &str,
    method: Method,
    params: Option<DynamicValue>,
) -> Result<Table, LoadError> {
    let value = client.call(path, method, params)?;
    let table = validate_table(&value).inspect_err(|err| {
        tracing::warn!(path, %method, error = %err, "rejected table payload");
    })?;
    tracing::debug!(path, %method, rows = table.row_count(), "table loaded");
    Ok(table)
}

/// Reads one record with the `read` method.
pub fn load_record(
    client: &dyn RpcClient,
    path: &str,
    params: Option<DynamicValue>,
) -> Result<Record, LoadError> {
    let value = client.call(path, Method::Read, params)?;
    let record = Record::from_value(&value).inspect_err(|err| {
        tracing::warn!(path, error = %err, "rejected record payload");
    })?;
    Ok(record)
}

/// Writes a record with `update` or `create`, returning the server's
/// acknowledgement.
///
/// The request carries `{table, id, record, issuer}`.
pub fn write_record(
    client: &dyn RpcClient,
    path: &str,
    method: Method,
    table: &str,
    id: i64,
    record: &Record,
    issuer: &str,
) -> Result<DynamicValue, LoadError> {
    debug_assert!(method.is_write(), "{} does not write records", method);
    let params = DynamicValue::named_map([
        ("table", DynamicValue::from(table)),
        ("id", DynamicValue::Int(id)),
        ("record", record.to_value()),
        ("issuer", DynamicValue::from(issuer)),
    ]);
    let ack = client.call(path, method, Some(params))?;
    tracing::debug!(path, %method, table, id, "record written");
    Ok(ack)
}
