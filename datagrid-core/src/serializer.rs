//! Entity to row conversion.
//!
//! Each row has one cell per declared column, in position order. A column
//! without display handler or accessor serializes as `null`; serialization
//! itself never fails.

use serde_json::Value;

use crate::context::RequestContext;
use crate::registry::{DisplayContext, FieldHandlers};
use crate::request::{Column, Parameters};

pub fn serialize_row<T, Q>(
    entity: &T,
    handlers: &FieldHandlers<T, Q>,
    params: &Parameters,
    ctx: &RequestContext<Q>,
    date_format: &str,
) -> Vec<Value> {
    let columns = params.columns_by_position();
    row_cells(entity, &columns, handlers, params, ctx, date_format)
}

pub fn serialize_rows<T, Q>(
    entities: &[T],
    handlers: &FieldHandlers<T, Q>,
    params: &Parameters,
    ctx: &RequestContext<Q>,
    date_format: &str,
) -> Vec<Vec<Value>> {
    let columns = params.columns_by_position();
    entities
        .iter()
        .map(|entity| row_cells(entity, &columns, handlers, params, ctx, date_format))
        .collect()
}

fn row_cells<T, Q>(
    entity: &T,
    columns: &[&Column],
    handlers: &FieldHandlers<T, Q>,
    params: &Parameters,
    ctx: &RequestContext<Q>,
    date_format: &str,
) -> Vec<Value> {
    columns
        .iter()
        .map(|column| {
            if let Some(handler) = handlers.display_handler(&column.name) {
                let display_ctx = DisplayContext {
                    parameters: params,
                    column: *column,
                    payload: ctx,
                };
                return handler.display(entity, &display_ctx).to_json(date_format);
            }
            match handlers.accessors().read(entity, &column.name) {
                Some(value) => value.to_json(date_format),
                None => Value::Null,
            }
        })
        .collect()
}
