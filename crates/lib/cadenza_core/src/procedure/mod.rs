//! Stored-procedure execution protocol.
//!
//! Every datastore operation is a named server-side function invoked as
//! `SELECT * FROM <name>($1..$n)`. Each call carries two implicit output
//! columns, `Resultado boolean` and `Msg text`, alongside any
//! procedure-specific columns:
//!
//! - command procedures return exactly one row: the implicit pair followed
//!   by extra output columns (e.g. a freshly inserted id);
//! - row-returning procedures repeat the implicit pair on every data row,
//!   and signal rejection with a single `Resultado = false` row.
//!
//! This module owns the connection lifecycle and converts every datastore
//! failure into a business [`ProcedureOutcome`]; a raw `sqlx::Error` never
//! crosses this boundary upward.

mod args;
mod row;

pub use args::{ProcArg, ProcArgs};
pub use row::ProcRow;

use futures_util::TryStreamExt;
use sqlx::PgPool;
use thiserror::Error;
use tracing::error;

/// Implicit success column every procedure emits.
pub const RESULT_COL: &str = "Resultado";

/// Implicit message column every procedure emits.
pub const MESSAGE_COL: &str = "Msg";

/// Uniform envelope for a procedure call.
///
/// `succeeded == false` is an ordinary business rejection, not an exceptional
/// condition; the payload is present only on success.
#[derive(Debug, Clone)]
pub struct ProcedureOutcome<T> {
    pub succeeded: bool,
    pub message: String,
    pub payload: Option<T>,
}

impl<T> ProcedureOutcome<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
            payload: Some(payload),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
            payload: None,
        }
    }
}

/// Failure channel used while a call is in flight.
///
/// Row decoders propagate this with `?`; the executor folds it into the
/// outcome envelope before returning.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// Datastore-level failure: connectivity, constraint violation, timeout.
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    /// The procedure reported `Resultado = false`.
    #[error("{0}")]
    Rejected(String),
}

/// Executes named stored procedures against a connection pool.
///
/// Stateless per call: each invocation checks a connection out of the pool
/// for exactly the duration of the call and returns it on every exit path
/// (the pool guard drops on success, rejection, and error alike). Safe to
/// share across concurrent callers. Cancellation is cooperative: dropping
/// the returned future releases the connection.
#[derive(Clone)]
pub struct ProcedureExecutor {
    pool: PgPool,
}

impl ProcedureExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs a command procedure with no outputs beyond the implicit pair.
    pub async fn execute(&self, name: &str, args: ProcArgs) -> ProcedureOutcome<()> {
        self.execute_returning(name, args, |_| Ok(())).await
    }

    /// Runs a command procedure and reads extra output columns from its
    /// single output row.
    pub async fn execute_returning<T, F>(
        &self,
        name: &str,
        args: ProcArgs,
        read_outputs: F,
    ) -> ProcedureOutcome<T>
    where
        F: FnOnce(&ProcRow) -> Result<T, ProcedureError>,
    {
        self.fold(name, &args, self.try_execute(name, &args, read_outputs).await)
    }

    /// Runs a row-returning procedure, decoding every data row with `decode`.
    ///
    /// `decode` is pure row projection: it reads named columns and builds a
    /// value, nothing else. An empty result set is a success with an empty
    /// collection.
    pub async fn fetch_all<T, F>(
        &self,
        name: &str,
        args: ProcArgs,
        decode: F,
    ) -> ProcedureOutcome<Vec<T>>
    where
        F: FnMut(&ProcRow) -> Result<T, ProcedureError>,
    {
        let result = self.try_fetch(name, &args, decode, false).await;
        self.fold(name, &args, result.map(|(message, rows)| (message, rows)))
    }

    /// Runs a row-returning procedure expected to yield at most one row.
    ///
    /// The cursor is abandoned after the first row; a miss is a success with
    /// `None` so the caller decides what absence means.
    pub async fn fetch_optional<T, F>(
        &self,
        name: &str,
        args: ProcArgs,
        decode: F,
    ) -> ProcedureOutcome<Option<T>>
    where
        F: FnMut(&ProcRow) -> Result<T, ProcedureError>,
    {
        let result = self.try_fetch(name, &args, decode, true).await;
        self.fold(
            name,
            &args,
            result.map(|(message, rows)| (message, rows.into_iter().next())),
        )
    }

    async fn try_execute<T, F>(
        &self,
        name: &str,
        args: &ProcArgs,
        read_outputs: F,
    ) -> Result<(String, T), ProcedureError>
    where
        F: FnOnce(&ProcRow) -> Result<T, ProcedureError>,
    {
        let sql = call_sql(name, args.len());
        let mut conn = self.pool.acquire().await?;
        let row = ProcRow::new(bind(&sql, args).fetch_one(conn.as_mut()).await?);
        let message = row.string(MESSAGE_COL)?;
        if !row.boolean(RESULT_COL)? {
            return Err(ProcedureError::Rejected(message));
        }
        let payload = read_outputs(&row)?;
        Ok((message, payload))
    }

    async fn try_fetch<T, F>(
        &self,
        name: &str,
        args: &ProcArgs,
        mut decode: F,
        first_only: bool,
    ) -> Result<(String, Vec<T>), ProcedureError>
    where
        F: FnMut(&ProcRow) -> Result<T, ProcedureError>,
    {
        let sql = call_sql(name, args.len());
        let mut conn = self.pool.acquire().await?;
        let mut stream = bind(&sql, args).fetch(conn.as_mut());

        let mut message = String::new();
        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            let row = ProcRow::new(row);
            if !row.boolean(RESULT_COL)? {
                return Err(ProcedureError::Rejected(row.string(MESSAGE_COL)?));
            }
            if message.is_empty() {
                message = row.string(MESSAGE_COL)?;
            }
            rows.push(decode(&row)?);
            if first_only {
                break;
            }
        }
        Ok((message, rows))
    }

    /// Folds the in-flight result into the outcome envelope. Datastore errors
    /// are logged here, with the procedure name and a redacted argument view,
    /// and downgraded to a rejection carrying the datastore message.
    fn fold<T>(
        &self,
        name: &str,
        args: &ProcArgs,
        result: Result<(String, T), ProcedureError>,
    ) -> ProcedureOutcome<T> {
        match result {
            Ok((message, payload)) => ProcedureOutcome::ok(message, payload),
            Err(ProcedureError::Rejected(message)) => ProcedureOutcome::rejected(message),
            Err(ProcedureError::Db(e)) => {
                error!(procedure = name, args = %args, error = %e, "stored procedure call failed");
                ProcedureOutcome::rejected(e.to_string())
            }
        }
    }
}

/// Builds the invocation statement for a procedure with `arg_count` inputs.
///
/// Name parts are quoted individually: procedure names are mixed-case and
/// schema-qualified (`seg.procCatUsuariosIns`).
fn call_sql(name: &str, arg_count: usize) -> String {
    let qualified = name
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join(".");
    let placeholders = (1..=arg_count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT * FROM {qualified}({placeholders})")
}

fn bind<'q>(
    sql: &'q str,
    args: &'q ProcArgs,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query(sql);
    for arg in args.iter() {
        query = match arg {
            ProcArg::Int(v) => query.bind(v),
            ProcArg::BigInt(v) => query.bind(v),
            ProcArg::Text(v) => query.bind(v),
            ProcArg::OptText(v) => query.bind(v),
            ProcArg::Bytes(v) => query.bind(v),
            ProcArg::Bool(v) => query.bind(v),
            ProcArg::Timestamp(v) => query.bind(v),
        };
    }
    query
}
