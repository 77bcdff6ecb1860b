//! reconbit keeps master/detail records in [Redb](https://github.com/cberner/redb): a master is saved together
//! with a complete replacement list of its details, which is reconciled against the persisted detail rows
//! (deletes, then creates, then updates) inside the master's write transaction.
//!
//! Reads attach the details back, including expression fields joined from other tables, and deleting a master
//! removes its details row by row within the same transaction.
//!

pub mod error;
pub mod logger;
pub mod macros;
pub mod record;
pub mod descriptor;
pub mod storage;
pub mod detail;
pub mod differ;
pub mod reconciler;
pub mod joiner;
pub mod cascade;
pub mod pipeline;
pub mod settings;
pub mod retry;
pub mod rest;

pub use axum;
pub use axum::http::StatusCode;
pub use axum::response::IntoResponse;
pub use axum::response::Response;
pub use chrono;
pub use http;
pub use rand;
pub use redb;
pub use redb::ReadTransaction;
pub use redb::WriteTransaction;
pub use serde;
pub use serde::Deserialize;
pub use serde::Serialize;
pub use serde_json;
pub use tokio;
pub use tower_http;
pub use utoipa;
pub use utoipa::ToSchema;
pub use utoipa_axum;
pub use utoipa_axum::router::OpenApiRouter;
pub use utoipa_swagger_ui;

pub use cascade::CascadeDelete;
pub use descriptor::{DetailDescriptor, JoinSpec, LoadResult, UniqueSpec};
pub use detail::{DetailRowReader, DetailRowService};
pub use differ::{diff, DetailDiff};
pub use error::{AppError, ErrorKind};
pub use joiner::Joiner;
pub use pipeline::{DetailRelation, MasterBehavior, MasterPipeline};
pub use reconciler::Reconciler;
pub use record::{DetailId, DetailRecord, MasterId, MasterRecord, Record, RecordId};
pub use rest::{build_router, serve, AppJson, ErrorResponse};
pub use retry::retry_with_delay;
pub use settings::{AppConfig, HttpSettings, StorageSettings};
pub use storage::{random_storage, DetailTable, EntityTable, Storage, TxView};
