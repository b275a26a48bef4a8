//! Connection plumbing shared by every store.
//!
//! A store runs its queries either against the pooled connection or
//! against an open transaction, depending on the handle it was built with.
//! Inside a transaction, single-row reads take `FOR UPDATE` locks: the JSON
//! list columns are read, changed in memory and written back whole, so two
//! writers on the same row must queue.

use std::sync::Arc;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QuerySelect,
    Select,
};

use common::AppError;

/// Something a store can run queries through.
pub trait DbHandle: Send + Sync {
    type Conn: ConnectionTrait + Send + Sync;

    fn conn(&self) -> &Self::Conn;

    /// Rows read through this handle stay locked until commit
    fn locks_rows(&self) -> bool {
        false
    }
}

impl DbHandle for Arc<DatabaseConnection> {
    type Conn = DatabaseConnection;

    fn conn(&self) -> &DatabaseConnection {
        self
    }
}

impl<'t> DbHandle for &'t DatabaseTransaction {
    type Conn = DatabaseTransaction;

    fn conn(&self) -> &DatabaseTransaction {
        self
    }

    fn locks_rows(&self) -> bool {
        true
    }
}

/// Add `FOR UPDATE` to a single-row read when the handle locks rows.
pub(crate) fn lockable<E: EntityTrait>(select: Select<E>, db: &impl DbHandle) -> Select<E> {
    if db.locks_rows() {
        select.lock_exclusive()
    } else {
        select
    }
}

/// Map a failed whole-row update to `NotFound` when the row is gone.
pub(crate) fn update_error(e: DbErr) -> AppError {
    match e {
        DbErr::RecordNotUpdated => AppError::NotFound,
        other => AppError::from(other),
    }
}

/// `NotFound` unless the delete touched a row.
pub(crate) fn ensure_deleted(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_row_maps_to_not_found() {
        assert!(matches!(update_error(DbErr::RecordNotUpdated), AppError::NotFound));
        assert!(matches!(
            update_error(DbErr::Custom("boom".into())),
            AppError::Database(_)
        ));
    }

    struct Handle(bool);

    impl DbHandle for Handle {
        type Conn = DatabaseConnection;

        fn conn(&self) -> &DatabaseConnection {
            unreachable!("queries are only built, never run")
        }

        fn locks_rows(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_transactional_reads_lock_rows() {
        use super::super::entities::plan::Entity as PlanEntity;
        use sea_orm::{DbBackend, QueryTrait};

        let id = uuid::Uuid::new_v4();
        let locked = lockable(PlanEntity::find_by_id(id), &Handle(true))
            .build(DbBackend::Postgres)
            .to_string();
        let plain = lockable(PlanEntity::find_by_id(id), &Handle(false))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(locked.ends_with("FOR UPDATE"), "{locked}");
        assert!(!plain.contains("FOR UPDATE"), "{plain}");
    }

    #[test]
    fn test_ensure_deleted() {
        assert!(matches!(ensure_deleted(0), Err(AppError::NotFound)));
        assert!(ensure_deleted(1).is_ok());
    }
}
