//! Common test utilities for cached execution tests

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlcache_ast::{CompiledQuery, Expression, InsertStmt, SelectStmt, Table};
use sqlcache_executor::{
    CacheEntry, CacheError, CacheKey, CacheSetup, CacheStore, CacheStrategy, Driver, DriverError,
    Invalidation, MemoryStore, MutationEvent, QueryCache,
};
use sqlcache_types::{Row, SqlValue};

/// Driver returning a settable result set and counting every call
#[derive(Default)]
pub struct MockDriver {
    rows: Mutex<Vec<Row>>,
    failure: Mutex<Option<DriverError>>,
    hang: AtomicBool,
    calls: AtomicUsize,
    executed: Mutex<Vec<String>>,
}

#[allow(dead_code)] // Test helper - available for all test modules
impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(rows: Vec<Row>) -> Self {
        let driver = Self::default();
        driver.set_rows(rows);
        driver
    }

    pub fn set_rows(&self, rows: Vec<Row>) {
        *self.rows.lock() = rows;
    }

    /// Fail every call until cleared
    pub fn fail_with(&self, error: DriverError) {
        *self.failure.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Never complete any call
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn execute(&self, sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>, DriverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.executed.lock().push(sql.to_string());

        if self.hang.load(Ordering::SeqCst) {
            return futures::future::pending().await;
        }
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        Ok(self.rows.lock().clone())
    }
}

/// Memory store that counts calls and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    noop: bool,
    gets: AtomicUsize,
    puts: AtomicUsize,
    invalidations: AtomicUsize,
    mutations: AtomicUsize,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
    fail_invalidations: AtomicBool,
    last_mutation: Mutex<Option<MutationEvent>>,
}

#[allow(dead_code)] // Test helper - available for all test modules
impl RecordingStore {
    pub fn new() -> Self {
        Self { inner: MemoryStore::new(100), ..Default::default() }
    }

    /// Recording store that reports itself as holding nothing
    pub fn noop() -> Self {
        Self { noop: true, ..Self::new() }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn last_mutation(&self) -> Option<MutationEvent> {
        self.last_mutation.lock().clone()
    }

    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    /// Make both `invalidate` and `on_mutate` fail
    pub fn fail_invalidations(&self) {
        self.fail_invalidations.store(true, Ordering::SeqCst);
    }

    fn invalidation_failure(&self) -> Result<(), CacheError> {
        if self.fail_invalidations.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<Row>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("read timed out".to_string()));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(CacheError::Backend("write timed out".to_string()));
        }
        self.inner.put(key, entry).await
    }

    async fn invalidate(&self, target: &Invalidation) -> Result<(), CacheError> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.invalidation_failure()?;
        self.inner.invalidate(target).await
    }

    async fn on_mutate(&self, event: &MutationEvent) -> Result<(), CacheError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        *self.last_mutation.lock() = Some(event.clone());
        self.invalidation_failure()?;
        self.inner.on_mutate(event).await
    }

    fn is_noop(&self) -> bool {
        self.noop
    }
}

/// Fresh cache over a mock driver and a recording store
#[allow(dead_code)] // Test helper - available for all test modules
pub fn setup(strategy: CacheStrategy) -> (QueryCache, Arc<MockDriver>, Arc<RecordingStore>) {
    setup_with(strategy, RecordingStore::new())
}

#[allow(dead_code)] // Test helper - available for all test modules
pub fn setup_with(
    strategy: CacheStrategy,
    store: RecordingStore,
) -> (QueryCache, Arc<MockDriver>, Arc<RecordingStore>) {
    let driver = Arc::new(MockDriver::returning(vec![user_row(1, "alice")]));
    let store = Arc::new(store);

    let db_driver: Arc<dyn Driver> = driver.clone();
    let db_store: Arc<dyn CacheStore> = store.clone();
    let db = QueryCache::new(db_driver, CacheSetup::with_strategy(db_store, strategy));

    (db, driver, store)
}

#[allow(dead_code)] // Test helper - available for all test modules
pub fn user_row(id: i32, name: &str) -> Row {
    Row::new(vec![SqlValue::Integer(id), SqlValue::Varchar(name.to_string())])
}

#[allow(dead_code)] // Test helper - available for all test modules
pub fn users() -> Table {
    Table::new("users")
}

/// `select * from "users"`
#[allow(dead_code)] // Test helper - available for all test modules
pub fn select_users() -> CompiledQuery {
    CompiledQuery::new("select * from \"users\"", Vec::new(), SelectStmt::from_table(&users()))
}

/// `select * from "users" where "id" = $1`
#[allow(dead_code)] // Test helper - available for all test modules
pub fn select_user_by_id(id: i32) -> CompiledQuery {
    let stmt = SelectStmt::from_table(&users())
        .filter(Expression::eq(Expression::column("users", "id"), Expression::Placeholder(0)));
    CompiledQuery::new("select * from \"users\" where \"id\" = $1", vec![SqlValue::Integer(id)], stmt)
}

/// `insert into "users" ("id", "name") values ($1, $2)`
#[allow(dead_code)] // Test helper - available for all test modules
pub fn insert_user(id: i32, name: &str) -> CompiledQuery {
    let stmt = InsertStmt::values(
        &users(),
        &["id", "name"],
        vec![vec![Expression::Placeholder(0), Expression::Placeholder(1)]],
    );
    CompiledQuery::new(
        "insert into \"users\" (\"id\", \"name\") values ($1, $2)",
        vec![SqlValue::Integer(id), SqlValue::Varchar(name.to_string())],
        stmt,
    )
}
