use log::{error, info, log, Level};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use super::error::{DbError, DbResult};
use super::value::{Row, SqlValue};
use crate::config::ConnectionInfo;

/// File extension of on-disk databases inside the data directory
pub const DATABASE_EXT: &str = "sqlite3";

const MAIN_SCHEMA: &str = "main";
const RESERVED_SCHEMAS: &[&str] = &["main", "temp"];

/// One row of `pragma_table_info`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub position: i64,
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
    pub name: String,
    pub rows: u64,
}

/// Primary key and insertable columns of a table, in declaration order
#[derive(Debug, Clone)]
struct TableColumns {
    key: String,
    data: Vec<String>,
}

enum Outcome {
    Changed(usize),
    Rows(VecDeque<Row>),
}

/// A single SQLite connection with a buffered cursor.
///
/// Each named database is attached under its own schema name. Unqualified
/// operations act on the current database (see [`Database::use_database`]);
/// operations taking `database: Option<&str>` act on that database without
/// changing the current one.
pub struct Database {
    conn: Connection,
    data_dir: Option<PathBuf>,
    current: Option<String>,
    autocommit: bool,
    cursor: VecDeque<Row>,
    columns: HashMap<(String, String), TableColumns>,
}

impl Database {
    /// Open the connection and, if `info.database` is set, create it when
    /// missing and make it current.
    pub fn connect(info: &ConnectionInfo) -> DbResult<Self> {
        let encoding = normalize_encoding(&info.encoding).map_err(|e| fail("connect", e))?;

        if let Some(dir) = &info.data_dir {
            fs::create_dir_all(dir).map_err(|e| fail("connect", e.into()))?;
        }

        let conn = Connection::open_in_memory()
            .map_err(|e| fail("connect", DbError::Connection(e)))?;
        conn.execute_batch(&format!(
            "PRAGMA encoding = '{}'; PRAGMA foreign_keys = ON;",
            encoding
        ))
        .map_err(|e| fail("connect", DbError::Connection(e)))?;

        let mut db = Self {
            conn,
            data_dir: info.data_dir.clone(),
            current: None,
            autocommit: info.autocommit,
            cursor: VecDeque::new(),
            columns: HashMap::new(),
        };

        if let Some(name) = &info.database {
            if !db.database_exist(name)? {
                db.create_database(name)?;
            }
            db.use_database(name)?;
        }

        info!(
            "connect:Connection opened:(data_dir={:?}, database={:?}, encoding={})",
            info.data_dir, info.database, encoding
        );

        Ok(db)
    }

    pub fn current_database(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Make `name` the current database, attaching it first if it exists on
    /// disk but is not attached yet.
    pub fn use_database(&mut self, name: &str) -> DbResult<()> {
        let ident = quote_ident(name).map_err(|e| fail("use", e))?;

        if !self.is_attached(name)? {
            match self.database_path(name) {
                Some(path) if path.exists() => self.attach(name, &path.to_string_lossy())?,
                _ => return Err(fail("use", DbError::NotFound(format!("database {}", name)))),
            }
        }

        self.current = Some(name.to_string());
        info!("use:USE {}", ident);
        Ok(())
    }

    /// Commit anything pending and close the connection
    pub fn close(self) -> DbResult<()> {
        if self.in_transaction() {
            self.run("close", "COMMIT", |c| c.execute_batch("COMMIT"))?;
        }

        let current = self.current.clone();
        self.conn
            .close()
            .map_err(|(_, e)| fail("close", DbError::Connection(e)))?;
        info!("close:Closed database ({:?})", current);
        Ok(())
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    /// Commit the open transaction. With autocommit off the next write
    /// starts a new one.
    pub fn commit(&mut self) -> DbResult<()> {
        if !self.in_transaction() {
            info!("commit:nothing to commit");
            return Ok(());
        }

        self.run("commit", "COMMIT", |c| c.execute_batch("COMMIT"))
    }

    /// Discard the open transaction
    pub fn rollback(&mut self) -> DbResult<()> {
        if !self.in_transaction() {
            info!("rollback:nothing to roll back");
            return Ok(());
        }

        self.run("rollback", "ROLLBACK", |c| c.execute_batch("ROLLBACK"))
    }

    /// Turning autocommit on commits whatever is pending. Turning it off only
    /// takes effect at the next write, which opens the transaction.
    pub fn set_autocommit(&mut self, autocommit: bool) -> DbResult<()> {
        if autocommit && self.in_transaction() {
            self.run("set_autocommit", "COMMIT", |c| c.execute_batch("COMMIT"))?;
        } else {
            info!("set_autocommit:{}", autocommit);
        }

        self.autocommit = autocommit;
        Ok(())
    }

    /// Run one statement with positional parameters (`?1`, `?2`, ...).
    ///
    /// Rows produced by the statement replace the cursor contents. Returns the
    /// number of rows fetched, or changed for statements without a result set.
    pub fn execute(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.cursor.clear();

        let begin = !self.autocommit;
        let (outcome, readonly) = self.run_at(Level::Debug, "execute", sql, |c| {
            run_statement(c, sql, params, begin)
        })?;

        // Any write may have been DDL
        if !readonly {
            self.columns.clear();
        }

        Ok(match outcome {
            Outcome::Changed(count) => count,
            Outcome::Rows(rows) => {
                let count = rows.len();
                self.cursor = rows;
                count
            }
        })
    }

    pub fn fetchone(&mut self) -> Option<Row> {
        self.cursor.pop_front()
    }

    pub fn fetchall(&mut self) -> Vec<Row> {
        self.cursor.drain(..).collect()
    }

    /// `schema.table` for the current database, quoted for use in SQL
    pub fn qualify(&self, table: &str) -> DbResult<String> {
        self.qualified(table, None)
    }

    // =========================================================================
    // Schema operations
    // =========================================================================

    pub fn create_database(&mut self, name: &str) -> DbResult<()> {
        check_schema_name(name).map_err(|e| fail("create_database", e))?;

        if self.database_exist(name)? {
            return Err(fail(
                "create_database",
                DbError::AlreadyExists(format!("database {}", name)),
            ));
        }

        let target = self
            .database_path(name)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ":memory:".to_string());

        self.attach(name, &target)
    }

    /// Detach the database and delete its file
    pub fn drop_database(&mut self, name: &str) -> DbResult<()> {
        let ident = check_schema_name(name).map_err(|e| fail("drop_database", e))?;

        let attached = self.is_attached(name)?;
        let path = self.database_path(name).filter(|p| p.exists());

        if !attached && path.is_none() {
            return Err(fail(
                "drop_database",
                DbError::NotFound(format!("database {}", name)),
            ));
        }

        if attached {
            let sql = format!("DETACH DATABASE {}", ident);
            self.run("drop_database", &sql, |c| c.execute_batch(&sql))?;
        }

        if let Some(path) = path {
            fs::remove_file(&path).map_err(|e| fail("drop_database", e.into()))?;
            info!("drop_database:removed {:?}", path);
        }

        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        self.columns.retain(|(schema, _), _| schema != name);

        Ok(())
    }

    /// `definition` is the body of the CREATE TABLE statement
    pub fn create_table(
        &mut self,
        table: &str,
        definition: &str,
        database: Option<&str>,
    ) -> DbResult<()> {
        let target = self
            .qualified(table, database)
            .map_err(|e| fail("create_table", e))?;
        let sql = format!("CREATE TABLE {} ({})", target, definition);

        self.begin_write("create_table")?;
        self.run("create_table", &sql, |c| c.execute_batch(&sql))?;
        self.forget_columns(table, database);
        Ok(())
    }

    pub fn drop_table(&mut self, table: &str, database: Option<&str>) -> DbResult<()> {
        let target = self
            .qualified(table, database)
            .map_err(|e| fail("drop_table", e))?;
        let sql = format!("DROP TABLE {}", target);

        self.begin_write("drop_table")?;
        self.run("drop_table", &sql, |c| c.execute_batch(&sql))?;
        self.forget_columns(table, database);
        Ok(())
    }

    pub fn create_index(
        &mut self,
        table: &str,
        column: &str,
        index: &str,
        database: Option<&str>,
    ) -> DbResult<()> {
        let sql = (|| -> DbResult<String> {
            Ok(format!(
                "CREATE INDEX {}.{} ON {}({})",
                self.schema(database)?,
                quote_ident(index)?,
                quote_ident(table)?,
                quote_ident(column)?
            ))
        })()
        .map_err(|e| fail("create_index", e))?;

        self.begin_write("create_index")?;
        self.run("create_index", &sql, |c| c.execute_batch(&sql))
    }

    pub fn drop_index(&mut self, table: &str, index: &str, database: Option<&str>) -> DbResult<()> {
        if !self.index_exist(table, index, database)? {
            return Err(fail(
                "drop_index",
                DbError::NotFound(format!("index {} on {}", index, table)),
            ));
        }

        let sql = format!("DROP INDEX {}.{}", self.schema(database)?, quote_ident(index)?);
        self.begin_write("drop_index")?;
        self.run("drop_index", &sql, |c| c.execute_batch(&sql))
    }

    // =========================================================================
    // Existence checks
    // =========================================================================

    pub fn database_exist(&self, name: &str) -> DbResult<bool> {
        quote_ident(name).map_err(|e| fail("database_exist", e))?;

        if self.is_attached(name)? {
            return Ok(true);
        }
        Ok(self.database_path(name).is_some_and(|p| p.exists()))
    }

    pub fn table_exist(&self, table: &str, database: Option<&str>) -> DbResult<bool> {
        let schema = self.schema(database).map_err(|e| fail("table_exist", e))?;
        let sql = format!(
            "SELECT 1 FROM {}.sqlite_master WHERE type = 'table' AND name = ?1",
            schema
        );

        let found = self.run_at(Level::Debug, "table_exist", &sql, |c| {
            c.query_row(&sql, [table], |_| Ok(())).optional()
        })?;
        Ok(found.is_some())
    }

    pub fn index_exist(&self, table: &str, index: &str, database: Option<&str>) -> DbResult<bool> {
        let schema = self.schema(database).map_err(|e| fail("index_exist", e))?;
        let sql = format!(
            "SELECT 1 FROM {}.sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND name = ?2",
            schema
        );

        let found = self.run_at(Level::Debug, "index_exist", &sql, |c| {
            c.query_row(&sql, [table, index], |_| Ok(())).optional()
        })?;
        Ok(found.is_some())
    }

    pub fn row_exist(&mut self, table: &str, id: i64) -> DbResult<bool> {
        let columns = self.table_columns(table).map_err(|e| fail("row_exist", e))?;
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ?1",
            self.qualify(table)?,
            quote_column(&columns.key)
        );

        let found = self.run_at(Level::Debug, "row_exist", &sql, |c| {
            c.query_row(&sql, [id], |_| Ok(())).optional()
        })?;
        Ok(found.is_some())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Attached databases plus any database files in the data directory
    pub fn get_databases(&self) -> DbResult<Vec<String>> {
        let sql = "SELECT name FROM pragma_database_list WHERE name NOT IN ('main', 'temp')";
        let mut names: BTreeSet<String> = self
            .run_at(Level::Debug, "get_databases", sql, |c| query_strings(c, sql, []))?
            .into_iter()
            .collect();

        if let Some(dir) = &self.data_dir {
            for entry in fs::read_dir(dir).map_err(|e| fail("get_databases", e.into()))? {
                let path = entry.map_err(|e| fail("get_databases", e.into()))?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(DATABASE_EXT) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_string());
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    pub fn get_tables(&self, database: Option<&str>) -> DbResult<Vec<String>> {
        let schema = self.schema(database).map_err(|e| fail("get_tables", e))?;
        let sql = format!(
            "SELECT name FROM {}.sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            schema
        );

        self.run_at(Level::Debug, "get_tables", &sql, |c| query_strings(c, &sql, []))
    }

    pub fn get_columns_metadata(
        &self,
        table: &str,
        database: Option<&str>,
    ) -> DbResult<Vec<ColumnInfo>> {
        let schema = self
            .schema_name(database)
            .map_err(|e| fail("get_columns_metadata", e))?;
        let sql = "SELECT cid, name, type, \"notnull\", dflt_value, pk \
                   FROM pragma_table_info(?1, ?2) ORDER BY cid";

        let columns = self.run_at(Level::Debug, "get_columns_metadata", sql, |c| {
            let mut stmt = c.prepare(sql)?;
            let columns = stmt
                .query_map([table, schema], |row| {
                    Ok(ColumnInfo {
                        position: row.get(0)?,
                        name: row.get(1)?,
                        data_type: row.get(2)?,
                        not_null: row.get::<_, i64>(3)? != 0,
                        default: row.get(4)?,
                        primary_key: row.get::<_, i64>(5)? > 0,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>();
            columns
        })?;

        if columns.is_empty() {
            return Err(fail(
                "get_columns_metadata",
                DbError::NotFound(format!("table {}.{}", schema, table)),
            ));
        }
        Ok(columns)
    }

    pub fn get_column_metadata(
        &self,
        table: &str,
        column: &str,
        database: Option<&str>,
    ) -> DbResult<ColumnInfo> {
        self.get_columns_metadata(table, database)?
            .into_iter()
            .find(|c| c.name == column)
            .ok_or_else(|| {
                fail(
                    "get_column_metadata",
                    DbError::NotFound(format!("column {}.{}", table, column)),
                )
            })
    }

    /// Row counts for one table, or every table when `table` is `None`
    pub fn get_table_status(
        &self,
        table: Option<&str>,
        database: Option<&str>,
    ) -> DbResult<Vec<TableStatus>> {
        let tables = match table {
            Some(name) => {
                if !self.table_exist(name, database)? {
                    return Err(fail(
                        "get_table_status",
                        DbError::NotFound(format!("table {}", name)),
                    ));
                }
                vec![name.to_string()]
            }
            None => self.get_tables(database)?,
        };

        tables
            .into_iter()
            .map(|name| {
                let sql = format!("SELECT COUNT(*) FROM {}", self.qualified(&name, database)?);
                let rows: i64 = self.run_at(Level::Debug, "get_table_status", &sql, |c| {
                    c.query_row(&sql, [], |row| row.get(0))
                })?;
                Ok(TableStatus {
                    name,
                    rows: rows as u64,
                })
            })
            .collect()
    }

    pub fn row_count(&self, table: &str, database: Option<&str>) -> DbResult<u64> {
        Ok(self
            .get_table_status(Some(table), database)?
            .first()
            .map(|s| s.rows)
            .unwrap_or(0))
    }

    // =========================================================================
    // Row operations
    // =========================================================================

    /// Insert `values` positionally into every non-primary-key column of
    /// `table` and return the generated id
    pub fn insert_row(&mut self, table: &str, values: &[SqlValue]) -> DbResult<i64> {
        let columns = self.table_columns(table).map_err(|e| fail("insert_row", e))?;
        check_arity(table, &columns, values).map_err(|e| fail("insert_row", e))?;

        let names: Vec<String> = columns.data.iter().map(|n| quote_column(n)).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.qualify(table)?,
            names.join(", "),
            placeholders.join(", ")
        );

        self.begin_write("insert_row")?;
        self.run_at(Level::Debug, "insert_row", &sql, |c| {
            c.prepare_cached(&sql)?.execute(params_from_iter(values))
        })?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every non-primary-key column of row `id`, positionally
    pub fn update_row(&mut self, table: &str, id: i64, values: &[SqlValue]) -> DbResult<()> {
        let columns = self.table_columns(table).map_err(|e| fail("update_row", e))?;
        check_arity(table, &columns, values).map_err(|e| fail("update_row", e))?;

        let assignments: Vec<String> = columns
            .data
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{} = ?{}", quote_column(n), i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            self.qualify(table)?,
            assignments.join(", "),
            quote_column(&columns.key),
            values.len() + 1
        );

        let id_value = SqlValue::Integer(id);
        self.begin_write("update_row")?;
        let changed = self.run_at(Level::Debug, "update_row", &sql, |c| {
            c.prepare_cached(&sql)?
                .execute(params_from_iter(values.iter().chain(iter::once(&id_value))))
        })?;

        if changed == 0 {
            return Err(fail(
                "update_row",
                DbError::NotFound(format!("row {} in {}", id, table)),
            ));
        }
        Ok(())
    }

    pub fn delete_row(&mut self, table: &str, id: i64) -> DbResult<()> {
        let columns = self.table_columns(table).map_err(|e| fail("delete_row", e))?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            self.qualify(table)?,
            quote_column(&columns.key)
        );

        self.begin_write("delete_row")?;
        let changed = self.run_at(Level::Debug, "delete_row", &sql, |c| c.execute(&sql, [id]))?;
        if changed == 0 {
            return Err(fail(
                "delete_row",
                DbError::NotFound(format!("row {} in {}", id, table)),
            ));
        }
        Ok(())
    }

    /// Write a compacted copy of the database to
    /// `<dest_dir>/<name>_<timestamp>.sqlite3`. Pending work is committed
    /// first since VACUUM cannot run inside a transaction.
    pub fn dump(&mut self, database: Option<&str>, dest_dir: &Path) -> DbResult<PathBuf> {
        let name = self.schema_name(database).map_err(|e| fail("dump", e))?;
        fs::create_dir_all(dest_dir).map_err(|e| fail("dump", e.into()))?;

        let stamp = chrono::Local::now().format("%Y-%m-%d_%H%M%S");
        let dest = dest_dir.join(format!("{}_{}.{}", name, stamp, DATABASE_EXT));
        let sql = format!(
            "VACUUM {} INTO '{}'",
            quote_ident(name)?,
            dest.to_string_lossy().replace('\'', "''")
        );

        self.commit()?;
        self.run("dump", &sql, |c| c.execute_batch(&sql))?;
        Ok(dest)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// With autocommit off, open the transaction the next write joins
    fn begin_write(&self, op: &str) -> DbResult<()> {
        if self.autocommit || self.in_transaction() {
            return Ok(());
        }
        self.run(op, "BEGIN", |c| c.execute_batch("BEGIN"))
    }

    fn run<T>(
        &self,
        op: &str,
        sql: &str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> DbResult<T> {
        self.run_at(Level::Info, op, sql, f)
    }

    fn run_at<T>(
        &self,
        level: Level,
        op: &str,
        sql: &str,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> DbResult<T> {
        match f(&self.conn) {
            Ok(value) => {
                log!(level, "{}:{}", op, sql);
                Ok(value)
            }
            Err(source) => {
                error!("{}:{}:{}", op, source, sql);
                Err(DbError::Query {
                    sql: sql.to_string(),
                    source,
                })
            }
        }
    }

    fn attach(&mut self, name: &str, target: &str) -> DbResult<()> {
        let sql = format!("ATTACH DATABASE ?1 AS {}", quote_ident(name)?);
        self.run("attach", &sql, |c| c.execute(&sql, [target]).map(|_| ()))
    }

    fn is_attached(&self, name: &str) -> DbResult<bool> {
        let sql = "SELECT 1 FROM pragma_database_list WHERE name = ?1";
        let found = self.run_at(Level::Debug, "database_exist", sql, |c| {
            c.query_row(sql, [name], |_| Ok(())).optional()
        })?;
        Ok(found.is_some())
    }

    fn database_path(&self, name: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.{}", name, DATABASE_EXT)))
    }

    fn schema_name<'a>(&'a self, database: Option<&'a str>) -> DbResult<&'a str> {
        let name = database
            .or(self.current.as_deref())
            .unwrap_or(MAIN_SCHEMA);
        quote_ident(name)?;
        Ok(name)
    }

    fn schema(&self, database: Option<&str>) -> DbResult<String> {
        quote_ident(self.schema_name(database)?)
    }

    fn qualified(&self, table: &str, database: Option<&str>) -> DbResult<String> {
        Ok(format!("{}.{}", self.schema(database)?, quote_ident(table)?))
    }

    fn table_columns(&mut self, table: &str) -> DbResult<TableColumns> {
        let key = (self.schema_name(None)?.to_string(), table.to_string());
        if let Some(columns) = self.columns.get(&key) {
            return Ok(columns.clone());
        }

        let metadata = self.get_columns_metadata(table, None)?;
        let primary = metadata
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "rowid".to_string());
        let columns = TableColumns {
            key: primary,
            data: metadata
                .into_iter()
                .filter(|c| !c.primary_key)
                .map(|c| c.name)
                .collect(),
        };

        self.columns.insert(key, columns.clone());
        Ok(columns)
    }

    fn forget_columns(&mut self, table: &str, database: Option<&str>) {
        let schema = database
            .or(self.current.as_deref())
            .unwrap_or(MAIN_SCHEMA)
            .to_string();
        self.columns.remove(&(schema, table.to_string()));
    }
}

/// Double-quote an identifier after checking it only holds `[A-Za-z0-9_]`
pub fn quote_ident(name: &str) -> DbResult<String> {
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(DbError::InvalidName(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}

/// Quote a column name read back from the catalog
fn quote_column(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn check_schema_name(name: &str) -> DbResult<String> {
    if RESERVED_SCHEMAS.contains(&name.to_ascii_lowercase().as_str()) {
        return Err(DbError::InvalidName(name.to_string()));
    }
    quote_ident(name)
}

fn check_arity(table: &str, columns: &TableColumns, values: &[SqlValue]) -> DbResult<()> {
    if columns.data.len() != values.len() {
        return Err(DbError::ColumnCount {
            table: table.to_string(),
            expected: columns.data.len(),
            got: values.len(),
        });
    }
    Ok(())
}

fn fail(op: &str, err: DbError) -> DbError {
    error!("{}:{}", op, err);
    err
}

fn normalize_encoding(charset: &str) -> DbResult<&'static str> {
    let key: String = charset
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match key.as_str() {
        "utf8" | "utf8mb4" => Ok("UTF-8"),
        "utf16" => Ok("UTF-16"),
        "utf16le" => Ok("UTF-16le"),
        "utf16be" => Ok("UTF-16be"),
        _ => Err(DbError::UnsupportedEncoding(charset.to_string())),
    }
}

/// Returns the outcome and whether the statement was read-only. With
/// `begin` set, a write outside a transaction opens one first.
fn run_statement(
    conn: &Connection,
    sql: &str,
    params: &[SqlValue],
    begin: bool,
) -> rusqlite::Result<(Outcome, bool)> {
    let mut stmt = conn.prepare_cached(sql)?;
    let readonly = stmt.readonly();
    let width = stmt.column_count();

    if begin && !readonly && conn.is_autocommit() {
        conn.execute_batch("BEGIN")?;
    }

    if width == 0 {
        let changed = stmt.execute(params_from_iter(params))?;
        return Ok((Outcome::Changed(changed), readonly));
    }

    let mut fetched = VecDeque::new();
    let mut rows = stmt.query(params_from_iter(params))?;
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|idx| row.get::<_, SqlValue>(idx))
            .collect::<rusqlite::Result<Row>>()?;
        fetched.push_back(values);
    }

    Ok((Outcome::Rows(fetched), readonly))
}

fn query_strings<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let names = stmt
        .query_map(params, |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>();
    names
}
