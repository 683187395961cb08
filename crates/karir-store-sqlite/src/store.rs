//! [`SqliteStore`], the SQLite implementation of [`CareerStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, functions::FunctionFlags, types::Value};
use uuid::Uuid;

use karir_core::{
  access::AccessFilter,
  account::{NewUser, Session, User, UserCredentials},
  alumni::{AlumniDetails, AlumniProfile, NewAlumni},
  employment::{EmploymentDetails, EmploymentRecord, NewEmployment},
  identity::Identity,
  lifecycle::{LifecycleState, Transition},
  query::{ListView, RecordPage, RecordQuery, RecordSelector, SortKey},
  store::CareerStore,
};

use crate::{
  Error, Result,
  encode::{
    ALUMNI_COLUMNS, EMPLOYMENT_COLUMNS, RawAlumni, RawEmployment, RawUser,
    decode_role, decode_uuid, encode_date, encode_dt, encode_status,
    encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Karir store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised onto one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// SQL functions the queries below rely on. Registered per connection.
///
/// `lower_unicode(text)` folds case over the whole of Unicode; the built-in
/// `lower()` and `LIKE` only fold ASCII.
fn register_functions(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "lower_unicode",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// Append the ownership predicate for `access` to `sql`.
fn push_access(sql: &mut String, params: &mut Vec<Value>, access: AccessFilter) {
  match access {
    AccessFilter::Unrestricted => {}
    AccessFilter::Alumni(alumni_id) => {
      sql.push_str(" AND alumni_id = ?");
      params.push(Value::Text(encode_uuid(alumni_id)));
    }
    AccessFilter::Nothing => sql.push_str(" AND 1 = 0"),
  }
}

fn push_state(sql: &mut String, state: LifecycleState) {
  sql.push_str(match state {
    LifecycleState::Active => " AND deleted_at IS NULL",
    LifecycleState::Trashed => " AND deleted_at IS NOT NULL",
  });
}

/// `WHERE` clause matching exactly the record a selector names.
fn selector_clause(selector: &RecordSelector, params: &mut Vec<Value>) -> String {
  let mut sql = String::from(" WHERE employment_id = ?");
  params.push(Value::Text(encode_uuid(selector.employment_id)));
  push_access(&mut sql, params, selector.access);
  if let Some(state) = selector.state {
    push_state(&mut sql, state);
  }
  sql
}

/// Escape `LIKE` metacharacters so user input only ever matches literally.
fn like_pattern(search: &str) -> String {
  let mut pattern = String::with_capacity(search.len() + 2);
  pattern.push('%');
  for c in search.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

/// Columns searched by each view.
fn search_columns(view: ListView) -> &'static [&'static str] {
  match view {
    ListView::Active => &["company", "position", "industry", "location"],
    ListView::Trash => &["company", "position"],
  }
}

/// `WHERE` clause shared by the count and window queries of a listing.
fn query_clause(query: &RecordQuery, params: &mut Vec<Value>) -> String {
  let mut sql = String::from(" WHERE 1 = 1");
  push_state(&mut sql, query.view.state());
  push_access(&mut sql, params, query.access);
  if let Some(search) = query.search.as_deref() {
    let pattern = like_pattern(&search.to_lowercase());
    let ors = search_columns(query.view)
      .iter()
      .map(|col| {
        params.push(Value::Text(pattern.clone()));
        format!("lower_unicode({col}) LIKE ? ESCAPE '\\'")
      })
      .collect::<Vec<_>>()
      .join(" OR ");
    sql.push_str(" AND (");
    sql.push_str(&ors);
    sql.push(')');
  }
  sql
}

/// Column name for a sort key. Only these fixed identifiers ever reach the
/// `ORDER BY` clause.
fn sort_column(key: SortKey) -> &'static str {
  match key {
    SortKey::Id => "employment_id",
    SortKey::Company => "company",
    SortKey::Position => "position",
    SortKey::StartDate => "start_date",
    SortKey::CreatedAt => "created_at",
    SortKey::DeletedAt => "deleted_at",
  }
}

fn to_count(n: usize) -> u64 { n as u64 }

// ─── CareerStore impl ────────────────────────────────────────────────────────

impl CareerStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      username:   input.username,
      email:      input.email,
      role:       input.role,
      created_at: now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let email    = user.email.clone();
    let hash     = input.password_hash;
    let role     = user.role.as_str();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, email, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, username, email, hash, role, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(user_id = %user.user_id, "user added");
    Ok(user)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username, email, role, created_at
             FROM users WHERE user_id = ?1",
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_login(&self, login: String) -> Result<Option<UserCredentials>> {
    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username, email, role, created_at, password_hash
             FROM users WHERE username = ?1 OR email = ?1",
            rusqlite::params![login],
            |row| Ok((RawUser::from_row(row)?, row.get(5)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(user, password_hash)| {
        Ok(UserCredentials { user: user.into_user()?, password_hash })
      })
      .transpose()
  }

  async fn create_session(&self, session: Session) -> Result<()> {
    let user_str    = encode_uuid(session.user_id);
    let issued_str  = encode_dt(session.issued_at);
    let expires_str = encode_dt(session.expires_at);
    let hash        = session.token_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, issued_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash, user_str, issued_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn resolve_session(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> Result<Option<Identity>> {
    let now_str = encode_dt(now);

    let raw: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT u.user_id, u.role
             FROM sessions s JOIN users u ON u.user_id = s.user_id
             WHERE s.token_hash = ?1 AND s.expires_at > ?2",
            rusqlite::params![token_hash, now_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(id, role)| {
        Ok(Identity { subject_id: decode_uuid(&id)?, role: decode_role(&role)? })
      })
      .transpose()
  }

  async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(to_count(removed))
  }

  // ── Alumni profiles ───────────────────────────────────────────────────────

  async fn add_alumni(&self, input: NewAlumni) -> Result<AlumniProfile> {
    let at = now();
    let profile = AlumniProfile {
      alumni_id:       Uuid::new_v4(),
      student_number:  input.details.student_number,
      name:            input.details.name,
      major:           input.details.major,
      entry_year:      input.details.entry_year,
      graduation_year: input.details.graduation_year,
      email:           input.details.email,
      phone:           input.details.phone,
      address:         input.details.address,
      user_id:         input.user_id,
      created_at:      at,
      updated_at:      at,
    };

    let row = profile.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO alumni (
             alumni_id, student_number, name, major, entry_year,
             graduation_year, email, phone, address, user_id,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            encode_uuid(row.alumni_id),
            row.student_number,
            row.name,
            row.major,
            row.entry_year,
            row.graduation_year,
            row.email,
            row.phone,
            row.address,
            row.user_id.map(encode_uuid),
            encode_dt(row.created_at),
            encode_dt(row.updated_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(alumni_id = %profile.alumni_id, "alumni profile added");
    Ok(profile)
  }

  async fn get_alumni(&self, alumni_id: Uuid) -> Result<Option<AlumniProfile>> {
    let id_str = encode_uuid(alumni_id);

    let raw: Option<RawAlumni> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ALUMNI_COLUMNS} FROM alumni WHERE alumni_id = ?1"),
            rusqlite::params![id_str],
            RawAlumni::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAlumni::into_profile).transpose()
  }

  async fn find_alumni_by_user(&self, user_id: Uuid) -> Result<Option<AlumniProfile>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawAlumni> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ALUMNI_COLUMNS} FROM alumni WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawAlumni::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAlumni::into_profile).transpose()
  }

  async fn update_alumni(
    &self,
    alumni_id: Uuid,
    details: AlumniDetails,
    at: DateTime<Utc>,
  ) -> Result<Option<AlumniProfile>> {
    let id_str = encode_uuid(alumni_id);
    let at_str = encode_dt(at);

    let raw: Option<RawAlumni> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE alumni SET
             student_number = ?1, name = ?2, major = ?3, entry_year = ?4,
             graduation_year = ?5, email = ?6, phone = ?7, address = ?8,
             updated_at = ?9
           WHERE alumni_id = ?10",
          rusqlite::params![
            details.student_number,
            details.name,
            details.major,
            details.entry_year,
            details.graduation_year,
            details.email,
            details.phone,
            details.address,
            at_str,
            id_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {ALUMNI_COLUMNS} FROM alumni WHERE alumni_id = ?1"),
            rusqlite::params![id_str],
            RawAlumni::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAlumni::into_profile).transpose()
  }

  async fn delete_alumni(&self, alumni_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(alumni_id);

    let (records, deleted): (i64, usize) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let records: i64 = tx.query_row(
          "SELECT COUNT(*) FROM employment WHERE alumni_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;
        if records > 0 {
          return Ok((records, 0));
        }
        let deleted = tx.execute(
          "DELETE FROM alumni WHERE alumni_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok((0, deleted))
      })
      .await?;

    if records > 0 {
      return Err(Error::ProfileInUse { alumni_id, records: records as u64 });
    }
    if deleted > 0 {
      tracing::debug!(%alumni_id, "alumni profile deleted");
    }
    Ok(to_count(deleted))
  }

  // ── Employment records ────────────────────────────────────────────────────

  async fn insert_employment(&self, input: NewEmployment) -> Result<EmploymentRecord> {
    let at = now();
    let record = EmploymentRecord {
      employment_id: Uuid::new_v4(),
      alumni_id:     input.alumni_id,
      details:       input.details,
      created_at:    at,
      updated_at:    at,
      deleted_at:    None,
    };

    let id_str     = encode_uuid(record.employment_id);
    let alumni_str = encode_uuid(record.alumni_id);
    let at_str     = encode_dt(at);
    let d          = record.details.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employment (
             employment_id, alumni_id, company, position, industry, location,
             salary_range, start_date, end_date, status, description,
             created_at, updated_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12, NULL)",
          rusqlite::params![
            id_str,
            alumni_str,
            d.company,
            d.position,
            d.industry,
            d.location,
            d.salary_range,
            encode_date(d.start_date),
            d.end_date.map(encode_date),
            encode_status(d.status),
            d.description,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get_employment(&self, employment_id: Uuid) -> Result<Option<EmploymentRecord>> {
    let id_str = encode_uuid(employment_id);

    let raw: Option<RawEmployment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {EMPLOYMENT_COLUMNS} FROM employment WHERE employment_id = ?1"),
            rusqlite::params![id_str],
            RawEmployment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEmployment::into_record).transpose()
  }

  async fn list_employment_for_alumni(&self, alumni_id: Uuid) -> Result<Vec<EmploymentRecord>> {
    let id_str = encode_uuid(alumni_id);

    let raws: Vec<RawEmployment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EMPLOYMENT_COLUMNS} FROM employment
           WHERE alumni_id = ?1 AND deleted_at IS NULL
           ORDER BY created_at ASC, employment_id ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawEmployment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployment::into_record).collect()
  }

  async fn list_employment<'a>(&'a self, query: &'a RecordQuery) -> Result<RecordPage> {
    let mut params = Vec::new();
    let clause = query_clause(query, &mut params);
    let count_sql = format!("SELECT COUNT(*) FROM employment{clause}");
    let count_params = params.clone();
    let window_sql = format!(
      "SELECT {EMPLOYMENT_COLUMNS} FROM employment{clause}
       ORDER BY {} {}, employment_id {} LIMIT ? OFFSET ?",
      sort_column(query.sort),
      query.order.as_str(),
      query.order.as_str(),
    );
    params.push(Value::Integer(i64::from(query.limit)));
    params.push(Value::Integer(i64::try_from(query.offset).unwrap_or(i64::MAX)));

    // Count and window share one read transaction, so the total always
    // describes the rows returned.
    let (total, raws): (i64, Vec<RawEmployment>) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let total = tx.query_row(
          &count_sql,
          rusqlite::params_from_iter(count_params.iter()),
          |r| r.get(0),
        )?;
        let rows = {
          let mut stmt = tx.prepare(&window_sql)?;
          stmt
            .query_map(rusqlite::params_from_iter(params.iter()), RawEmployment::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok((total, rows))
      })
      .await?;

    Ok(RecordPage {
      total: total.max(0) as u64,
      items: raws
        .into_iter()
        .map(RawEmployment::into_record)
        .collect::<Result<_>>()?,
    })
  }

  async fn update_employment(
    &self,
    selector: RecordSelector,
    details: EmploymentDetails,
    at: DateTime<Utc>,
  ) -> Result<Option<EmploymentRecord>> {
    let mut params = vec![
      Value::Text(details.company),
      Value::Text(details.position),
      Value::Text(details.industry),
      Value::Text(details.location),
      details.salary_range.map_or(Value::Null, Value::Text),
      Value::Text(encode_date(details.start_date)),
      details.end_date.map_or(Value::Null, |d| Value::Text(encode_date(d))),
      Value::Text(encode_status(details.status).to_owned()),
      details.description.map_or(Value::Null, Value::Text),
      Value::Text(encode_dt(at)),
    ];
    let update = format!(
      "UPDATE employment SET
         company = ?, position = ?, industry = ?, location = ?,
         salary_range = ?, start_date = ?, end_date = ?, status = ?,
         description = ?, updated_at = ?{}",
      selector_clause(&selector, &mut params)
    );
    let id_str = encode_uuid(selector.employment_id);

    // Update and re-read on the same connection call so no other write can
    // land in between.
    let raw: Option<RawEmployment> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(&update, rusqlite::params_from_iter(params.iter()))?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(conn
          .query_row(
            &format!("SELECT {EMPLOYMENT_COLUMNS} FROM employment WHERE employment_id = ?1"),
            rusqlite::params![id_str],
            RawEmployment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEmployment::into_record).transpose()
  }

  async fn transition_employment(
    &self,
    selector: RecordSelector,
    transition: Transition,
    at: DateTime<Utc>,
  ) -> Result<u64> {
    let at_str = encode_dt(at);
    let (set, mut params) = match transition {
      // SET expressions see the pre-update row, so both branches test the
      // old marker.
      Transition::Trash => (
        "deleted_at = COALESCE(deleted_at, ?), \
         updated_at = CASE WHEN deleted_at IS NULL THEN ? ELSE updated_at END",
        vec![Value::Text(at_str.clone()), Value::Text(at_str)],
      ),
      Transition::Restore => (
        "deleted_at = NULL, updated_at = ?",
        vec![Value::Text(at_str)],
      ),
    };
    let sql = format!(
      "UPDATE employment SET {set}{}",
      selector_clause(&selector, &mut params)
    );

    let matched = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;
    Ok(to_count(matched))
  }

  async fn delete_employment(&self, selector: RecordSelector) -> Result<u64> {
    let mut params = Vec::new();
    let sql = format!(
      "DELETE FROM employment{}",
      selector_clause(&selector, &mut params)
    );

    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?))
      .await?;
    Ok(to_count(deleted))
  }
}
