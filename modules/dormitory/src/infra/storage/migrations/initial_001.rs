use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = schema_sql(manager.get_database_backend())?;
        manager.get_connection().execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let sql = r#"
DROP TABLE IF EXISTS repair_tickets;
DROP TABLE IF EXISTS assignments;
DROP TABLE IF EXISTS rooms;
DROP TABLE IF EXISTS users;
        "#;
        conn.execute_unprepared(sql).await?;
        Ok(())
    }
}

fn schema_sql(backend: sea_orm::DatabaseBackend) -> Result<&'static str, DbErr> {
    let sql = match backend {
        sea_orm::DatabaseBackend::Postgres => {
            r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY NOT NULL,
    username VARCHAR(50) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    real_name VARCHAR(100) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(32),
    role VARCHAR(16) NOT NULL,
    student_number VARCHAR(32),
    class_name VARCHAR(100),
    major VARCHAR(100),
    department VARCHAR(100),
    position VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_student_number ON users(student_number);

CREATE TABLE IF NOT EXISTS rooms (
    id UUID PRIMARY KEY NOT NULL,
    building_name VARCHAR(100) NOT NULL,
    room_number VARCHAR(20) NOT NULL,
    capacity INTEGER NOT NULL CHECK (capacity > 0),
    occupancy INTEGER NOT NULL DEFAULT 0 CHECK (occupancy >= 0 AND occupancy <= capacity),
    room_type VARCHAR(16) NOT NULL,
    status VARCHAR(16) NOT NULL,
    monthly_rent DOUBLE PRECISION,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_rooms_location ON rooms(building_name, room_number);

CREATE TABLE IF NOT EXISTS assignments (
    id UUID PRIMARY KEY NOT NULL,
    student_id UUID NOT NULL REFERENCES users(id),
    room_id UUID NOT NULL REFERENCES rooms(id),
    check_in_date DATE NOT NULL,
    check_out_date DATE,
    status VARCHAR(16) NOT NULL,
    monthly_fee DOUBLE PRECISION,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_assignments_student ON assignments(student_id, status);
CREATE INDEX IF NOT EXISTS idx_assignments_room ON assignments(room_id, status);
CREATE UNIQUE INDEX IF NOT EXISTS idx_assignments_one_active
    ON assignments(student_id) WHERE status = 'ACTIVE';

CREATE TABLE IF NOT EXISTS repair_tickets (
    id UUID PRIMARY KEY NOT NULL,
    student_id UUID NOT NULL REFERENCES users(id),
    room_id UUID NOT NULL REFERENCES rooms(id),
    description TEXT NOT NULL,
    repair_type VARCHAR(16) NOT NULL,
    status VARCHAR(16) NOT NULL,
    priority VARCHAR(16) NOT NULL,
    assigned_admin_id UUID REFERENCES users(id),
    admin_notes TEXT,
    repair_cost DOUBLE PRECISION,
    requested_at TIMESTAMPTZ NOT NULL,
    assigned_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_repair_tickets_status ON repair_tickets(status, requested_at);
            "#
        }
        sea_orm::DatabaseBackend::MySql => {
            return Err(DbErr::Migration("MySQL is not supported".to_owned()));
        }
        sea_orm::DatabaseBackend::Sqlite => {
            r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    real_name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    role TEXT NOT NULL,
    student_number TEXT,
    class_name TEXT,
    major TEXT,
    department TEXT,
    position TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_student_number ON users(student_number);

CREATE TABLE IF NOT EXISTS rooms (
    id TEXT PRIMARY KEY NOT NULL,
    building_name TEXT NOT NULL,
    room_number TEXT NOT NULL,
    capacity INTEGER NOT NULL CHECK (capacity > 0),
    occupancy INTEGER NOT NULL DEFAULT 0 CHECK (occupancy >= 0 AND occupancy <= capacity),
    room_type TEXT NOT NULL,
    status TEXT NOT NULL,
    monthly_rent REAL,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_rooms_location ON rooms(building_name, room_number);

CREATE TABLE IF NOT EXISTS assignments (
    id TEXT PRIMARY KEY NOT NULL,
    student_id TEXT NOT NULL REFERENCES users(id),
    room_id TEXT NOT NULL REFERENCES rooms(id),
    check_in_date TEXT NOT NULL,
    check_out_date TEXT,
    status TEXT NOT NULL,
    monthly_fee REAL,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_assignments_student ON assignments(student_id, status);
CREATE INDEX IF NOT EXISTS idx_assignments_room ON assignments(room_id, status);
CREATE UNIQUE INDEX IF NOT EXISTS idx_assignments_one_active
    ON assignments(student_id) WHERE status = 'ACTIVE';

CREATE TABLE IF NOT EXISTS repair_tickets (
    id TEXT PRIMARY KEY NOT NULL,
    student_id TEXT NOT NULL REFERENCES users(id),
    room_id TEXT NOT NULL REFERENCES rooms(id),
    description TEXT NOT NULL,
    repair_type TEXT NOT NULL,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    assigned_admin_id TEXT REFERENCES users(id),
    admin_notes TEXT,
    repair_cost REAL,
    requested_at TEXT NOT NULL,
    assigned_at TEXT,
    completed_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_repair_tickets_status ON repair_tickets(status, requested_at);
            "#
        }
    };
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sqlite_and_postgres_have_a_schema() {
        assert!(schema_sql(sea_orm::DatabaseBackend::Sqlite).is_ok());
        assert!(schema_sql(sea_orm::DatabaseBackend::Postgres).is_ok());
        assert!(matches!(
            schema_sql(sea_orm::DatabaseBackend::MySql),
            Err(DbErr::Migration(msg)) if msg.contains("MySQL")
        ));
    }
}
