use machinatrack_errors::TrackResult;
use sqlx::SqlitePool;
use tracing::debug;

const TABLES: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS equipment (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        manufacturer TEXT,
        model TEXT,
        serial_number TEXT,
        location TEXT,
        purchase_date TEXT,
        status TEXT NOT NULL DEFAULT 'operational',
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS consumables (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
        min_quantity INTEGER NOT NULL DEFAULT 0 CHECK (min_quantity >= 0),
        unit TEXT,
        location TEXT,
        supplier TEXT,
        part_number TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS maintenance_tasks (
        id TEXT PRIMARY KEY,
        equipment_id TEXT NOT NULL,
        description TEXT NOT NULL,
        frequency_days INTEGER,
        last_performed_date TEXT,
        next_due_date TEXT,
        assigned_to TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        parts_used TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (equipment_id) REFERENCES equipment(id) ON DELETE RESTRICT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metrology_tools (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        tool_type TEXT,
        serial_number TEXT,
        location TEXT,
        calibration_interval_days INTEGER,
        last_calibration_date TEXT,
        next_calibration_date TEXT,
        status TEXT NOT NULL DEFAULT 'awaiting_calibration',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS calibration_logs (
        id TEXT PRIMARY KEY,
        tool_id TEXT NOT NULL,
        calibration_date TEXT NOT NULL,
        performed_by TEXT NOT NULL,
        result TEXT NOT NULL,
        notes TEXT,
        next_due_date TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY (tool_id) REFERENCES metrology_tools(id) ON DELETE RESTRICT
    )
    "#,
];

const INDEXES: [&str; 8] = [
    "CREATE INDEX IF NOT EXISTS idx_equipment_status ON equipment(status)",
    "CREATE INDEX IF NOT EXISTS idx_consumables_category ON consumables(category)",
    "CREATE INDEX IF NOT EXISTS idx_maintenance_tasks_equipment_id ON maintenance_tasks(equipment_id)",
    "CREATE INDEX IF NOT EXISTS idx_maintenance_tasks_status ON maintenance_tasks(status)",
    "CREATE INDEX IF NOT EXISTS idx_maintenance_tasks_next_due_date ON maintenance_tasks(next_due_date)",
    "CREATE INDEX IF NOT EXISTS idx_metrology_tools_status ON metrology_tools(status)",
    "CREATE INDEX IF NOT EXISTS idx_metrology_tools_next_calibration ON metrology_tools(next_calibration_date)",
    "CREATE INDEX IF NOT EXISTS idx_calibration_logs_tool_id ON calibration_logs(tool_id)",
];

/// 创建全部表与索引，可重复执行
pub async fn run_migrations(pool: &SqlitePool) -> TrackResult<()> {
    debug!("Running SQLite database migrations");

    for table_sql in TABLES {
        sqlx::query(table_sql).execute(pool).await?;
    }
    for index_sql in INDEXES {
        sqlx::query(index_sql).execute(pool).await?;
    }

    debug!("Successfully completed SQLite database migrations");
    Ok(())
}
