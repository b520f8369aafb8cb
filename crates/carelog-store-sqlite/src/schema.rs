//! SQL schema for the carelog SQLite store.
//!
//! Column lists must match the [`Table`](carelog_core::Table) definitions in
//! `carelog_core::models`. The DDL runs only on a fresh database, recorded
//! through `PRAGMA user_version`.

/// Version written to `user_version` once [`SCHEMA`] has been applied.
pub const SCHEMA_VERSION: i64 = 1;

/// Run on every connection. `foreign_keys` is per-connection and off by
/// default in SQLite; cascades and `SET NULL` actions depend on it.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Full schema DDL.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER REFERENCES users(id) ON DELETE CASCADE,
    furigana    TEXT NOT NULL,
    full_name   TEXT NOT NULL,
    gender      TEXT,            -- 'male' | 'female' | 'other'
    birthday    TEXT,
    postal_code TEXT,
    address     TEXT,
    telephone   TEXT,
    email       TEXT,
    notes       TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS facilities (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    furigana        TEXT,
    facility_number TEXT,
    service_type    TEXT,
    postal_code     TEXT,
    address         TEXT,
    telephone       TEXT NOT NULL,
    fax             TEXT,
    email           TEXT,
    capacity        INTEGER,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS facility_user (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    facility_id INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    role        TEXT NOT NULL DEFAULT 'staff',   -- 'admin' | 'manager' | 'staff'
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (user_id, facility_id)
);

CREATE TABLE IF NOT EXISTS medias (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name    TEXT NOT NULL,
    mime_type    TEXT NOT NULL,
    size         INTEGER NOT NULL,
    vendor       TEXT NOT NULL,   -- 'local' | 's3'
    path         TEXT NOT NULL,   -- URL path (local) or object key (s3)
    content_hash TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS consultations (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    facility_id          INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    consultation_date    TEXT NOT NULL,
    furigana             TEXT NOT NULL,
    full_name            TEXT NOT NULL,
    gender               TEXT,
    birthday             TEXT,
    telephone            TEXT NOT NULL,
    postal_code          TEXT,
    address              TEXT,
    consultation_route   TEXT,
    content              TEXT,
    response_status      TEXT NOT NULL DEFAULT '0',
    referral_facility_id INTEGER REFERENCES facilities(id) ON DELETE SET NULL,
    staff_user_id        INTEGER REFERENCES users(id) ON DELETE SET NULL,
    notes                TEXT,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS family_members (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    consultation_id INTEGER NOT NULL REFERENCES consultations(id) ON DELETE CASCADE,
    name            TEXT NOT NULL,
    relationship    TEXT,
    age             INTEGER,
    living_together INTEGER NOT NULL DEFAULT 0,
    telephone       TEXT,
    notes           TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS service_users (
    id                          INTEGER PRIMARY KEY AUTOINCREMENT,
    facility_id                 INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    consultation_id             INTEGER REFERENCES consultations(id) ON DELETE SET NULL,
    furigana                    TEXT NOT NULL,
    full_name                   TEXT NOT NULL,
    gender                      TEXT,
    birthday                    TEXT,
    recipient_number            TEXT,
    support_category            INTEGER,
    move_in_date                TEXT,
    move_out_date               TEXT,
    room_number                 TEXT,
    emergency_contact_name      TEXT,
    emergency_contact_telephone TEXT,
    status                      TEXT NOT NULL DEFAULT 'active',
    notes                       TEXT,
    created_at                  TEXT NOT NULL,
    updated_at                  TEXT NOT NULL,
    deleted_at                  TEXT
);

CREATE TABLE IF NOT EXISTS assessments (
    id                            INTEGER PRIMARY KEY AUTOINCREMENT,
    service_user_id               INTEGER NOT NULL REFERENCES service_users(id) ON DELETE CASCADE,
    assessment_date               TEXT NOT NULL,
    assessor_user_id              INTEGER REFERENCES users(id) ON DELETE SET NULL,
    living_situation              TEXT,
    hopes_of_person               TEXT,
    hopes_of_family               TEXT,
    physical_disability_type      TEXT,
    physical_disability_grade     INTEGER,
    intellectual_disability_grade TEXT,
    mental_disability_grade       INTEGER,
    notes                         TEXT,
    created_at                    TEXT NOT NULL,
    updated_at                    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS living_domain_assessments (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    assessment_id  INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    domain         TEXT NOT NULL,
    level          TEXT,
    current_status TEXT,
    support_needed TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS medical_disability_history (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    assessment_id INTEGER NOT NULL REFERENCES assessments(id) ON DELETE CASCADE,
    disease_name  TEXT NOT NULL,
    onset_date    TEXT,
    hospital_name TEXT,
    doctor_name   TEXT,
    medication    TEXT,
    notes         TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS support_plans (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    service_user_id INTEGER NOT NULL REFERENCES service_users(id) ON DELETE CASCADE,
    facility_id     INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    plan_start_date TEXT NOT NULL,
    plan_end_date   TEXT NOT NULL,
    created_by      INTEGER REFERENCES users(id) ON DELETE SET NULL,
    long_term_goal  TEXT,
    short_term_goal TEXT,
    hopes_of_person TEXT,
    hopes_of_family TEXT,
    status          TEXT NOT NULL DEFAULT 'draft',   -- 'draft' | 'agreed' | 'finished'
    agreed_on       TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS support_plan_goals (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    support_plan_id INTEGER NOT NULL REFERENCES support_plans(id) ON DELETE CASCADE,
    domain          TEXT,
    goal            TEXT NOT NULL,
    priority        INTEGER,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS support_plan_details (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    support_plan_id  INTEGER NOT NULL REFERENCES support_plans(id) ON DELETE CASCADE,
    support_content  TEXT NOT NULL,
    frequency        TEXT,
    person_in_charge TEXT,
    period           TEXT,
    notes            TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS support_plan_reviews (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    support_plan_id  INTEGER NOT NULL REFERENCES support_plans(id) ON DELETE CASCADE,
    review_date      TEXT NOT NULL,
    reviewer_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    achievement      TEXT,
    evaluation       TEXT,
    next_action      TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS daily_reports (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    facility_id INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    report_date TEXT NOT NULL,
    shift       TEXT NOT NULL DEFAULT 'day',   -- 'day' | 'night'
    weather     TEXT,
    summary     TEXT,
    handover    TEXT,
    created_by  INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (facility_id, report_date, shift)
);

CREATE TABLE IF NOT EXISTS daily_report_staffs (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    daily_report_id INTEGER NOT NULL REFERENCES daily_reports(id) ON DELETE CASCADE,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role            TEXT,
    shift_start     TEXT,
    shift_end       TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS daily_report_service_users (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    daily_report_id  INTEGER NOT NULL REFERENCES daily_reports(id) ON DELETE CASCADE,
    service_user_id  INTEGER NOT NULL REFERENCES service_users(id) ON DELETE CASCADE,
    condition        TEXT,
    body_temperature REAL,
    breakfast        INTEGER NOT NULL DEFAULT 0,
    lunch            INTEGER NOT NULL DEFAULT 0,
    dinner           INTEGER NOT NULL DEFAULT 0,
    bathing          INTEGER NOT NULL DEFAULT 0,
    medication_taken INTEGER NOT NULL DEFAULT 0,
    notes            TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL,
    UNIQUE (daily_report_id, service_user_id)
);

CREATE TABLE IF NOT EXISTS incidents (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    facility_id      INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    service_user_id  INTEGER REFERENCES service_users(id) ON DELETE SET NULL,
    occurred_at      TEXT NOT NULL,
    location         TEXT,
    category         TEXT NOT NULL,   -- 'accident' | 'near_miss' | 'complaint' | 'other'
    description      TEXT NOT NULL,
    response         TEXT,
    prevention       TEXT,
    reporter_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    family_notified  INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS service_provision_logs (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    facility_id     INTEGER NOT NULL REFERENCES facilities(id) ON DELETE CASCADE,
    service_user_id INTEGER NOT NULL REFERENCES service_users(id) ON DELETE CASCADE,
    provision_date  TEXT NOT NULL,
    service_type    TEXT,
    start_time      TEXT NOT NULL,   -- HH:MM
    end_time        TEXT NOT NULL,   -- HH:MM
    pickup          INTEGER NOT NULL DEFAULT 0,
    meal_provided   INTEGER NOT NULL DEFAULT 0,
    notes           TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS deposits (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    service_user_id  INTEGER NOT NULL REFERENCES service_users(id) ON DELETE CASCADE,
    transaction_date TEXT NOT NULL,
    transaction_type TEXT NOT NULL,   -- 'deposit' | 'withdrawal'
    amount           INTEGER NOT NULL CHECK (amount > 0),
    item             TEXT,
    handled_by       INTEGER REFERENCES users(id) ON DELETE SET NULL,
    receipt_media_id INTEGER REFERENCES medias(id) ON DELETE SET NULL,
    notes            TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    service_user_id INTEGER NOT NULL REFERENCES service_users(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    category        TEXT,
    file            INTEGER REFERENCES medias(id) ON DELETE SET NULL,
    issued_on       TEXT,
    notes           TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS signatures (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    signer_name TEXT NOT NULL,
    signer_role TEXT,
    signed_at   TEXT NOT NULL,
    media_id    INTEGER REFERENCES medias(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS consultations_facility_idx ON consultations(facility_id);
CREATE INDEX IF NOT EXISTS service_users_facility_idx ON service_users(facility_id);
CREATE INDEX IF NOT EXISTS assessments_user_idx       ON assessments(service_user_id);
CREATE INDEX IF NOT EXISTS support_plans_user_idx     ON support_plans(service_user_id);
CREATE INDEX IF NOT EXISTS daily_reports_date_idx     ON daily_reports(report_date);
CREATE INDEX IF NOT EXISTS incidents_facility_idx     ON incidents(facility_id);
CREATE INDEX IF NOT EXISTS provision_logs_user_idx    ON service_provision_logs(service_user_id);
CREATE INDEX IF NOT EXISTS deposits_user_idx          ON deposits(service_user_id);
CREATE INDEX IF NOT EXISTS documents_user_idx         ON documents(service_user_id);
";
