pub(super) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS applications (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    full_name TEXT NOT NULL,
    phone TEXT,
    profile TEXT NOT NULL,
    status TEXT NOT NULL,
    reviewed_by TEXT,
    submitted_at TEXT NOT NULL,
    approved_at TEXT,
    agreement_at TEXT,
    one_time_fee_at TEXT,
    rejected_at TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS applications_applicant
    ON applications (email COLLATE NOCASE, full_name);

CREATE TABLE IF NOT EXISTS customers (
    customer_id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    full_name TEXT NOT NULL,
    application_id TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS customers_applicant
    ON customers (email COLLATE NOCASE, full_name);

CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    phone TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bank_records (
    id TEXT PRIMARY KEY,
    holder_name TEXT NOT NULL,
    account_number TEXT NOT NULL UNIQUE,
    ifsc TEXT NOT NULL,
    bank_name TEXT NOT NULL,
    branch_name TEXT,
    upi_id TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS qr_images (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    content_type TEXT NOT NULL,
    md5 TEXT NOT NULL,
    base64 TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assigned_banks (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    customer_email TEXT NOT NULL,
    bank_record_id TEXT,
    holder_name TEXT,
    account_number TEXT,
    ifsc TEXT,
    bank_name TEXT,
    branch_name TEXT,
    upi_id TEXT,
    qr_image_id TEXT,
    assigned_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS assigned_banks_customer
    ON assigned_banks (customer_email COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS notifications (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    application_id TEXT,
    stage TEXT NOT NULL,
    recipient TEXT NOT NULL,
    subject TEXT NOT NULL,
    body TEXT NOT NULL,
    state TEXT NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";
