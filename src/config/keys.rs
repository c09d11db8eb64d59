//! Storage key constants
//!
//! These strings are a stable wire contract with the persistent key-value
//! store. Renaming any of them orphans previously written data.

/// Scheduled reports created from export templates
///
/// Custom-report schedules share this key; the schedule record carries
/// enough export options that a separate store was never needed.
pub const SCHEDULED_REPORTS: &str = "scheduled-reports";

/// Named export templates
pub const EXPORT_TEMPLATES: &str = "export-templates";

/// Report run history (ring buffer)
pub const REPORT_HISTORY: &str = "money_management_report_history";

/// Singleton backup configuration
pub const BACKUP_CONFIG: &str = "money_management_backup_config";

/// Backup run history (ring buffer)
pub const BACKUP_HISTORY: &str = "money_management_backup_history";

/// Stored backup records (payload blobs plus metadata)
pub const BACKUP_RECORDS: &str = "money_management_backups";

/// Stored accounts
pub const ACCOUNTS: &str = "money_management_accounts";

/// Stored transactions
pub const TRANSACTIONS: &str = "money_management_transactions";

/// Stored budget lines
pub const BUDGETS: &str = "money_management_budgets";

/// Stored savings goals
pub const GOALS: &str = "money_management_goals";

/// Stored investments
pub const INVESTMENTS: &str = "money_management_investments";

/// Stored category definitions
pub const CATEGORIES: &str = "money_management_categories";

/// Application settings blob
pub const SETTINGS: &str = "money_management_settings";

/// Entity keys collected verbatim into a backup bundle
pub const BACKUP_DATA_KEYS: &[&str] = &[
    ACCOUNTS,
    TRANSACTIONS,
    BUDGETS,
    GOALS,
    INVESTMENTS,
    CATEGORIES,
    SETTINGS,
];
