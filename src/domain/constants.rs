pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_VIOLATIONS_LIMIT: u32 = 50;

pub const MIN_SCAN_INTERVAL_MINUTES: i64 = 1;
pub const MAX_SCAN_INTERVAL_MINUTES: i64 = 1440;

/// Exit status for a protected command invoked without a session.
pub const EXIT_LOGIN_REDIRECT: i32 = 3;

pub const LOGIN_ROUTE: &str = "login";

/// Views reachable from the console, in navigation order.
pub const ROUTES: &[(&str, &str)] = &[
    ("Dashboard", "dashboard"),
    ("Scan", "scan"),
    ("History", "history"),
    ("Risk Analysis", "risk"),
    ("Violations", "violations"),
    ("Reports", "report"),
    ("System Settings", "system"),
];
