/// Road speeds are carried as miles per hour.
pub type Mph = f64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
