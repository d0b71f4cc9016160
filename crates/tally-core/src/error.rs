use std::fmt;

/// Machine-readable error codes shared by every tally error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    EmptyInput,
    InvalidValue,
    NoSelection,
    StaleSelection,
    ItemNotFound,
    IdsExhausted,
    CorruptSnapshot,
    InvalidStorageKey,
    StorageIo,
    StorageSqlite,
    InternalEncode,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::EmptyInput => "E2001",
            Self::InvalidValue => "E2002",
            Self::NoSelection => "E2003",
            Self::StaleSelection => "E2004",
            Self::ItemNotFound => "E2005",
            Self::IdsExhausted => "E2006",
            Self::CorruptSnapshot => "E3001",
            Self::InvalidStorageKey => "E3002",
            Self::StorageIo => "E5001",
            Self::StorageSqlite => "E5002",
            Self::InternalEncode => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyInput => "Name and value are required",
            Self::InvalidValue => "Value is not a number",
            Self::NoSelection => "No item selected",
            Self::StaleSelection => "Selected item no longer exists",
            Self::ItemNotFound => "Item not found",
            Self::IdsExhausted => "No item ids left",
            Self::CorruptSnapshot => "Stored snapshot is corrupt",
            Self::InvalidStorageKey => "Invalid storage key",
            Self::StorageIo => "Storage I/O failed",
            Self::StorageSqlite => "SQLite storage failed",
            Self::InternalEncode => "Internal encoding error",
        }
    }

    /// Optional remediation hint that can be surfaced to the presentation layer.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in tally config.toml and retry."),
            Self::EmptyInput => Some("Fill in both the name and the value."),
            Self::InvalidValue => Some("Enter a whole number, e.g. 300."),
            Self::NoSelection | Self::StaleSelection => Some("Select an item to edit first."),
            Self::ItemNotFound => None,
            Self::IdsExhausted => Some("Remove the item with the highest id, or clear all items."),
            Self::CorruptSnapshot => {
                Some("Inspect or clear the stored slot; it was not overwritten.")
            }
            Self::InvalidStorageKey => Some("Use only letters, digits, '-' and '_' in keys."),
            Self::StorageIo => Some("Check disk space and write permissions."),
            Self::StorageSqlite => Some("Check that the database file is writable."),
            Self::InternalEncode => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
