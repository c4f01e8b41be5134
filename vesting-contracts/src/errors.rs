use soroban_sdk::contracterror;

/// Custom error types for the vesting contract
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VestingError {
    // Initialization errors (1000-1099)
    NotInitialized = 1000,
    AlreadyInitialized = 1001,

    // Authorization errors (1100-1199)
    Unauthorized = 1100,

    // Validation errors (1200-1299)
    InvalidAmount = 1200,
    InvalidTimestamp = 1201,
    InvalidSchedule = 1202,

    // Lifecycle errors (1300-1399)
    /// Registration attempted once the schedule has started.
    ScheduleStarted = 1300,
    AlreadyRegistered = 1301,
    NothingDue = 1302,
    OperationNotAllowed = 1303,

    // Ledger errors (1400-1499)
    InsufficientCustody = 1400,
    TransferFailed = 1401,
    LedgerInvariantBroken = 1402,

    // Arithmetic errors (1500-1599)
    Overflow = 1500,
    DivideByZero = 1501,

    // Batch errors (1600-1699)
    BatchEmpty = 1600,
    BatchTooLarge = 1601,
    BatchLengthMismatch = 1602,
}
