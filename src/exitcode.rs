//! Process exit codes, taken from BSD sysexits.h

/// Command succeeded; every validated file passed
pub const OK: i32 = 0;

/// Bad invocation: missing command, refusing to overwrite a config file
pub const USAGE: i32 = 64;

/// A tree file is malformed or failed batch validation
pub const DATAERR: i32 = 65;

/// Tree file or directory does not exist
pub const NOINPUT: i32 = 66;

/// Engine invariant broken at runtime
pub const SOFTWARE: i32 = 70;

/// Reading trees or terminal I/O failed
pub const IOERR: i32 = 74;

/// Config file unreadable or invalid
pub const CONFIG: i32 = 78;
