/// Check if the process is running as root.
///
/// PostgreSQL keeps its home directory readable by the `postgres` account
/// only, so collection without root usually yields a partial archive.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Get instructions for elevating privileges
pub fn get_elevation_instructions() -> &'static str {
    "Run with sudo: 'sudo pg-collector', or as the postgres user"
}
