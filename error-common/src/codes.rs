// Error codes implementation
// Stable, machine-readable codes carried in every API error body

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
    pub const TOO_SHORT: &str = "VALIDATION_1004";
    pub const WEAK_PASSWORD: &str = "VALIDATION_1005";
    pub const MALFORMED_BODY: &str = "VALIDATION_1006";
    pub const TOO_LONG: &str = "VALIDATION_1007";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const TOKEN_EXPIRED: &str = "AUTH_2002";
    pub const TOKEN_INVALID: &str = "AUTH_2003";
    pub const MISSING_BEARER: &str = "AUTH_2004";
    pub const INVALID_REFRESH_TOKEN: &str = "AUTH_2005";
    pub const NOT_LOGGED_IN: &str = "AUTH_2006";
    pub const USER_NOT_FOUND: &str = "AUTH_2007";
}

pub mod registration {
    pub const EMAIL_TAKEN: &str = "REG_3001";
}

pub mod system {
    pub const INTERNAL: &str = "SYS_5001";
}
