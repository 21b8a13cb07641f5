pub mod validation {

    /// Passwords must be strictly longer than this.
    pub const PASSWORD_MIN_LENGTH: usize = 3;

    pub const USERNAME_MIN_LENGTH: usize = 3;
}

pub mod token {

    pub const DEFAULT_TTL_SECONDS: u64 = 60 * 60;

    /// Thirty days.
    pub const MAX_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;
}

pub mod messages {

    pub const TOKEN_MISSING_OR_INVALID: &str = "token missing or invalid";

    pub const TOKEN_EXPIRED: &str = "token expired";

    pub const INVALID_LOGIN: &str = "invalid username or password";

    pub const MALFORMED_ID: &str = "malformatted id";
}
