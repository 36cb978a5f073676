pub mod limits {
    pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
    pub const MAX_TITLE_CHARS: usize = 200;
    pub const MAX_CONTENT_CHARS: usize = 50_000;
    pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
    pub const FILE_MODE: u32 = 0o644;
    pub const MAX_ERROR_OUTPUT_BYTES: usize = 4096;
}

pub mod timeouts {
    pub const WP_CLI_TIMEOUT_MS: u64 = 60_000;
}

pub mod cache {
    pub const READ_TTL_MS: u64 = 600_000;
}

pub mod breaker {
    pub const FAILURE_THRESHOLD: u32 = 5;
    pub const RECOVERY_TIMEOUT_MS: u64 = 60_000;
}

pub mod wordpress {
    pub const POST_STATUSES: &[&str] = &["publish", "draft", "pending", "private"];
    pub const POST_TYPES: &[&str] = &["post", "page"];
    pub const EDITABLE_EXTENSIONS: &[&str] = &[
        "php", "css", "js", "json", "html", "htm", "txt", "md", "xml", "yml", "yaml", "ini",
    ];
}

pub mod families {
    pub const POSTS: &str = "posts";
    pub const PLUGINS: &str = "plugins";
    pub const THEMES: &str = "themes";
    pub const OPTIONS: &str = "options";
    pub const SYSTEM: &str = "system";
}
