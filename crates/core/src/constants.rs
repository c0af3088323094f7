/// Page size used when a search request does not specify one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound for any search page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Version assigned to prompt templates created without one
pub const DEFAULT_TEMPLATE_VERSION: &str = "1.0-draft";

/// Suffix marking a prompt template version as a draft
pub const DRAFT_VERSION_SUFFIX: &str = "-draft";

/// Maximum length of content and template names
pub const MAX_NAME_LENGTH: usize = 128;

/// Maximum length of a prompt template version string
pub const MAX_VERSION_LENGTH: usize = 16;

/// Maximum length of system and user prompt templates
pub const MAX_PROMPT_LENGTH: usize = 4096;

/// Maximum length of a negative prompt template
pub const MAX_NEGATIVE_PROMPT_LENGTH: usize = 2048;

/// Maximum length of a library content description
pub const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// Maximum length of a user email address
pub const MAX_EMAIL_LENGTH: usize = 256;

/// Role that grants library and user administration
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// Roles an administrator can assign
pub const KNOWN_ROLES: [&str; 2] = [ADMINISTRATOR_ROLE, "User"];

/// Length of an administrative lockout, in months (100 years)
pub const ADMIN_LOCKOUT_MONTHS: u32 = 1200;
