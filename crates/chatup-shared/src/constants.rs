/// Default tenant identifier scoping collaborator paths
pub const DEFAULT_APP_ID: &str = "default-chat-app";

/// Number of messages kept in a live conversation window
pub const MESSAGE_WINDOW: usize = 50;

/// Stream identifier of the singleton public room
pub const PUBLIC_STREAM: &str = "public";

/// Separator joining the two participant ids of a direct stream
pub const DIRECT_STREAM_SEPARATOR: char = '_';

/// Sender id carried by synthetic system messages (load failures etc.)
pub const SYSTEM_SENDER: &str = "system";

/// Path prefix of the presence subtree in the realtime KV collaborator
pub const PRESENCE_PATH: &str = "status";

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;
