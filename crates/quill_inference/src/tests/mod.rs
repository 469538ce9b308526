//! Cross-module scenarios exercising the session protocol end to end.

mod session_protocol;
