//! Tokenized logging front end.
//!
//! `token_log!` replaces the format string with its compile-time token,
//! varint-encodes the arguments, and emits one `$`...`\n` frame through the
//! logger's byte sink. The format string itself never reaches the target
//! binary's data; resolving tokens back to text happens offline against a
//! database built from the source tree.
//!
//! The logger owns its sink, so as long as a single task owns the logger,
//! frames can never interleave on the wire.

use tokenwire::frame::{self, ByteSink, Metadata};

pub struct TokenLogger<S: ByteSink> {
    sink: S,
}

impl<S: ByteSink> TokenLogger<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Emits one frame; the first sink failure aborts the frame and
    /// propagates, so a partial frame is never reported as sent.
    pub fn emit(&mut self, metadata: Metadata, payload: &[u8]) -> Result<(), S::Error> {
        frame::emit(&mut self.sink, metadata, payload)
    }
}

/// `token_log!(logger, Info, "mean=%d n=%u", mean, n)`
///
/// The level is a [`tokenwire::frame::Level`] variant name; arguments must
/// implement [`tokenwire::payload::LogArg`]. Evaluates to the sink's
/// `Result`.
#[macro_export]
macro_rules! token_log {
    ($logger:expr, $level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        const TOKEN: u32 = ::tokenwire::payload::token($fmt);
        let mut payload = ::tokenwire::payload::Payload::<64>::new(TOKEN);
        $( ::tokenwire::payload::LogArg::encode(&$arg, &mut payload); )*
        $logger.emit(
            ::tokenwire::frame::Metadata::new(::tokenwire::frame::Level::$level, line!()),
            payload.as_bytes(),
        )
    }};
}
