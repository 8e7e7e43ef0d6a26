//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter     | Implements  | Connects to                          |
//! |-------------|-------------|--------------------------------------|
//! | `log_sink`  | EventSink   | `log` facade (serial console)        |
//! | `time`      | ClockPort   | Host monotonic clock                 |
//!
//! Hardware range drivers live with the board support code and implement
//! [`RangePort`](crate::app::ports::RangePort) directly.

pub mod log_sink;
pub mod time;
