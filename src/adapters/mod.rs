//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                     |
//! |----------------|---------------------|---------------------------------|
//! | `config_store` | ConfigPort          | JSON file / in-memory blob      |
//! | `console`      | AnnunciatorPort     | stdout (LCD, LED, buzzer)       |
//! | `event_file`   | EventLogPort        | append-only `events.txt`        |
//! | `hardware`     | SensorPort          | embedded-hal GPIO + HC-SR04     |
//! |                | KeypadPort          | 4×4 matrix keypad               |
//! | `log_sink`     | EventSink           | `log` facade                    |
//! | `sim`          | pins, KeypadPort    | host simulation                 |
//! | `time`         | ClockPort           | `Instant` + local wall clock    |

pub mod config_store;
pub mod console;
pub mod event_file;
pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
